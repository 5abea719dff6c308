//! Print program readiness and the events stored in the wall account.
//!
//! Usage: `wall-status [config-file]`. Values not in the file come from
//! `PREDICTION_*` environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use prediction_client::gate;
use prediction_client::{telemetry, ClientConfig, HttpLedgerRpc};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init(Level::INFO);

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ClientConfig::load(path.as_deref()).context("loading configuration")?;
    info!(rpc = %config.rpc_url, program = %config.program_id, "checking ledger");

    let rpc = HttpLedgerRpc::from_config(&config)?;
    let readiness = gate::readiness(&rpc, &config.program_id, &config.wall_account).await?;
    println!("program deployed:     {}", readiness.program_deployed);
    println!("wall account created: {}", readiness.wall_account_created);

    if !readiness.program_deployed {
        println!("deploy the program first");
        return Ok(());
    }

    match gate::fetch_events(&rpc, &config.wall_account).await? {
        None => println!("wall account {} does not exist yet", config.wall_account),
        Some(events) => {
            println!("total predictions:    {}", events.total_predictions);
            for p in &events.predictions {
                let winner = p
                    .winning_outcome
                    .map_or_else(|| "-".to_string(), |w| w.to_string());
                println!(
                    "  {:<32}  {:<9}  expiry {}  pool {}  outcomes {}  winner {}",
                    p.unique_id_text(),
                    p.status,
                    p.expiry_timestamp,
                    p.total_pool_amount,
                    p.outcomes.len(),
                    winner
                );
            }
        }
    }

    Ok(())
}
