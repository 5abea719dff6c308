//! Account state gate.
//!
//! An absent account is an ordinary answer, not a failure. Only errors where
//! the ledger could not answer propagate.

use arch_tx::Identity;
use tracing::{debug, warn};

use crate::error::{ClientError, RpcError};
use crate::rpc::{AccountInfo, LedgerRpc};
use crate::state::{decode_account_state, PredictionEvents};

/// Whether the program and the shared wall account are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub program_deployed: bool,
    pub wall_account_created: bool,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.program_deployed && self.wall_account_created
    }
}

/// Read an account, mapping "not found" to `None`.
pub async fn read_account<R>(rpc: &R, identity: &Identity) -> Result<Option<AccountInfo>, RpcError>
where
    R: LedgerRpc + ?Sized,
{
    match rpc.read_account_info(identity).await {
        Ok(info) => Ok(Some(info)),
        Err(RpcError::NotFound(_)) => {
            debug!(account = %identity, "account not found");
            Ok(None)
        }
        Err(e) => {
            warn!(account = %identity, error = %e, "account read failed");
            Err(e)
        }
    }
}

pub async fn check_exists<R>(rpc: &R, identity: &Identity) -> Result<bool, RpcError>
where
    R: LedgerRpc + ?Sized,
{
    Ok(read_account(rpc, identity).await?.is_some())
}

/// Check program deployment and wall-account creation.
pub async fn readiness<R>(rpc: &R, program_id: &Identity, wall_account: &Identity) -> Result<Readiness, RpcError>
where
    R: LedgerRpc + ?Sized,
{
    let program_deployed = check_exists(rpc, program_id).await?;
    let wall_account_created = check_exists(rpc, wall_account).await?;
    Ok(Readiness {
        program_deployed,
        wall_account_created,
    })
}

/// Read and decode the wall account's event list.
pub async fn fetch_events<R>(rpc: &R, wall_account: &Identity) -> Result<Option<PredictionEvents>, ClientError>
where
    R: LedgerRpc + ?Sized,
{
    let Some(info) = read_account(rpc, wall_account).await? else {
        return Ok(None);
    };
    let events = decode_account_state(&info.data)?;
    debug!(count = events.predictions.len(), "decoded wall account");
    Ok(Some(events))
}
