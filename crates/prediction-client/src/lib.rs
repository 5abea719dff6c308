//! Client for the Arch prediction-market program.
//!
//! [`PredictionClient`] is built once at startup from a [`ClientConfig`], a
//! ledger RPC implementation and a wallet capability, and is read-only after
//! that. Every operation is a plain async request/response:
//!
//! ```text
//! create_event / close_event:
//!   wallet identity -> instruction -> message -> hash
//!     -> one signature per signer -> SignedTransaction -> send_transaction
//!
//! readiness / fetch_events:
//!   read_account_info -> exists? -> decode PredictionEvents
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod input;
pub mod rpc;
pub mod state;
pub mod submit;
pub mod telemetry;

use arch_signer::{Connection, SigningBridge, WalletCapability};
use arch_tx::{assemble, event_instruction, Identity, Instruction, Operation, Signature, TxError};
use tracing::{debug, instrument};

pub use crate::config::ClientConfig;
pub use error::{ClientError, ConfigError, InputError, RpcError};
pub use gate::Readiness;
pub use input::{
    unique_id_from_text, validate_display_name, validate_wall_message, WallEntry,
    MAX_MESSAGE_BYTES, MAX_NAME_BYTES,
};
pub use rpc::{AccountInfo, HttpLedgerRpc, LedgerRpc, SubmissionResult};
pub use state::{EventStatus, OutcomeTotal, PredictionEvents, PredictionRecord};

/// Explicit context passed to every ledger operation.
pub struct PredictionClient<R, W> {
    config: ClientConfig,
    rpc: R,
    bridge: SigningBridge<W>,
}

impl<W: WalletCapability> PredictionClient<HttpLedgerRpc, W> {
    /// Client talking JSON-RPC to the configured node.
    pub fn connect_http(config: ClientConfig, wallet: W) -> Result<Self, ClientError> {
        let rpc = HttpLedgerRpc::from_config(&config)?;
        Ok(Self::new(config, rpc, wallet))
    }
}

impl<R: LedgerRpc, W: WalletCapability> PredictionClient<R, W> {
    pub fn new(config: ClientConfig, rpc: R, wallet: W) -> Self {
        Self::with_bridge(config, rpc, SigningBridge::new(wallet))
    }

    pub fn with_bridge(config: ClientConfig, rpc: R, bridge: SigningBridge<W>) -> Self {
        PredictionClient { config, rpc, bridge }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn bridge(&self) -> &SigningBridge<W> {
        &self.bridge
    }

    /// Switch the wallet to the ledger's chain and prove key ownership.
    #[instrument(skip_all)]
    pub async fn connect_wallet(&self) -> Result<Connection, ClientError> {
        Ok(self.bridge.connect().await?)
    }

    /// Create an event on the shared wall account.
    #[instrument(skip_all, fields(expiry = expiry_timestamp, outcomes = num_outcomes))]
    pub async fn create_event(
        &self,
        unique_id: [u8; 32],
        expiry_timestamp: u32,
        num_outcomes: u8,
    ) -> Result<SubmissionResult, ClientError> {
        self.run_operation(Operation::create_event(unique_id, expiry_timestamp, num_outcomes))
            .await
    }

    /// Close an event on the shared wall account.
    #[instrument(skip_all)]
    pub async fn close_event(&self, unique_id: [u8; 32]) -> Result<SubmissionResult, ClientError> {
        self.run_operation(Operation::close_event(unique_id)).await
    }

    async fn run_operation(&self, operation: Operation) -> Result<SubmissionResult, ClientError> {
        let user = self.bridge.identity().await?;
        let ix = event_instruction(
            self.config.program_id,
            self.config.wall_account,
            user,
            &operation,
        )?;
        debug!(
            operation = operation.name(),
            unique_id = %hex::encode(operation.unique_id()),
            user = %user,
            "built instruction"
        );
        self.execute_as(user, vec![ix]).await
    }

    /// Assemble, sign and submit arbitrary instructions.
    ///
    /// Only the connected wallet can sign. If the message needs any other
    /// signer the call fails with `MissingSignature` before the wallet is
    /// asked for anything.
    #[instrument(skip_all, fields(instructions = instructions.len()))]
    pub async fn execute(&self, instructions: Vec<Instruction>) -> Result<SubmissionResult, ClientError> {
        let user = self.bridge.identity().await?;
        self.execute_as(user, instructions).await
    }

    /// `user` is the wallet identity already resolved for this operation.
    async fn execute_as(
        &self,
        user: Identity,
        instructions: Vec<Instruction>,
    ) -> Result<SubmissionResult, ClientError> {
        let message = assemble(instructions);
        let hash = message.hash()?;
        let signatures = self.collect_signatures(&message.signers, &user, &hash).await?;
        submit::submit(&self.rpc, message, signatures).await
    }

    async fn collect_signatures(
        &self,
        signers: &[Identity],
        user: &Identity,
        hash: &[u8; 32],
    ) -> Result<Vec<Signature>, ClientError> {
        let signable = signers.iter().filter(|s| *s == user).count();
        if signable < signers.len() {
            return Err(TxError::MissingSignature {
                expected: signers.len(),
                got: signable,
            }
            .into());
        }

        let mut signatures = Vec::with_capacity(signers.len());
        for _ in signers {
            signatures.push(self.bridge.request_signature(hash).await?);
        }
        Ok(signatures)
    }

    pub async fn check_exists(&self, identity: &Identity) -> Result<bool, ClientError> {
        Ok(gate::check_exists(&self.rpc, identity).await?)
    }

    /// Program deployment and wall-account creation status.
    #[instrument(skip_all)]
    pub async fn readiness(&self) -> Result<Readiness, ClientError> {
        Ok(gate::readiness(&self.rpc, &self.config.program_id, &self.config.wall_account).await?)
    }

    /// Events stored in the wall account, or `None` if it does not exist yet.
    #[instrument(skip_all)]
    pub async fn fetch_events(&self) -> Result<Option<PredictionEvents>, ClientError> {
        gate::fetch_events(&self.rpc, &self.config.wall_account).await
    }
}
