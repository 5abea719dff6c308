//! Ledger RPC collaborator.

pub mod http;

use arch_tx::{Identity, SignedTransaction};
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::RpcError;

pub use http::HttpLedgerRpc;

/// Account contents as reported by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub data: Vec<u8>,
    #[serde(default)]
    pub owner: Option<Identity>,
    #[serde(default)]
    pub utxo: Option<String>,
    #[serde(default)]
    pub is_executable: bool,
}

impl AccountInfo {
    pub fn with_data(data: Vec<u8>) -> Self {
        AccountInfo {
            data,
            ..AccountInfo::default()
        }
    }
}

/// Ledger acknowledgement of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub txid: String,
}

/// The two ledger operations this client needs.
///
/// Each call is a single request and a single response; implementations
/// must not retry.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Read an account. An absent account is `RpcError::NotFound`.
    async fn read_account_info(&self, identity: &Identity) -> Result<AccountInfo, RpcError>;

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<SubmissionResult, RpcError>;
}
