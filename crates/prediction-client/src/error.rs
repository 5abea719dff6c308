use arch_codec::CodecError;
use arch_signer::SignerError;
use arch_tx::TxError;
use thiserror::Error;

/// Startup configuration errors. Nothing can proceed after one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing config value: {0}")]
    Missing(String),

    #[error("invalid identity for {key}: {reason}")]
    InvalidIdentity { key: String, reason: String },

    #[error("invalid rpc url: {0}")]
    InvalidUrl(String),

    #[error("config source error: {0}")]
    Source(String),

    #[error("http client setup failed: {0}")]
    HttpClient(String),
}

impl From<::config::ConfigError> for ConfigError {
    fn from(e: ::config::ConfigError) -> Self {
        ConfigError::Source(e.to_string())
    }
}

/// Ledger RPC failures.
///
/// `NotFound` means the ledger answered and the account does not exist;
/// every other variant means the ledger could not give an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("rpc transport error: {0}")]
    Transport(String),

    #[error("rpc rejected request ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
}

/// User-input gate failures, raised before anything is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("{field} is {got} bytes, limit is {max}")]
    TooLong {
        field: &'static str,
        max: usize,
        got: usize,
    },
}

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("transaction build failed: {0}")]
    Transaction(#[from] TxError),

    #[error("signing failed: {0}")]
    Signing(#[from] SignerError),

    #[error("submission failed: {0}")]
    Submission(RpcError),

    #[error("ledger unavailable: {0}")]
    Rpc(#[from] RpcError),
}

impl ClientError {
    /// Whether a ledger read failed without an answer, as opposed to bad
    /// data, a signing failure or a rejected submission.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClientError::Rpc(e) if !matches!(e, RpcError::NotFound(_)))
    }
}
