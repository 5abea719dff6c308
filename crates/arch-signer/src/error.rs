use thiserror::Error;

/// Signing bridge errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("signature format error: {0}")]
    SignatureFormat(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

impl From<arch_tx::TxError> for SignerError {
    fn from(e: arch_tx::TxError) -> Self {
        SignerError::InvalidKey(e.to_string())
    }
}
