use arch_codec::CodecError;
use thiserror::Error;

/// Transaction assembly errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("missing signature: message needs {expected}, got {got}")]
    MissingSignature { expected: usize, got: usize },

    #[error("signature count mismatch: message needs {expected}, got {got}")]
    SignatureCountMismatch { expected: usize, got: usize },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}
