use std::fmt;

use async_trait::async_trait;

use crate::error::SignerError;

/// Message signing schemes a wallet may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    Bip322Simple,
    Ecdsa,
}

impl SigningScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            SigningScheme::Bip322Simple => "bip322-simple",
            SigningScheme::Ecdsa => "ecdsa",
        }
    }
}

impl fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wallet operations the core relies on.
///
/// Every call may take arbitrarily long (a user has to click "approve"), so
/// callers treat each one as a suspension point they are free to abandon.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Switch the wallet to the named chain, e.g. `BITCOIN_TESTNET4`.
    async fn switch_chain(&self, chain: &str) -> Result<(), SignerError>;

    /// Ask the user to expose their accounts; returns addresses.
    async fn request_accounts(&self) -> Result<Vec<String>, SignerError>;

    /// Hex-encoded public key of the active account.
    async fn get_public_key(&self) -> Result<String, SignerError>;

    /// Sign `message` with `scheme`; returns the base64 signature blob.
    async fn sign_message(&self, message: &str, scheme: SigningScheme)
        -> Result<String, SignerError>;
}
