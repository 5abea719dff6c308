//! Request signatures from a wallet and normalize what comes back.

use arch_tx::{Identity, Signature};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, warn};

use crate::error::SignerError;
use crate::wallet::{SigningScheme, WalletCapability};

/// Chain the wallet is switched to on connect.
pub const DEFAULT_CHAIN: &str = "BITCOIN_TESTNET4";

/// Message signed during connect to prove key ownership.
pub const CONNECT_MESSAGE: &str = "Prediction market at its peak with Bango";

/// Bytes in front of the raw signature in a BIP-322 simple witness
/// (item count, item length).
pub const SIGNATURE_HEADER_LEN: usize = 2;

const EXPECTED_HEADER: [u8; SIGNATURE_HEADER_LEN] = [0x01, 0x40];

/// Result of a successful wallet connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub identity: Identity,
    pub accounts: Vec<String>,
}

/// Decode a base64 wallet signature and strip its witness header.
///
/// The header bytes are not interpreted beyond a warning when they differ
/// from `[0x01, 0x40]`; only the remaining length is enforced.
pub fn normalize_signature(encoded: &str) -> Result<Signature, SignerError> {
    let raw = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SignerError::SignatureFormat(format!("base64 decode failed: {e}")))?;

    if raw.len() < SIGNATURE_HEADER_LEN {
        return Err(SignerError::SignatureFormat(format!(
            "signature blob too short: {} bytes",
            raw.len()
        )));
    }

    let (header, body) = raw.split_at(SIGNATURE_HEADER_LEN);
    if header != EXPECTED_HEADER {
        warn!(header = %hex::encode(header), "unexpected signature header");
    }

    Signature::from_slice(body).map_err(|_| {
        SignerError::SignatureFormat(format!(
            "expected {} signature bytes after header, got {}",
            Signature::LEN,
            body.len()
        ))
    })
}

/// Signs message digests through an injected wallet capability.
pub struct SigningBridge<W> {
    wallet: W,
    scheme: SigningScheme,
}

impl<W: WalletCapability> SigningBridge<W> {
    pub fn new(wallet: W) -> Self {
        SigningBridge {
            wallet,
            scheme: SigningScheme::Bip322Simple,
        }
    }

    pub fn with_scheme(wallet: W, scheme: SigningScheme) -> Self {
        SigningBridge { wallet, scheme }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Switch chain, prove key ownership, and resolve the account identity.
    pub async fn connect(&self) -> Result<Connection, SignerError> {
        self.wallet.switch_chain(DEFAULT_CHAIN).await?;

        let proof = self.wallet.sign_message(CONNECT_MESSAGE, self.scheme).await?;
        normalize_signature(&proof)?;

        let accounts = self.wallet.request_accounts().await?;
        if accounts.is_empty() {
            return Err(SignerError::Wallet("wallet exposed no accounts".into()));
        }

        let identity = self.identity().await?;
        info!(identity = %identity, accounts = accounts.len(), "wallet connected");
        Ok(Connection { identity, accounts })
    }

    /// Identity of the wallet's active account.
    pub async fn identity(&self) -> Result<Identity, SignerError> {
        let key = self.wallet.get_public_key().await?;
        Ok(Identity::from_hex(&key)?)
    }

    /// Ask the wallet to sign a 32-byte message digest.
    ///
    /// The digest is passed as lowercase hex text; the returned blob is
    /// normalized to a bare 64-byte signature.
    pub async fn request_signature(&self, message_hash: &[u8; 32]) -> Result<Signature, SignerError> {
        let digest_hex = hex::encode(message_hash);
        debug!(digest = %digest_hex, scheme = %self.scheme, "requesting signature");
        let encoded = self.wallet.sign_message(&digest_hex, self.scheme).await?;
        normalize_signature(&encoded)
    }
}
