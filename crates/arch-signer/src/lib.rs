//! Signing bridge between assembled messages and an external wallet.
//!
//! The core never holds user keys. It hands the hex digest of a message to a
//! [`WalletCapability`] (browser extension, hardware device, or the local
//! [`LocalKeySigner`]) and normalizes the base64 BIP-322 witness it returns
//! into a bare 64-byte [`Signature`](arch_tx::Signature).

pub mod bip322;
pub mod bridge;
pub mod error;
pub mod wallet;

pub use bip322::{verify_simple, LocalKeySigner};
pub use bridge::{normalize_signature, Connection, SigningBridge, DEFAULT_CHAIN, SIGNATURE_HEADER_LEN};
pub use error::SignerError;
pub use wallet::{SigningScheme, WalletCapability};
