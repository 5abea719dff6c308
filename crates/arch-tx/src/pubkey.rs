//! Account and program identities.
//!
//! An Arch identity is a 32-byte x-only secp256k1 public key. Wallets usually
//! hand out 33-byte compressed keys; the leading parity byte is dropped when
//! converting those.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TxError;

/// A 32-byte public identifier for an account or program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(pub [u8; 32]);

impl Identity {
    pub const LEN: usize = 32;

    pub const fn new(bytes: [u8; 32]) -> Self {
        Identity(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Build from raw bytes: 32 bytes as-is, or a 33-byte compressed key
    /// (0x02/0x03 prefix) with the parity byte dropped.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TxError> {
        match bytes.len() {
            32 => {
                let mut out = [0u8; 32];
                out.copy_from_slice(bytes);
                Ok(Identity(out))
            }
            33 if matches!(bytes[0], 0x02 | 0x03) => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&bytes[1..]);
                Ok(Identity(out))
            }
            33 => Err(TxError::InvalidIdentity(format!(
                "compressed key has invalid prefix {:#04x}",
                bytes[0]
            ))),
            n => Err(TxError::InvalidIdentity(format!(
                "expected 32 or 33 bytes, got {n}"
            ))),
        }
    }

    /// Parse a hex identity (64 chars, or 66 for a compressed key).
    pub fn from_hex(s: &str) -> Result<Self, TxError> {
        let bytes = hex::decode(s.trim().trim_start_matches("0x"))
            .map_err(|e| TxError::InvalidIdentity(format!("hex decode failed: {e}")))?;
        Self::from_slice(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Identity {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identity::from_hex(s)
    }
}

impl From<[u8; 32]> for Identity {
    fn from(bytes: [u8; 32]) -> Self {
        Identity(bytes)
    }
}
