//! Message assembly and hashing.
//!
//! ```text
//! Message:
//!   num_signers        u8
//!   signers            32 bytes * num_signers
//!   num_instructions   u8
//!   instructions[]:
//!     program_id       32 bytes
//!     num_accounts     u8
//!     accounts[]       32-byte pubkey, is_signer u8, is_writable u8
//!     data_len         u64 LE
//!     data             u8 * data_len
//! ```
//!
//! The message hash is `sha256(hex(sha256(encoding)))`, i.e. the second
//! round hashes the lowercase hex text of the first digest. Wallets sign the
//! hex form of the final 32-byte digest.

use arch_codec::{CodecError, Fields, LenPrefix, Record, Schema, Value};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TxError;
use crate::instruction::Instruction;
use crate::pubkey::Identity;

/// The signable unit: required signers plus the instructions they authorize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub signers: Vec<Identity>,
    pub instructions: Vec<Instruction>,
}

/// Assemble a message from instructions.
///
/// Signers are the signer-flagged identities in first-seen order: across
/// instructions in sequence, then across accounts within each instruction.
/// Duplicates are dropped. Signature `i` later pairs with `signers[i]`.
pub fn assemble(instructions: Vec<Instruction>) -> Message {
    let mut signers: Vec<Identity> = Vec::new();
    for ix in &instructions {
        for account in ix.accounts.iter().filter(|a| a.is_signer) {
            if !signers.contains(&account.identity) {
                signers.push(account.identity);
            }
        }
    }

    Message {
        signers,
        instructions,
    }
}

impl Message {
    /// Canonical byte encoding; this is what gets hashed.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TxError> {
        Ok(self.encode()?)
    }

    /// 32-byte message digest.
    pub fn hash(&self) -> Result<[u8; 32], TxError> {
        let first = Sha256::digest(self.to_bytes()?);
        let second = Sha256::digest(hex::encode(first).as_bytes());
        Ok(second.into())
    }

    /// Position of `identity` among the required signers.
    pub fn signer_index(&self, identity: &Identity) -> Option<usize> {
        self.signers.iter().position(|s| s == identity)
    }
}

impl Record for Message {
    fn schema() -> Schema {
        Schema::record([
            ("signers", Schema::vec(LenPrefix::U8, Schema::Bytes(Identity::LEN))),
            ("instructions", Schema::vec(LenPrefix::U8, Instruction::schema())),
        ])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            (
                "signers",
                Value::List(self.signers.iter().map(|s| Value::from(s.0)).collect()),
            ),
            (
                "instructions",
                Value::List(self.instructions.iter().map(Record::to_value).collect()),
            ),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "")?;
        let signers = f
            .list("signers")?
            .into_iter()
            .map(|v| {
                let mut bytes = [0u8; 32];
                match v {
                    Value::Bytes(b) if b.len() == 32 => {
                        bytes.copy_from_slice(&b);
                        Ok(Identity(bytes))
                    }
                    other => Err(CodecError::MalformedInput {
                        field: "signers".into(),
                        reason: format!("expected 32-byte identity, found {}", other.kind()),
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Message {
            signers,
            instructions: f.records("instructions")?,
        })
    }
}
