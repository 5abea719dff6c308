//! Transaction assembly for the Arch ledger.
//!
//! Instructions name a target program, an ordered list of account roles and
//! an opaque payload. A [`Message`] bundles instructions with the identities
//! that must sign it, and its hash is what the external wallet signs. The
//! signed envelope is a [`SignedTransaction`].
//!
//! All encodings go through `arch-codec`, so the bytes that get hashed are
//! the same canonical bytes the ledger sees.

pub mod error;
pub mod instruction;
pub mod message;
pub mod pubkey;
pub mod transaction;

#[cfg(test)]
mod strategies;

pub use error::TxError;
pub use instruction::{
    build_instruction, event_instruction, AccountRef, CloseEventParams, CreateEventParams,
    Instruction, Operation,
};
pub use message::{assemble, Message};
pub use pubkey::Identity;
pub use transaction::{Signature, SignedTransaction, TRANSACTION_VERSION};
