//! Fixed-layout binary codec for Arch ledger records.
//!
//! Records are described declaratively with a [`Schema`] and carried as
//! dynamically typed [`Value`]s. The byte layout is little-endian with no
//! padding and no length prefix on fixed-size arrays, which makes it byte
//! compatible with Borsh for every shape the ledger programs use.
//!
//! Typed records implement [`Record`] so that callers never hand-assemble
//! `Value` trees for internally constructed data.

pub mod codec;
pub mod error;
pub mod record;
pub mod schema;
pub mod value;

pub use codec::{decode, decode_prefix, encode, encode_into};
pub use error::CodecError;
pub use record::{Fields, Record};
pub use schema::{Field, LenPrefix, Schema};
pub use value::Value;
