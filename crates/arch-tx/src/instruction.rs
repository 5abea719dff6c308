//! Instruction records and the prediction-program instruction builder.
//!
//! ```text
//! CreateEvent (38 bytes):
//!   function_number   u8 = 1
//!   unique_id         [u8; 32]
//!   expiry_timestamp  u32 LE
//!   num_outcomes      u8
//!
//! CloseEvent (33 bytes):
//!   function_number   u8 = 2
//!   unique_id         [u8; 32]
//! ```
//!
//! Every prediction-program instruction uses the same two account slots:
//! `[0]` the shared event ledger account (writable) and `[1]` the acting user
//! (signer). The program reads accounts by position.

use arch_codec::{CodecError, Fields, LenPrefix, Record, Schema, Value};
use serde::{Deserialize, Serialize};

use crate::error::TxError;
use crate::pubkey::Identity;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// One account's role within one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    #[serde(rename = "pubkey")]
    pub identity: Identity,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountRef {
    pub fn new(identity: Identity, is_signer: bool, is_writable: bool) -> Self {
        AccountRef {
            identity,
            is_signer,
            is_writable,
        }
    }

    pub fn writable(identity: Identity) -> Self {
        Self::new(identity, false, true)
    }

    pub fn signer(identity: Identity) -> Self {
        Self::new(identity, true, false)
    }
}

/// A single requested operation against a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: Identity,
    pub accounts: Vec<AccountRef>,
    pub data: Vec<u8>,
}

impl Record for AccountRef {
    fn schema() -> Schema {
        Schema::record([
            ("pubkey", Schema::Bytes(Identity::LEN)),
            ("is_signer", Schema::Bool),
            ("is_writable", Schema::Bool),
        ])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            ("pubkey", self.identity.0.into()),
            ("is_signer", self.is_signer.into()),
            ("is_writable", self.is_writable.into()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "account")?;
        Ok(AccountRef {
            identity: Identity(f.byte_array("pubkey")?),
            is_signer: f.bool("is_signer")?,
            is_writable: f.bool("is_writable")?,
        })
    }
}

impl Record for Instruction {
    fn schema() -> Schema {
        Schema::record([
            ("program_id", Schema::Bytes(Identity::LEN)),
            ("accounts", Schema::vec(LenPrefix::U8, AccountRef::schema())),
            ("data", Schema::Blob(LenPrefix::U64)),
        ])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            ("program_id", self.program_id.0.into()),
            (
                "accounts",
                Value::List(self.accounts.iter().map(Record::to_value).collect()),
            ),
            ("data", self.data.clone().into()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "instruction")?;
        Ok(Instruction {
            program_id: Identity(f.byte_array("program_id")?),
            accounts: f.records("accounts")?,
            data: f.bytes("data")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Prediction-program operations
// ---------------------------------------------------------------------------

/// Payload of the `CreateEvent` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateEventParams {
    pub unique_id: [u8; 32],
    pub expiry_timestamp: u32,
    pub num_outcomes: u8,
}

/// Payload of the `CloseEvent` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseEventParams {
    pub unique_id: [u8; 32],
}

impl CreateEventParams {
    pub const FUNCTION_NUMBER: u8 = 1;
}

impl CloseEventParams {
    pub const FUNCTION_NUMBER: u8 = 2;
}

fn check_function_number(f: &mut Fields, expected: u8) -> Result<(), CodecError> {
    let found = f.u8("function_number")?;
    if found != expected {
        return Err(CodecError::MalformedInput {
            field: "function_number".into(),
            reason: format!("expected {expected}, found {found}"),
        });
    }
    Ok(())
}

impl Record for CreateEventParams {
    fn schema() -> Schema {
        Schema::record([
            ("function_number", Schema::U8),
            ("unique_id", Schema::Bytes(32)),
            ("expiry_timestamp", Schema::U32),
            ("num_outcomes", Schema::U8),
        ])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            ("function_number", Self::FUNCTION_NUMBER.into()),
            ("unique_id", self.unique_id.into()),
            ("expiry_timestamp", self.expiry_timestamp.into()),
            ("num_outcomes", self.num_outcomes.into()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "")?;
        check_function_number(&mut f, Self::FUNCTION_NUMBER)?;
        Ok(CreateEventParams {
            unique_id: f.byte_array("unique_id")?,
            expiry_timestamp: f.u32("expiry_timestamp")?,
            num_outcomes: f.u8("num_outcomes")?,
        })
    }
}

impl Record for CloseEventParams {
    fn schema() -> Schema {
        Schema::record([
            ("function_number", Schema::U8),
            ("unique_id", Schema::Bytes(32)),
        ])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            ("function_number", Self::FUNCTION_NUMBER.into()),
            ("unique_id", self.unique_id.into()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "")?;
        check_function_number(&mut f, Self::FUNCTION_NUMBER)?;
        Ok(CloseEventParams {
            unique_id: f.byte_array("unique_id")?,
        })
    }
}

/// The closed set of prediction-program operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateEvent(CreateEventParams),
    CloseEvent(CloseEventParams),
}

impl Operation {
    pub fn create_event(unique_id: [u8; 32], expiry_timestamp: u32, num_outcomes: u8) -> Self {
        Operation::CreateEvent(CreateEventParams {
            unique_id,
            expiry_timestamp,
            num_outcomes,
        })
    }

    pub fn close_event(unique_id: [u8; 32]) -> Self {
        Operation::CloseEvent(CloseEventParams { unique_id })
    }

    /// Leading byte of the encoded payload.
    pub fn discriminant(&self) -> u8 {
        match self {
            Operation::CreateEvent(_) => CreateEventParams::FUNCTION_NUMBER,
            Operation::CloseEvent(_) => CloseEventParams::FUNCTION_NUMBER,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateEvent(_) => "CreateEvent",
            Operation::CloseEvent(_) => "CloseEvent",
        }
    }

    pub fn unique_id(&self) -> &[u8; 32] {
        match self {
            Operation::CreateEvent(p) => &p.unique_id,
            Operation::CloseEvent(p) => &p.unique_id,
        }
    }

    /// Encode discriminant and fields into instruction data.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Operation::CreateEvent(p) => p.encode(),
            Operation::CloseEvent(p) => p.encode(),
        }
    }

    /// Decode instruction data, dispatching on the leading discriminant.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        match data.first() {
            Some(&CreateEventParams::FUNCTION_NUMBER) => {
                CreateEventParams::decode(data).map(Operation::CreateEvent)
            }
            Some(&CloseEventParams::FUNCTION_NUMBER) => {
                CloseEventParams::decode(data).map(Operation::CloseEvent)
            }
            Some(other) => Err(CodecError::MalformedInput {
                field: "function_number".into(),
                reason: format!("unknown operation {other}"),
            }),
            None => Err(CodecError::MalformedInput {
                field: "function_number".into(),
                reason: "empty instruction data".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build an instruction from an explicit account list.
pub fn build_instruction(
    program_id: Identity,
    accounts: Vec<AccountRef>,
    operation: &Operation,
) -> Result<Instruction, TxError> {
    Ok(Instruction {
        program_id,
        accounts,
        data: operation.encode()?,
    })
}

/// Build a prediction-program instruction with the fixed two-slot account
/// layout: event ledger account (writable), then the acting user (signer).
pub fn event_instruction(
    program_id: Identity,
    event_account: Identity,
    user: Identity,
    operation: &Operation,
) -> Result<Instruction, TxError> {
    build_instruction(
        program_id,
        vec![AccountRef::writable(event_account), AccountRef::signer(user)],
        operation,
    )
}
