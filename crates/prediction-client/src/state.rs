//! Prediction-program account state.
//!
//! ```text
//! PredictionEvents:
//!   total_predictions    u32 LE
//!   predictions          u32 LE count, then PredictionRecord * count
//!
//! PredictionRecord:
//!   unique_id            32 bytes
//!   creator              32 bytes
//!   expiry_timestamp     u32 LE
//!   outcomes             u32 LE count, then (id u8, total_amount u64 LE) * count
//!   total_pool_amount    u64 LE
//!   status               u8   (0 active, 1 closed, 2 resolved, 3 cancelled)
//!   winning_outcome      u8 tag, then u8 when tag is 1
//! ```
//!
//! Account buffers are allocated up front, so the encoded state is usually
//! followed by zero padding.

use std::fmt;

use arch_codec::{CodecError, Fields, LenPrefix, Record, Schema, Value};
use arch_tx::Identity;

/// Lifecycle of a prediction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Active,
    Closed,
    Resolved,
    Cancelled,
}

impl EventStatus {
    pub fn as_u8(self) -> u8 {
        match self {
            EventStatus::Active => 0,
            EventStatus::Closed => 1,
            EventStatus::Resolved => 2,
            EventStatus::Cancelled => 3,
        }
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(EventStatus::Active),
            1 => Some(EventStatus::Closed),
            2 => Some(EventStatus::Resolved),
            3 => Some(EventStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventStatus::Active => "active",
            EventStatus::Closed => "closed",
            EventStatus::Resolved => "resolved",
            EventStatus::Cancelled => "cancelled",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeTotal {
    pub id: u8,
    pub total_amount: u64,
}

impl Record for OutcomeTotal {
    fn schema() -> Schema {
        Schema::record([("id", Schema::U8), ("total_amount", Schema::U64)])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            ("id", self.id.into()),
            ("total_amount", self.total_amount.into()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "outcome")?;
        Ok(OutcomeTotal {
            id: f.u8("id")?,
            total_amount: f.u64("total_amount")?,
        })
    }
}

/// One event stored in the wall account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRecord {
    pub unique_id: [u8; 32],
    pub creator: Identity,
    pub expiry_timestamp: u32,
    pub outcomes: Vec<OutcomeTotal>,
    pub total_pool_amount: u64,
    pub status: EventStatus,
    pub winning_outcome: Option<u8>,
}

impl PredictionRecord {
    /// The id as text, with trailing zero padding removed.
    pub fn unique_id_text(&self) -> String {
        let end = self
            .unique_id
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.unique_id[..end]).into_owned()
    }
}

impl Record for PredictionRecord {
    fn schema() -> Schema {
        Schema::record([
            ("unique_id", Schema::Bytes(32)),
            ("creator", Schema::Bytes(Identity::LEN)),
            ("expiry_timestamp", Schema::U32),
            ("outcomes", Schema::vec(LenPrefix::U32, OutcomeTotal::schema())),
            ("total_pool_amount", Schema::U64),
            ("status", Schema::U8),
            ("winning_outcome", Schema::option(Schema::U8)),
        ])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            ("unique_id", self.unique_id.into()),
            ("creator", self.creator.0.into()),
            ("expiry_timestamp", self.expiry_timestamp.into()),
            (
                "outcomes",
                Value::List(self.outcomes.iter().map(Record::to_value).collect()),
            ),
            ("total_pool_amount", self.total_pool_amount.into()),
            ("status", self.status.as_u8().into()),
            ("winning_outcome", self.winning_outcome.into()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "prediction")?;
        let unique_id = f.byte_array("unique_id")?;
        let creator = Identity::new(f.byte_array("creator")?);
        let expiry_timestamp = f.u32("expiry_timestamp")?;
        let outcomes = f.records("outcomes")?;
        let total_pool_amount = f.u64("total_pool_amount")?;

        let status_byte = f.u8("status")?;
        let status = EventStatus::from_u8(status_byte).ok_or_else(|| CodecError::MalformedInput {
            field: "prediction.status".into(),
            reason: format!("unknown event status {status_byte}"),
        })?;

        let winning_outcome = match f.option("winning_outcome")? {
            None => None,
            Some(Value::Int(n)) => Some(u8::try_from(n).map_err(|_| CodecError::MalformedInput {
                field: "prediction.winning_outcome".into(),
                reason: format!("{n} exceeds u8"),
            })?),
            Some(other) => {
                return Err(CodecError::MalformedInput {
                    field: "prediction.winning_outcome".into(),
                    reason: format!("expected int, found {}", other.kind()),
                })
            }
        };

        Ok(PredictionRecord {
            unique_id,
            creator,
            expiry_timestamp,
            outcomes,
            total_pool_amount,
            status,
            winning_outcome,
        })
    }
}

/// Decoded contents of the wall account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionEvents {
    pub total_predictions: u32,
    pub predictions: Vec<PredictionRecord>,
}

impl Record for PredictionEvents {
    fn schema() -> Schema {
        Schema::record([
            ("total_predictions", Schema::U32),
            ("predictions", Schema::vec(LenPrefix::U32, PredictionRecord::schema())),
        ])
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            ("total_predictions", self.total_predictions.into()),
            (
                "predictions",
                Value::List(self.predictions.iter().map(Record::to_value).collect()),
            ),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = Fields::new(value, "")?;
        Ok(PredictionEvents {
            total_predictions: f.u32("total_predictions")?,
            predictions: f.records("predictions")?,
        })
    }
}

/// Decode account bytes, ignoring the zero padding after the state.
pub fn decode_account_state(data: &[u8]) -> Result<PredictionEvents, CodecError> {
    let (events, _consumed) = PredictionEvents::decode_prefix(data)?;
    Ok(events)
}
