//! Typed records bound to a fixed schema.

use crate::codec;
use crate::error::CodecError;
use crate::schema::Schema;
use crate::value::Value;

/// A Rust type with a fixed wire layout.
///
/// Implementors declare their layout once in [`Record::schema`] and convert
/// to and from [`Value`]. Since the Rust field types already match the schema
/// widths, encoding an internally built record cannot hit a schema violation.
pub trait Record: Sized {
    fn schema() -> Schema;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, CodecError>;

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(&Self::schema(), &self.to_value())
    }

    /// Decode from a buffer holding exactly one record.
    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_value(codec::decode(&Self::schema(), bytes)?)
    }

    /// Decode from the front of a buffer, ignoring trailing bytes.
    fn decode_prefix(bytes: &[u8]) -> Result<(Self, usize), CodecError> {
        let (value, consumed) = codec::decode_prefix(&Self::schema(), bytes)?;
        Ok((Self::from_value(value)?, consumed))
    }
}

/// Field-by-field reader over a decoded struct value.
///
/// Fields are taken out by name; the `context` string prefixes error paths.
pub struct Fields {
    context: String,
    fields: Vec<(&'static str, Value)>,
}

impl Fields {
    pub fn new(value: Value, context: impl Into<String>) -> Result<Self, CodecError> {
        let context = context.into();
        match value {
            Value::Struct(fields) => Ok(Fields { context, fields }),
            other => Err(CodecError::malformed(
                &context,
                format!("expected struct, found {}", other.kind()),
            )),
        }
    }

    fn path(&self, name: &str) -> String {
        if self.context.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.context)
        }
    }

    /// Remove and return the named field.
    pub fn take(&mut self, name: &str) -> Result<Value, CodecError> {
        let pos = self
            .fields
            .iter()
            .position(|(n, _)| *n == name)
            .ok_or_else(|| CodecError::malformed(&self.path(name), "missing field"))?;
        Ok(self.fields.remove(pos).1)
    }

    pub fn u8(&mut self, name: &str) -> Result<u8, CodecError> {
        let n = self.int(name)?;
        u8::try_from(n).map_err(|_| CodecError::malformed(&self.path(name), format!("{n} exceeds u8")))
    }

    pub fn u32(&mut self, name: &str) -> Result<u32, CodecError> {
        let n = self.int(name)?;
        u32::try_from(n).map_err(|_| CodecError::malformed(&self.path(name), format!("{n} exceeds u32")))
    }

    pub fn u64(&mut self, name: &str) -> Result<u64, CodecError> {
        self.int(name)
    }

    fn int(&mut self, name: &str) -> Result<u64, CodecError> {
        match self.take(name)? {
            Value::Int(n) => Ok(n),
            other => Err(self.mismatch(name, "int", &other)),
        }
    }

    pub fn bool(&mut self, name: &str) -> Result<bool, CodecError> {
        match self.take(name)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.mismatch(name, "bool", &other)),
        }
    }

    pub fn bytes(&mut self, name: &str) -> Result<Vec<u8>, CodecError> {
        match self.take(name)? {
            Value::Bytes(b) => Ok(b),
            other => Err(self.mismatch(name, "bytes", &other)),
        }
    }

    pub fn byte_array<const N: usize>(&mut self, name: &str) -> Result<[u8; N], CodecError> {
        let bytes = self.bytes(name)?;
        let len = bytes.len();
        bytes.try_into().map_err(|_| {
            CodecError::malformed(&self.path(name), format!("expected {N} bytes, got {len}"))
        })
    }

    pub fn list(&mut self, name: &str) -> Result<Vec<Value>, CodecError> {
        match self.take(name)? {
            Value::List(items) => Ok(items),
            other => Err(self.mismatch(name, "list", &other)),
        }
    }

    pub fn option(&mut self, name: &str) -> Result<Option<Value>, CodecError> {
        match self.take(name)? {
            Value::Option(inner) => Ok(inner.map(|b| *b)),
            other => Err(self.mismatch(name, "option", &other)),
        }
    }

    /// Decode each item of a list field as a nested record.
    pub fn records<T: Record>(&mut self, name: &str) -> Result<Vec<T>, CodecError> {
        self.list(name)?.into_iter().map(T::from_value).collect()
    }

    fn mismatch(&self, name: &str, expected: &str, found: &Value) -> CodecError {
        CodecError::malformed(
            &self.path(name),
            format!("expected {expected}, found {}", found.kind()),
        )
    }
}
