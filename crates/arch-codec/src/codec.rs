//! Encoding and decoding of [`Value`]s against a [`Schema`].
//!
//! Encoding validates shape and integer width before writing anything for a
//! field; decoding never reads past the buffer and reports the field path
//! of the first failure.

use crate::error::CodecError;
use crate::schema::{LenPrefix, Schema};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `value` under `schema` into a fresh buffer.
pub fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(schema.min_len());
    encode_into(schema, value, &mut buf)?;
    Ok(buf)
}

/// Append the encoding of `value` to `buf`.
///
/// On error `buf` may hold a partial encoding; callers that reuse the buffer
/// should truncate it.
pub fn encode_into(schema: &Schema, value: &Value, buf: &mut Vec<u8>) -> Result<(), CodecError> {
    write_value(schema, value, "", buf)
}

fn write_value(
    schema: &Schema,
    value: &Value,
    path: &str,
    buf: &mut Vec<u8>,
) -> Result<(), CodecError> {
    match (schema, value) {
        (Schema::U8, Value::Int(n)) => buf.push(check_width(*n, u8::MAX as u64, "u8", path)? as u8),
        (Schema::U32, Value::Int(n)) => {
            let n = check_width(*n, u32::MAX as u64, "u32", path)? as u32;
            buf.extend_from_slice(&n.to_le_bytes());
        }
        (Schema::U64, Value::Int(n)) => buf.extend_from_slice(&n.to_le_bytes()),
        (Schema::Bool, Value::Bool(b)) => buf.push(u8::from(*b)),
        (Schema::Bytes(len), Value::Bytes(bytes)) => {
            if bytes.len() != *len {
                return Err(CodecError::violation(
                    path,
                    format!("expected {len} bytes, got {}", bytes.len()),
                ));
            }
            buf.extend_from_slice(bytes);
        }
        (Schema::Array { len, item }, Value::List(items)) => {
            check_item_width(items.len() as u64, item, path)?;
            if items.len() != *len {
                return Err(CodecError::violation(
                    path,
                    format!("expected {len} items, got {}", items.len()),
                ));
            }
            for (i, v) in items.iter().enumerate() {
                write_value(item, v, &index_path(path, i), buf)?;
            }
        }
        (Schema::Vec { prefix, item }, Value::List(items)) => {
            check_item_width(items.len() as u64, item, path)?;
            write_len(*prefix, items.len(), path, buf)?;
            for (i, v) in items.iter().enumerate() {
                write_value(item, v, &index_path(path, i), buf)?;
            }
        }
        (Schema::Blob(prefix), Value::Bytes(bytes)) => {
            write_len(*prefix, bytes.len(), path, buf)?;
            buf.extend_from_slice(bytes);
        }
        (Schema::Option(_), Value::Option(None)) => buf.push(0),
        (Schema::Option(inner), Value::Option(Some(v))) => {
            buf.push(1);
            write_value(inner, v, path, buf)?;
        }
        (Schema::Struct(fields), Value::Struct(values)) => {
            if fields.len() != values.len() {
                return Err(CodecError::violation(
                    path,
                    format!("expected {} fields, got {}", fields.len(), values.len()),
                ));
            }
            for (field, (name, v)) in fields.iter().zip(values) {
                let child = field_path(path, field.name);
                if field.name != *name {
                    return Err(CodecError::violation(
                        &child,
                        format!("field out of order, found `{name}`"),
                    ));
                }
                write_value(&field.schema, v, &child, buf)?;
            }
        }
        (schema, value) => {
            return Err(CodecError::violation(
                path,
                format!("cannot encode {} as {}", value.kind(), schema_name(schema)),
            ));
        }
    }
    Ok(())
}

fn check_width(n: u64, max: u64, ty: &str, path: &str) -> Result<u64, CodecError> {
    if n > max {
        return Err(CodecError::violation(path, format!("value {n} exceeds {ty}")));
    }
    Ok(n)
}

fn write_len(prefix: LenPrefix, len: usize, path: &str, buf: &mut Vec<u8>) -> Result<(), CodecError> {
    let len = len as u64;
    if len > prefix.max_len() {
        return Err(CodecError::violation(
            path,
            format!("length {len} does not fit a {}-byte prefix", prefix.size()),
        ));
    }
    match prefix {
        LenPrefix::U8 => buf.push(len as u8),
        LenPrefix::U32 => buf.extend_from_slice(&(len as u32).to_le_bytes()),
        LenPrefix::U64 => buf.extend_from_slice(&len.to_le_bytes()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode exactly one value from `bytes`; trailing bytes are rejected.
pub fn decode(schema: &Schema, bytes: &[u8]) -> Result<Value, CodecError> {
    let (value, consumed) = decode_prefix(schema, bytes)?;
    if consumed != bytes.len() {
        return Err(CodecError::malformed(
            "",
            format!("{} trailing bytes", bytes.len() - consumed),
        ));
    }
    Ok(value)
}

/// Decode one value from the front of `bytes`.
///
/// Returns the value and the number of bytes it occupied. Anything after
/// that is ignored, which suits pre-allocated ledger account buffers.
pub fn decode_prefix(schema: &Schema, bytes: &[u8]) -> Result<(Value, usize), CodecError> {
    let mut reader = Reader { data: bytes, pos: 0 };
    let value = reader.read_value(schema, "")?;
    Ok((value, reader.pos))
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize, path: &str) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::malformed(
                path,
                format!("need {n} bytes, have {}", self.remaining()),
            ));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self, path: &str) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, path)?);
        Ok(out)
    }

    fn read_len(&mut self, prefix: LenPrefix, path: &str) -> Result<u64, CodecError> {
        Ok(match prefix {
            LenPrefix::U8 => self.take_array::<1>(path)?[0] as u64,
            LenPrefix::U32 => u32::from_le_bytes(self.take_array(path)?) as u64,
            LenPrefix::U64 => u64::from_le_bytes(self.take_array(path)?),
        })
    }

    /// Reject lengths that cannot possibly fit in what is left, before
    /// allocating anything for them.
    fn check_room(&self, len: u64, item: &Schema, path: &str) -> Result<usize, CodecError> {
        check_item_width(len, item, path)?;
        let needed = (item.min_len() as u64).checked_mul(len);
        match needed {
            Some(n) if n <= self.remaining() as u64 => Ok(len as usize),
            _ => Err(CodecError::malformed(
                path,
                format!(
                    "declared length {len} exceeds the {} remaining bytes",
                    self.remaining()
                ),
            )),
        }
    }

    fn read_value(&mut self, schema: &Schema, path: &str) -> Result<Value, CodecError> {
        match schema {
            Schema::U8 => Ok(Value::Int(self.take_array::<1>(path)?[0] as u64)),
            Schema::U32 => Ok(Value::Int(u32::from_le_bytes(self.take_array(path)?) as u64)),
            Schema::U64 => Ok(Value::Int(u64::from_le_bytes(self.take_array(path)?))),
            Schema::Bool => match self.take_array::<1>(path)?[0] {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                b => Err(CodecError::malformed(path, format!("invalid bool byte {b:#04x}"))),
            },
            Schema::Bytes(len) => Ok(Value::Bytes(self.take(*len, path)?.to_vec())),
            Schema::Array { len, item } => {
                self.check_room(*len as u64, item, path)?;
                self.read_items(*len, item, path)
            }
            Schema::Vec { prefix, item } => {
                let len = self.read_len(*prefix, path)?;
                let len = self.check_room(len, item, path)?;
                self.read_items(len, item, path)
            }
            Schema::Blob(prefix) => {
                let len = self.read_len(*prefix, path)?;
                let len = self.check_room(len, &Schema::U8, path)?;
                Ok(Value::Bytes(self.take(len, path)?.to_vec()))
            }
            Schema::Option(inner) => match self.take_array::<1>(path)?[0] {
                0 => Ok(Value::none()),
                1 => Ok(Value::some(self.read_value(inner, path)?)),
                tag => Err(CodecError::malformed(
                    path,
                    format!("invalid option tag {tag:#04x}"),
                )),
            },
            Schema::Struct(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    let child = field_path(path, field.name);
                    values.push((field.name, self.read_value(&field.schema, &child)?));
                }
                Ok(Value::Struct(values))
            }
        }
    }

    fn read_items(&mut self, len: usize, item: &Schema, path: &str) -> Result<Value, CodecError> {
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for i in 0..len {
            items.push(self.read_value(item, &index_path(path, i))?);
        }
        Ok(Value::List(items))
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Items that occupy no bytes cannot be counted off the wire, so a
/// sequence of them must be empty.
fn check_item_width(len: u64, item: &Schema, path: &str) -> Result<(), CodecError> {
    if len > 0 && item.min_len() == 0 {
        return Err(CodecError::violation(
            path,
            format!("{len} items of a zero-width {}", schema_name(item)),
        ));
    }
    Ok(())
}

fn field_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn index_path(parent: &str, i: usize) -> String {
    format!("{parent}[{i}]")
}

fn schema_name(schema: &Schema) -> &'static str {
    match schema {
        Schema::U8 => "u8",
        Schema::U32 => "u32",
        Schema::U64 => "u64",
        Schema::Bool => "bool",
        Schema::Bytes(_) => "bytes",
        Schema::Array { .. } => "array",
        Schema::Vec { .. } => "vec",
        Schema::Blob(_) => "blob",
        Schema::Option(_) => "option",
        Schema::Struct(_) => "struct",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_event_schema() -> Schema {
        Schema::record([
            ("function_number", Schema::U8),
            ("unique_id", Schema::Bytes(32)),
            ("expiry_timestamp", Schema::U32),
            ("num_outcomes", Schema::U8),
        ])
    }

    fn create_event_value(id: [u8; 32]) -> Value {
        Value::Struct(vec![
            ("function_number", Value::Int(1)),
            ("unique_id", Value::from(id)),
            ("expiry_timestamp", Value::Int(1_689_422_272)),
            ("num_outcomes", Value::Int(3)),
        ])
    }

    fn outcome_schema() -> Schema {
        Schema::record([("id", Schema::U8), ("total_amount", Schema::U64)])
    }

    #[test]
    fn scalars_are_little_endian() {
        assert_eq!(encode(&Schema::U32, &Value::Int(0x0102_0304)).unwrap(), [4, 3, 2, 1]);
        assert_eq!(
            encode(&Schema::U64, &Value::Int(1)).unwrap(),
            [1, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn struct_layout_has_no_padding() {
        let bytes = encode(&create_event_schema(), &create_event_value([0xaa; 32])).unwrap();
        assert_eq!(bytes.len(), 38);
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..33], &[0xaa; 32]);
        assert_eq!(&bytes[33..37], &1_689_422_272u32.to_le_bytes());
        assert_eq!(bytes[37], 3);
    }

    #[test]
    fn struct_roundtrip() {
        let schema = create_event_schema();
        let value = create_event_value([7; 32]);
        let bytes = encode(&schema, &value).unwrap();
        assert_eq!(decode(&schema, &bytes).unwrap(), value);
    }

    #[test]
    fn nested_vec_and_option_roundtrip() {
        let schema = Schema::record([
            ("outcomes", Schema::vec(LenPrefix::U32, outcome_schema())),
            ("winner", Schema::option(Schema::U8)),
        ]);
        let value = Value::Struct(vec![
            (
                "outcomes",
                Value::List(vec![
                    Value::Struct(vec![("id", Value::Int(0)), ("total_amount", Value::Int(5))]),
                    Value::Struct(vec![("id", Value::Int(1)), ("total_amount", Value::Int(u64::MAX))]),
                ]),
            ),
            ("winner", Value::some(Value::Int(1))),
        ]);
        let bytes = encode(&schema, &value).unwrap();
        assert_eq!(bytes.len(), 4 + 2 * 9 + 2);
        assert_eq!(decode(&schema, &bytes).unwrap(), value);
    }

    #[test]
    fn fixed_array_has_no_prefix() {
        let schema = Schema::array(2, Schema::U8);
        let bytes = encode(&schema, &Value::List(vec![Value::Int(9), Value::Int(8)])).unwrap();
        assert_eq!(bytes, [9, 8]);
    }

    #[test]
    fn blob_with_u64_prefix() {
        let schema = Schema::Blob(LenPrefix::U64);
        let bytes = encode(&schema, &Value::Bytes(vec![1, 2, 3])).unwrap();
        assert_eq!(bytes, [3, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3]);
        assert_eq!(decode(&schema, &bytes).unwrap(), Value::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn overflow_is_schema_violation() {
        let err = encode(&Schema::U8, &Value::Int(256)).unwrap_err();
        assert!(matches!(err, CodecError::SchemaViolation { .. }));

        let err = encode(&Schema::U32, &Value::Int(u32::MAX as u64 + 1)).unwrap_err();
        assert!(matches!(err, CodecError::SchemaViolation { .. }));
    }

    #[test]
    fn wrong_byte_length_names_the_field() {
        let mut value = create_event_value([0; 32]);
        if let Value::Struct(fields) = &mut value {
            fields[1].1 = Value::Bytes(vec![0; 31]);
        }
        let err = encode(&create_event_schema(), &value).unwrap_err();
        assert_eq!(
            err,
            CodecError::SchemaViolation {
                field: "unique_id".into(),
                reason: "expected 32 bytes, got 31".into(),
            }
        );
    }

    #[test]
    fn shape_mismatch_is_schema_violation() {
        let err = encode(&Schema::U8, &Value::Bool(true)).unwrap_err();
        assert_eq!(err.to_string(), "schema violation at <root>: cannot encode bool as u8");
    }

    #[test]
    fn misordered_field_is_rejected() {
        let schema = Schema::record([("a", Schema::U8), ("b", Schema::U8)]);
        let value = Value::Struct(vec![("b", Value::Int(1)), ("a", Value::Int(2))]);
        let err = encode(&schema, &value).unwrap_err();
        assert_eq!(err.field(), "a");
    }

    #[test]
    fn vec_longer_than_prefix_is_rejected() {
        let schema = Schema::vec(LenPrefix::U8, Schema::U8);
        let value = Value::List(vec![Value::Int(0); 256]);
        assert!(matches!(
            encode(&schema, &value),
            Err(CodecError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn every_truncation_is_malformed() {
        let schema = create_event_schema();
        let bytes = encode(&schema, &create_event_value([3; 32])).unwrap();
        for cut in 0..bytes.len() {
            let err = decode(&schema, &bytes[..cut]).unwrap_err();
            assert!(
                matches!(err, CodecError::MalformedInput { .. }),
                "cut at {cut} gave {err:?}"
            );
        }
    }

    #[test]
    fn truncation_reports_field_path() {
        let schema = create_event_schema();
        let err = decode(&schema, &[1, 0, 0]).unwrap_err();
        assert_eq!(err.field(), "unique_id");
    }

    #[test]
    fn invalid_option_tag_is_malformed() {
        let schema = Schema::option(Schema::U8);
        let err = decode(&schema, &[2, 5]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedInput { .. }));
        assert!(err.to_string().contains("0x02"));
    }

    #[test]
    fn invalid_bool_is_malformed() {
        assert!(matches!(
            decode(&Schema::Bool, &[7]),
            Err(CodecError::MalformedInput { .. })
        ));
    }

    #[test]
    fn huge_declared_length_does_not_allocate() {
        let schema = Schema::vec(LenPrefix::U32, outcome_schema());
        let err = decode(&schema, &[0xff, 0xff, 0xff, 0xff, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedInput { .. }));
    }

    #[test]
    fn zero_width_items_cannot_claim_a_length() {
        let schema = Schema::vec(LenPrefix::U32, Schema::Struct(vec![]));
        let err = decode(&schema, &[0xff, 0xff, 0xff, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::SchemaViolation { .. }));

        let blobs = Schema::vec(LenPrefix::U64, Schema::Bytes(0));
        let err = decode(&blobs, &[0xff; 8]).unwrap_err();
        assert!(matches!(err, CodecError::SchemaViolation { .. }));

        assert!(decode(&Schema::array(usize::MAX, Schema::Struct(vec![])), &[]).is_err());
    }

    #[test]
    fn empty_sequence_of_zero_width_items_is_fine() {
        let schema = Schema::vec(LenPrefix::U32, Schema::Struct(vec![]));
        assert_eq!(decode(&schema, &[0, 0, 0, 0]).unwrap(), Value::List(vec![]));
        assert_eq!(encode(&schema, &Value::List(vec![])).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn zero_width_items_are_not_encoded() {
        let schema = Schema::vec(LenPrefix::U8, Schema::Bytes(0));
        let err = encode(&schema, &Value::List(vec![Value::Bytes(vec![])])).unwrap_err();
        assert!(matches!(err, CodecError::SchemaViolation { .. }));
    }

    #[test]
    fn strict_decode_rejects_trailing_bytes() {
        let err = decode(&Schema::U8, &[1, 0]).unwrap_err();
        assert_eq!(err.to_string(), "malformed input at <root>: 1 trailing bytes");
    }

    #[test]
    fn prefix_decode_reports_consumed() {
        let (value, consumed) = decode_prefix(&Schema::U32, &[1, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(value, Value::Int(1));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn matches_borsh_layout() {
        #[derive(borsh::BorshSerialize)]
        struct Outcome {
            id: u8,
            total_amount: u64,
        }

        #[derive(borsh::BorshSerialize)]
        struct Sample {
            unique_id: [u8; 32],
            expiry_timestamp: u32,
            outcomes: Vec<Outcome>,
            winning_outcome: Option<u8>,
        }

        let sample = Sample {
            unique_id: [0x5a; 32],
            expiry_timestamp: 42,
            outcomes: vec![
                Outcome { id: 0, total_amount: 10 },
                Outcome { id: 1, total_amount: 20 },
            ],
            winning_outcome: Some(1),
        };
        let expected = borsh::to_vec(&sample).unwrap();

        let schema = Schema::record([
            ("unique_id", Schema::Bytes(32)),
            ("expiry_timestamp", Schema::U32),
            ("outcomes", Schema::vec(LenPrefix::U32, outcome_schema())),
            ("winning_outcome", Schema::option(Schema::U8)),
        ]);
        let value = Value::Struct(vec![
            ("unique_id", Value::from([0x5a; 32])),
            ("expiry_timestamp", Value::Int(42)),
            (
                "outcomes",
                Value::List(vec![
                    Value::Struct(vec![("id", Value::Int(0)), ("total_amount", Value::Int(10))]),
                    Value::Struct(vec![("id", Value::Int(1)), ("total_amount", Value::Int(20))]),
                ]),
            ),
            ("winning_outcome", Value::some(Value::Int(1))),
        ]);

        assert_eq!(encode(&schema, &value).unwrap(), expected);
    }

    fn ledger_schema() -> Schema {
        Schema::record([
            ("id", Schema::Bytes(32)),
            ("open", Schema::Bool),
            ("expiry", Schema::U32),
            ("outcomes", Schema::vec(LenPrefix::U32, outcome_schema())),
            ("winner", Schema::option(Schema::U8)),
            ("memo", Schema::Blob(LenPrefix::U8)),
        ])
    }

    fn ledger_value() -> impl Strategy<Value = Value> {
        let outcome = (any::<u8>(), any::<u64>()).prop_map(|(id, amount)| {
            Value::Struct(vec![("id", Value::from(id)), ("total_amount", Value::from(amount))])
        });
        (
            any::<[u8; 32]>(),
            any::<bool>(),
            any::<u32>(),
            prop::collection::vec(outcome, 0..6),
            any::<Option<u8>>(),
            prop::collection::vec(any::<u8>(), 0..=255),
        )
            .prop_map(|(id, open, expiry, outcomes, winner, memo)| {
                Value::Struct(vec![
                    ("id", Value::from(id)),
                    ("open", Value::from(open)),
                    ("expiry", Value::from(expiry)),
                    ("outcomes", Value::List(outcomes)),
                    ("winner", Value::from(winner)),
                    ("memo", Value::from(memo)),
                ])
            })
    }

    proptest! {
        #[test]
        fn any_valid_value_roundtrips(value in ledger_value()) {
            let schema = ledger_schema();
            let bytes = encode(&schema, &value).unwrap();
            prop_assert_eq!(decode(&schema, &bytes).unwrap(), value.clone());
            prop_assert_eq!(decode_prefix(&schema, &bytes).unwrap(), (value, bytes.len()));
        }

        #[test]
        fn any_strict_prefix_is_malformed(value in ledger_value()) {
            let schema = ledger_schema();
            let bytes = encode(&schema, &value).unwrap();
            for cut in 0..bytes.len() {
                let err = decode(&schema, &bytes[..cut]).unwrap_err();
                prop_assert!(matches!(err, CodecError::MalformedInput { .. }), "cut {}: {:?}", cut, err);
            }
        }

        #[test]
        fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let _ = decode(&ledger_schema(), &bytes);
            let _ = decode(&Schema::vec(LenPrefix::U64, Schema::Struct(vec![])), &bytes);
            let _ = decode(&Schema::vec(LenPrefix::U32, Schema::Blob(LenPrefix::U64)), &bytes);
        }
    }
}
