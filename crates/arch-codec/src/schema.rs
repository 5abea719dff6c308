//! Declarative record layouts.
//!
//! ```text
//! u8 / u32 / u64     little-endian, fixed width
//! bool               1 byte, 0 or 1
//! bytes[N]           N raw bytes, no prefix
//! array[N] of T      N consecutive encodings of T, no prefix
//! vec of T           length prefix (u8 | u32 | u64 LE), then the items
//! blob               length prefix, then raw bytes
//! option of T        0x00, or 0x01 followed by T
//! struct             fields in declaration order, no padding
//! ```

/// Width of the little-endian length prefix in front of a `vec` or `blob`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LenPrefix {
    U8,
    U32,
    U64,
}

impl LenPrefix {
    /// Size of the prefix in bytes.
    pub fn size(self) -> usize {
        match self {
            LenPrefix::U8 => 1,
            LenPrefix::U32 => 4,
            LenPrefix::U64 => 8,
        }
    }

    /// Largest length the prefix can carry.
    pub fn max_len(self) -> u64 {
        match self {
            LenPrefix::U8 => u8::MAX as u64,
            LenPrefix::U32 => u32::MAX as u64,
            LenPrefix::U64 => u64::MAX,
        }
    }
}

/// A named field of a struct schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
}

/// Layout of one encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    U8,
    U32,
    U64,
    Bool,
    Bytes(usize),
    Array { len: usize, item: Box<Schema> },
    Vec { prefix: LenPrefix, item: Box<Schema> },
    Blob(LenPrefix),
    Option(Box<Schema>),
    Struct(Vec<Field>),
}

impl Schema {
    pub fn array(len: usize, item: Schema) -> Self {
        Schema::Array {
            len,
            item: Box::new(item),
        }
    }

    pub fn vec(prefix: LenPrefix, item: Schema) -> Self {
        Schema::Vec {
            prefix,
            item: Box::new(item),
        }
    }

    pub fn option(inner: Schema) -> Self {
        Schema::Option(Box::new(inner))
    }

    /// Build a struct schema from `(name, schema)` pairs in wire order.
    pub fn record(fields: impl IntoIterator<Item = (&'static str, Schema)>) -> Self {
        Schema::Struct(
            fields
                .into_iter()
                .map(|(name, schema)| Field { name, schema })
                .collect(),
        )
    }

    /// Smallest number of bytes any value of this schema encodes to.
    ///
    /// Variable-length parts count as empty and options as absent.
    pub fn min_len(&self) -> usize {
        match self {
            Schema::U8 | Schema::Bool => 1,
            Schema::U32 => 4,
            Schema::U64 => 8,
            Schema::Bytes(n) => *n,
            Schema::Array { len, item } => len.saturating_mul(item.min_len()),
            Schema::Vec { prefix, .. } | Schema::Blob(prefix) => prefix.size(),
            Schema::Option(_) => 1,
            Schema::Struct(fields) => fields.iter().map(|f| f.schema.min_len()).sum(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_sizes() {
        assert_eq!(Schema::U8.min_len(), 1);
        assert_eq!(Schema::U32.min_len(), 4);
        assert_eq!(Schema::U64.min_len(), 8);
        assert_eq!(Schema::Bool.min_len(), 1);
    }

    #[test]
    fn struct_min_len_sums_fields() {
        let schema = Schema::record([
            ("function_number", Schema::U8),
            ("unique_id", Schema::Bytes(32)),
            ("expiry_timestamp", Schema::U32),
            ("num_outcomes", Schema::U8),
        ]);
        assert_eq!(schema.min_len(), 38);
    }

    #[test]
    fn variable_parts_count_their_prefix() {
        let schema = Schema::record([
            ("count", Schema::U32),
            ("items", Schema::vec(LenPrefix::U32, Schema::U64)),
        ]);
        assert_eq!(schema.min_len(), 8);
    }

    #[test]
    fn option_min_len_is_tag_only() {
        assert_eq!(Schema::option(Schema::U64).min_len(), 1);
    }

    #[test]
    fn array_of_structs() {
        let pair = Schema::record([("id", Schema::U8), ("amount", Schema::U64)]);
        assert_eq!(Schema::array(3, pair).min_len(), 27);
    }

    #[test]
    fn prefix_limits() {
        assert_eq!(LenPrefix::U8.max_len(), 255);
        assert_eq!(LenPrefix::U32.size(), 4);
        assert_eq!(LenPrefix::U64.max_len(), u64::MAX);
    }
}
