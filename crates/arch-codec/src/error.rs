use thiserror::Error;

/// Schema codec errors.
///
/// `field` is the dotted path of the offending field (for example
/// `predictions[2].winning_outcome`), or `<root>` for a top-level value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed input at {field}: {reason}")]
    MalformedInput { field: String, reason: String },

    #[error("schema violation at {field}: {reason}")]
    SchemaViolation { field: String, reason: String },
}

impl CodecError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        CodecError::MalformedInput {
            field: display_path(field),
            reason: reason.into(),
        }
    }

    pub(crate) fn violation(field: &str, reason: impl Into<String>) -> Self {
        CodecError::SchemaViolation {
            field: display_path(field),
            reason: reason.into(),
        }
    }

    /// The field path the error refers to.
    pub fn field(&self) -> &str {
        match self {
            CodecError::MalformedInput { field, .. } | CodecError::SchemaViolation { field, .. } => {
                field
            }
        }
    }
}

fn display_path(field: &str) -> String {
    if field.is_empty() {
        "<root>".to_string()
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_malformed_input() {
        let err = CodecError::malformed("unique_id", "need 32 bytes, have 3");
        assert_eq!(
            err.to_string(),
            "malformed input at unique_id: need 32 bytes, have 3"
        );
    }

    #[test]
    fn display_schema_violation() {
        let err = CodecError::violation("num_outcomes", "value 300 exceeds u8");
        assert_eq!(
            err.to_string(),
            "schema violation at num_outcomes: value 300 exceeds u8"
        );
    }

    #[test]
    fn empty_path_is_root() {
        let err = CodecError::malformed("", "trailing bytes");
        assert_eq!(err.field(), "<root>");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CodecError::violation("x", "test"));
        assert!(err.to_string().contains("test"));
    }
}
