//! User-input gates applied before any payload is encoded.

use crate::error::InputError;

/// Display-name limit, in UTF-8 bytes.
pub const MAX_NAME_BYTES: usize = 16;

/// Wall-message limit, in UTF-8 bytes.
pub const MAX_MESSAGE_BYTES: usize = 64;

/// Width of an event id.
pub const UNIQUE_ID_LEN: usize = 32;

fn check(field: &'static str, text: &str, max: usize) -> Result<(), InputError> {
    if text.trim().is_empty() {
        return Err(InputError::Empty { field });
    }
    let got = text.len();
    if got > max {
        return Err(InputError::TooLong { field, max, got });
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<(), InputError> {
    check("name", name, MAX_NAME_BYTES)
}

pub fn validate_wall_message(message: &str) -> Result<(), InputError> {
    check("message", message, MAX_MESSAGE_BYTES)
}

/// A name and message pair that has passed both gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallEntry {
    name: String,
    message: String,
}

impl WallEntry {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Result<Self, InputError> {
        let name = name.into();
        let message = message.into();
        validate_display_name(&name)?;
        validate_wall_message(&message)?;
        Ok(WallEntry { name, message })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Pack text into a 32-byte event id: UTF-8 bytes, truncated, zero-padded.
///
/// Truncation is byte-wise and may split a multibyte character.
pub fn unique_id_from_text(text: &str) -> [u8; UNIQUE_ID_LEN] {
    let mut id = [0u8; UNIQUE_ID_LEN];
    let bytes = text.as_bytes();
    let n = bytes.len().min(UNIQUE_ID_LEN);
    id[..n].copy_from_slice(&bytes[..n]);
    id
}
