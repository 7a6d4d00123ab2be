//! Error types for the `.ch2` codec.

use thiserror::Error;

/// Errors that can occur while encoding a `.ch2` document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Ch2Error {
    /// A character has no Shift_JIS (CP932) representation.
    #[error("Cannot encode {character:?} (U+{code:04X}) in Shift_JIS: {line}")]
    Unencodable {
        character: char,
        code: u32,
        line: String,
    },
}
