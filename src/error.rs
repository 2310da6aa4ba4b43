//! Error types for parsing, serializing and decoding DX documents.
//!
//! Most parsers in this crate are lenient: unrecognized lines are skipped rather
//! than reported. The errors here cover what cannot be recovered from:
//!
//! - **Model errors**: duplicate column names, rows that do not match their schema
//! - **Parse errors**: oversized input, invalid UTF-8 in byte input
//! - **Decode errors**: malformed JSON envelopes, bad binary magic/version, truncation
//! - **Encode errors**: counts that do not fit the binary layout, non-finite numbers
//!
//! Structural diagnostics for raw text (line, column, hint) are not errors; they
//! are returned as [`ValidationResult`](crate::validate::ValidationResult) values.
//!
//! ## Examples
//!
//! ```rust
//! use dx_codec::{deserialize_machine, Error};
//!
//! let result = deserialize_machine("{not json");
//! assert!(matches!(result, Err(Error::InvalidJson(_))));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all failures produced by the DX codecs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A schema declared the same column twice.
    #[error("Duplicate field '{name}' in schema")]
    DuplicateField { name: String },

    /// A row was pushed through the strict API with the wrong number of cells.
    #[error("Row length {found} doesn't match schema length {expected}")]
    RowLength { expected: usize, found: usize },

    /// A serializer found a row that does not match its section schema.
    #[error("Section '{section}' row {row} has {found} values but the schema defines {expected} columns")]
    SchemaMismatch {
        section: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A key, id or column name cannot be written in the target encoding.
    #[error("Key '{0}' cannot be written here: expected an identifier")]
    InvalidKey(String),

    /// Input exceeded the configured size cap.
    #[error("Input too large: {size} bytes exceeds maximum of {max} bytes")]
    InputTooLarge { size: usize, max: usize },

    /// The machine envelope was not valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The machine envelope was valid JSON but not a valid document.
    #[error("Invalid machine document: {0}")]
    InvalidEnvelope(String),

    /// Binary input did not start with the expected magic bytes.
    #[error("Invalid magic: expected DXMB")]
    InvalidMagic,

    /// The envelope or binary header carried an unknown version.
    #[error("Unsupported version {0}")]
    UnsupportedVersion(u64),

    /// Binary input ended before a complete value could be read.
    #[error("Truncated binary data at offset {offset}")]
    Truncated { offset: usize },

    /// A binary section began with an unknown type tag.
    #[error("Unknown section tag {tag:#04x} at offset {offset}")]
    UnknownSectionTag { tag: u8, offset: usize },

    /// A binary value began with an unknown type tag.
    #[error("Unknown value tag {tag:#04x} at offset {offset}")]
    UnknownValueTag { tag: u8, offset: usize },

    /// Binary string data was not valid UTF-8.
    #[error("Invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// A length or count does not fit the binary field that carries it.
    #[error("{what} length {len} exceeds the binary limit of {max}")]
    LengthOverflow {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// NaN and infinities have no form in the text encodings or the JSON envelope.
    #[error("Cannot encode non-finite number {0}")]
    NonFiniteNumber(f64),

    /// A validated format pass did not read back to the same document shape.
    #[error("Round-trip check failed: {0}")]
    RoundTrip(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a duplicate field error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dx_codec::Error;
    ///
    /// let err = Error::duplicate_field("id");
    /// assert!(err.to_string().contains("'id'"));
    /// ```
    pub fn duplicate_field(name: &str) -> Self {
        Error::DuplicateField {
            name: name.to_string(),
        }
    }

    /// Creates a truncation error for binary decoding.
    pub fn truncated(offset: usize) -> Self {
        Error::Truncated { offset }
    }

    /// Creates an envelope shape error.
    pub fn invalid_envelope<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidEnvelope(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dx_codec::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_too_large_message() {
        let err = Error::InputTooLarge { size: 10, max: 4 };
        assert_eq!(
            err.to_string(),
            "Input too large: 10 bytes exceeds maximum of 4 bytes"
        );
    }

    #[test]
    fn test_schema_mismatch_names_both_counts() {
        let err = Error::SchemaMismatch {
            section: "users".to_string(),
            row: 1,
            expected: 3,
            found: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 values"));
        assert!(msg.contains("3 columns"));
    }

    #[test]
    fn test_tag_errors_are_hex() {
        let err = Error::UnknownSectionTag { tag: 0x09, offset: 8 };
        assert!(err.to_string().contains("0x09"));
    }
}
