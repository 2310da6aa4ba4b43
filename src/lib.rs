//! # dx_codec
//!
//! A multi-representation document codec. One document model, four encodings:
//!
//! - **Dense (LLM) text**: token-efficient lines like `users:2(id nm)[1 Al;2 Bo]`
//! - **Human text**: a TOML/INI-like layout with `[sections]` and `a | b` tables
//! - **Machine JSON**: a tagged `{t, v}` envelope for tools
//! - **Binary**: a compact `DXMB` byte layout
//!
//! Every parser produces a [`DxDocument`] and every formatter consumes one. The
//! encodings never talk to each other directly.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! dx_codec = "0.1"
//! ```
//!
//! ### Dense text
//!
//! ```rust
//! use dx_codec::{from_dense, to_dense, DxValue};
//!
//! let doc = from_dense("nm=Test\nusers:2(id nm)[1 Alice;2 Bob]")?;
//! assert_eq!(doc.context["nm"], DxValue::from("Test"));
//! assert_eq!(doc.sections["users"].rows.len(), 2);
//!
//! assert_eq!(to_dense(&doc)?, "nm=Test\nusers:2(id nm)[1 Alice;2 Bob]");
//! # Ok::<(), dx_codec::Error>(())
//! ```
//!
//! ### Human text
//!
//! Abbreviated keys are expanded for people and compressed again on the way
//! back:
//!
//! ```rust
//! use dx_codec::{dense_to_human, human_to_dense};
//!
//! let human = dense_to_human("nm=Test\nct=3")?;
//! assert_eq!(human, "[config]\nname  = Test\ncount = 3");
//! assert_eq!(human_to_dense(&human)?, "nm=Test\nct=3");
//! # Ok::<(), dx_codec::Error>(())
//! ```
//!
//! ### Machine formats
//!
//! ```rust
//! use dx_codec::{deserialize_machine, from_binary, from_dense, serialize_machine, to_binary};
//!
//! let doc = from_dense("nm=Test\n#:A|Acme Corp")?;
//! assert_eq!(deserialize_machine(&serialize_machine(&doc)?)?, doc);
//! assert_eq!(from_binary(&to_binary(&doc)?)?, doc);
//! # Ok::<(), dx_codec::Error>(())
//! ```
//!
//! ### Validation
//!
//! Parsers skip what they cannot read. [`validate()`] is the strict pre-check:
//!
//! ```rust
//! use dx_codec::validate;
//!
//! let result = validate("#d(id|nm)\n1|Alpha\n2");
//! let error = result.error.unwrap();
//! assert_eq!(error.line(), 3);
//! assert!(!error.hint().is_empty());
//! ```
//!
//! ### Building values with dx!
//!
//! ```rust
//! use dx_codec::{dx, DxValue};
//!
//! let data = dx!({
//!     "nm": "Alice",
//!     "tags": ["rust", "llm"],
//!     "cmp": ^"A"
//! });
//!
//! if let DxValue::Object(obj) = data {
//!     assert_eq!(obj.get("nm").and_then(|v| v.as_str()), Some("Alice"));
//! }
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Parsers are lenient and never panic on malformed text
//! - Decoders check every length before reading
//! - All operations are synchronous and share no mutable state
//!
//! ## Format Grammars
//!
//! See the [`grammar`] module.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Parse and write dense text
//! - **`macro.rs`** - Building values with the dx! macro
//! - **`tabular_sections.rs`** - Tables across the dense and human formats
//! - **`custom_options.rs`** - Separators, symbol sets and human layout
//! - **`machine_formats.rs`** - JSON envelope and binary encoding
//!
//! Run any example with: `cargo run --example <name>`

pub mod abbrev;
pub mod binary;
pub mod convert;
pub mod de;
pub mod document;
pub mod error;
pub mod grammar;
pub mod human_formatter;
pub mod human_parser;
pub mod machine;
pub mod macros;
pub mod map;
pub mod options;
pub mod scan;
pub mod ser;
pub mod validate;
pub mod value;

pub use abbrev::{compress_key, expand_key, expand_key_in};
pub use binary::{binary_info, from_binary, to_binary, verify_binary, BinaryInfo};
pub use convert::{dense_to_human, dense_to_human_with_options, human_to_dense};
pub use de::DenseParser;
pub use document::{DxDocument, DxSection, FieldDef};
pub use error::{Error, Result};
pub use human_formatter::{HumanFormatter, PrettyPrinter};
pub use human_parser::HumanParser;
pub use machine::{
    deserialize_machine, from_machine, serialize_machine, to_machine, MachineDocument,
    MachineValue,
};
pub use map::DxMap;
pub use options::{DenseOptions, HumanOptions, Separator, SymbolSet};
pub use ser::{minify, smart_quote, DenseSerializer};
pub use validate::{
    detect_format, validate, TextFormat, ValidationError, ValidationErrorKind, ValidationResult,
};
pub use value::DxValue;

/// Parses dense text with the default options.
///
/// # Examples
///
/// ```rust
/// use dx_codec::from_dense;
///
/// let doc = from_dense("nm|Test\nv|1.0")?;
/// assert_eq!(doc.context.len(), 2);
/// # Ok::<(), dx_codec::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if the input exceeds the size cap or a schema repeats a
/// column name. Unrecognized lines are skipped, not reported.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_dense(text: &str) -> Result<DxDocument> {
    DenseParser::default().parse(text)
}

/// Parses dense text with custom options.
///
/// # Errors
///
/// See [`from_dense`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_dense_with_options(text: &str, options: DenseOptions) -> Result<DxDocument> {
    DenseParser::new(options).parse(text)
}

/// Parses dense text from bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidUtf8`] if the bytes are not UTF-8, otherwise see
/// [`from_dense`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_dense_slice(bytes: &[u8]) -> Result<DxDocument> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;
    from_dense(text)
}

/// Writes dense text with the default options.
///
/// # Examples
///
/// ```rust
/// use dx_codec::{to_dense, DxDocument, DxValue};
///
/// let mut doc = DxDocument::new();
/// doc.context.insert("ok".to_string(), DxValue::Bool(true));
/// assert_eq!(to_dense(&doc)?, "ok=true");
/// # Ok::<(), dx_codec::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if a key cannot be written as an identifier or a row does
/// not match its schema.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_dense(doc: &DxDocument) -> Result<String> {
    to_dense_with_options(doc, DenseOptions::default())
}

/// Writes dense text with custom options.
///
/// # Errors
///
/// See [`to_dense`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_dense_with_options(doc: &DxDocument, options: DenseOptions) -> Result<String> {
    DenseSerializer::new(options).serialize(doc)
}

/// Parses human text.
///
/// # Errors
///
/// Only fails if a section cannot be built; malformed lines are skipped.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_human(text: &str) -> Result<DxDocument> {
    HumanParser::new().parse(text)
}

/// Writes human text with the default options.
///
/// # Errors
///
/// Returns an error if a row does not match its schema.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_human(doc: &DxDocument) -> Result<String> {
    to_human_with_options(doc, HumanOptions::default())
}

/// Writes human text with custom options.
///
/// # Examples
///
/// ```rust
/// use dx_codec::{to_human_with_options, DxDocument, DxValue, HumanOptions};
///
/// let mut doc = DxDocument::new();
/// doc.context.insert("nm".to_string(), DxValue::from("Test"));
/// let options = HumanOptions::new().with_expand_keys(false).with_key_padding(4);
/// assert_eq!(to_human_with_options(&doc, options)?, "[config]\nnm   = Test");
/// # Ok::<(), dx_codec::Error>(())
/// ```
///
/// # Errors
///
/// See [`to_human`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_human_with_options(doc: &DxDocument, options: HumanOptions) -> Result<String> {
    HumanFormatter::new(options).format(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_round_trip() {
        let text = "nm=Test\nusers:2(id nm)[1 Alice;2 Bob]";
        assert_eq!(to_dense(&from_dense(text).unwrap()).unwrap(), text);
    }

    #[test]
    fn test_dense_to_human_preserves_counts() {
        let doc = from_dense("nm=Test\nv=1.0\nusers:2(id nm)[1 Alice;2 Bob]\np:2[a=1 b=2]").unwrap();
        let back = from_human(&to_human(&doc).unwrap()).unwrap();
        assert_eq!(back.context.len(), doc.context.len());
        assert_eq!(back.sections.len(), doc.sections.len());
    }

    #[test]
    fn test_from_dense_slice_rejects_invalid_utf8() {
        assert_eq!(
            from_dense_slice(b"k=\xff"),
            Err(Error::InvalidUtf8 { offset: 2 })
        );
        assert_eq!(from_dense_slice(b"k=v").unwrap().context.len(), 1);
    }

    #[test]
    fn test_every_encoding_agrees() {
        let doc = from_dense("#:A|Acme\nnm=Test\ncmp=^A\nusers:2(id nm)[1 Alice;2 Bob]").unwrap();
        let options = HumanOptions::new().with_expand_keys(false);
        let from_text = from_human(&to_human_with_options(&doc, options).unwrap()).unwrap();
        let from_json = deserialize_machine(&serialize_machine(&doc).unwrap()).unwrap();
        let from_bytes = from_binary(&to_binary(&doc).unwrap()).unwrap();
        assert_eq!(from_text, doc);
        assert_eq!(from_json, doc);
        assert_eq!(from_bytes, doc);
    }
}
