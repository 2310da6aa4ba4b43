//! Text-to-text conversion between the dense and human formats.

use crate::de::DenseParser;
use crate::human_formatter::HumanFormatter;
use crate::human_parser::HumanParser;
use crate::options::{DenseOptions, HumanOptions};
use crate::ser::DenseSerializer;
use crate::Result;

/// Dense text to human text, expanding abbreviated keys.
///
/// ```rust
/// use dx_codec::dense_to_human;
///
/// let human = dense_to_human("nm=Test\nct=3")?;
/// assert_eq!(human, "[config]\nname  = Test\ncount = 3");
/// # Ok::<(), dx_codec::Error>(())
/// ```
pub fn dense_to_human(text: &str) -> Result<String> {
    dense_to_human_with_options(text, HumanOptions::default())
}

/// [`dense_to_human`] with explicit formatting options.
pub fn dense_to_human_with_options(text: &str, options: HumanOptions) -> Result<String> {
    let doc = DenseParser::default().parse(text)?;
    HumanFormatter::new(options).format(&doc)
}

/// Human text to dense text with abbreviated keys and compact symbols.
///
/// ```rust
/// use dx_codec::human_to_dense;
///
/// let dense = human_to_dense("[config]\nname = Test\nactive = true")?;
/// assert_eq!(dense, "nm=Test\nac=+");
/// # Ok::<(), dx_codec::Error>(())
/// ```
pub fn human_to_dense(text: &str) -> Result<String> {
    let doc = HumanParser::new().parse(text)?.compress_keys();
    DenseSerializer::new(DenseOptions::compact()).serialize(&doc)
}
