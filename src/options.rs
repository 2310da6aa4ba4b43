//! Configuration options for the dense and human encodings.
//!
//! - [`DenseOptions`]: pair separator, symbol set and input cap for dense text
//! - [`HumanOptions`]: key padding, abbreviation expansion, summaries, ref resolution
//! - [`Separator`]: comma or space, also returned by separator auto-detection
//! - [`SymbolSet`]: the two dense symbol vocabularies
//!
//! ## Examples
//!
//! ```rust
//! use dx_codec::{DenseOptions, Separator, SymbolSet};
//!
//! let options = DenseOptions::new()
//!     .with_separator(Separator::Comma)
//!     .with_symbols(SymbolSet::Compact);
//! assert_eq!(options.separator.as_char(), ',');
//! ```

/// Default cap on dense input size (100 MiB).
pub const MAX_INPUT_SIZE: usize = 100 * 1024 * 1024;

/// Separator between `key=value` pairs inside inline objects, and between
/// schema columns in tables.
///
/// # Examples
///
/// ```rust
/// use dx_codec::Separator;
///
/// assert_eq!(Separator::Comma.as_str(), ",");
/// assert_eq!(Separator::Space.as_str(), " ");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Separator {
    Comma,
    #[default]
    Space,
}

impl Separator {
    /// Returns the string representation of this separator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Separator::Comma => ",",
            Separator::Space => " ",
        }
    }

    /// Returns the separator character.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Space => ' ',
        }
    }
}

/// Symbol vocabulary used for booleans, null and root arrays in dense text.
///
/// The two sets are deliberately incompatible: text written with one must be
/// read back with the same one.
///
/// | Value | `Verbose` | `Compact` |
/// |-------|-----------|-----------|
/// | true / false | `true` / `false` | `+` / `-` |
/// | null | `null` | `~` |
/// | root array | `[a b c]` | `*a,b,c` |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SymbolSet {
    #[default]
    Verbose,
    Compact,
}

/// Configuration for the dense parser and serializer.
///
/// # Examples
///
/// ```rust
/// use dx_codec::{DenseOptions, Separator, SymbolSet};
///
/// let options = DenseOptions::compact();
/// assert_eq!(options.symbols, SymbolSet::Compact);
///
/// let options = DenseOptions::minified();
/// assert_eq!(options.separator, Separator::Comma);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DenseOptions {
    pub separator: Separator,
    pub symbols: SymbolSet,
    pub max_input_size: usize,
}

impl Default for DenseOptions {
    fn default() -> Self {
        DenseOptions {
            separator: Separator::default(),
            symbols: SymbolSet::default(),
            max_input_size: MAX_INPUT_SIZE,
        }
    }
}

impl DenseOptions {
    /// Creates default options (space separator, verbose symbols).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the compact symbol set (`+`, `-`, `~`, `*a,b`).
    #[must_use]
    pub fn compact() -> Self {
        DenseOptions {
            symbols: SymbolSet::Compact,
            ..Default::default()
        }
    }

    /// Options used by [`minify`](crate::minify): comma separators, verbose symbols.
    #[must_use]
    pub fn minified() -> Self {
        DenseOptions {
            separator: Separator::Comma,
            ..Default::default()
        }
    }

    /// Sets the pair separator used for inline objects and field arrays.
    #[must_use]
    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    /// Sets the symbol set.
    #[must_use]
    pub fn with_symbols(mut self, symbols: SymbolSet) -> Self {
        self.symbols = symbols;
        self
    }

    /// Sets the maximum accepted input size in bytes.
    #[must_use]
    pub fn with_max_input_size(mut self, max: usize) -> Self {
        self.max_input_size = max;
        self
    }
}

/// Configuration for the human formatter.
///
/// # Examples
///
/// ```rust
/// use dx_codec::HumanOptions;
///
/// let options = HumanOptions::new().with_key_padding(12).with_summary(true);
/// assert_eq!(options.key_padding, 12);
/// assert!(options.summary);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HumanOptions {
    /// Minimum key width in `key = value` lines.
    pub key_padding: usize,
    /// Expand abbreviated keys and section ids (`nm` → `name`).
    pub expand_keys: bool,
    /// Append a `Total: N items` line after each data section.
    pub summary: bool,
    /// Substitute `^key` references with their values from the document refs.
    pub resolve_refs: bool,
    /// Indentation of table rows.
    pub indent: usize,
}

impl Default for HumanOptions {
    fn default() -> Self {
        HumanOptions {
            key_padding: 0,
            expand_keys: true,
            summary: false,
            resolve_refs: false,
            indent: 2,
        }
    }
}

impl HumanOptions {
    /// Creates default options (keys expanded, no padding, no summaries).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum key width.
    #[must_use]
    pub fn with_key_padding(mut self, padding: usize) -> Self {
        self.key_padding = padding;
        self
    }

    /// Enables or disables key expansion.
    #[must_use]
    pub fn with_expand_keys(mut self, expand: bool) -> Self {
        self.expand_keys = expand;
        self
    }

    /// Enables or disables `Total: N items` summary lines.
    #[must_use]
    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    /// Enables or disables reference resolution.
    #[must_use]
    pub fn with_resolve_refs(mut self, resolve: bool) -> Self {
        self.resolve_refs = resolve;
        self
    }

    /// Sets the row indentation.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
