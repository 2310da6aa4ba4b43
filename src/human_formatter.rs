//! Human (TOML/INI-like) format output.
//!
//! [`HumanFormatter`] renders a [`DxDocument`] as text meant for people:
//!
//! ```text
//! tags:
//!   - web
//!
//! [config]
//! name    = "My App"
//! version = 1
//!
//! [references]
//! A = "Acme Corp"
//!
//! [users]
//!   id | name
//!   1  | Alice
//!   2  | Bob
//! ```
//!
//! Standalone arrays come first, then `[config]` for the context, then
//! `[references]`, then every section and object in document order. A section
//! with one row is written as `key = value` lines; any other section is an
//! indented table. A section whose id is `config`, `references` or `refs` gets
//! the quoted header `["refs"]` so it reads back as data. Abbreviated keys are expanded unless
//! [`HumanOptions::expand_keys`] is off.

use crate::document::{DxDocument, DxSection};
use crate::human_parser::{is_reserved_header, HumanParser};
use crate::options::HumanOptions;
use crate::scan::is_ident;
use crate::ser::smart_quote;
use crate::value::{format_number, is_numeric_literal};
use crate::{DxMap, DxValue, Error, Result};
use std::borrow::Cow;

/// `true` for strings the human parser would not read back as themselves.
fn is_misread(s: &str) -> bool {
    s.is_empty()
        || matches!(s, "true" | "false" | "none")
        || is_numeric_literal(s)
        || s.trim() != s
        || s.starts_with('-')
        || s.starts_with("//")
        || s.contains(['[', ']', ',', '=', '\n', '\r', '\t'])
}

/// Quotes a human string: [`smart_quote`] first, then plain double quotes for
/// strings that would otherwise be misread.
fn quote_human(s: &str) -> Cow<'_, str> {
    match smart_quote(s) {
        Cow::Borrowed(_) if is_misread(s) => Cow::Owned(format!("\"{}\"", s)),
        quoted => quoted,
    }
}

/// Formats a value for a `key = value` line.
///
/// ```rust
/// use dx_codec::human_formatter::format_value;
/// use dx_codec::DxValue;
///
/// assert_eq!(format_value(&DxValue::Null), "none");
/// assert_eq!(format_value(&DxValue::from("a b")), "\"a b\"");
/// let tags = DxValue::Array(vec!["a".into(), "b".into()]);
/// assert_eq!(format_value(&tags), "a, b");
/// let nested = DxValue::Array(vec![tags, "c".into()]);
/// assert_eq!(format_value(&nested), "[[a, b], c]");
/// ```
#[must_use]
pub fn format_value(value: &DxValue) -> String {
    match value {
        DxValue::Null => "none".to_string(),
        DxValue::Array(items) if items.len() >= 2 && items.iter().all(DxValue::is_scalar) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        DxValue::Array(items) => bracketed(items),
        other => format_scalar(other),
    }
}

/// Formats a value for a table cell. Null is `-` and arrays are bracketed.
#[must_use]
pub fn format_table_value(value: &DxValue) -> String {
    match value {
        DxValue::Null => "-".to_string(),
        DxValue::Array(items) => bracketed(items),
        other => format_scalar(other),
    }
}

/// The `Total: N items` line written after a data section.
#[must_use]
pub fn generate_summary(section: &DxSection) -> String {
    format!("Total: {} items", section.row_count())
}

fn bracketed(items: &[DxValue]) -> String {
    let inner: Vec<String> = items
        .iter()
        .map(|item| match item {
            DxValue::Null => "none".to_string(),
            DxValue::Array(nested) => bracketed(nested),
            other => format_scalar(other),
        })
        .collect();
    format!("[{}]", inner.join(", "))
}

fn format_scalar(value: &DxValue) -> String {
    match value {
        DxValue::String(s) => quote_human(s).into_owned(),
        DxValue::Number(n) => format_number(*n),
        DxValue::Bool(b) => b.to_string(),
        DxValue::Null => "none".to_string(),
        DxValue::Ref(key) => format!("^{}", key),
        DxValue::Array(items) => bracketed(items),
        DxValue::Object(map) => {
            let pairs: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}={}", k, format_table_value(v)))
                .collect();
            format!("[{}]", pairs.join(", "))
        }
    }
}

/// Writes a [`DxDocument`] as human text.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    options: HumanOptions,
}

impl HumanFormatter {
    #[must_use]
    pub fn new(options: HumanOptions) -> Self {
        HumanFormatter { options }
    }

    #[must_use]
    pub fn options(&self) -> &HumanOptions {
        &self.options
    }

    /// Formats `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] when a section row does not match its
    /// schema and [`Error::NonFiniteNumber`] for NaN or infinite numbers.
    pub fn format(&self, doc: &DxDocument) -> Result<String> {
        doc.check_finite()?;
        let expanded;
        let doc = if self.options.expand_keys {
            expanded = doc.expand_keys();
            &expanded
        } else {
            doc
        };
        let resolved;
        let doc = if self.options.resolve_refs {
            resolved = doc.resolve_refs();
            &resolved
        } else {
            doc
        };

        let mut blocks: Vec<Vec<String>> = Vec::new();

        if !doc.arrays.is_empty() {
            let mut lines = Vec::new();
            for (key, items) in &doc.arrays {
                self.array_block(&mut lines, key, items);
            }
            blocks.push(lines);
        }

        if !doc.context.is_empty() {
            let mut lines = vec!["[config]".to_string()];
            self.key_values(&mut lines, doc.context.iter());
            blocks.push(lines);
        }

        if !doc.refs.is_empty() {
            let mut lines = vec!["[references]".to_string()];
            let width = self.key_width(doc.refs.keys());
            for (key, value) in &doc.refs {
                lines.push(format!("{:<width$} = {}", key, quote_human(value), width = width));
            }
            blocks.push(lines);
        }

        for id in doc.ordered_ids() {
            let mut lines = vec![header(id)];
            if let Some(section) = doc.sections.get(id) {
                section.check_rows()?;
                self.section(&mut lines, section);
                if self.options.summary {
                    lines.push(generate_summary(section));
                }
            } else if let Some(object) = doc.objects.get(id) {
                self.object(&mut lines, object);
                if self.options.summary {
                    lines.push("Total: 1 items".to_string());
                }
            }
            blocks.push(lines);
        }

        let text = blocks
            .into_iter()
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(text)
    }

    fn key_width<'a>(&self, keys: impl Iterator<Item = &'a String>) -> usize {
        keys.map(|k| k.chars().count())
            .max()
            .unwrap_or(0)
            .max(self.options.key_padding)
    }

    fn indent(&self) -> String {
        " ".repeat(self.options.indent)
    }

    fn array_block(&self, lines: &mut Vec<String>, key: &str, items: &[DxValue]) {
        lines.push(format!("{}:", key));
        let indent = self.indent();
        for item in items {
            lines.push(format!("{}- {}", indent, format_value(item)));
        }
    }

    /// Scalars as padded `key = value` lines; arrays as `key:` blocks.
    fn key_values<'a>(
        &self,
        lines: &mut Vec<String>,
        pairs: impl Iterator<Item = (&'a String, &'a DxValue)> + Clone,
    ) {
        let width = self.key_width(
            pairs
                .clone()
                .filter(|(_, v)| !v.is_array())
                .map(|(k, _)| k),
        );
        for (key, value) in pairs {
            match value {
                DxValue::Array(items) => self.array_block(lines, key, items),
                other => lines.push(format!(
                    "{:<width$} = {}",
                    key,
                    format_value(other),
                    width = width
                )),
            }
        }
    }

    fn section(&self, lines: &mut Vec<String>, section: &DxSection) {
        let all_keys = section.schema.iter().all(|f| is_ident(&f.name));
        if section.rows.len() == 1 && all_keys {
            let pairs: Vec<(&String, &DxValue)> = section
                .schema
                .iter()
                .map(|f| &f.name)
                .zip(&section.rows[0])
                .collect();
            self.key_values(lines, pairs.into_iter());
            return;
        }
        if section.schema.is_empty() {
            return;
        }

        let header: Vec<String> = section
            .schema
            .iter()
            .map(|f| quote_human(&f.name).into_owned())
            .collect();
        let rows: Vec<Vec<String>> = section
            .rows
            .iter()
            .map(|row| row.iter().map(format_table_value).collect())
            .collect();
        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let indent = self.indent();
        lines.push(table_line(&indent, &header, &widths));
        for row in &rows {
            lines.push(table_line(&indent, row, &widths));
        }
    }

    fn object(&self, lines: &mut Vec<String>, object: &DxMap) {
        let ident: Vec<(&String, &DxValue)> = object.iter().filter(|(k, _)| is_ident(k)).collect();
        if ident.len() < object.len() {
            log::debug!(
                "{} object keys are not identifiers and cannot be written as human lines",
                object.len() - ident.len()
            );
        }
        self.key_values(lines, ident.into_iter());
    }
}

fn table_line(indent: &str, cells: &[String], widths: &[usize]) -> String {
    let mut line = indent.to_string();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str(" | ");
        }
        line.push_str(cell);
        if i + 1 < cells.len() {
            let width = widths.get(i).copied().unwrap_or(0);
            let pad = width.saturating_sub(cell.chars().count());
            line.extend(std::iter::repeat(' ').take(pad));
        }
    }
    line
}

/// Formats a document and checks that the output reads back with the same
/// shape: context keys, section ids, row counts and references.
#[derive(Clone, Debug, Default)]
pub struct PrettyPrinter {
    formatter: HumanFormatter,
}

impl PrettyPrinter {
    #[must_use]
    pub fn new(options: HumanOptions) -> Self {
        PrettyPrinter {
            formatter: HumanFormatter::new(options),
        }
    }

    /// Formats `doc` without the read-back check.
    pub fn format_unchecked(&self, doc: &DxDocument) -> Result<String> {
        self.formatter.format(doc)
    }

    /// Formats `doc` and verifies the output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoundTrip`] when the formatted text parses into a
    /// document of a different shape.
    pub fn format(&self, doc: &DxDocument) -> Result<String> {
        let text = self.formatter.format(doc)?;
        let parsed = HumanParser::new().parse(&text)?;
        check_shape(doc, &parsed)?;
        Ok(text)
    }
}

fn header(id: &str) -> String {
    if is_reserved_header(id) {
        format!("[\"{}\"]", id)
    } else {
        format!("[{}]", id)
    }
}

fn check_shape(original: &DxDocument, parsed: &DxDocument) -> Result<()> {
    let mismatch = |what: &str, expected: usize, found: usize| {
        Error::RoundTrip(format!("expected {} {}, found {}", expected, what, found))
    };
    if original.context.len() != parsed.context.len() {
        return Err(mismatch("context entries", original.context.len(), parsed.context.len()));
    }
    if original.refs.len() != parsed.refs.len() {
        return Err(mismatch("references", original.refs.len(), parsed.refs.len()));
    }
    if original.arrays.len() != parsed.arrays.len() {
        return Err(mismatch("arrays", original.arrays.len(), parsed.arrays.len()));
    }
    let ids = original.ordered_ids();
    if ids.len() != parsed.sections.len() {
        return Err(mismatch("sections", ids.len(), parsed.sections.len()));
    }
    for (index, id) in ids.into_iter().enumerate() {
        let Some(section) = original.sections.get(id) else {
            continue;
        };
        let Some((_, read)) = parsed.sections.get_index(index) else {
            continue;
        };
        if !section.schema.is_empty() && section.rows.len() != read.rows.len() {
            return Err(Error::RoundTrip(format!(
                "section '{}': expected {} rows, found {}",
                id,
                section.rows.len(),
                read.rows.len()
            )));
        }
    }
    Ok(())
}
