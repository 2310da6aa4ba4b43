//! Dense (LLM) format parsing.
//!
//! This module provides the [`DenseParser`] that turns token-dense text into a
//! [`DxDocument`].
//!
//! ## Overview
//!
//! Parsing is line oriented. Every logical line is first classified into a
//! [`DenseLine`] and then applied to the document:
//!
//! - `name:count[k=v k2=v2]`: inline object, a single-row section
//! - `name:count(a b)[1 x;2 y]`: table
//! - `key=value`: root context value
//! - `key[n]=a b c`: standalone array
//! - `key|value`, `#c`, `#:key|value`, `#id(a|b)`, `#id`: legacy dialect
//! - `# text`, `// text`: comments
//!
//! Anything else is skipped. The parser never checks bracket nesting
//! exhaustively; run [`validate`](crate::validate()) first for strict feedback.
//!
//! ## Usage
//!
//! ```rust
//! use dx_codec::from_dense;
//!
//! let doc = from_dense("version=1.0\nusers:2(id nm)[1 Alice;2 Bob]")?;
//! assert_eq!(doc.context.len(), 1);
//! assert_eq!(doc.sections["users"].rows.len(), 2);
//! # Ok::<(), dx_codec::Error>(())
//! ```

use crate::document::{DxDocument, DxSection, FieldDef};
use crate::options::{DenseOptions, SymbolSet};
use crate::scan::{self, ScanMode};
use crate::value::is_numeric_literal;
use crate::{DxMap, DxValue, Error, Result};
use std::borrow::Cow;

/// A classified logical line of dense text.
#[derive(Clone, Debug, PartialEq)]
pub enum DenseLine<'a> {
    /// `name:count[content]`
    InlineObject { name: &'a str, content: &'a str },
    /// `name:count(schema)[rows]`
    Table {
        name: &'a str,
        schema: &'a str,
        rows: &'a str,
    },
    /// `key=value`
    Scalar { key: &'a str, value: &'a str },
    /// `key[count]=values`
    Array {
        key: &'a str,
        count: usize,
        values: &'a str,
    },
    /// `key|value`
    Pair { key: &'a str, value: &'a str },
    Sigil(Sigil<'a>),
    Comment,
    Unrecognized,
}

/// A `#`-prefixed marker of the legacy dialect.
#[derive(Clone, Debug, PartialEq)]
pub enum Sigil<'a> {
    /// `#c`
    Context,
    /// `#:key|value`; `value` is `None` when the `|` is missing.
    Reference {
        key: &'a str,
        value: Option<&'a str>,
    },
    /// `#id(schema)`, optionally followed by `[` opening a row block.
    Table {
        id: &'a str,
        schema: &'a str,
        bracketed: bool,
    },
    /// `#id`
    Object { id: &'a str },
    Unknown(&'a str),
}

/// Classifies one trimmed logical line.
///
/// Inline objects and tables are recognized before scalars, so
/// `a:1[x=1]` is never read as a `key=value` line.
///
/// # Examples
///
/// ```rust
/// use dx_codec::de::{classify_line, DenseLine};
///
/// assert!(matches!(classify_line("u:1[a=1]"), DenseLine::InlineObject { name: "u", .. }));
/// assert!(matches!(classify_line("k=v"), DenseLine::Scalar { key: "k", value: "v" }));
/// assert_eq!(classify_line("???"), DenseLine::Unrecognized);
/// ```
#[must_use]
pub fn classify_line(line: &str) -> DenseLine<'_> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") {
        return DenseLine::Comment;
    }
    if let Some(rest) = line.strip_prefix('#') {
        return classify_sigil(line, rest);
    }
    if let Some(section) = classify_section(line) {
        return section;
    }
    if let Some((key, value)) = line.split_once('=') {
        let key = key.trim();
        if scan::is_ident(key) {
            return DenseLine::Scalar {
                key,
                value: value.trim(),
            };
        }
        if let Some((key, count)) = parse_array_key(key) {
            return DenseLine::Array {
                key,
                count,
                values: value.trim(),
            };
        }
    }
    if let Some((key, value)) = line.split_once('|') {
        let key = key.trim();
        if scan::is_ident(key) {
            return DenseLine::Pair {
                key,
                value: value.trim(),
            };
        }
    }
    DenseLine::Unrecognized
}

fn classify_sigil<'a>(line: &'a str, rest: &'a str) -> DenseLine<'a> {
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return DenseLine::Comment;
    }
    if rest == "c" {
        return DenseLine::Sigil(Sigil::Context);
    }
    if let Some(body) = rest.strip_prefix(':') {
        let sigil = match body.split_once('|') {
            Some((key, value)) if !key.trim().is_empty() => Sigil::Reference {
                key: key.trim(),
                value: Some(value.trim()),
            },
            _ => Sigil::Reference {
                key: body.trim(),
                value: None,
            },
        };
        return DenseLine::Sigil(sigil);
    }

    let id_len = rest.find(|c: char| !scan::is_ident_char(c)).unwrap_or(rest.len());
    let (id, tail) = rest.split_at(id_len);
    if !scan::is_ident(id) {
        return DenseLine::Sigil(Sigil::Unknown(line));
    }
    if tail.is_empty() {
        return DenseLine::Sigil(Sigil::Object { id });
    }
    if tail.starts_with('(') {
        if let Some(close) = scan::matching_close(tail, 0) {
            let after = tail[close + 1..].trim();
            if after.is_empty() || after == "[" {
                return DenseLine::Sigil(Sigil::Table {
                    id,
                    schema: &tail[1..close],
                    bracketed: after == "[",
                });
            }
        }
    }
    DenseLine::Sigil(Sigil::Unknown(line))
}

fn classify_section(line: &str) -> Option<DenseLine<'_>> {
    let (name, body_start) = section_prefix(line)?;
    let last = line.len() - 1;
    match line[body_start..].chars().next()? {
        '[' => {
            let close = scan::matching_close(line, body_start)?;
            (close == last).then(|| DenseLine::InlineObject {
                name,
                content: &line[body_start + 1..close],
            })
        }
        '(' => {
            let schema_close = scan::matching_close(line, body_start)?;
            let rows_open = schema_close + 1;
            if !line[rows_open..].starts_with('[') {
                return None;
            }
            let close = scan::matching_close(line, rows_open)?;
            (close == last).then(|| DenseLine::Table {
                name,
                schema: &line[body_start + 1..schema_close],
                rows: &line[rows_open + 1..close],
            })
        }
        _ => None,
    }
}

/// Splits `name:count` off a section line, returning the name and the offset
/// of the `[` or `(` that follows the count.
fn section_prefix(line: &str) -> Option<(&str, usize)> {
    let colon = line.find(':')?;
    let name = &line[..colon];
    if !scan::is_ident(name) {
        return None;
    }
    let rest = &line[colon + 1..];
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let body_start = colon + 1 + digits;
    let opens = matches!(line.as_bytes().get(body_start), Some(b'[' | b'('));
    (digits > 0 && opens).then_some((name, body_start))
}

/// Parses `name[count]` into its parts.
pub(crate) fn parse_array_key(key: &str) -> Option<(&str, usize)> {
    let inner = key.strip_suffix(']')?;
    let (name, count) = inner.split_once('[')?;
    if !scan::is_ident(name) || count.is_empty() {
        return None;
    }
    count.parse().ok().map(|n| (name, n))
}

/// Returns `true` for a modern table or object line whose brackets stay
/// open, so it continues on the following lines.
pub(crate) fn continues_on_next_line(line: &str) -> bool {
    section_prefix(line).is_some() && scan::open_depth(line) > 0
}

/// Joins an open section line with the following lines until its brackets
/// balance, returning the joined text and the number of lines consumed.
///
/// Returns `None` if the input ends first or a line that starts a section or
/// a sigil comes before the close. Written cells quote `#` and `:`, so such a
/// line is never a row.
fn join_continuation(first: &str, rest: &[&str]) -> Option<(String, usize)> {
    let mut joined = first.to_string();
    for (used, line) in rest.iter().enumerate() {
        let line = line.trim();
        if section_prefix(line).is_some() || matches!(classify_line(line), DenseLine::Sigil(_)) {
            return None;
        }
        joined.push('\n');
        joined.push_str(line);
        if scan::open_depth(&joined) == 0 {
            return Some((joined, used + 1));
        }
    }
    None
}

/// Coerces an unquoted scalar token.
///
/// `true`, `false` and `null` are literals, `-?\d+(\.\d+)?` is a number, and
/// underscore-joined TitleCase names (`James_Smith`) become space-joined
/// (`James Smith`). Everything else is returned as a string.
///
/// The name recovery is deliberately narrow: it needs at least two segments,
/// each at least three characters long, with one uppercase letter followed by
/// lowercase letters only. `HTTP_Request`, `my_var` and `Al_Gore` are kept.
///
/// # Examples
///
/// ```rust
/// use dx_codec::de::parse_scalar_value;
/// use dx_codec::DxValue;
///
/// assert_eq!(parse_scalar_value("42"), DxValue::Number(42.0));
/// assert_eq!(parse_scalar_value("James_Smith"), DxValue::from("James Smith"));
/// assert_eq!(parse_scalar_value("HTTP_Request"), DxValue::from("HTTP_Request"));
/// ```
#[must_use]
pub fn parse_scalar_value(s: &str) -> DxValue {
    match s {
        "true" => return DxValue::Bool(true),
        "false" => return DxValue::Bool(false),
        "null" => return DxValue::Null,
        _ => {}
    }
    if is_numeric_literal(s) {
        if let Ok(n) = s.parse::<f64>() {
            return DxValue::Number(n);
        }
    }
    match recover_name(s) {
        Some(name) => DxValue::String(name),
        None => DxValue::String(s.to_string()),
    }
}

pub(crate) fn recover_name(s: &str) -> Option<String> {
    let parts: Vec<&str> = s.split('_').collect();
    if parts.len() < 2 {
        return None;
    }
    let title_case = |part: &str| {
        let mut chars = part.chars();
        part.chars().count() >= 3
            && chars.next().map_or(false, char::is_uppercase)
            && chars.all(char::is_lowercase)
    };
    parts
        .iter()
        .all(|p| title_case(*p))
        .then(|| parts.join(" "))
}

/// Strips the quotes from a fully quoted token.
///
/// Double-quoted tokens unescape `\"`, `\\`, `\n`, `\r` and `\t`; single-quoted
/// tokens are taken verbatim. Returns `None` if `token` is not exactly one
/// quoted string.
pub(crate) fn unquote(token: &str) -> Option<String> {
    let mut chars = token.char_indices();
    match chars.next()? {
        (_, '\'') => {
            let inner = token.strip_prefix('\'')?.strip_suffix('\'')?;
            (!inner.contains('\'')).then(|| inner.to_string())
        }
        (_, '"') => {
            let mut out = String::with_capacity(token.len());
            while let Some((i, ch)) = chars.next() {
                match ch {
                    '\\' => match chars.next() {
                        Some((_, '"')) => out.push('"'),
                        Some((_, '\\')) => out.push('\\'),
                        Some((_, 'n')) => out.push('\n'),
                        Some((_, 'r')) => out.push('\r'),
                        Some((_, 't')) => out.push('\t'),
                        Some((_, other)) => {
                            out.push('\\');
                            out.push(other);
                        }
                        None => return None,
                    },
                    '"' => return (i == token.len() - 1).then_some(out),
                    _ => out.push(ch),
                }
            }
            None
        }
        _ => None,
    }
}

/// A legacy `#id(a|b)` table collecting `v|v` rows.
struct LegacyTable {
    section: DxSection,
    separator: char,
    bracketed: bool,
    awaiting_open: bool,
}

enum Block {
    Root,
    Table(LegacyTable),
    Object { id: String, fields: DxMap },
}

impl Block {
    fn is_bracketed(&self) -> bool {
        matches!(self, Block::Table(t) if t.bracketed)
    }
}

/// Parses dense text into a [`DxDocument`].
///
/// # Examples
///
/// ```rust
/// use dx_codec::{DenseOptions, DenseParser, DxValue};
///
/// let parser = DenseParser::new(DenseOptions::compact());
/// let doc = parser.parse("ok=+\ntags=*a,b")?;
/// assert_eq!(doc.context["ok"], DxValue::Bool(true));
/// assert_eq!(doc.context["tags"].as_array().map(Vec::len), Some(2));
/// # Ok::<(), dx_codec::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct DenseParser {
    options: DenseOptions,
}

impl DenseParser {
    #[must_use]
    pub fn new(options: DenseOptions) -> Self {
        DenseParser { options }
    }

    /// Parses `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputTooLarge`] when `text` exceeds the configured cap
    /// and [`Error::DuplicateField`] when a schema repeats a column name.
    pub fn parse(&self, text: &str) -> Result<DxDocument> {
        if text.len() > self.options.max_input_size {
            return Err(Error::InputTooLarge {
                size: text.len(),
                max: self.options.max_input_size,
            });
        }

        let mut doc = DxDocument::new();
        let mut block = Block::Root;
        let lines: Vec<&str> = text.lines().collect();
        let mut i = 0;

        while i < lines.len() {
            let line_no = i + 1;
            let raw = lines[i].trim();
            i += 1;

            if raw.is_empty() {
                if !block.is_bracketed() {
                    self.finish_block(&mut doc, &mut block);
                }
                continue;
            }

            match &mut block {
                Block::Table(table) if table.bracketed || !raw.starts_with('#') => {
                    if self.table_line(table, raw) {
                        self.finish_block(&mut doc, &mut block);
                    }
                    continue;
                }
                Block::Object { fields, .. } => match classify_line(raw) {
                    DenseLine::Pair { key, value } | DenseLine::Scalar { key, value } => {
                        fields.insert(key.to_string(), self.decode_value(value));
                        continue;
                    }
                    _ => self.finish_block(&mut doc, &mut block),
                },
                Block::Table(_) => self.finish_block(&mut doc, &mut block),
                Block::Root => {}
            }

            let logical = if continues_on_next_line(raw) {
                match join_continuation(raw, &lines[i..]) {
                    Some((joined, used)) => {
                        i += used;
                        Cow::Owned(joined)
                    }
                    None => {
                        log::trace!("dense line {}: brackets never close, skipped", line_no);
                        continue;
                    }
                }
            } else {
                Cow::Borrowed(raw)
            };

            match classify_line(&logical) {
                DenseLine::InlineObject { name, content } => {
                    let section = self.parse_inline_object(name, content)?;
                    doc.insert_section(section);
                }
                DenseLine::Table { name, schema, rows } => {
                    let section = self.parse_table(name, schema, rows)?;
                    doc.insert_section(section);
                }
                DenseLine::Scalar { key, value } | DenseLine::Pair { key, value } => {
                    doc.context.insert(key.to_string(), self.decode_value(value));
                }
                DenseLine::Array { key, values, .. } => {
                    doc.arrays.insert(key.to_string(), self.decode_list(values));
                }
                DenseLine::Sigil(sigil) => self.apply_sigil(&mut doc, &mut block, sigil, line_no)?,
                DenseLine::Comment => {}
                DenseLine::Unrecognized => {
                    log::trace!("dense line {}: unrecognized, skipped", line_no);
                }
            }
        }
        self.finish_block(&mut doc, &mut block);

        log::debug!(
            "parsed dense document: {} context, {} sections, {} objects, {} arrays, {} refs",
            doc.context.len(),
            doc.sections.len(),
            doc.objects.len(),
            doc.arrays.len(),
            doc.refs.len()
        );
        Ok(doc)
    }

    fn apply_sigil(
        &self,
        doc: &mut DxDocument,
        block: &mut Block,
        sigil: Sigil<'_>,
        line_no: usize,
    ) -> Result<()> {
        match sigil {
            Sigil::Context => {}
            Sigil::Reference {
                key,
                value: Some(value),
            } => {
                let value = unquote(value).unwrap_or_else(|| value.to_string());
                doc.refs.insert(key.to_string(), value);
            }
            Sigil::Reference { value: None, .. } => {
                log::trace!("dense line {}: reference without '|', skipped", line_no);
            }
            Sigil::Table {
                id,
                schema,
                bracketed,
            } => {
                let (columns, separator) = legacy_columns(schema);
                let section =
                    DxSection::new(id, columns.into_iter().map(FieldDef::new).collect())?;
                *block = Block::Table(LegacyTable {
                    section,
                    separator,
                    bracketed,
                    awaiting_open: !bracketed,
                });
            }
            Sigil::Object { id } => {
                *block = Block::Object {
                    id: id.to_string(),
                    fields: DxMap::new(),
                };
            }
            Sigil::Unknown(text) => {
                log::trace!("dense line {}: unknown sigil '{}', skipped", line_no, text);
            }
        }
        Ok(())
    }

    /// Applies one line to an open legacy table. Returns `true` when the line
    /// closed a `[` … `]` row block.
    fn table_line(&self, table: &mut LegacyTable, raw: &str) -> bool {
        if table.awaiting_open {
            table.awaiting_open = false;
            if raw == "[" {
                table.bracketed = true;
                return false;
            }
        }
        let mut row = raw;
        let mut closed = false;
        if table.bracketed && closes_block(raw) {
            row = raw[..raw.len() - 1].trim_end();
            closed = true;
        }
        if !row.is_empty() {
            let cells = legacy_cells(row, table.separator)
                .into_iter()
                .map(|c| self.decode_value(c))
                .collect();
            table.section.push_row_lenient(cells);
        }
        closed
    }

    fn finish_block(&self, doc: &mut DxDocument, block: &mut Block) {
        match std::mem::replace(block, Block::Root) {
            Block::Root => {}
            Block::Table(table) => {
                doc.insert_section(table.section);
            }
            Block::Object { id, fields } => {
                doc.insert_object(id, fields);
            }
        }
    }

    fn parse_table(&self, name: &str, schema: &str, rows: &str) -> Result<DxSection> {
        let separator = scan::detect_separator(schema, ScanMode::BeforeAssign);
        let columns = scan::split_list(schema, separator);
        let mut section = DxSection::new(name, columns.into_iter().map(FieldDef::new).collect())?;

        let rows = rows.trim();
        if !rows.is_empty() {
            let row_separator = scan::detect_row_separator(rows);
            for row in scan::split_top_level(rows, row_separator) {
                let cells = scan::split_tokens(row)
                    .into_iter()
                    .map(|c| self.decode_value(c))
                    .collect();
                section.push_row_lenient(cells);
            }
        }
        Ok(section)
    }

    fn parse_inline_object(&self, name: &str, content: &str) -> Result<DxSection> {
        let separator = scan::detect_separator(content, ScanMode::AfterAssign);
        let mut tokens = scan::split_list(content, separator).into_iter();
        let mut schema = Vec::new();
        let mut row = Vec::new();

        while let Some(token) = tokens.next() {
            let Some((key, value)) = token.split_once('=') else {
                log::trace!("object '{}': token '{}' has no '=', skipped", name, token);
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match parse_array_key(key) {
                Some((field, count)) => {
                    let mut items = Vec::with_capacity(count.min(64));
                    if count > 0 && !value.is_empty() {
                        items.push(self.decode_value(value));
                    }
                    while items.len() < count {
                        match tokens.next() {
                            Some(next) => items.push(self.decode_value(next)),
                            None => break,
                        }
                    }
                    schema.push(FieldDef::array(field));
                    row.push(DxValue::Array(items));
                }
                None => {
                    schema.push(FieldDef::new(key));
                    row.push(self.decode_value(value));
                }
            }
        }

        let mut section = DxSection::new(name, schema)?;
        section.push_row_lenient(row);
        Ok(section)
    }

    /// Decodes one token, honouring quotes, refs, brackets and the symbol set.
    fn decode_value(&self, raw: &str) -> DxValue {
        let raw = raw.trim();
        if raw.is_empty() {
            return DxValue::Null;
        }
        if let Some(s) = unquote(raw) {
            return DxValue::String(s);
        }
        if let Some(key) = raw.strip_prefix('^') {
            if scan::is_ident(key) {
                return DxValue::Ref(key.to_string());
            }
        }
        if raw.starts_with('[') && scan::matching_close(raw, 0) == Some(raw.len() - 1) {
            let inner = &raw[1..raw.len() - 1];
            return match self.decode_object(inner) {
                Some(map) => DxValue::Object(map),
                None => DxValue::Array(self.decode_list(inner)),
            };
        }
        if self.options.symbols == SymbolSet::Compact {
            match raw {
                "+" => return DxValue::Bool(true),
                "-" => return DxValue::Bool(false),
                "~" => return DxValue::Null,
                _ => {}
            }
            if let Some(items) = raw.strip_prefix('*') {
                return DxValue::Array(
                    scan::split_top_level(items, ',')
                        .into_iter()
                        .map(|item| self.decode_value(item))
                        .collect(),
                );
            }
        }
        parse_scalar_value(raw)
    }

    /// Decodes `[k=v k2=v2]` content. Every token must be an `ident=value` pair.
    fn decode_object(&self, content: &str) -> Option<DxMap> {
        let separator = scan::detect_separator(content, ScanMode::AfterAssign);
        let tokens = scan::split_list(content, separator);
        if tokens.is_empty() {
            return None;
        }
        let mut map = DxMap::with_capacity(tokens.len());
        for token in tokens {
            let (key, value) = token.split_once('=')?;
            let key = key.trim();
            if !scan::is_ident(key) {
                return None;
            }
            map.insert(key.to_string(), self.decode_value(value));
        }
        Some(map)
    }

    /// Decodes a comma- or whitespace-separated list.
    fn decode_list(&self, s: &str) -> Vec<DxValue> {
        let items = if scan::find_top_level(s, ',').is_some() {
            scan::split_top_level(s, ',')
        } else {
            scan::split_tokens(s)
        };
        items.into_iter().map(|item| self.decode_value(item)).collect()
    }
}

/// `true` if `raw` ends with a `]` that has no opener on the line.
pub(crate) fn closes_block(raw: &str) -> bool {
    raw.ends_with(']') && scan::open_depth(&format!("[{}", raw)) == 0
}

pub(crate) fn legacy_columns(schema: &str) -> (Vec<&str>, char) {
    let separator = if scan::find_top_level(schema, '|').is_some() {
        '|'
    } else if scan::find_top_level(schema, ',').is_some() {
        ','
    } else {
        ' '
    };
    let columns = match separator {
        ' ' => scan::split_tokens(schema),
        sep => scan::split_fields(schema, sep)
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect(),
    };
    (columns, separator)
}

pub(crate) fn legacy_cells(row: &str, separator: char) -> Vec<&str> {
    if scan::find_top_level(row, '|').is_some() {
        scan::split_fields(row, '|')
    } else {
        match separator {
            ',' => scan::split_fields(row, ','),
            ' ' => scan::split_tokens(row),
            _ => vec![row],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> DxDocument {
        DenseParser::default().parse(text).unwrap()
    }

    #[test]
    fn test_classifier_precedence() {
        assert!(matches!(
            classify_line("u:2(a b)[1 x;2 y]"),
            DenseLine::Table { name: "u", .. }
        ));
        assert!(matches!(
            classify_line("tags[2]=a b"),
            DenseLine::Array { key: "tags", count: 2, .. }
        ));
        assert!(matches!(classify_line("nm|Test"), DenseLine::Pair { .. }));
        assert_eq!(classify_line("# note"), DenseLine::Comment);
        assert_eq!(classify_line("// note"), DenseLine::Comment);
        assert_eq!(classify_line("#c"), DenseLine::Sigil(Sigil::Context));
        assert!(matches!(
            classify_line("#!x"),
            DenseLine::Sigil(Sigil::Unknown("#!x"))
        ));
    }

    #[test]
    fn test_unclosed_object_is_not_a_section() {
        assert_eq!(classify_line("u:1[a=1"), DenseLine::Unrecognized);
        assert_eq!(classify_line("u:1[a=1]x"), DenseLine::Unrecognized);
    }

    #[test]
    fn test_root_pairs() {
        let doc = parse("nm|Test\nv|1.0");
        assert_eq!(doc.context.len(), 2);
        assert_eq!(doc.context["v"], DxValue::Number(1.0));
    }

    #[test]
    fn test_legacy_table() {
        let doc = parse("#d(id|nm)\n1|Alpha\n2|Beta");
        let d = &doc.sections["d"];
        assert_eq!(d.rows.len(), 2);
        assert_eq!(d.rows[1], vec![DxValue::Number(2.0), DxValue::from("Beta")]);
    }

    #[test]
    fn test_legacy_bracketed_table_and_object() {
        let text = "#:A|Acme Corp\n#t(id,nm)\n[\n1|x\n\n2|y\n]\n#o\nhost|local\nport|80\n#c\nmode|fast";
        let doc = parse(text);
        assert_eq!(doc.refs["A"], "Acme Corp");
        assert_eq!(doc.sections["t"].rows.len(), 2);
        assert_eq!(doc.objects["o"].len(), 2);
        assert_eq!(doc.context["mode"], DxValue::from("fast"));
        assert_eq!(doc.section_order, vec!["t", "o"]);
    }

    #[test]
    fn test_legacy_table_ends_at_blank_line() {
        let doc = parse("#d(a|b)\n1|2\n\nk|v");
        assert_eq!(doc.sections["d"].rows.len(), 1);
        assert_eq!(doc.context["k"], DxValue::from("v"));
    }

    #[test]
    fn test_modern_table_and_separators() {
        let doc = parse("t:2(id,nm)[1 a,2 b]");
        let t = &doc.sections["t"];
        assert_eq!(t.column_names(), vec!["id", "nm"]);
        assert_eq!(t.rows.len(), 2);

        let doc = parse("t:2(id nm)[1 a:2 b]");
        assert_eq!(doc.sections["t"].rows.len(), 2);
    }

    #[test]
    fn test_empty_table() {
        let doc = parse("t:0(a b)[]");
        assert_eq!(doc.sections["t"].rows.len(), 0);
        assert_eq!(doc.sections["t"].schema.len(), 2);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let doc = parse("t:2(a b c)[1 2;3]");
        assert_eq!(
            doc.sections["t"].rows[1],
            vec![DxValue::Number(3.0), DxValue::Null, DxValue::Null]
        );
    }

    #[test]
    fn test_inline_object_arrays_consume_declared_count() {
        let doc = parse("u:3[id=1 tags[2]=a b nm=x]");
        let u = &doc.sections["u"];
        assert_eq!(u.column_names(), vec!["id", "tags", "nm"]);
        assert!(u.schema[1].is_array);
        assert_eq!(
            u.rows[0][1],
            DxValue::Array(vec![DxValue::from("a"), DxValue::from("b")])
        );
        assert_eq!(u.rows[0][2], DxValue::from("x"));
    }

    #[test]
    fn test_inline_object_array_runs_out() {
        let doc = parse("u:1[tags[5]=a b]");
        assert_eq!(doc.sections["u"].rows[0][0].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_comma_pair_separator() {
        let doc = parse("u:3[nm=\"Jane Doe\",tags[2]=x,y,ct=3]");
        let row = &doc.sections["u"].rows[0];
        assert_eq!(row[0], DxValue::from("Jane Doe"));
        assert_eq!(row[1].as_array().map(Vec::len), Some(2));
        assert_eq!(row[2], DxValue::Number(3.0));
    }

    #[test]
    fn test_multiline_table() {
        let doc = parse("t:2(id nm)[\n1 Alpha\n2 Beta\n]\nafter=1");
        assert_eq!(doc.sections["t"].rows.len(), 2);
        assert_eq!(doc.context["after"], DxValue::Number(1.0));
    }

    #[test]
    fn test_unclosed_section_keeps_later_lines() {
        let doc = parse("t:1[a=1\nk=v\nother=2");
        assert!(doc.sections.is_empty());
        assert_eq!(doc.context.len(), 2);
        assert_eq!(doc.context["k"], DxValue::from("v"));
        assert_eq!(doc.context["other"], DxValue::Number(2.0));
    }

    #[test]
    fn test_unclosed_table_stops_at_next_section() {
        let doc = parse("t:2(id nm)[\n1 Alpha\nu:1(a)[x]\n#:A|Acme\nk=v");
        assert!(!doc.sections.contains_key("t"));
        assert_eq!(doc.sections["u"].rows.len(), 1);
        assert_eq!(doc.refs["A"], "Acme");
        assert_eq!(doc.context["k"], DxValue::from("v"));
    }

    #[test]
    fn test_value_decoding() {
        let doc = parse("a=\"x \\\"y\\\"\"\nb='say \"hi\"'\nc=^A\nd=[1 [2 3]]\ne=\"42\"\nf=");
        assert_eq!(doc.context["a"], DxValue::from("x \"y\""));
        assert_eq!(doc.context["b"], DxValue::from("say \"hi\""));
        assert_eq!(doc.context["c"], DxValue::Ref("A".into()));
        assert_eq!(
            doc.context["d"],
            DxValue::Array(vec![
                DxValue::Number(1.0),
                DxValue::Array(vec![DxValue::Number(2.0), DxValue::Number(3.0)])
            ])
        );
        assert_eq!(doc.context["e"], DxValue::from("42"));
        assert_eq!(doc.context["f"], DxValue::Null);
    }

    #[test]
    fn test_nested_object_values() {
        let doc = parse("db=[host=local port=5432]\nxs=[a \"b=c\"]");
        let db = doc.context["db"].as_object().unwrap();
        assert_eq!(db.get("port"), Some(&DxValue::Number(5432.0)));
        assert_eq!(doc.context["xs"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_symbol_sets_differ() {
        let verbose = parse("a=+\nb=~\nc=*x,y");
        assert_eq!(verbose.context["a"], DxValue::from("+"));
        assert_eq!(verbose.context["c"], DxValue::from("*x,y"));

        let compact = DenseParser::new(DenseOptions::compact())
            .parse("a=+\nb=~\nc=*x,y\nd=-")
            .unwrap();
        assert_eq!(compact.context["a"], DxValue::Bool(true));
        assert_eq!(compact.context["b"], DxValue::Null);
        assert_eq!(compact.context["c"].as_array().map(Vec::len), Some(2));
        assert_eq!(compact.context["d"], DxValue::Bool(false));
    }

    #[test]
    fn test_root_arrays() {
        let doc = parse("xs[3]=1 2 3\nys[2]=a,b");
        assert_eq!(doc.arrays["xs"].len(), 3);
        assert_eq!(doc.arrays["ys"].len(), 2);
    }

    // Known-narrow heuristic: only TitleCase segments of 3+ letters are joined.
    #[test]
    fn test_name_recovery_is_narrow() {
        assert_eq!(parse_scalar_value("James_Smith"), DxValue::from("James Smith"));
        assert_eq!(
            parse_scalar_value("Mary_Ann_Jones"),
            DxValue::from("Mary Ann Jones")
        );
        for kept in ["my_var", "HTTP_Request", "Al_Gore", "James_", "James", "James_smith"] {
            assert_eq!(parse_scalar_value(kept), DxValue::from(kept), "{kept}");
        }
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"a\"").as_deref(), Some("a"));
        assert_eq!(unquote("\"a\"b\""), None);
        assert_eq!(unquote("'it'"), Some("it".to_string()));
        assert_eq!(unquote("plain"), None);
        assert_eq!(unquote("\""), None);
    }

    #[test]
    fn test_input_cap() {
        let parser = DenseParser::new(DenseOptions::new().with_max_input_size(4));
        assert!(matches!(
            parser.parse("a=12345"),
            Err(Error::InputTooLarge { size: 7, max: 4 })
        ));
    }

    #[test]
    fn test_duplicate_columns() {
        let err = DenseParser::default().parse("t:1(a a)[1 2;3 4]").unwrap_err();
        assert_eq!(err, Error::duplicate_field("a"));
    }
}
