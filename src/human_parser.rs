//! Human (TOML/INI-like) format parsing.
//!
//! ```text
//! # comment
//! app = "My App"
//! tags:
//!   - web
//!   - api
//!
//! [config]
//! version = 1.0
//!
//! [references]
//! A = "Acme Corp"
//!
//! [server]
//! host = localhost
//! port = 8080
//!
//! [users]
//!   id | name
//!   1  | Alice
//!   2  | Bob
//! ```
//!
//! Root key/values and `[config]` fill the context, `[references]` (or
//! `[refs]`) fills the reference table, and every other header opens a
//! section. The quoted form `["refs"]` always opens a section, even for the
//! reserved ids. A section holds either key/value lines (one row) or an indented
//! `a | b` table whose first line is the column header.
//!
//! The parser never fails on malformed lines; it skips them. Use
//! [`validate`](crate::validate()) when strict feedback is needed.

use crate::document::{DxDocument, DxSection, FieldDef};
use crate::scan;
use crate::value::is_numeric_literal;
use crate::{DxValue, Result};
use indexmap::IndexMap;

/// Parses one human value.
///
/// Empty and `none` are null, `true`/`false` are booleans, a single quoted
/// string (`"…"` or `'…'`) has its quotes stripped without escape processing,
/// and `-?\d+(\.\d+)?` is a number. Unquoted `^key` is a reference, `[a, b]`
/// and `a, b` are arrays. Anything else is a string.
///
/// # Examples
///
/// ```rust
/// use dx_codec::human_parser::parse_value;
/// use dx_codec::DxValue;
///
/// assert_eq!(parse_value("none"), DxValue::Null);
/// assert_eq!(parse_value("\"42\""), DxValue::from("42"));
/// assert_eq!(parse_value("42"), DxValue::Number(42.0));
/// assert_eq!(parse_value("a, b").as_array().map(Vec::len), Some(2));
/// ```
#[must_use]
pub fn parse_value(raw: &str) -> DxValue {
    let s = raw.trim();
    match s {
        "" | "none" => return DxValue::Null,
        "true" => return DxValue::Bool(true),
        "false" => return DxValue::Bool(false),
        _ => {}
    }
    if s.starts_with('[') && scan::matching_close(s, 0) == Some(s.len() - 1) {
        return DxValue::Array(parse_items(&s[1..s.len() - 1]));
    }
    if is_list(s) {
        return DxValue::Array(parse_items(s));
    }
    if let Some(inner) = strip_quotes(s) {
        return DxValue::String(inner.to_string());
    }
    if let Some(key) = s.strip_prefix('^') {
        if scan::is_ident(key) {
            return DxValue::Ref(key.to_string());
        }
    }
    if is_numeric_literal(s) {
        if let Ok(n) = s.parse::<f64>() {
            return DxValue::Number(n);
        }
    }
    DxValue::String(s.to_string())
}

/// Parses one table cell: `-` is null, everything else as [`parse_value`].
#[must_use]
pub fn parse_cell(raw: &str) -> DxValue {
    match raw.trim() {
        "-" => DxValue::Null,
        s => parse_value(s),
    }
}

/// `a, b` at the top level, outside quotes and brackets.
fn is_list(s: &str) -> bool {
    scan::find_top_level(s, ',').map_or(false, |i| s[i + 1..].starts_with(' '))
}

fn parse_items(s: &str) -> Vec<DxValue> {
    scan::split_top_level(s, ',')
        .into_iter()
        .map(parse_value)
        .collect()
}

/// Returns the inside of a single quoted string, without unescaping.
pub(crate) fn strip_quotes(s: &str) -> Option<&str> {
    let quote = s.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = s.strip_prefix(quote)?.strip_suffix(quote)?;
    (!is_list(s)).then_some(inner)
}

fn is_total_line(line: &str) -> bool {
    line.strip_prefix("Total:")
        .and_then(|rest| rest.trim().strip_suffix("items"))
        .map_or(false, |n| {
            let n = n.trim();
            !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())
        })
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

/// `[name]` with an identifier inside, or `["name"]` for a data section whose
/// id is one of the reserved headers.
fn header_target(line: &str) -> Option<Target> {
    let name = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    if let Some(quoted) = name.strip_prefix('"').and_then(|n| n.strip_suffix('"')) {
        return scan::is_ident(quoted).then(|| Target::Data(quoted.to_string()));
    }
    if !scan::is_ident(name) {
        return None;
    }
    Some(match name {
        "config" => Target::Config,
        "references" | "refs" => Target::Refs,
        _ => Target::Data(name.to_string()),
    })
}

/// Header ids the parser routes to the context or the reference table.
pub(crate) fn is_reserved_header(id: &str) -> bool {
    matches!(id, "config" | "references" | "refs")
}

/// `key = value` or `key: value`.
fn key_value(line: &str) -> Option<(&str, &str)> {
    if let Some((key, value)) = line.split_once('=') {
        let key = key.trim();
        if scan::is_ident(key) {
            return Some((key, value.trim()));
        }
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    let value = value.trim();
    (scan::is_ident(key) && !value.is_empty()).then_some((key, value))
}

/// `key:` opening an array block.
fn array_open(line: &str) -> Option<&str> {
    let key = line.strip_suffix(':')?.trim();
    scan::is_ident(key).then_some(key)
}

#[derive(Clone, Debug, PartialEq)]
enum Target {
    Root,
    Config,
    Refs,
    Data(String),
}

#[derive(Default)]
struct PendingSection {
    fields: IndexMap<String, (DxValue, bool)>,
    header: Option<Vec<String>>,
    rows: Vec<Vec<DxValue>>,
}

impl PendingSection {
    fn table_line(&mut self, id: &str, line: &str) {
        let cells = scan::split_fields(line, '|');
        match self.header {
            None => self.header = Some(unique_columns(id, cells)),
            Some(_) => self.rows.push(cells.into_iter().map(parse_cell).collect()),
        }
    }

    fn into_section(self, id: &str) -> Result<DxSection> {
        if let Some(header) = self.header {
            if !self.fields.is_empty() {
                log::debug!(
                    "section '{}': table wins over {} key/value fields",
                    id,
                    self.fields.len()
                );
            }
            let mut section = DxSection::new(id, header.into_iter().map(FieldDef::new).collect())?;
            for row in self.rows {
                section.push_row_lenient(row);
            }
            return Ok(section);
        }

        let mut schema = Vec::with_capacity(self.fields.len());
        let mut row = Vec::with_capacity(self.fields.len());
        for (name, (value, is_array)) in self.fields {
            schema.push(if is_array {
                FieldDef::array(name)
            } else {
                FieldDef::new(name)
            });
            row.push(value);
        }
        let mut section = DxSection::new(id, schema)?;
        if !row.is_empty() {
            section.push_row(row)?;
        }
        Ok(section)
    }
}

/// Header names, with empty names filled in and repeats renamed `name_2`, `name_3`, ….
fn unique_columns(id: &str, cells: Vec<&str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(cells.len());
    for (i, cell) in cells.into_iter().enumerate() {
        let base = match strip_quotes(cell) {
            Some(inner) => inner.to_string(),
            None if cell.is_empty() => format!("column_{}", i + 1),
            None => cell.to_string(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while names.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        if name != base {
            log::debug!("section '{}': duplicate column '{}' renamed '{}'", id, base, name);
        }
        names.push(name);
    }
    names
}

/// Parses human text into a [`DxDocument`].
#[derive(Clone, Debug, Default)]
pub struct HumanParser;

impl HumanParser {
    #[must_use]
    pub fn new() -> Self {
        HumanParser
    }

    /// Parses `text`. Malformed lines are skipped, so this only fails if the
    /// document model itself rejects a section.
    pub fn parse(&self, text: &str) -> Result<DxDocument> {
        let mut doc = DxDocument::new();
        let mut target = Target::Root;
        let mut pending = PendingSection::default();
        let mut block: Option<(String, Vec<DxValue>)> = None;

        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if block.is_some() {
                if let Some(item) = trimmed.strip_prefix('-') {
                    if item.is_empty() || item.starts_with(char::is_whitespace) {
                        if let Some((_, items)) = block.as_mut() {
                            items.push(parse_value(item));
                        }
                        continue;
                    }
                }
                if let Some((key, items)) = block.take() {
                    flush_array(&mut doc, &target, &mut pending, key, items);
                }
            }

            if is_comment(trimmed) || is_total_line(trimmed) {
                continue;
            }

            let indented = line.starts_with(char::is_whitespace);
            if let Some(next) = header_target(trimmed).filter(|_| !indented) {
                finish_section(&mut doc, &target, &mut pending)?;
                target = next;
                continue;
            }

            if let Some(key) = array_open(trimmed) {
                block = Some((key.to_string(), Vec::new()));
                continue;
            }

            if let Some((key, raw)) = key_value(trimmed) {
                match &target {
                    Target::Root | Target::Config => {
                        doc.context.insert(key.to_string(), parse_value(raw));
                    }
                    Target::Refs => {
                        let value = strip_quotes(raw).unwrap_or(raw);
                        doc.refs.insert(key.to_string(), value.to_string());
                    }
                    Target::Data(_) if pending.header.is_none() => {
                        pending
                            .fields
                            .insert(key.to_string(), (parse_value(raw), false));
                    }
                    Target::Data(id) => pending.table_line(id, trimmed),
                }
                continue;
            }

            match &target {
                Target::Data(id) => pending.table_line(id, trimmed),
                _ => log::trace!("human line {}: unrecognized, skipped", index + 1),
            }
        }

        if let Some((key, items)) = block.take() {
            flush_array(&mut doc, &target, &mut pending, key, items);
        }
        finish_section(&mut doc, &target, &mut pending)?;

        log::debug!(
            "parsed human document: {} context, {} sections, {} arrays, {} refs",
            doc.context.len(),
            doc.sections.len(),
            doc.arrays.len(),
            doc.refs.len()
        );
        Ok(doc)
    }
}

fn flush_array(
    doc: &mut DxDocument,
    target: &Target,
    pending: &mut PendingSection,
    key: String,
    items: Vec<DxValue>,
) {
    match target {
        Target::Root => {
            doc.arrays.insert(key, items);
        }
        Target::Config => {
            doc.context.insert(key, DxValue::Array(items));
        }
        Target::Refs => log::trace!("array '{}' inside references ignored", key),
        Target::Data(_) => {
            pending.fields.insert(key, (DxValue::Array(items), true));
        }
    }
}

fn finish_section(
    doc: &mut DxDocument,
    target: &Target,
    pending: &mut PendingSection,
) -> Result<()> {
    let taken = std::mem::take(pending);
    if let Target::Data(id) = target {
        let section = taken.into_section(id)?;
        doc.insert_section(section);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> DxDocument {
        HumanParser::new().parse(text).unwrap()
    }

    #[test]
    fn test_parse_value_rules() {
        assert_eq!(parse_value(""), DxValue::Null);
        assert_eq!(parse_value("true"), DxValue::Bool(true));
        assert_eq!(parse_value("True"), DxValue::from("True"));
        assert_eq!(parse_value("'a b'"), DxValue::from("a b"));
        assert_eq!(parse_value(r#""a \"b\"""#), DxValue::from(r#"a \"b\""#));
        assert_eq!(parse_value("-1.5"), DxValue::Number(-1.5));
        assert_eq!(parse_value("1e5"), DxValue::from("1e5"));
        assert_eq!(parse_value("^A"), DxValue::Ref("A".into()));
        assert_eq!(parse_value("a,b"), DxValue::from("a,b"));
    }

    #[test]
    fn test_parse_nested_arrays() {
        let v = parse_value("[[a, b], c]");
        assert_eq!(
            v,
            DxValue::Array(vec![
                DxValue::Array(vec!["a".into(), "b".into()]),
                "c".into()
            ])
        );
        assert_eq!(parse_value("[]"), DxValue::Array(vec![]));
        assert_eq!(parse_value("\"x, y\", z").as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_sections_and_config() {
        let doc = parse(
            "# header\n[config]\nname = Test\nversion: 2\n\n[server]\nhost = localhost\nport = 8080\n",
        );
        assert_eq!(doc.context.len(), 2);
        let server = &doc.sections["server"];
        assert_eq!(server.column_names(), vec!["host", "port"]);
        assert_eq!(server.rows, vec![vec!["localhost".into(), 8080.into()]]);
    }

    #[test]
    fn test_references() {
        let doc = parse("[references]\nA = \"Acme Corp\"\nB = 1.0");
        assert_eq!(doc.refs["A"], "Acme Corp");
        assert_eq!(doc.refs["B"], "1.0");
    }

    #[test]
    fn test_array_blocks() {
        let doc = parse("tags:\n  - a\n  - 2\n[config]\nlist:\n- x\n[p]\nnm = n\nitems:\n  - 1\n");
        assert_eq!(doc.arrays["tags"], vec![DxValue::from("a"), DxValue::from(2)]);
        assert_eq!(doc.context["list"], DxValue::Array(vec!["x".into()]));
        let p = &doc.sections["p"];
        assert!(p.schema[1].is_array);
        assert_eq!(p.rows[0][1], DxValue::Array(vec![DxValue::from(1)]));
    }

    #[test]
    fn test_dash_outside_block_is_not_an_item() {
        let doc = parse("[t]\n  a\n  -\n");
        assert_eq!(doc.sections["t"].rows, vec![vec![DxValue::Null]]);
    }

    #[test]
    fn test_table_section() {
        let doc = parse("[users]\n  id | name\n  1 | Alice\n  2 | -\nTotal: 2 items\n");
        let users = &doc.sections["users"];
        assert_eq!(users.column_names(), vec!["id", "name"]);
        assert_eq!(users.rows.len(), 2);
        assert_eq!(users.rows[1][1], DxValue::Null);
    }

    #[test]
    fn test_duplicate_headers_renamed() {
        let doc = parse("[t]\n  a | a | a\n  1 | 2 | 3\n");
        assert_eq!(doc.sections["t"].column_names(), vec!["a", "a_2", "a_3"]);
    }

    #[test]
    fn test_empty_section() {
        let doc = parse("[empty]\n[next]\nk = v");
        assert!(doc.sections["empty"].schema.is_empty());
        assert!(doc.sections["empty"].rows.is_empty());
        assert_eq!(doc.section_order, vec!["empty", "next"]);
    }

    #[test]
    fn test_indented_bracket_line_is_a_row() {
        let doc = parse("[t]\n  v\n  [a]\n");
        assert_eq!(doc.sections["t"].rows[0][0], DxValue::Array(vec!["a".into()]));
    }

    #[test]
    fn test_comments_skipped() {
        let doc = parse("// a\n# b\nk = v");
        assert_eq!(doc.context.len(), 1);
    }
}
