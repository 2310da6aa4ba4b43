//! Dense (LLM) format serialization.
//!
//! This module provides the [`DenseSerializer`] that writes a [`DxDocument`]
//! back to token-dense text, plus the quoting helper [`smart_quote`] shared with
//! the human formatter and the [`minify`] text-to-text path.
//!
//! ## Output
//!
//! Lines are written in a fixed order:
//!
//! 1. references: `#:key|value`
//! 2. context: `key=value`, in context order
//! 3. standalone arrays: `key[n]=a b c`
//! 4. sections and objects, in `section_order`
//!
//! A section with exactly one row becomes an inline object
//! (`id:fieldCount[k=v tags[2]=a b]`); any other section becomes a table
//! (`id:rowCount(a b)[1 x;2 y]`). Objects are written as legacy `#id` blocks of
//! `key|value` lines, which read back into [`DxDocument::objects`].
//!
//! ## Symbol sets
//!
//! [`SymbolSet::Verbose`] writes `true`, `false`, `null` and root arrays as
//! `[a b]`. [`SymbolSet::Compact`] writes `+`, `-`, `~` and root arrays as
//! `*a,b`. Text must be read back with the set it was written with.
//!
//! ```rust
//! use dx_codec::{from_dense, to_dense, to_dense_with_options, DenseOptions};
//!
//! let doc = from_dense("ok=true\nempty=null")?;
//! assert_eq!(to_dense(&doc)?, "ok=true\nempty=null");
//! assert_eq!(to_dense_with_options(&doc, DenseOptions::compact())?, "ok=+\nempty=~");
//! # Ok::<(), dx_codec::Error>(())
//! ```

use crate::de::{recover_name, DenseParser};
use crate::document::{DxDocument, DxSection};
use crate::human_parser::HumanParser;
use crate::options::{DenseOptions, SymbolSet};
use crate::scan::is_ident;
use crate::validate::{detect_format, TextFormat};
use crate::value::{format_number, is_numeric_literal};
use crate::{DxMap, DxValue, Error, Result};
use std::borrow::Cow;

/// Quotes a string if it contains a space, a quote, `#`, `|`, `^` or `:`.
///
/// - apostrophe but no double quote: `"…"`
/// - double quote but no apostrophe: `'…'`
/// - both: `"…"` with every `"` escaped as `\"`
///
/// Anything else is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use dx_codec::smart_quote;
///
/// assert_eq!(smart_quote("plain"), "plain");
/// assert_eq!(smart_quote("it's"), "\"it's\"");
/// assert_eq!(smart_quote("say \"hi\""), "'say \"hi\"'");
/// assert_eq!(smart_quote("it's \"x\""), "\"it's \\\"x\\\"\"");
/// ```
#[must_use]
pub fn smart_quote(s: &str) -> Cow<'_, str> {
    if !s.contains([' ', '"', '\'', '#', '|', '^', ':']) {
        return Cow::Borrowed(s);
    }
    let quoted = match (s.contains('\''), s.contains('"')) {
        (_, false) => format!("\"{}\"", s),
        (false, true) => format!("'{}'", s),
        (true, true) => format!("\"{}\"", s.replace('"', "\\\"")),
    };
    Cow::Owned(quoted)
}

/// Double-quotes a string with full escaping.
fn escape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Strings the dense parser would otherwise decode as something else.
fn is_ambiguous(s: &str) -> bool {
    s.is_empty()
        || matches!(s, "true" | "false" | "null" | "+" | "-" | "~")
        || is_numeric_literal(s)
        || s.starts_with('*')
        || s.contains([',', ';', '=', '[', ']', '(', ')', '{', '}'])
        || s.chars().any(char::is_whitespace)
        || recover_name(s).is_some()
}

/// Quotes a string token so the dense parser reads it back unchanged.
pub(crate) fn quote_dense(s: &str) -> Cow<'_, str> {
    if s.contains(['\\', '\n', '\r', '\t']) {
        return Cow::Owned(escape_quoted(s));
    }
    match smart_quote(s) {
        Cow::Borrowed(_) if is_ambiguous(s) => Cow::Owned(format!("\"{}\"", s)),
        quoted => quoted,
    }
}

fn check_ident(key: &str) -> Result<()> {
    if is_ident(key) {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}

fn check_column(name: &str) -> Result<()> {
    if name.is_empty() || name.contains([',', '=', '(', ')', '[', ']', '\n']) {
        Err(Error::InvalidKey(name.to_string()))
    } else {
        Ok(())
    }
}

/// Where a value is written; decides how arrays render.
#[derive(Clone, Copy, PartialEq)]
enum Slot {
    /// Root `key=value` line.
    Context,
    /// Table cell, array item or object field.
    Nested,
}

/// Writes a [`DxDocument`] as dense text.
#[derive(Clone, Debug, Default)]
pub struct DenseSerializer {
    options: DenseOptions,
}

impl DenseSerializer {
    #[must_use]
    pub fn new(options: DenseOptions) -> Self {
        DenseSerializer { options }
    }

    /// Serializes `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if a row does not match its schema,
    /// [`Error::InvalidKey`] if a key or id is not an identifier and
    /// [`Error::NonFiniteNumber`] for NaN or infinite numbers.
    pub fn serialize(&self, doc: &DxDocument) -> Result<String> {
        doc.check_finite()?;
        let mut lines: Vec<String> = Vec::new();

        for (key, value) in &doc.refs {
            check_ident(key)?;
            lines.push(format!("#:{}|{}", key, self.ref_value(value)));
        }
        for (key, value) in &doc.context {
            check_ident(key)?;
            let mut line = format!("{}=", key);
            self.write_value(&mut line, value, Slot::Context);
            lines.push(line);
        }
        for (key, items) in &doc.arrays {
            check_ident(key)?;
            let mut line = format!("{}[{}]=", key, items.len());
            self.write_items(&mut line, items);
            lines.push(line);
        }
        for id in doc.ordered_ids() {
            if let Some(section) = doc.sections.get(id) {
                lines.push(self.section_line(section)?);
            } else if let Some(object) = doc.objects.get(id) {
                self.object_lines(&mut lines, id, object)?;
            }
        }

        Ok(lines.join("\n"))
    }

    fn ref_value(&self, value: &str) -> String {
        let trimmed_differs = value.trim() != value;
        if value.is_empty()
            || trimmed_differs
            || value.starts_with(['"', '\''])
            || value.contains(['\\', '\n', '\r', '\t'])
        {
            escape_quoted(value)
        } else {
            value.to_string()
        }
    }

    fn section_line(&self, section: &DxSection) -> Result<String> {
        check_ident(&section.id)?;
        section.check_rows()?;
        let sep = self.options.separator.as_str();

        let inline = section.rows.len() == 1 && section.schema.iter().all(|f| is_ident(&f.name));
        if inline {
            let mut line = format!("{}:{}[", section.id, section.schema.len());
            for (i, (field, value)) in section.schema.iter().zip(&section.rows[0]).enumerate() {
                if i > 0 {
                    line.push_str(sep);
                }
                match value {
                    DxValue::Array(items) => {
                        line.push_str(&format!("{}[{}]=", field.name, items.len()));
                        self.write_items(&mut line, items);
                    }
                    other => {
                        line.push_str(&field.name);
                        line.push('=');
                        self.write_value(&mut line, other, Slot::Nested);
                    }
                }
            }
            line.push(']');
            return Ok(line);
        }

        for field in &section.schema {
            check_column(&field.name)?;
        }
        let spaced = section
            .schema
            .iter()
            .any(|f| f.name.contains(char::is_whitespace));
        let schema_sep = if spaced { "," } else { sep };
        let schema = section.column_names().join(schema_sep);

        let mut line = format!("{}:{}({})[", section.id, section.rows.len(), schema);
        for (r, row) in section.rows.iter().enumerate() {
            if r > 0 {
                line.push(';');
            }
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    line.push(' ');
                }
                self.write_value(&mut line, cell, Slot::Nested);
            }
        }
        line.push(']');
        Ok(line)
    }

    fn object_lines(&self, lines: &mut Vec<String>, id: &str, object: &DxMap) -> Result<()> {
        check_ident(id)?;
        lines.push(format!("#{}", id));
        for (key, value) in object {
            check_ident(key)?;
            let mut line = format!("{}|", key);
            self.write_value(&mut line, value, Slot::Nested);
            lines.push(line);
        }
        Ok(())
    }

    /// Writes array items joined by the pair separator.
    fn write_items(&self, out: &mut String, items: &[DxValue]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(self.options.separator.as_str());
            }
            self.write_value(out, item, Slot::Nested);
        }
    }

    fn write_value(&self, out: &mut String, value: &DxValue, slot: Slot) {
        let compact = self.options.symbols == SymbolSet::Compact;
        match value {
            DxValue::Null => out.push_str(if compact { "~" } else { "null" }),
            DxValue::Bool(b) => out.push_str(match (compact, *b) {
                (true, true) => "+",
                (true, false) => "-",
                (false, true) => "true",
                (false, false) => "false",
            }),
            DxValue::Number(n) => out.push_str(&format_number(*n)),
            DxValue::String(s) => out.push_str(&quote_dense(s)),
            DxValue::Ref(key) => {
                out.push('^');
                out.push_str(key);
            }
            DxValue::Array(items) if compact && slot == Slot::Context => {
                out.push('*');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_value(out, item, Slot::Nested);
                }
            }
            DxValue::Array(items) => {
                out.push('[');
                self.write_items(out, items);
                out.push(']');
            }
            DxValue::Object(map) => {
                out.push('[');
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(self.options.separator.as_str());
                    }
                    out.push_str(key);
                    out.push('=');
                    self.write_value(out, item, Slot::Nested);
                }
                out.push(']');
            }
        }
    }
}

/// Re-serializes dense or human text as minified dense text.
///
/// The input format is sniffed the same way [`validate`](crate::validate()) does.
/// Pairs and array items are comma-separated, so scalar and object documents
/// carry no whitespace outside string literals.
///
/// # Examples
///
/// ```rust
/// use dx_codec::minify;
///
/// assert_eq!(minify("name: John")?, "name=John");
/// assert_eq!(minify("u:2[a=1 b=2]")?, "u:2[a=1,b=2]");
/// # Ok::<(), dx_codec::Error>(())
/// ```
///
/// # Errors
///
/// Propagates parse errors and serializer errors.
pub fn minify(text: &str) -> Result<String> {
    let doc = match detect_format(text) {
        TextFormat::Dense => DenseParser::default().parse(text)?,
        TextFormat::Human => HumanParser::default().parse(text)?,
    };
    DenseSerializer::new(DenseOptions::minified()).serialize(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FieldDef;

    fn dense(doc: &DxDocument) -> String {
        DenseSerializer::default().serialize(doc).unwrap()
    }

    fn users(rows: usize) -> DxSection {
        let mut s = DxSection::with_columns("users", &["id", "nm"]).unwrap();
        for i in 0..rows {
            s.push_row(vec![DxValue::from(i as i32 + 1), DxValue::from("Al Bo")])
                .unwrap();
        }
        s
    }

    #[test]
    fn test_smart_quote_rules() {
        assert_eq!(smart_quote("a#b"), "\"a#b\"");
        assert_eq!(smart_quote("a|b"), "\"a|b\"");
        assert_eq!(smart_quote("^a"), "\"^a\"");
        assert_eq!(smart_quote("a:b"), "\"a:b\"");
        assert_eq!(smart_quote("a b"), "\"a b\"");
        assert_eq!(smart_quote("a,b"), "a,b");
    }

    #[test]
    fn test_table_and_inline_forms() {
        let mut doc = DxDocument::new();
        doc.insert_section(users(2));
        assert_eq!(dense(&doc), "users:2(id nm)[1 \"Al Bo\";2 \"Al Bo\"]");

        let mut doc = DxDocument::new();
        doc.insert_section(users(1));
        assert_eq!(dense(&doc), "users:2[id=1 nm=\"Al Bo\"]");

        let mut doc = DxDocument::new();
        doc.insert_section(users(0));
        assert_eq!(dense(&doc), "users:0(id nm)[]");
    }

    #[test]
    fn test_line_order() {
        let mut doc = DxDocument::new();
        doc.insert_section(users(1));
        doc.arrays.insert("xs".into(), vec![DxValue::from(1), DxValue::from(2)]);
        doc.context.insert("v".into(), DxValue::from(1.5));
        doc.refs.insert("A".into(), "Acme Corp".into());
        assert_eq!(
            dense(&doc),
            "#:A|Acme Corp\nv=1.5\nxs[2]=1 2\nusers:2[id=1 nm=\"Al Bo\"]"
        );
    }

    #[test]
    fn test_array_fields() {
        let mut s = DxSection::new("p", vec![FieldDef::array("tags")]).unwrap();
        s.push_row(vec![DxValue::Array(vec!["a".into(), "b".into()])])
            .unwrap();
        let mut doc = DxDocument::new();
        doc.insert_section(s);
        assert_eq!(dense(&doc), "p:1[tags[2]=a b]");
        let comma = DenseSerializer::new(DenseOptions::minified())
            .serialize(&doc)
            .unwrap();
        assert_eq!(comma, "p:1[tags[2]=a,b]");
    }

    #[test]
    fn test_compact_symbols() {
        let mut doc = DxDocument::new();
        doc.context.insert("a".into(), DxValue::Bool(true));
        doc.context.insert("b".into(), DxValue::Bool(false));
        doc.context.insert("c".into(), DxValue::Null);
        doc.context
            .insert("d".into(), DxValue::Array(vec!["x".into(), "y".into()]));
        let out = DenseSerializer::new(DenseOptions::compact())
            .serialize(&doc)
            .unwrap();
        assert_eq!(out, "a=+\nb=-\nc=~\nd=*x,y");
        assert_eq!(dense(&doc), "a=true\nb=false\nc=null\nd=[x y]");
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        let mut doc = DxDocument::new();
        for (k, v) in [
            ("a", "true"),
            ("b", "42"),
            ("c", ""),
            ("d", "x;y"),
            ("e", "James_Smith"),
            ("f", "~"),
            ("g", "line\nbreak"),
        ] {
            doc.context.insert(k.into(), DxValue::from(v));
        }
        let out = dense(&doc);
        let back = DenseParser::default().parse(&out).unwrap();
        assert_eq!(back.context, doc.context);
    }

    #[test]
    fn test_refs_and_objects() {
        let mut doc = DxDocument::new();
        let mut obj = DxMap::new();
        obj.insert("host".into(), DxValue::from("localhost"));
        obj.insert("port".into(), DxValue::from(5432));
        doc.insert_object("db", obj);
        doc.insert_section(users(1));
        doc.context.insert("owner".into(), DxValue::Ref("A".into()));
        let out = dense(&doc);
        assert_eq!(
            out,
            "owner=^A\n#db\nhost|localhost\nport|5432\nusers:2[id=1 nm=\"Al Bo\"]"
        );
        let back = DenseParser::default().parse(&out).unwrap();
        assert_eq!(back.objects["db"].len(), 2);
        assert_eq!(back.section_order, vec!["db", "users"]);
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let mut s = users(2);
        s.rows[1].pop();
        let mut doc = DxDocument::new();
        doc.insert_section(s);
        assert!(matches!(
            DenseSerializer::default().serialize(&doc),
            Err(Error::SchemaMismatch { row: 1, expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let mut doc = DxDocument::new();
        doc.context.insert("two words".into(), DxValue::Null);
        assert_eq!(
            DenseSerializer::default().serialize(&doc),
            Err(Error::InvalidKey("two words".into()))
        );
    }

    #[test]
    fn test_spaced_columns_use_comma_schema() {
        let mut s = DxSection::with_columns("t", &["first name", "id"]).unwrap();
        s.push_row(vec!["A".into(), 1.into()]).unwrap();
        s.push_row(vec!["B".into(), 2.into()]).unwrap();
        let mut doc = DxDocument::new();
        doc.insert_section(s);
        let out = dense(&doc);
        assert_eq!(out, "t:2(first name,id)[A 1;B 2]");
        let back = DenseParser::default().parse(&out).unwrap();
        assert_eq!(back.sections["t"].column_names(), vec!["first name", "id"]);
    }

    #[test]
    fn test_assign_in_column_rejected() {
        for rows in [1, 2] {
            let mut s = DxSection::with_columns("t", &["a=b", "c"]).unwrap();
            for _ in 0..rows {
                s.push_row(vec![1.into(), 2.into()]).unwrap();
            }
            let mut doc = DxDocument::new();
            doc.insert_section(s);
            let err = DenseSerializer::default().serialize(&doc).unwrap_err();
            assert_eq!(err, Error::InvalidKey("a=b".to_string()));
        }
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut doc = DxDocument::new();
            doc.context.insert("x".into(), DxValue::Array(vec![1.into(), DxValue::Number(n)]));
            let err = DenseSerializer::default().serialize(&doc).unwrap_err();
            assert!(matches!(err, Error::NonFiniteNumber(_)));
        }

        let mut doc = DxDocument::new();
        let mut s = users(2);
        s.rows[1][0] = DxValue::Number(f64::NAN);
        doc.insert_section(s);
        assert!(matches!(
            DenseSerializer::default().serialize(&doc),
            Err(Error::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn test_empty_object_reads_back_as_empty_array() {
        let mut doc = DxDocument::new();
        doc.context.insert("o".into(), DxValue::Object(DxMap::new()));
        let out = dense(&doc);
        assert_eq!(out, "o=[]");
        let back = DenseParser::default().parse(&out).unwrap();
        assert_eq!(back.context["o"], DxValue::Array(Vec::new()));
    }

    #[test]
    fn test_minify_has_no_whitespace() {
        let out = minify("name: John").unwrap();
        assert!(!out.chars().any(char::is_whitespace));
    }
}
