//! Structural validation of dense and human text.
//!
//! The parsers in this crate are lenient and skip what they cannot read. The
//! validator is the strict counterpart: it works on raw text without building a
//! document and reports the first problem with a 1-indexed line and column and a
//! hint on how to fix it.
//!
//! ```rust
//! use dx_codec::validate::{validate, ValidationErrorKind};
//!
//! let result = validate("#t(id|nm)\n1|Alpha|extra");
//! let error = result.error.unwrap();
//! assert_eq!(error.kind(), ValidationErrorKind::SchemaRowMismatch);
//! assert_eq!(error.line(), 2);
//! assert!(error.message().contains('3') && error.message().contains('2'));
//! ```

use crate::de::{self, DenseLine, Sigil};
use crate::scan::{self, ScanMode};
use std::fmt;

/// The text encodings [`detect_format`] can tell apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    Dense,
    Human,
}

/// Guesses the encoding of `text` from its first significant line.
///
/// A line starting with `#` and a non-space character, `key=`, `key|`,
/// `key[n]=` or `key:N(` / `key:N[` means dense; anything else means human.
///
/// ```rust
/// use dx_codec::validate::{detect_format, TextFormat};
///
/// assert_eq!(detect_format("name=John"), TextFormat::Dense);
/// assert_eq!(detect_format("name: John"), TextFormat::Human);
/// assert_eq!(detect_format("# notes\n[server]\nport = 1"), TextFormat::Human);
/// ```
#[must_use]
pub fn detect_format(text: &str) -> TextFormat {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_dense_comment(line));
    match first {
        Some(line) if looks_dense(line) => TextFormat::Dense,
        _ => TextFormat::Human,
    }
}

fn is_dense_comment(line: &str) -> bool {
    if line.starts_with("//") {
        return true;
    }
    line.strip_prefix('#')
        .map_or(false, |rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

fn is_human_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

fn looks_dense(line: &str) -> bool {
    if line.starts_with('#') {
        return true;
    }
    let key_len = line
        .find(|c: char| !scan::is_ident_char(c))
        .unwrap_or(line.len());
    let (key, rest) = line.split_at(key_len);
    if !scan::is_ident(key) {
        return false;
    }
    match rest.chars().next() {
        Some('=' | '|') => true,
        Some('[') => rest.contains("]="),
        Some(':') => {
            let digits = rest[1..].bytes().take_while(u8::is_ascii_digit).count();
            digits > 0 && matches!(rest.as_bytes().get(1 + digits), Some(b'(' | b'['))
        }
        _ => false,
    }
}

/// What went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    UnclosedBracket,
    UnclosedString,
    MismatchedBracket,
    UnexpectedClosingBracket,
    UnknownSigil,
    SchemaRowMismatch,
    EmptySchema,
    InvalidReferenceDefinition,
    MissingSeparator,
}

impl ValidationErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationErrorKind::UnclosedBracket => "unclosed bracket",
            ValidationErrorKind::UnclosedString => "unclosed string",
            ValidationErrorKind::MismatchedBracket => "mismatched bracket",
            ValidationErrorKind::UnexpectedClosingBracket => "unexpected closing bracket",
            ValidationErrorKind::UnknownSigil => "unknown sigil",
            ValidationErrorKind::SchemaRowMismatch => "schema/row mismatch",
            ValidationErrorKind::EmptySchema => "empty schema",
            ValidationErrorKind::InvalidReferenceDefinition => "invalid reference definition",
            ValidationErrorKind::MissingSeparator => "missing separator",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A located diagnostic. `line` and `column` are 1-indexed and `hint` is
/// never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub hint: String,
}

impl ValidationError {
    fn new(
        kind: ValidationErrorKind,
        line: usize,
        column: usize,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        ValidationError {
            kind,
            message: message.into(),
            line,
            column,
            hint: hint.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    #[inline]
    #[must_use]
    pub fn hint(&self) -> &str {
        &self.hint
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {} (hint: {})",
            self.line, self.column, self.kind, self.message, self.hint
        )
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of [`validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    pub success: bool,
    pub error: Option<ValidationError>,
}

impl ValidationResult {
    #[must_use]
    pub fn ok() -> Self {
        ValidationResult {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: ValidationError) -> Self {
        ValidationResult {
            success: false,
            error: Some(error),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.success
    }

    /// Line of the error, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.error.as_ref().map(ValidationError::line)
    }

    /// Column of the error, if any.
    #[must_use]
    pub fn column(&self) -> Option<usize> {
        self.error.as_ref().map(ValidationError::column)
    }

    /// Hint of the error, if any.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.error.as_ref().map(ValidationError::hint)
    }
}

impl From<Option<ValidationError>> for ValidationResult {
    fn from(error: Option<ValidationError>) -> Self {
        error.map_or_else(ValidationResult::ok, ValidationResult::failed)
    }
}

/// Validates `text`, dispatching on [`detect_format`].
#[must_use]
pub fn validate(text: &str) -> ValidationResult {
    match detect_format(text) {
        TextFormat::Dense => validate_dense(text),
        TextFormat::Human => validate_human(text),
    }
}

/// Validates human text: brackets and strings only.
#[must_use]
pub fn validate_human(text: &str) -> ValidationResult {
    scan_brackets(text, is_human_comment).into()
}

/// Validates dense text: brackets and strings, then table structure.
#[must_use]
pub fn validate_dense(text: &str) -> ValidationResult {
    scan_brackets(text, is_dense_comment)
        .or_else(|| DenseChecker::default().run(text))
        .into()
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '{' => '}',
        _ => ']',
    }
}

fn opener_for(close: char) -> char {
    match close {
        ')' => '(',
        '}' => '{',
        _ => '[',
    }
}

/// Single pass over `text` with a bracket stack and an in-string flag.
/// Strings never span lines.
fn scan_brackets(text: &str, is_comment: fn(&str) -> bool) -> Option<ValidationError> {
    let mut stack: Vec<(char, usize, usize)> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if is_comment(line.trim()) {
            continue;
        }
        let mut string: Option<(char, usize)> = None;
        let mut escaped = false;
        let mut prev: Option<char> = None;

        for (col, ch) in line.chars().enumerate().map(|(i, c)| (i + 1, c)) {
            if let Some((quote, _)) = string {
                if escaped {
                    escaped = false;
                } else if ch == '\\' && quote == '"' {
                    escaped = true;
                } else if ch == quote {
                    string = None;
                }
                prev = Some(ch);
                continue;
            }
            match ch {
                '"' | '\'' if opens_string(prev) => string = Some((ch, col)),
                '[' | '(' | '{' => stack.push((ch, line_no, col)),
                ']' | ')' | '}' => match stack.pop() {
                    None => {
                        return Some(ValidationError::new(
                            ValidationErrorKind::UnexpectedClosingBracket,
                            line_no,
                            col,
                            format!("Unexpected '{}' with no open bracket", ch),
                            format!("Remove this '{}' or add a matching '{}' before it", ch, opener_for(ch)),
                        ));
                    }
                    Some((open, open_line, open_col)) if closer_for(open) != ch => {
                        return Some(ValidationError::new(
                            ValidationErrorKind::MismatchedBracket,
                            line_no,
                            col,
                            format!(
                                "Found '{}' but '{}' from line {} column {} is still open",
                                ch, open, open_line, open_col
                            ),
                            format!("Use '{}' to close '{}'", closer_for(open), open),
                        ));
                    }
                    Some(_) => {}
                },
                _ => {}
            }
            prev = Some(ch);
        }

        if let Some((quote, col)) = string {
            return Some(ValidationError::new(
                ValidationErrorKind::UnclosedString,
                line_no,
                col,
                format!("String starting with {} is never closed", quote),
                format!("Add a closing {} before the end of the line", quote),
            ));
        }
    }

    stack.first().map(|&(open, line, col)| {
        ValidationError::new(
            ValidationErrorKind::UnclosedBracket,
            line,
            col,
            format!("'{}' is never closed", open),
            format!("Add '{}' to close the '{}' opened here", closer_for(open), open),
        )
    })
}

fn opens_string(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, ',' | ';' | ':' | '=' | '[' | '(' | '|' | '*'),
    }
}

fn indent_column(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count() + 1
}

/// A `#id(schema)` table waiting for rows.
struct OpenTable {
    id: String,
    columns: usize,
    separator: char,
    bracketed: bool,
    awaiting_open: bool,
    line: usize,
    column: usize,
}

#[derive(Default)]
struct DenseChecker {
    table: Option<OpenTable>,
}

impl DenseChecker {
    fn run(mut self, text: &str) -> Option<ValidationError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut i = 0;

        while i < lines.len() {
            let line_no = i + 1;
            let line = lines[i];
            let raw = line.trim();
            i += 1;

            if let Some(table) = self.table.as_mut() {
                if raw.is_empty() {
                    if !table.bracketed {
                        self.table = None;
                    }
                    continue;
                }
                if table.bracketed || !raw.starts_with('#') {
                    if let Some(error) = table_row(table, raw, line_no, indent_column(line)) {
                        return Some(error);
                    }
                    if table.bracketed && de::closes_block(raw) {
                        self.table = None;
                    }
                    continue;
                }
                self.table = None;
            }

            if raw.is_empty() {
                continue;
            }

            let start_line = line_no;
            let column = indent_column(line);
            let mut logical = raw.to_string();
            if de::continues_on_next_line(raw) {
                while i < lines.len() && scan::open_depth(&logical) > 0 {
                    logical.push('\n');
                    logical.push_str(lines[i].trim());
                    i += 1;
                }
                if scan::open_depth(&logical) > 0 {
                    return Some(ValidationError::new(
                        ValidationErrorKind::UnclosedBracket,
                        start_line,
                        column,
                        "Table is not terminated before the end of input",
                        "Close the table rows with ']'",
                    ));
                }
            }

            if let Some(error) = self.check_line(&logical, start_line, column) {
                return Some(error);
            }
        }

        match self.table {
            Some(table) if table.bracketed => Some(ValidationError::new(
                ValidationErrorKind::UnclosedBracket,
                table.line,
                table.column,
                format!("Table '{}' is not terminated before the end of input", table.id),
                format!("Add ']' after the last row of '{}'", table.id),
            )),
            _ => None,
        }
    }

    fn check_line(&mut self, logical: &str, line: usize, column: usize) -> Option<ValidationError> {
        match de::classify_line(logical) {
            DenseLine::Table { name, schema, rows } => check_table(name, schema, rows, line, column),
            DenseLine::Sigil(Sigil::Unknown(text)) => Some(ValidationError::new(
                ValidationErrorKind::UnknownSigil,
                line,
                column,
                format!("Unknown marker '{}'", text),
                "Known markers are #c, #:key|value, #id(col|col) and #id",
            )),
            DenseLine::Sigil(Sigil::Reference { key, value: None }) => {
                Some(ValidationError::new(
                    ValidationErrorKind::InvalidReferenceDefinition,
                    line,
                    column,
                    format!("Reference '{}' has no value", key),
                    "Write references as #:key|value",
                ))
            }
            DenseLine::Sigil(Sigil::Table {
                id,
                schema,
                bracketed,
            }) => {
                let (columns, separator) = de::legacy_columns(schema);
                if columns.is_empty() {
                    return Some(empty_schema(id, line, column));
                }
                if separator == ' ' && columns.len() > 1 {
                    return Some(ValidationError::new(
                        ValidationErrorKind::MissingSeparator,
                        line,
                        column,
                        format!("Columns of '{}' are not separated by '|' or ','", id),
                        format!("Write the schema as #{}({})", id, columns.join("|")),
                    ));
                }
                if separator != ' ' && scan::split_fields(schema, separator).iter().any(|c| c.is_empty()) {
                    return Some(ValidationError::new(
                        ValidationErrorKind::EmptySchema,
                        line,
                        column,
                        format!("Schema of '{}' has an empty column name", id),
                        format!("Remove the extra '{}' or name the column", separator),
                    ));
                }
                self.table = Some(OpenTable {
                    id: id.to_string(),
                    columns: columns.len(),
                    separator,
                    bracketed,
                    awaiting_open: !bracketed,
                    line,
                    column,
                });
                None
            }
            _ => None,
        }
    }
}

fn empty_schema(id: &str, line: usize, column: usize) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::EmptySchema,
        line,
        column,
        format!("Table '{}' declares no columns", id),
        format!("List the column names inside the parentheses after '{}'", id),
    )
}

fn mismatch(id: &str, expected: usize, found: usize, line: usize, column: usize) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::SchemaRowMismatch,
        line,
        column,
        format!(
            "Row of '{}' has {} values but the schema defines {} columns",
            id, found, expected
        ),
        format!("Give every row of '{}' exactly {} values", id, expected),
    )
}

fn check_table(name: &str, schema: &str, rows: &str, line: usize, column: usize) -> Option<ValidationError> {
    let separator = scan::detect_separator(schema, ScanMode::BeforeAssign);
    let columns = scan::split_list(schema, separator).len();
    if columns == 0 {
        return Some(empty_schema(name, line, column));
    }
    let rows = rows.trim();
    if rows.is_empty() {
        return None;
    }
    let row_separator = scan::detect_row_separator(rows);
    scan::split_top_level(rows, row_separator)
        .into_iter()
        .map(|row| scan::split_tokens(row).len())
        .find(|found| *found != columns)
        .map(|found| mismatch(name, columns, found, line, column))
}

fn table_row(table: &mut OpenTable, raw: &str, line: usize, column: usize) -> Option<ValidationError> {
    if table.awaiting_open {
        table.awaiting_open = false;
        if raw == "[" {
            table.bracketed = true;
            return None;
        }
    }
    let row = if table.bracketed && de::closes_block(raw) {
        raw[..raw.len() - 1].trim_end()
    } else {
        raw
    };
    if row.is_empty() {
        return None;
    }
    let found = de::legacy_cells(row, table.separator).len();
    (found != table.columns).then(|| mismatch(&table.id, table.columns, found, line, column))
}
