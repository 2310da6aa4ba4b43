//! Quote- and bracket-aware scanning shared by the dense parser and validator.
//!
//! Everything here walks a string once, skipping quoted regions and tracking
//! bracket depth across `[]`, `()` and `{}`. A quote only opens a string at the
//! start of a token, so apostrophes inside words (`it's`) are plain characters.

use crate::options::Separator;
use std::ops::ControlFlow;

/// Which `=`-relative comma test [`detect_separator`] applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    /// Comma if one appears before the first `=` (schema lists).
    BeforeAssign,
    /// Comma if one appears after some `=` (key/value pair lists).
    AfterAssign,
}

/// Identifier: `[A-Za-z_][A-Za-z0-9_.-]*`.
#[must_use]
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(is_ident_char)
}

#[inline]
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

#[inline]
fn opens_token(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, ',' | ';' | ':' | '=' | '[' | '(' | '|' | '*'),
    }
}

/// Calls `f(index, ch, depth)` for every character outside quotes, plus the
/// opening quote of each quoted region. `depth` is the bracket depth before
/// `ch` is applied.
fn walk<F>(s: &str, mut f: F) -> Option<usize>
where
    F: FnMut(usize, char, usize) -> ControlFlow<usize>,
{
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (i, ch) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' && q == '"' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            prev = Some(ch);
            continue;
        }
        if (ch == '"' || ch == '\'') && opens_token(prev) {
            quote = Some(ch);
            prev = Some(ch);
            if let ControlFlow::Break(at) = f(i, ch, depth) {
                return Some(at);
            }
            continue;
        }
        if let ControlFlow::Break(at) = f(i, ch, depth) {
            return Some(at);
        }
        match ch {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        prev = Some(ch);
    }
    None
}

/// Detects the separator of a schema or pair list.
///
/// # Examples
///
/// ```rust
/// use dx_codec::scan::{detect_separator, ScanMode};
/// use dx_codec::Separator;
///
/// assert_eq!(detect_separator("id,nm", ScanMode::BeforeAssign), Separator::Comma);
/// assert_eq!(detect_separator("id nm", ScanMode::BeforeAssign), Separator::Space);
/// assert_eq!(detect_separator("a=1,b=2", ScanMode::AfterAssign), Separator::Comma);
/// assert_eq!(detect_separator("a=1 b=2", ScanMode::AfterAssign), Separator::Space);
/// ```
#[must_use]
pub fn detect_separator(content: &str, mode: ScanMode) -> Separator {
    let mut seen_assign = false;
    let found = walk(content, |i, ch, depth| match (ch, mode) {
        ('=', ScanMode::BeforeAssign) => ControlFlow::Break(usize::MAX),
        ('=', ScanMode::AfterAssign) => {
            seen_assign = true;
            ControlFlow::Continue(())
        }
        (',', ScanMode::BeforeAssign) if depth == 0 => ControlFlow::Break(i),
        (',', ScanMode::AfterAssign) if depth == 0 && seen_assign => ControlFlow::Break(i),
        _ => ControlFlow::Continue(()),
    });
    match found {
        Some(i) if i != usize::MAX => Separator::Comma,
        _ => Separator::Space,
    }
}

/// Detects the row separator of a table body: the first of `,` `;` `:` or a
/// newline at depth zero, defaulting to `;`.
#[must_use]
pub fn detect_row_separator(rows: &str) -> char {
    walk(rows, |i, ch, depth| {
        if depth == 0 && matches!(ch, ',' | ';' | ':' | '\n') {
            ControlFlow::Break(i)
        } else {
            ControlFlow::Continue(())
        }
    })
    .and_then(|i| rows[i..].chars().next())
    .unwrap_or(';')
}

/// Index of the first top-level occurrence of `target`.
#[must_use]
pub fn find_top_level(s: &str, target: char) -> Option<usize> {
    walk(s, |i, ch, depth| {
        if depth == 0 && ch == target {
            ControlFlow::Break(i)
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// Index of the bracket closing the one at byte offset `open`.
#[must_use]
pub fn matching_close(s: &str, open: usize) -> Option<usize> {
    let tail = s.get(open..)?;
    walk(tail, |i, ch, depth| {
        if depth == 1 && matches!(ch, ']' | ')' | '}') {
            ControlFlow::Break(open + i)
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// Net bracket depth at the end of `s`. Brackets inside quotes do not count.
#[must_use]
pub fn open_depth(s: &str) -> usize {
    let mut depth = 0usize;
    walk(s, |_, ch, _| {
        match ch {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        ControlFlow::Continue(())
    });
    depth
}

/// Splits on top-level occurrences of `sep`, trimming each part and dropping
/// empty ones.
///
/// ```rust
/// use dx_codec::scan::split_top_level;
///
/// assert_eq!(split_top_level("a=[1,2],b=\"x,y\"", ','), vec!["a=[1,2]", "b=\"x,y\""]);
/// ```
#[must_use]
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    walk(s, |i, ch, depth| {
        if depth == 0 && ch == sep {
            parts.push(&s[start..i]);
            start = i + ch.len_utf8();
        }
        ControlFlow::Continue(())
    });
    parts.push(&s[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Splits on top-level occurrences of `sep`, trimming each part but keeping
/// empty ones, so `a||b` yields three cells.
#[must_use]
pub fn split_fields(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    walk(s, |i, ch, depth| {
        if depth == 0 && ch == sep {
            parts.push(s[start..i].trim());
            start = i + ch.len_utf8();
        }
        ControlFlow::Continue(())
    });
    parts.push(s[start..].trim());
    parts
}

/// Splits on top-level whitespace.
///
/// ```rust
/// use dx_codec::scan::split_tokens;
///
/// assert_eq!(split_tokens("1 \"Jane Doe\" [a b]"), vec!["1", "\"Jane Doe\"", "[a b]"]);
/// ```
#[must_use]
pub fn split_tokens(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    walk(s, |i, ch, depth| {
        if depth == 0 && ch.is_whitespace() {
            if let Some(begin) = start.take() {
                parts.push(&s[begin..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
        ControlFlow::Continue(())
    });
    if let Some(begin) = start {
        parts.push(&s[begin..]);
    }
    parts
}

/// Splits a list on the given separator: top-level commas or top-level whitespace.
#[must_use]
pub fn split_list(s: &str, separator: Separator) -> Vec<&str> {
    match separator {
        Separator::Comma => split_top_level(s, ','),
        Separator::Space => split_tokens(s),
    }
}
