//! Dynamic value representation shared by every encoding.
//!
//! [`DxValue`] is the cell and field type of a [`DxDocument`](crate::DxDocument).
//! It is deliberately small: every encoding must be able to carry every variant.
//!
//! ## Creating Values
//!
//! ```rust
//! use dx_codec::{dx, DxValue};
//!
//! let null = DxValue::Null;
//! let flag = DxValue::from(true);
//! let count = DxValue::from(42);
//! let name = DxValue::from("Alice");
//! let reference = DxValue::Ref("company".to_string());
//!
//! let tags = dx!(["rust", "llm"]);
//! assert_eq!(tags.as_array().map(|a| a.len()), Some(2));
//! ```
//!
//! ## Extracting Values
//!
//! ```rust
//! use dx_codec::DxValue;
//! use std::convert::TryFrom;
//!
//! let value = DxValue::from(8080);
//! let port = f64::try_from(value).unwrap();
//! assert_eq!(port, 8080.0);
//! ```

use crate::{DxMap, Error};
use std::fmt;

/// A dynamically-typed DX value.
///
/// Numbers are always `f64`; the dense and human grammars do not distinguish
/// integers from floats. `Ref` holds only the key of a named value, never a
/// nested container.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum DxValue {
    String(String),
    Number(f64),
    Bool(bool),
    #[default]
    Null,
    Array(Vec<DxValue>),
    Object(DxMap),
    Ref(String),
}

impl DxValue {
    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, DxValue::Null)
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, DxValue::Bool(_))
    }

    /// Returns `true` if the value is a number.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, DxValue::Number(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, DxValue::String(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, DxValue::Array(_))
    }

    /// Returns `true` if the value is an inline object.
    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, DxValue::Object(_))
    }

    /// Returns `true` if the value is a reference.
    #[inline]
    #[must_use]
    pub const fn is_ref(&self) -> bool {
        matches!(self, DxValue::Ref(_))
    }

    /// Name of the variant, for diagnostics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dx_codec::DxValue;
    ///
    /// assert_eq!(DxValue::from(1.5).type_name(), "number");
    /// assert_eq!(DxValue::Ref("a".into()).type_name(), "ref");
    /// ```
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            DxValue::String(_) => "string",
            DxValue::Number(_) => "number",
            DxValue::Bool(_) => "bool",
            DxValue::Null => "null",
            DxValue::Array(_) => "array",
            DxValue::Object(_) => "object",
            DxValue::Ref(_) => "ref",
        }
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DxValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a number, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DxValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is a whole number that fits in an `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dx_codec::DxValue;
    ///
    /// assert_eq!(DxValue::from(42).as_i64(), Some(42));
    /// assert_eq!(DxValue::from(42.5).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DxValue::Number(n)
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 =>
            {
                Some(*n as i64)
            }
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DxValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<DxValue>> {
        match self {
            DxValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// If the value is an inline object, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&DxMap> {
        match self {
            DxValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// If the value is a reference, returns its key.
    #[inline]
    #[must_use]
    pub fn as_ref_key(&self) -> Option<&str> {
        match self {
            DxValue::Ref(key) => Some(key),
            _ => None,
        }
    }

    /// Returns `true` for strings, numbers, booleans, null and refs.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, DxValue::Array(_) | DxValue::Object(_))
    }
}

/// Renders a number the way every text encoding writes it.
///
/// Whole numbers print without a fractional part, so `1.0` becomes `1`.
pub(crate) fn format_number(n: f64) -> String {
    n.to_string()
}

/// Matches `-?\d+(\.\d+)?`, the only numeral shape the text grammars read.
pub(crate) fn is_numeric_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.map_or(true, all_digits)
}

impl fmt::Display for DxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DxValue::String(s) => write!(f, "{}", s),
            DxValue::Number(n) => write!(f, "{}", format_number(*n)),
            DxValue::Bool(b) => write!(f, "{}", b),
            DxValue::Null => write!(f, "null"),
            DxValue::Array(arr) => {
                write!(
                    f,
                    "[{}]",
                    arr.iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            DxValue::Object(obj) => {
                write!(
                    f,
                    "[{}]",
                    obj.iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect::<Vec<_>>()
                        .join(",")
                )
            }
            DxValue::Ref(key) => write!(f, "^{}", key),
        }
    }
}

impl TryFrom<DxValue> for f64 {
    type Error = Error;

    fn try_from(value: DxValue) -> crate::Result<Self> {
        match value {
            DxValue::Number(n) => Ok(n),
            other => Err(Error::custom(format!(
                "expected number, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<DxValue> for bool {
    type Error = Error;

    fn try_from(value: DxValue) -> crate::Result<Self> {
        match value {
            DxValue::Bool(b) => Ok(b),
            other => Err(Error::custom(format!(
                "expected bool, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<DxValue> for String {
    type Error = Error;

    fn try_from(value: DxValue) -> crate::Result<Self> {
        match value {
            DxValue::String(s) => Ok(s),
            other => Err(Error::custom(format!(
                "expected string, found {}",
                other.type_name()
            ))),
        }
    }
}

impl From<bool> for DxValue {
    fn from(value: bool) -> Self {
        DxValue::Bool(value)
    }
}

impl From<i32> for DxValue {
    fn from(value: i32) -> Self {
        DxValue::Number(value as f64)
    }
}

impl From<i64> for DxValue {
    fn from(value: i64) -> Self {
        DxValue::Number(value as f64)
    }
}

impl From<u32> for DxValue {
    fn from(value: u32) -> Self {
        DxValue::Number(value as f64)
    }
}

impl From<f64> for DxValue {
    fn from(value: f64) -> Self {
        DxValue::Number(value)
    }
}

impl From<String> for DxValue {
    fn from(value: String) -> Self {
        DxValue::String(value)
    }
}

impl From<&str> for DxValue {
    fn from(value: &str) -> Self {
        DxValue::String(value.to_string())
    }
}

impl From<Vec<DxValue>> for DxValue {
    fn from(value: Vec<DxValue>) -> Self {
        DxValue::Array(value)
    }
}

impl From<DxMap> for DxValue {
    fn from(value: DxMap) -> Self {
        DxValue::Object(value)
    }
}

impl<T: Into<DxValue>> From<Option<T>> for DxValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DxValue::Null, Into::into)
    }
}
