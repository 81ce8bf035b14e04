//! Field values held by a form.
//!
//! Form values are dynamically typed in the document format. Inside the
//! engine they are a closed sum type so that default-value and validation
//! logic can match on them exhaustively.
//!
//! The coercion helpers ([`FieldValue::is_truthy`], [`FieldValue::to_display`],
//! [`FieldValue::to_number`]) follow the loose semantics of the browser forms
//! these documents were written for: an empty string is falsy, `"12"`
//! compares numerically as `12`, a list stringifies as its comma-joined items.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field id → value. A key's presence means the field is visible.
pub type ValueMap = BTreeMap<String, FieldValue>;

/// A single list item of a `checkbox_group` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Numeric option value.
    Number(f64),
    /// Textual option value.
    Text(String),
}

impl Scalar {
    /// Returns the value as it would be displayed.
    #[must_use]
    pub fn to_display(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    /// Compares this item with a field value using strict equality.
    #[must_use]
    pub fn strict_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (Self::Number(a), FieldValue::Number(b)) => a == b,
            (Self::Text(a), FieldValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// The current value of a form field.
///
/// Serializes untagged: `null`, booleans, numbers, strings and arrays map
/// directly onto the JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value. Used for a `number` field that has not been filled in.
    #[default]
    Unset,
    /// A checkbox state.
    Bool(bool),
    /// A numeric value.
    Number(f64),
    /// A textual value (text, email, date, select, radio, ...).
    Text(String),
    /// The selected items of a `checkbox_group`.
    List(Vec<Scalar>),
}

impl FieldValue {
    /// Convenience constructor for a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the empty text value.
    #[must_use]
    pub fn empty_text() -> Self {
        Self::Text(String::new())
    }

    /// Converts a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] for objects, and for list items that are not
    /// strings or numbers.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValueError> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Unset),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| ValueError::UnrepresentableNumber(n.to_string())),
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(s) => Ok(Scalar::Text(s.clone())),
                    Value::Number(n) => n
                        .as_f64()
                        .map(Scalar::Number)
                        .ok_or_else(|| ValueError::UnrepresentableNumber(n.to_string())),
                    other => Err(ValueError::InvalidListItem {
                        index,
                        kind: json_kind(other),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(_) => Err(ValueError::Object),
        }
    }

    /// Whether the value counts as "set" in a boolean context.
    ///
    /// `Unset`, `false`, `0`, `NaN` and `""` are falsy. Lists are always
    /// truthy, even when empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Unset => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::List(_) => true,
        }
    }

    /// Returns the string form of the value.
    #[must_use]
    pub fn to_display(&self) -> String {
        match self {
            Self::Unset => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Scalar::to_display)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Numeric coercion. Returns `NaN` when the value has no numeric reading.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Unset => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::Text(s) => parse_number(s),
            Self::List(items) => match items.as_slice() {
                [] => 0.0,
                [only] => parse_number(&only.to_display()),
                _ => f64::NAN,
            },
        }
    }

    /// Strict equality: same kind and same contents.
    ///
    /// An unset value equals the empty string, since an untouched `number`
    /// input holds an empty string in the browser.
    #[must_use]
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unset, Self::Unset) => true,
            (Self::Unset, Self::Text(s)) | (Self::Text(s), Self::Unset) => s.is_empty(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }

    /// Returns `true` for values a required field must not hold:
    /// unset, the empty string, or an empty list.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Returns the list items if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<Scalar>> for FieldValue {
    fn from(value: Vec<Scalar>) -> Self {
        Self::List(value)
    }
}

/// Errors converting a JSON value into a [`FieldValue`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// Objects have no field value representation.
    #[error("objects are not valid field values")]
    Object,

    /// A list item is neither a string nor a number.
    #[error("list item {index} is a {kind}, expected a string or number")]
    InvalidListItem {
        /// Position of the offending item.
        index: usize,
        /// JSON kind of the item.
        kind: &'static str,
    },

    /// The number does not fit into an `f64`.
    #[error("number {0} cannot be represented")]
    UnrepresentableNumber(String),
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Formats a number the way a browser stringifies it.
///
/// Integral values have no trailing `.0`; magnitudes from `1e21` up and
/// below `1e-6` use exponent notation with a signed exponent (`1e+21`).
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        return format!("{sign}Infinity");
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{n:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    n.to_string()
}

/// Parses text the way a browser coerces a string to a number.
///
/// Surrounding whitespace is ignored, blank text is `0`, hexadecimal,
/// octal and binary literals are accepted, anything else unparsable is `NaN`.
fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.starts_with(['+', '-']) {
                return f64::NAN;
            }
            #[allow(clippy::cast_precision_loss)]
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |v| v as f64);
        }
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
