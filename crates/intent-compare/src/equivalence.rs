//! Scalar equivalence rules
//!
//! Intended and actual values come from two encoders that disagree on
//! details: union-typed leaves may be a number on one side and a string on
//! the other, and IPv6 addresses may be written in any of their legal
//! textual forms. These helpers decide when such values are the same.

use std::borrow::Cow;
use std::fmt;
use std::net::Ipv6Addr;

use serde_json::Value;

/// Maximum IPv6 prefix length
const MAX_PREFIX_LEN: u16 = 128;

/// The JSON tag of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Tag of a value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// Bring a number/string pair to the same type
///
/// When one side is numeric and the other is a string, the numeric side is
/// rendered as text. Every other combination is returned untouched.
pub fn coerce<'a>(intended: &'a Value, actual: &'a Value) -> (Cow<'a, Value>, Cow<'a, Value>) {
    match (intended, actual) {
        (Value::Number(n), Value::String(_)) => {
            (Cow::Owned(Value::String(n.to_string())), Cow::Borrowed(actual))
        }
        (Value::String(_), Value::Number(n)) => {
            (Cow::Borrowed(intended), Cow::Owned(Value::String(n.to_string())))
        }
        _ => (Cow::Borrowed(intended), Cow::Borrowed(actual)),
    }
}

/// Canonical RFC 5952 text of an IPv6 address, with optional `/prefix`
///
/// Hextets lose their leading zeros, the first longest run of two or more
/// zero hextets becomes `::`, embedded IPv4 tails are rewritten as hextets,
/// and IPv4-mapped addresses (`::ffff:0:0/96`) are written as dotted quads.
/// Text that is not an address is returned unchanged.
pub fn normalize_address(text: &str) -> String {
    let (address, prefix) = split_prefix(text);
    let Ok(parsed) = address.parse::<Ipv6Addr>() else {
        return text.to_string();
    };
    match prefix {
        None => parsed.to_string(),
        Some(prefix) => match parse_prefix(prefix) {
            Some(len) => format!("{parsed}/{len}"),
            None => text.to_string(),
        },
    }
}

/// `true` when `text` is an IPv6 address, optionally with a prefix length
///
/// Accepts full, compressed, IPv4-embedded and IPv4-mapped forms. Rejects
/// bare IPv4, zone identifiers, and prefixes that are not an integer in
/// `0..=128`.
pub fn is_address(text: &str) -> bool {
    let (address, prefix) = split_prefix(text);
    if let Some(prefix) = prefix
        && parse_prefix(prefix).is_none()
    {
        return false;
    }
    address.parse::<Ipv6Addr>().is_ok()
}

/// Whether an intended scalar matches the actual one
///
/// Equal when literally equal, or when the intended value is an IPv6
/// address whose canonical form is the actual text.
pub fn scalars_equal(intended: &Value, actual: &Value) -> bool {
    if intended == actual {
        return true;
    }
    match (intended, actual) {
        (Value::String(i), Value::String(a)) => is_address(i) && normalize_address(i) == *a,
        _ => false,
    }
}

/// Text used for a value in audit findings
///
/// Strings are verbatim; everything else is compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `true` for `{}`, `[]` and `[null]`
pub fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty() || matches!(items.as_slice(), [Value::Null]),
        _ => false,
    }
}

/// `true` for objects and arrays
pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn split_prefix(text: &str) -> (&str, Option<&str>) {
    match text.split_once('/') {
        Some((address, prefix)) => (address, Some(prefix)),
        None => (text, None),
    }
}

fn parse_prefix(prefix: &str) -> Option<u16> {
    if prefix.is_empty() || prefix.len() > 3 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse::<u16>().ok().filter(|len| *len <= MAX_PREFIX_LEN)
}
