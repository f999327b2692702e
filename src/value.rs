//! # Value Module
//!
//! The loosely-typed datum handlers produce and patterns describe.
//!
//! A [`Value`] is a closed tagged union: handlers return one, the shape
//! classifier in [`crate::dispatcher`] decides what it means. Matching logic
//! dispatches purely on the [`Tag`]; a `Value` never mixes tags.
//!
//! `Mapping` preserves insertion order but the order is not semantically
//! significant; equality for `Mapping` and `Set` is order-insensitive.

use std::fmt;

/// Discriminant of a [`Value`], used for type-tag pattern checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Absent,
    Integer,
    Bytes,
    Text,
    Sequence,
    Mapping,
    Set,
}

/// A tagged runtime datum produced by a handler or embedded in a pattern.
#[derive(Debug, Clone)]
pub enum Value {
    /// No value at all ("the handler returned nothing").
    Absent,
    Integer(i64),
    Bytes(Vec<u8>),
    Text(String),
    /// Ordered list of values.
    Sequence(Vec<Value>),
    /// Key/value entries in insertion order. Order is not significant.
    Mapping(Vec<(Value, Value)>),
    /// Unordered collection of values.
    Set(Vec<Value>),
}

impl Value {
    /// The tag this value carries.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Value::Absent => Tag::Absent,
            Value::Integer(_) => Tag::Integer,
            Value::Bytes(_) => Tag::Bytes,
            Value::Text(_) => Tag::Text,
            Value::Sequence(_) => Tag::Sequence,
            Value::Mapping(_) => Tag::Mapping,
            Value::Set(_) => Tag::Set,
        }
    }

    /// A `(status, body)` pair, the fourth accepted response shape.
    #[must_use]
    pub fn pair(status: u16, body: impl Into<Vec<u8>>) -> Value {
        Value::Sequence(vec![
            Value::Integer(i64::from(status)),
            Value::Bytes(body.into()),
        ])
    }

    /// A single-entry `{content-type: body}` mapping, the fifth accepted
    /// response shape.
    #[must_use]
    pub fn content(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Value {
        Value::Mapping(vec![(
            Value::Text(content_type.into()),
            Value::Bytes(body.into()),
        )])
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Absent
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Absent => "absent",
            Tag::Integer => "integer",
            Tag::Bytes => "bytes",
            Tag::Text => "text",
            Tag::Sequence => "sequence",
            Tag::Mapping => "mapping",
            Tag::Set => "set",
        };
        f.write_str(name)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(v: &[u8; N]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => {
                unordered_eq(a, b, |(ka, va), (kb, vb)| ka == kb && va == vb)
            }
            (Value::Set(a), Value::Set(b)) => unordered_eq(a, b, |x, y| x == y),
            _ => false,
        }
    }
}

/// Multiset equality: every element of `a` pairs with a distinct, equal
/// element of `b`. Quadratic, acceptable at response-shape sizes.
fn unordered_eq<T>(a: &[T], b: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    for item in a {
        let witness = (0..b.len()).find(|&i| !used[i] && eq(item, &b[i]));
        match witness {
            Some(i) => used[i] = true,
            None => return false,
        }
    }
    true
}
