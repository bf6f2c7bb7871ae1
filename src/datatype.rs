// used for the document tree and for records
use serde_json::{Map, Value};

// used when callers hand us something serializable instead of a ready tree
use serde::Serialize;

// used to order values during sorting
use std::cmp::Ordering;
// used to indicate that join keys need to be hashable
use std::hash::{BuildHasherDefault, Hash, Hasher};
use seahash::SeaHasher;

use crate::error::{Result, WeftError};

// ------------- Record -------------
/// One logical row: a mapping from output key to the value extracted for it.
pub type Record = Map<String, Value>;

/// Hasher for maps and sets keyed by join keys and path roots.
pub type FastHasher = BuildHasherDefault<SeaHasher>;

/// Convert anything serializable into a document tree.
pub fn to_document<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ------------- Ordering -------------
/// Order two values for sorting. Nulls (and therefore missing fields, which
/// sort as null) come before everything else; values of one type order
/// naturally. Ordering two non-null values of different types, or two
/// objects, is refused with a [`WeftError::Comparison`].
pub fn value_cmp(left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Null, _) => Ok(Ordering::Less),
        (_, Value::Null) => Ok(Ordering::Greater),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            Ok(a.partial_cmp(&b).unwrap_or(Ordering::Equal))
        }
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ordering = value_cmp(x, y)?;
                if ordering != Ordering::Equal {
                    return Ok(ordering);
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        (a, b) => Err(WeftError::Comparison {
            left: type_name(a),
            right: type_name(b),
        }),
    }
}

// ------------- Literal -------------
/// The right-hand side of a filter condition: an integer when the token
/// parses as one, otherwise the original text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Text(String),
}

impl Literal {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(number) => Literal::Int(number),
            Err(_) => Literal::Text(raw.to_string()),
        }
    }
    /// Compare a record value against this literal, value on the left.
    /// Comparisons never coerce across types: a number only compares to an
    /// integer literal, a string only to a text literal. `None` means the
    /// pair is incomparable.
    pub fn compare(&self, value: &Value) -> Option<Ordering> {
        match (self, value) {
            (Literal::Int(i), Value::Number(n)) => {
                n.as_f64().unwrap_or_default().partial_cmp(&(*i as f64))
            }
            (Literal::Text(t), Value::String(s)) => Some(s.as_str().cmp(t.as_str())),
            _ => None,
        }
    }
}

// ------------- JoinKey -------------
/// The values of the join fields of one record, in field-list order.
/// A record missing any join field, or holding null there, has no key
/// and takes no part in a join.
#[derive(Debug, Clone)]
pub struct JoinKey(Vec<Value>);

impl JoinKey {
    pub fn from_record(record: &Record, on: &[String]) -> Option<JoinKey> {
        let mut parts = Vec::with_capacity(on.len());
        for field in on {
            match record.get(field) {
                Some(value) if !value.is_null() => parts.push(value.clone()),
                _ => return None,
            }
        }
        Some(JoinKey(parts))
    }
}

impl PartialEq for JoinKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for JoinKey {}
impl Hash for JoinKey {
    // hash each part through its canonical text, so equal values hash equally
    // regardless of internal representation
    fn hash<H: Hasher>(&self, state: &mut H) {
        for part in &self.0 {
            part.to_string().hash(state);
        }
    }
}
