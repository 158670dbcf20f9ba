//! Result tables produced by an upstream parameter sweep.
//!
//! A [`ResultTable`] is an ordered list of [`Record`]s. Each record carries
//! named scalar parameter fields plus one opaque payload of type `P`. The
//! table only ever reads records; it never inspects the payload.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Name of the payload column when none is configured.
pub const DEFAULT_PAYLOAD_COLUMN: &str = "data";

/// A scalar parameter value.
///
/// Numbers compare by value across variants: `Int(10) == Float(10.0)`, so a
/// restriction written as `[0, 1]` selects from a float column. Non-integral
/// floats compare by bit pattern, which keeps `Value` usable as a map key
/// (`NaN` equals itself). Hashing follows the same rule.
///
/// Deserializes untagged from plain YAML scalars: `10`, `0.5`, `classic`, `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A text value.
    Text(String),
    /// A boolean flag.
    Bool(bool),
}

impl Value {
    /// Get as f64 if numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Comparison key for numbers: integral floats fold onto the integer they equal.
#[derive(PartialEq, Eq, Hash)]
enum NumericKey {
    Int(i64),
    Bits(u64),
}

// 2^63, the first float past i64::MAX.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Value {
    fn numeric_key(&self) -> Option<NumericKey> {
        match self {
            Value::Int(i) => Some(NumericKey::Int(*i)),
            Value::Float(f) if f.fract() == 0.0 && *f >= -I64_BOUND && *f < I64_BOUND => {
                Some(NumericKey::Int(*f as i64))
            }
            Value::Float(f) => Some(NumericKey::Bits(f.to_bits())),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (a, b) => match (a.numeric_key(), b.numeric_key()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Text(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(_) | Value::Float(_) => {
                2u8.hash(state);
                self.numeric_key().hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" so 1.0 does not read as an integer.
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// One row of a result table: named parameter fields and an opaque payload.
#[derive(Debug, Clone)]
pub struct Record<P> {
    fields: IndexMap<String, Value>,
    payload: P,
}

impl<P> Record<P> {
    /// Create a record holding only a payload.
    #[must_use]
    pub fn new(payload: P) -> Self {
        Self { fields: IndexMap::new(), payload }
    }

    /// Set a parameter field.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(column.to_string(), value.into());
        self
    }

    /// Get a parameter field, or `None` if this record does not carry it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// The opaque payload.
    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Parameter fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An ordered, read-only collection of sweep results.
///
/// The schema is the union of all record fields in first-seen order. A record
/// that lacks a column simply matches no value in it, which is how runs with
/// differing parameter sets share one table.
#[derive(Debug, Clone)]
pub struct ResultTable<P> {
    columns: Vec<String>,
    records: Vec<Record<P>>,
    payload_column: String,
}

impl<P> Default for ResultTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ResultTable<P> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            records: Vec::new(),
            payload_column: DEFAULT_PAYLOAD_COLUMN.to_string(),
        }
    }

    /// Name the payload column (used in ambiguity reports).
    #[must_use]
    pub fn with_payload_column(mut self, name: impl Into<String>) -> Self {
        self.payload_column = name.into();
        self
    }

    /// Append a record, extending the schema with any new columns.
    pub fn push(&mut self, record: Record<P>) {
        for (name, _) in record.fields() {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
            }
        }
        self.records.push(record);
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn row(mut self, record: Record<P>) -> Self {
        self.push(record);
        self
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in table order.
    #[must_use]
    pub fn records(&self) -> &[Record<P>] {
        &self.records
    }

    /// Parameter column names in first-seen order. The payload is not listed.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Name of the payload column.
    #[must_use]
    pub fn payload_column(&self) -> &str {
        &self.payload_column
    }

    /// Check if a parameter column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Distinct values of a column in order of first appearance.
    #[must_use]
    pub fn distinct(&self, column: &str) -> Vec<Value> {
        let seen: IndexSet<&Value> = self.records.iter().filter_map(|r| r.get(column)).collect();
        seen.into_iter().cloned().collect()
    }

    /// Whether any record carries `value` in `column`.
    #[must_use]
    pub fn contains_value(&self, column: &str, value: &Value) -> bool {
        self.records.iter().any(|r| r.get(column) == Some(value))
    }
}

impl<P> FromIterator<Record<P>> for ResultTable<P> {
    fn from_iter<I: IntoIterator<Item = Record<P>>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.push(record);
        }
        table
    }
}
