//! Source value model.
//!
//! A closed variant of every value kind a source driver can deliver,
//! resolved once at the driver boundary. The normalizer dispatches over
//! this enum with a total match, so no value can silently fall through to
//! stringification by accident; drivers map types they cannot represent to
//! [`SourceValue::Opaque`] explicitly, carrying the value's display form.

use chrono::{DateTime, NaiveDate, Utc};

/// One value as delivered by a source driver, prior to normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Exact-precision decimal, carried as its textual digits.
    Decimal(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<SourceValue>),
    /// Nested document; field order as delivered by the driver.
    Document(Vec<(String, SourceValue)>),
    /// A driver value with no native mapping, already rendered to text.
    Opaque(String),
}

impl SourceValue {
    /// Convert a JSON value delivered by a driver (JSON/JSONB columns)
    /// into the source model.
    pub fn from_json(value: serde_json::Value) -> SourceValue {
        match value {
            serde_json::Value::Null => SourceValue::Null,
            serde_json::Value::Bool(b) => SourceValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SourceValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    SourceValue::Float(f)
                } else {
                    // u64 beyond i64 range.
                    SourceValue::Decimal(n.to_string())
                }
            }
            serde_json::Value::String(s) => SourceValue::Text(s),
            serde_json::Value::Array(items) => {
                SourceValue::Array(items.into_iter().map(SourceValue::from_json).collect())
            }
            serde_json::Value::Object(map) => SourceValue::Document(
                map.into_iter()
                    .map(|(k, v)| (k, SourceValue::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// One raw row or document fetched from a source, prior to normalization.
/// Field order is the order the driver delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub fields: Vec<(String, SourceValue)>,
}

impl SourceRecord {
    pub fn new(fields: Vec<(String, SourceValue)>) -> Self {
        Self { fields }
    }
}
