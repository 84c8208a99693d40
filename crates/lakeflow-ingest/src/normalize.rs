//! Type normalization.
//!
//! Converts source values into JSON-safe primitives. The downstream storage
//! format is schema-inferring JSON text, so decimals, dates, binary, and
//! driver-specific values must be reduced to types JSON can carry natively.
//! Normalization never fails; values with no better mapping keep their
//! textual representation.

use serde_json::Value;

use crate::value::{SourceRecord, SourceValue};

/// Normalize one value. Total match over the source variant:
///
/// - decimals become IEEE doubles (unparseable digits stay textual)
/// - dates and timestamps become ISO-8601 strings
/// - binary becomes UTF-8 text, lossily when invalid
/// - opaque driver values keep their display form
/// - JSON-native kinds pass through unchanged, containers recursively
pub fn normalize_value(value: SourceValue) -> Value {
    match value {
        SourceValue::Null => Value::Null,
        SourceValue::Bool(b) => Value::Bool(b),
        SourceValue::Int(i) => Value::from(i),
        SourceValue::Float(f) => {
            // JSON has no NaN/Infinity; fall back to text for those.
            serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string()))
        }
        SourceValue::Decimal(digits) => match digits.parse::<f64>() {
            Ok(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(digits)),
            Err(_) => Value::String(digits),
        },
        SourceValue::Date(d) => Value::String(d.to_string()),
        SourceValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
        SourceValue::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => Value::String(s),
            Err(e) => Value::String(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        },
        SourceValue::Text(s) => Value::String(s),
        SourceValue::Array(items) => {
            Value::Array(items.into_iter().map(normalize_value).collect())
        }
        SourceValue::Document(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect(),
        ),
        SourceValue::Opaque(s) => Value::String(s),
    }
}

/// Normalize a whole record, preserving field order.
pub fn normalize_record(record: SourceRecord) -> serde_json::Map<String, Value> {
    record
        .fields
        .into_iter()
        .map(|(name, value)| (name, normalize_value(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    // ---------------------------------------------------------------
    // Per-kind rules
    // ---------------------------------------------------------------

    #[test]
    fn test_decimal_becomes_double() {
        assert_eq!(
            normalize_value(SourceValue::Decimal("19.99".to_string())),
            serde_json::json!(19.99)
        );
    }

    #[test]
    fn test_unparseable_decimal_stays_textual() {
        assert_eq!(
            normalize_value(SourceValue::Decimal("not-a-number".to_string())),
            serde_json::json!("not-a-number")
        );
    }

    #[test]
    fn test_date_becomes_iso_string() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            normalize_value(SourceValue::Date(d)),
            serde_json::json!("2024-03-07")
        );
    }

    #[test]
    fn test_datetime_becomes_iso_string() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap();
        let value = normalize_value(SourceValue::DateTime(dt));
        assert_eq!(value.as_str().unwrap(), "2024-03-07T14:05:09+00:00");
    }

    #[test]
    fn test_valid_utf8_bytes_decode() {
        assert_eq!(
            normalize_value(SourceValue::Bytes(b"hello".to_vec())),
            serde_json::json!("hello")
        );
    }

    #[test]
    fn test_invalid_utf8_bytes_fall_back_to_lossy_text() {
        let value = normalize_value(SourceValue::Bytes(vec![0xff, 0xfe, b'a']));
        assert!(value.is_string());
        assert!(value.as_str().unwrap().contains('a'));
    }

    #[test]
    fn test_opaque_keeps_display_form() {
        assert_eq!(
            normalize_value(SourceValue::Opaque("Point(1 2)".to_string())),
            serde_json::json!("Point(1 2)")
        );
    }

    #[test]
    fn test_json_native_kinds_unchanged() {
        assert_eq!(normalize_value(SourceValue::Null), serde_json::Value::Null);
        assert_eq!(
            normalize_value(SourceValue::Bool(true)),
            serde_json::json!(true)
        );
        assert_eq!(normalize_value(SourceValue::Int(7)), serde_json::json!(7));
        assert_eq!(
            normalize_value(SourceValue::Float(2.5)),
            serde_json::json!(2.5)
        );
        assert_eq!(
            normalize_value(SourceValue::Text("x".to_string())),
            serde_json::json!("x")
        );
    }

    #[test]
    fn test_non_finite_float_becomes_text() {
        let value = normalize_value(SourceValue::Float(f64::NAN));
        assert!(value.is_string());
    }

    #[test]
    fn test_containers_normalized_recursively() {
        let value = normalize_value(SourceValue::Document(vec![
            (
                "amounts".to_string(),
                SourceValue::Array(vec![SourceValue::Decimal("1.5".to_string())]),
            ),
            (
                "when".to_string(),
                SourceValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            ),
        ]));
        assert_eq!(
            value,
            serde_json::json!({"amounts": [1.5], "when": "2024-01-02"})
        );
    }

    // ---------------------------------------------------------------
    // Record-level behavior
    // ---------------------------------------------------------------

    #[test]
    fn test_record_field_order_preserved() {
        let record = SourceRecord::new(vec![
            ("z".to_string(), SourceValue::Int(1)),
            ("a".to_string(), SourceValue::Int(2)),
            ("m".to_string(), SourceValue::Int(3)),
        ]);
        let normalized = normalize_record(record);
        let keys: Vec<&str> = normalized.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        // Normalize, lift the JSON back into the source model, normalize
        // again: the second pass must change nothing.
        let record = SourceRecord::new(vec![
            ("price".to_string(), SourceValue::Decimal("9.75".to_string())),
            (
                "day".to_string(),
                SourceValue::Date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()),
            ),
            ("blob".to_string(), SourceValue::Bytes(b"text".to_vec())),
            ("n".to_string(), SourceValue::Int(3)),
        ]);

        let first = normalize_record(record);
        let lifted = SourceRecord::new(
            first
                .clone()
                .into_iter()
                .map(|(k, v)| (k, SourceValue::from_json(v)))
                .collect(),
        );
        let second = normalize_record(lifted);
        assert_eq!(first, second);
    }
}
