//! Object-store sink.
//!
//! Serializes a batch as newline-delimited JSON and writes it as a single
//! object under a date-partitioned key:
//!
//! ```text
//! <table>/year=<YYYY>/month=<MM>/day=<DD>/<table>_<YYYYMMDD_HHMMSS>.json
//! ```
//!
//! One write per batch, content type `application/x-ndjson`, no retries.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions};
use serde_json::Value;
use tracing::info;

use crate::error::{IngestError, Result};

const CONTENT_TYPE: &str = "application/x-ndjson";

/// Build the destination key for a table captured at the given instant.
pub fn build_object_key(table: &str, captured_at: DateTime<Utc>) -> String {
    format!(
        "{table}/year={}/month={}/day={}/{table}_{}.json",
        captured_at.format("%Y"),
        captured_at.format("%m"),
        captured_at.format("%d"),
        captured_at.format("%Y%m%d_%H%M%S"),
    )
}

/// Serialize records as NDJSON: one compact JSON object per line, fields in
/// each record's own key order.
pub fn serialize_ndjson(records: &[serde_json::Map<String, Value>]) -> Result<Bytes> {
    let mut output = Vec::new();
    for record in records {
        serde_json::to_writer(&mut output, record)
            .map_err(|e| IngestError::SerializationError(e.to_string()))?;
        output.push(b'\n');
    }
    Ok(Bytes::from(output))
}

/// Writes serialized batches to an object store bucket.
pub struct ObjectStoreSink {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStoreSink {
    /// Build an S3-backed sink from ambient AWS configuration.
    pub fn for_bucket(bucket: &str) -> Result<Self> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| {
                IngestError::ConfigError(format!("failed to build S3 client: {}", e))
            })?;
        Ok(Self {
            store: Arc::new(store),
            bucket: bucket.to_string(),
        })
    }

    /// Build a sink over an injected store (useful for testing).
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
        }
    }

    /// Write one serialized batch under the given key.
    pub async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, CONTENT_TYPE.into());

        let path = ObjectPath::from(key);
        self.store
            .put_opts(&path, body.into(), PutOptions::from(attributes))
            .await
            .map_err(|e| IngestError::StorageError(format!("put {}: {}", key, e)))?;

        info!(bucket = %self.bucket, key = %key, "batch written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    // ---------------------------------------------------------------
    // Key building
    // ---------------------------------------------------------------

    #[test]
    fn test_build_key_orders_example() {
        let captured = Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(
            build_object_key("orders", captured),
            "orders/year=2024/month=03/day=07/orders_20240307_140509.json"
        );
    }

    #[test]
    fn test_build_key_zero_pads_components() {
        let captured = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            build_object_key("t", captured),
            "t/year=2025/month=01/day=02/t_20250102_030405.json"
        );
    }

    // ---------------------------------------------------------------
    // NDJSON serialization
    // ---------------------------------------------------------------

    fn record(pairs: &[(&str, Value)]) -> serde_json::Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_serialize_ndjson_one_object_per_line() {
        let records = vec![
            record(&[("id", Value::from(1)), ("name", Value::from("a"))]),
            record(&[("id", Value::from(2)), ("name", Value::Null)]),
        ];
        let data = serialize_ndjson(&records).unwrap();
        let text = String::from_utf8(data.to_vec()).unwrap();
        let lines: Vec<&str> = text.trim_end().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"id":1,"name":"a"}"#);
        assert_eq!(lines[1], r#"{"id":2,"name":null}"#);
    }

    #[test]
    fn test_serialize_ndjson_preserves_key_order() {
        let records = vec![record(&[
            ("zeta", Value::from(1)),
            ("alpha", Value::from(2)),
        ])];
        let data = serialize_ndjson(&records).unwrap();
        let text = String::from_utf8(data.to_vec()).unwrap();
        assert_eq!(text.trim_end(), r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn test_serialize_ndjson_empty() {
        let data = serialize_ndjson(&[]).unwrap();
        assert!(data.is_empty());
    }

    // ---------------------------------------------------------------
    // Store writes
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn test_put_writes_under_key() {
        use futures::TryStreamExt;

        let store = Arc::new(object_store::memory::InMemory::new());
        let sink = ObjectStoreSink::with_store(store.clone(), "test-bucket");

        sink.put("t/year=2024/month=03/day=07/t_x.json", Bytes::from("{}\n"))
            .await
            .unwrap();

        let objects: Vec<_> = store.list(None).try_collect().await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(
            objects[0].location.as_ref(),
            "t/year=2024/month=03/day=07/t_x.json"
        );
    }
}
