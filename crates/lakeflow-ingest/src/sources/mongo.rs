//! MongoDB source connector.
//!
//! Full-collection scans over the official driver. BSON values are resolved
//! into the closed [`SourceValue`] variant; object identifiers (the `_id`
//! field and any other `ObjectId`) are stringified so downstream JSON never
//! sees a driver-specific identifier object. Custom extraction queries are
//! a relational-only feature and are rejected here.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::Client;
use tracing::info;

use crate::error::{IngestError, Result};
use crate::sources::{DataSource, SourceConfig, SourceKind};
use crate::value::{SourceRecord, SourceValue};

pub struct MongoSource {
    client: Client,
    database: String,
}

impl MongoSource {
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let uri = format!(
            "mongodb://{}:{}@{}:{}",
            config.user,
            config.password,
            config.host,
            config.port.unwrap_or(27017)
        );
        let client = Client::with_uri_str(&uri)
            .await
            .map_err(|e| IngestError::ConnectionError(format!("mongodb: {}", e)))?;
        info!(host = %config.host, database = %config.database, "connected to mongodb");
        Ok(Self {
            client,
            database: config.database.clone(),
        })
    }

    fn convert_document(doc: Document) -> SourceRecord {
        let fields = doc
            .into_iter()
            .map(|(name, value)| {
                let converted = convert_bson(value);
                (name, converted)
            })
            .collect();
        SourceRecord::new(fields)
    }
}

fn convert_bson(value: Bson) -> SourceValue {
    match value {
        Bson::Null => SourceValue::Null,
        Bson::Boolean(b) => SourceValue::Bool(b),
        Bson::Int32(i) => SourceValue::Int(i as i64),
        Bson::Int64(i) => SourceValue::Int(i),
        Bson::Double(f) => SourceValue::Float(f),
        Bson::Decimal128(d) => SourceValue::Decimal(d.to_string()),
        Bson::String(s) => SourceValue::Text(s),
        Bson::ObjectId(oid) => SourceValue::Text(oid.to_hex()),
        Bson::DateTime(dt) => SourceValue::DateTime(dt.to_chrono()),
        Bson::Binary(b) => SourceValue::Bytes(b.bytes),
        Bson::Array(items) => {
            SourceValue::Array(items.into_iter().map(convert_bson).collect())
        }
        Bson::Document(doc) => SourceValue::Document(
            doc.into_iter()
                .map(|(k, v)| (k, convert_bson(v)))
                .collect(),
        ),
        Bson::RegularExpression(r) => {
            SourceValue::Opaque(format!("/{}/{}", r.pattern, r.options))
        }
        Bson::Timestamp(ts) => SourceValue::Opaque(format!("{}:{}", ts.time, ts.increment)),
        // Symbol, JavaScript code, min/max keys, and other exotic kinds.
        other => SourceValue::Opaque(other.to_string()),
    }
}

#[async_trait]
impl DataSource for MongoSource {
    async fn extract(
        &self,
        table: &str,
        custom_query: Option<&str>,
    ) -> Result<Vec<SourceRecord>> {
        if custom_query.is_some() {
            return Err(IngestError::ExtractionError(
                "custom queries are not supported for mongodb sources".to_string(),
            ));
        }

        let collection = self
            .client
            .database(&self.database)
            .collection::<Document>(table);

        let mut cursor = collection
            .find(None, None)
            .await
            .map_err(|e| IngestError::ExtractionError(format!("{}: {}", table, e)))?;

        let mut records = Vec::new();
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| IngestError::ExtractionError(format!("{}: {}", table, e)))?
        {
            records.push(Self::convert_document(doc));
        }

        info!(collection = %table, documents = records.len(), "extracted from mongodb");
        Ok(records)
    }

    async fn close(&self) {
        // The driver releases its connections when the client drops.
        info!("mongodb connection released");
    }

    fn kind(&self) -> SourceKind {
        SourceKind::MongoDb
    }
}
