//! Ingestion pipeline.
//!
//! One run opens a single source connection, processes its tables strictly
//! sequentially (extract, normalize, write), and releases the connection on
//! every exit path. An empty extraction is logged and skipped; any failure
//! aborts the remainder of the run.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::normalize::normalize_record;
use crate::sink::{build_object_key, serialize_ndjson, ObjectStoreSink};
use crate::sources::DataSource;

/// The unit of one ingestion write.
#[derive(Debug)]
pub struct IngestionBatch {
    pub table: String,
    pub records: Vec<serde_json::Map<String, Value>>,
    pub captured_at: DateTime<Utc>,
    pub object_key: String,
}

/// Outcome of ingesting one table.
#[derive(Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Written { rows: usize, key: String },
    /// Zero records were extracted; nothing was written.
    Skipped,
}

/// Drives extraction, normalization, and partitioned writes for one run.
pub struct Ingester {
    source: Box<dyn DataSource>,
    sink: ObjectStoreSink,
}

impl Ingester {
    pub fn new(source: Box<dyn DataSource>, sink: ObjectStoreSink) -> Self {
        Self { source, sink }
    }

    /// Ingest one table or collection: extract everything, normalize, and
    /// write one date-partitioned NDJSON object. A batch with zero records
    /// is never written.
    pub async fn ingest_table(
        &self,
        table: &str,
        custom_query: Option<&str>,
    ) -> Result<IngestOutcome> {
        info!(table = %table, source = %self.source.kind(), "starting ingestion");

        let raw = self.source.extract(table, custom_query).await?;
        if raw.is_empty() {
            warn!(table = %table, "no records extracted, skipping write");
            return Ok(IngestOutcome::Skipped);
        }

        let records: Vec<serde_json::Map<String, Value>> =
            raw.into_iter().map(normalize_record).collect();

        let captured_at = Utc::now();
        let batch = IngestionBatch {
            object_key: build_object_key(table, captured_at),
            table: table.to_string(),
            records,
            captured_at,
        };

        let body = serialize_ndjson(&batch.records)?;
        self.sink.put(&batch.object_key, body).await?;

        info!(table = %batch.table, rows = batch.records.len(), key = %batch.object_key, "ingestion complete");
        Ok(IngestOutcome::Written {
            rows: batch.records.len(),
            key: batch.object_key,
        })
    }

    /// Process tables strictly sequentially, aborting the run on the first
    /// failure. The source connection is released on all exit paths.
    pub async fn run(&self, tables: &[String]) -> Result<()> {
        let result = self.ingest_all(tables).await;
        self.source.close().await;
        result
    }

    async fn ingest_all(&self, tables: &[String]) -> Result<()> {
        for table in tables {
            let table = table.trim();
            if table.is_empty() {
                continue;
            }
            if let Err(e) = self.ingest_table(table, None).await {
                error!(table = %table, error = %e, "ingestion failed, aborting run");
                return Err(e);
            }
        }
        info!("ingestion run complete");
        Ok(())
    }
}
