//! Batch ingestion from operational databases into object storage.
//!
//! A run connects to one source (MySQL, PostgreSQL, or MongoDB), extracts
//! every row or document from each configured table, normalizes values into
//! JSON-safe primitives, and writes one date-partitioned NDJSON object per
//! table.
//!
//! # Architecture
//!
//! ```text
//! DataSource (mysql | postgresql | mongodb)
//!       |  Vec<SourceRecord>
//!       v
//! normalize  --  closed SourceValue variants -> JSON primitives
//!       |
//!       v
//! ObjectStoreSink  --  <table>/year=/month=/day=/<table>_<ts>.json
//! ```

pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod sink;
pub mod sources;
pub mod value;

pub use error::{IngestError, Result};
pub use normalize::{normalize_record, normalize_value};
pub use pipeline::{IngestOutcome, Ingester, IngestionBatch};
pub use sink::{build_object_key, serialize_ndjson, ObjectStoreSink};
pub use sources::{connect, DataSource, SourceConfig, SourceKind};
pub use value::{SourceRecord, SourceValue};
