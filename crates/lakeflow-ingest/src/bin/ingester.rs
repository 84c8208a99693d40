//! Batch Ingestion Job
//!
//! Extracts every configured table from one source database and writes
//! date-partitioned NDJSON batches to object storage.
//!
//! # Environment Variables
//!
//! - `DB_TYPE`: Source kind: mysql, postgresql, or mongodb (required)
//! - `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`: Source connection (required)
//! - `DB_PORT`: Source port (default: driver default)
//! - `S3_BUCKET`: Destination bucket (required)
//! - `TABLES`: Comma-separated table/collection names (required)
//! - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`: S3 credentials
//! - `RUST_LOG`: Log level (default: info)
//!
//! # Example
//!
//! ```bash
//! export DB_TYPE=postgresql
//! export DB_HOST=localhost
//! export DB_USER=app
//! export DB_PASSWORD=secret
//! export DB_NAME=shop
//! export S3_BUCKET=datalake-raw
//! export TABLES=orders,customers,products
//! cargo run --bin ingester
//! ```

use lakeflow_ingest::{sources, Ingester, ObjectStoreSink, SourceConfig, SourceKind};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🚀 Ingestion job starting...");

    // Load configuration
    let kind = SourceKind::from_str_config(
        &std::env::var("DB_TYPE").map_err(|_| "DB_TYPE environment variable required")?,
    )?;
    let bucket = std::env::var("S3_BUCKET").map_err(|_| "S3_BUCKET environment variable required")?;
    let tables: Vec<String> = std::env::var("TABLES")
        .map_err(|_| "TABLES environment variable required")?
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tables.is_empty() {
        return Err("TABLES must name at least one table".into());
    }
    let source_config = SourceConfig::from_env()?;

    info!("Configuration:");
    info!("  Source: {} @ {}", kind, source_config.host);
    info!("  Bucket: {}", bucket);
    info!("  Tables: {}", tables.join(", "));

    // Connect source and sink
    let source = sources::connect(kind, &source_config).await?;
    info!("✓ Source connected");

    let sink = ObjectStoreSink::for_bucket(&bucket)?;
    info!("✓ Object store connected (bucket: {})", bucket);

    // Run
    let ingester = Ingester::new(source, sink);
    if let Err(e) = ingester.run(&tables).await {
        error!("ingestion run failed: {}", e);
        return Err(e.into());
    }

    info!("✓ Ingestion run complete");
    Ok(())
}
