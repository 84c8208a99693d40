//! Analytics API Server Binary
//!
//! # Environment Variables
//!
//! - `ATHENA_OUTPUT_LOCATION`: S3 staging URI for query results (required)
//! - `ATHENA_DATABASE`: Default database (default: datalake_raw)
//! - `ATHENA_WORKGROUP`: Athena workgroup (default: primary)
//! - `QUERY_MAX_WAIT_SECS`: Per-query wall-clock budget (default: 60)
//! - `QUERY_POLL_INTERVAL_MS`: Status poll interval (default: 500)
//! - `API_PORT`: HTTP port (default: 8000)
//! - `RUST_LOG`: Log level (default: info)
//!
//! # Example
//!
//! ```bash
//! export ATHENA_OUTPUT_LOCATION=s3://datalake-results/athena/
//! export ATHENA_DATABASE=datalake_raw
//! export API_PORT=8000
//! cargo run --bin api
//! ```

use std::sync::Arc;

use lakeflow_api::{create_router, serve, AppState};
use lakeflow_query::athena::AthenaEngine;
use lakeflow_query::gateway::{GatewayConfig, QueryGateway};
use tracing::{info, Level};
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

    info!("🚀 Analytics API starting...");

    // Load configuration
    let config = GatewayConfig::from_env()?;
    let api_port = std::env::var("API_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    info!("Configuration:");
    info!("  Database: {}", config.database);
    info!("  Output location: {}", config.output_location);
    info!("  Workgroup: {}", config.workgroup);
    info!("  Port: {}", api_port);

    // Build the engine and gateway
    let engine = Arc::new(AthenaEngine::from_env(&config.workgroup).await);
    let gateway = Arc::new(QueryGateway::new(engine, config));
    info!("✓ Query gateway initialized");

    let router = create_router(AppState { gateway });

    serve(router, api_port).await?;
    Ok(())
}
