//! API models for REST endpoints

use lakeflow_query::materialize::ResultRecord;
use serde::{Deserialize, Serialize};

/// Uniform envelope returned by every query endpoint.
///
/// Execution failures are reported in-band (`success: false` plus `error`);
/// only request-level problems (unknown query name, rejected custom query)
/// surface as non-200 statuses.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ResultRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn ok(data: Vec<ResultRecord>, execution_time_ms: u64) -> Self {
        Self {
            success: true,
            rows_count: Some(data.len()),
            data: Some(data),
            execution_time_ms: Some(execution_time_ms),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            data: None,
            rows_count: None,
            execution_time_ms: None,
            error: Some(error),
        }
    }
}

/// Body for `POST /api/query/custom`.
#[derive(Debug, Deserialize)]
pub struct CustomQueryRequest {
    pub query: String,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    "datalake_raw".to_string()
}

/// Request-level error body (4xx responses).
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response for `GET /api/queries/list`.
#[derive(Debug, Serialize)]
pub struct QueryCatalogResponse {
    pub queries: Vec<String>,
}
