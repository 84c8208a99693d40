//! HTTP handlers.
//!
//! Every query endpoint returns the uniform [`QueryResponse`] envelope.
//! Engine-side failures (syntax errors, timeouts) come back as HTTP 200
//! with `success: false`; only request-level problems map to 4xx.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::{error, info};

use crate::models::{CustomQueryRequest, ErrorResponse, QueryResponse};
use crate::queries::{self, QueryParams};
use crate::validate;
use crate::AppState;

/// GET / - service banner
pub async fn service_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "Datalake Analytics API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /health - probes the engine with a trivial query
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match state.gateway.execute("SELECT 1 AS test", None).await {
        Ok(_) => Ok(Json(serde_json::json!({
            "status": "healthy",
            "engine_connection": "ok",
            "timestamp": Utc::now().to_rfc3339(),
        }))),
        Err(e) => {
            error!("health check failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// GET /api/queries/list - predefined query names
pub async fn list_queries() -> Json<serde_json::Value> {
    let names = queries::names();
    Json(serde_json::json!({
        "total_queries": names.len(),
        "queries": names,
    }))
}

/// GET /api/queries/:name - execute a predefined query
pub async fn run_predefined(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(entry) = queries::lookup(&name) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("unknown query '{}'", name),
            }),
        ));
    };

    let sql = entry.render(params);
    info!(query = %name, "running predefined query");

    match state.gateway.execute(&sql, None).await {
        Ok(outcome) => Ok(Json(QueryResponse::ok(outcome.records, outcome.elapsed_ms))),
        Err(e) => {
            error!(query = %name, "predefined query failed: {}", e);
            Ok(Json(QueryResponse::failed(e.to_string())))
        }
    }
}

/// POST /api/query/custom - execute a caller-supplied read-only query
pub async fn custom_query(
    State(state): State<AppState>,
    Json(request): Json<CustomQueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(keyword) = validate::check_read_only(&request.query) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "Keyword '{}' not allowed. Read-only (SELECT) queries only",
                    keyword
                ),
            }),
        ));
    }

    info!(database = %request.database, "running custom query");
    match state
        .gateway
        .execute(&request.query, Some(&request.database))
        .await
    {
        Ok(outcome) => Ok(Json(QueryResponse::ok(outcome.records, outcome.elapsed_ms))),
        Err(e) => {
            error!("custom query failed: {}", e);
            Ok(Json(QueryResponse::failed(e.to_string())))
        }
    }
}
