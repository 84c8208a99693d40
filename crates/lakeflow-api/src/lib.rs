//! Datalake Analytics API
//!
//! HTTP/JSON surface over the analytical query gateway: a predefined query
//! catalog plus a guarded custom-query endpoint.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use lakeflow_query::gateway::QueryGateway;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod models;
pub mod queries;
pub mod validate;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<QueryGateway>,
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/queries/list", get(handlers::list_queries))
        .route("/queries/:name", get(handlers::run_predefined))
        .route("/query/custom", post(handlers::custom_query))
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Start the API server
pub async fn serve(router: Router, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Analytics API listening on {}", addr);
    tracing::info!("   Catalog: http://localhost:{}/api/queries/list", port);
    tracing::info!("   Health:  http://localhost:{}/health", port);

    axum::serve(listener, router).await?;
    Ok(())
}
