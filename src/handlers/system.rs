use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::handlers::AppState;

/// GET /api/health/
///
/// Healthy only when the database answers a trivial query
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state
        .ledger
        .ping()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Database connection failed: {}", e)))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "database": "connected",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    ))
}

/// GET /metrics
pub async fn metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}
