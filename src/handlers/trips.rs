use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::handlers::{calculate::price_trip, AppState};
use crate::trips::{TripRecord, TripRequest};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// GET /api/history/
pub async fn get_calculation_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<TripRecord>>, AppError> {
    let history = state.ledger.history(query.limit).await?;
    Ok(Json(history))
}

/// PUT /api/update-entry/:entry_id
pub async fn update_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
    Json(trip): Json<TripRequest>,
) -> Result<Json<TripRecord>, AppError> {
    let (trip, result) = price_trip(&state, trip).await?;
    let record = state.ledger.update(entry_id, &trip, &result).await?;
    Ok(Json(record))
}

/// PUT /api/delete-entry/:entry_id
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    state.ledger.delete(entry_id).await?;
    Ok(Json(json!({
        "message": format!("Entry {} deleted successfully", entry_id)
    })))
}
