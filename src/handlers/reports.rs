use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::trips::{DriveStats, MonthlySummary};

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

/// GET /api/stats/
pub async fn get_drive_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<DriveStats>>, AppError> {
    let stats = state.ledger.stats().await?;
    Ok(Json(vec![stats]))
}

/// GET /api/available-months/
pub async fn get_available_months(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.ledger.available_months().await?))
}

/// GET /api/monthly-summary/
pub async fn get_monthly_summary(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<MonthlySummary>>, AppError> {
    let month = query.month.as_deref().filter(|m| !m.trim().is_empty());
    Ok(Json(state.ledger.monthly_summary(month).await?))
}

/// GET /api/monthly-data/
pub async fn get_monthly_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthlySummary>>, AppError> {
    Ok(Json(state.ledger.monthly_summary(None).await?))
}
