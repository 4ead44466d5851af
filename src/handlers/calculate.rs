use axum::{extract::State, Json};
use tracing::info;

use crate::calculator::{calculate_trip_cost, CostResult};
use crate::error::AppError;
use crate::handlers::AppState;
use crate::metrics;
use crate::trips::TripRequest;

/// Validate the trip, resolve the regional price and compute the cost.
///
/// Shared by the calculate and update handlers.
pub(crate) async fn price_trip(
    state: &AppState,
    trip: TripRequest,
) -> Result<(TripRequest, CostResult), AppError> {
    let trip = trip.validate().map_err(AppError::InvalidInput)?;
    let input = trip.trip_input();

    let gas_price = state.resolver.resolve_price(&input.region_code).await?;
    let result = calculate_trip_cost(&input, gas_price);

    if !result.is_finite() {
        return Err(AppError::InvalidInput(
            "trip parameters produce an undefined fuel cost".to_string(),
        ));
    }

    metrics::record_calculation(&input.region_code);
    Ok((trip, result))
}

/// POST /api/calculate/
pub async fn calculate_drive_cost(
    State(state): State<AppState>,
    Json(trip): Json<TripRequest>,
) -> Result<Json<CostResult>, AppError> {
    let (trip, result) = price_trip(&state, trip).await?;
    let record = state.ledger.insert(&trip, &result).await?;

    info!(
        id = record.id,
        state = %record.state_code,
        miles = record.miles,
        total_cost = record.total_cost,
        "Calculated drive cost"
    );

    Ok(Json(result))
}
