//! Blended fuel-cost calculation.
//!
//! Economy is a rate (distance per volume), so the city/highway mix is a
//! harmonic blend weighted by the share of distance driven in each condition.

use serde::{Deserialize, Serialize};

/// Trip parameters for one calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripInput {
    pub distance: f64,
    pub city_economy: f64,
    pub highway_economy: f64,
    /// Percent of the distance driven at highway conditions, in [0, 100]
    pub highway_fraction: f64,
    pub region_code: String,
}

/// Outcome of a calculation, serialized with the public API field names
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    #[serde(rename = "blended_mpg")]
    pub blended_economy: f64,
    #[serde(rename = "gallons_used")]
    pub volume_consumed: f64,
    pub total_cost: f64,
    #[serde(rename = "gas_price")]
    pub unit_price: f64,
}

impl CostResult {
    /// False when a degenerate input produced an unbounded or undefined figure
    pub fn is_finite(&self) -> bool {
        self.blended_economy.is_finite()
            && self.volume_consumed.is_finite()
            && self.total_cost.is_finite()
    }
}

/// Compute blended economy, volume consumed and total cost for a trip.
///
/// Inputs are not re-validated here. A zero blended economy yields an
/// infinite volume; callers check [`CostResult::is_finite`].
pub fn calculate_trip_cost(trip: &TripInput, unit_price: f64) -> CostResult {
    let city_share = (100.0 - trip.highway_fraction) / 100.0;
    let highway_share = trip.highway_fraction / 100.0;

    let blended_economy = if city_share + highway_share == 0.0 {
        0.0
    } else {
        1.0 / (city_share / trip.city_economy + highway_share / trip.highway_economy)
    };

    let volume_consumed = trip.distance / blended_economy;
    let total_cost = volume_consumed * unit_price;

    CostResult {
        blended_economy: round_to(blended_economy, 1),
        volume_consumed: round_to(volume_consumed, 2),
        total_cost: round_to(total_cost, 2),
        unit_price,
    }
}

/// Round to `places` decimals, ties to even on the exact binary value.
///
/// Decimal formatting is exact, so `3.125` becomes `3.12` while `2.675`
/// (stored as 2.67499..) becomes `2.67`.
fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}
