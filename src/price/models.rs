use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a cached price may be reused before it must be re-fetched.
pub const FRESHNESS_WINDOW_HOURS: i64 = 24;

pub fn freshness_window() -> Duration {
    Duration::hours(FRESHNESS_WINDOW_HOURS)
}

/// Cached fuel price for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPrice {
    pub region_code: String,
    /// Currency per unit volume (USD per gallon for EIA series)
    pub price: f64,
    /// Time of the fetch that produced `price`
    pub observed_at: DateTime<Utc>,
}

impl RegionPrice {
    pub fn new(region_code: impl Into<String>, price: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            region_code: region_code.into(),
            price,
            observed_at,
        }
    }

    /// A record is fresh while `now - observed_at` is strictly below the window.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.observed_at) < freshness_window()
    }
}

/// Latest observation of a provider series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesObservation {
    pub series_id: String,
    /// Reporting period as given by the provider, e.g. "2025-01-06"
    pub period: Option<String>,
    pub value: f64,
}
