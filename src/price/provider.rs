use async_trait::async_trait;

use crate::price::error::PriceError;
use crate::price::models::SeriesObservation;

/// Source of the latest value of a named price series.
///
/// Implementations classify failures into [`PriceError::UpstreamUnavailable`]
/// (transport) and [`PriceError::UpstreamDataInvalid`] (payload), and only
/// return observations whose value is a finite positive number.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn latest_observation(&self, series_id: &str) -> Result<SeriesObservation, PriceError>;

    fn provider_name(&self) -> &str;
}
