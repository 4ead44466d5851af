//! Client for the EIA open-data API (weekly retail gasoline prices).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::EiaConfig;
use crate::logging::RedactedKey;
use crate::price::error::PriceError;
use crate::price::models::SeriesObservation;
use crate::price::provider::PriceProvider;

const DATA_PATH: &str = "/v2/petroleum/pri/gnd/data/";
const PRODUCT_FACET: &str = "EPMR";

#[derive(Debug, Deserialize)]
struct EiaEnvelope {
    #[serde(default)]
    response: Option<EiaResponse>,
}

#[derive(Debug, Deserialize)]
struct EiaResponse {
    #[serde(default)]
    data: Vec<EiaDataPoint>,
}

#[derive(Debug, Deserialize)]
struct EiaDataPoint {
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

pub struct EiaClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EiaClient {
    pub fn new(config: &EiaConfig) -> Result<Self, PriceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                PriceError::upstream_unavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn data_url(&self) -> String {
        format!("{}{}", self.base_url, DATA_PATH)
    }
}

#[async_trait]
impl PriceProvider for EiaClient {
    async fn latest_observation(&self, series_id: &str) -> Result<SeriesObservation, PriceError> {
        debug!(
            series = series_id,
            api_key = %RedactedKey::new(&self.api_key),
            "Requesting latest EIA observation"
        );

        let response = self
            .client
            .get(self.data_url())
            .query(&[
                ("frequency", "weekly"),
                ("data[0]", "value"),
                ("facets[product][]", PRODUCT_FACET),
                ("facets[series][]", series_id),
                ("sort[0][column]", "period"),
                ("sort[0][direction]", "desc"),
                ("api_key", self.api_key.as_str()),
                ("offset", "0"),
                ("length", "1"),
            ])
            .send()
            .await
            // The request URL carries the api key
            .map_err(|e| PriceError::upstream_unavailable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(series = series_id, status = %status, "EIA API returned an error status");
            return Err(PriceError::upstream_unavailable(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PriceError::upstream_unavailable(e.without_url().to_string()))?;

        parse_latest_observation(series_id, &body)
    }

    fn provider_name(&self) -> &str {
        "eia"
    }
}

/// Extract the first data point of an EIA response body.
pub fn parse_latest_observation(series_id: &str, body: &str) -> Result<SeriesObservation, PriceError> {
    let envelope: EiaEnvelope = serde_json::from_str(body).map_err(|e| {
        PriceError::upstream_data_invalid(format!("malformed response body: {}", e))
    })?;

    let point = envelope
        .response
        .and_then(|r| r.data.into_iter().next())
        .ok_or_else(|| PriceError::upstream_data_invalid("No recent gas price data was found"))?;

    let value = point
        .value
        .as_ref()
        .ok_or_else(|| PriceError::upstream_data_invalid("data point has no value"))
        .and_then(parse_price)?;

    Ok(SeriesObservation {
        series_id: series_id.to_string(),
        period: point.period,
        value,
    })
}

/// EIA reports values either as JSON numbers or numeric strings.
fn parse_price(value: &serde_json::Value) -> Result<f64, PriceError> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(PriceError::upstream_data_invalid(format!(
            "Invalid gas price data format: {}",
            value
        ))),
    }
}
