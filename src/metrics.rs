use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and register metric descriptions
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

fn init_metric_descriptions() {
    describe_counter!(
        "fuel_price_cache_total",
        "Gas price cache lookups by outcome (hit, miss, stale)"
    );
    describe_counter!(
        "fuel_price_fetch_total",
        "Gas price fetches from the upstream provider by result"
    );
    describe_histogram!(
        "fuel_price_fetch_duration_seconds",
        "Upstream gas price fetch duration in seconds"
    );
    describe_counter!(
        "trip_calculations_total",
        "Total number of trip cost calculations"
    );
    describe_gauge!("drive_cost_info", "Service version information");

    gauge!("drive_cost_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

pub fn record_cache_lookup(region: &str, outcome: &'static str) {
    counter!(
        "fuel_price_cache_total",
        "region" => region.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_fetch(region: &str, result: &'static str, duration: Duration) {
    counter!(
        "fuel_price_fetch_total",
        "region" => region.to_string(),
        "result" => result
    )
    .increment(1);

    histogram!(
        "fuel_price_fetch_duration_seconds",
        "region" => region.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_calculation(region: &str) {
    counter!("trip_calculations_total", "region" => region.to_string()).increment(1);
}
