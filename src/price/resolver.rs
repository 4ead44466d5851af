use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::price::error::PriceError;
use crate::price::models::RegionPrice;
use crate::price::provider::PriceProvider;
use crate::price::store::PriceStore;

/// Resolves the current fuel price for a region, cache first.
///
/// A cached price younger than the freshness window is returned without
/// touching the provider. Otherwise the region is mapped to a provider series,
/// the latest observation is fetched and the cache entry is overwritten.
///
/// There is no cross-call locking: concurrent resolutions of the same stale
/// region may each fetch, and the last upsert wins.
pub struct PriceResolver {
    store: Arc<dyn PriceStore>,
    provider: Arc<dyn PriceProvider>,
    /// Region code -> provider series id
    series: HashMap<String, String>,
}

impl PriceResolver {
    pub fn new(
        store: Arc<dyn PriceStore>,
        provider: Arc<dyn PriceProvider>,
        series: HashMap<String, String>,
    ) -> Self {
        Self {
            store,
            provider,
            series,
        }
    }

    pub async fn resolve_price(&self, region_code: &str) -> Result<f64, PriceError> {
        self.resolve_price_at(region_code, Utc::now()).await
    }

    /// Resolve as if the current time were `now`.
    pub async fn resolve_price_at(
        &self,
        region_code: &str,
        now: DateTime<Utc>,
    ) -> Result<f64, PriceError> {
        // Cache is consulted before the series mapping on purpose: a fresh
        // entry for an unmapped region is still served.
        let cached = self.store.get(region_code).await?;
        match &cached {
            Some(entry) if entry.is_fresh_at(now) => {
                debug!(region = region_code, price = entry.price, "Gas price cache hit");
                metrics::record_cache_lookup(region_code, "hit");
                return Ok(entry.price);
            }
            Some(_) => metrics::record_cache_lookup(region_code, "stale"),
            None => metrics::record_cache_lookup(region_code, "miss"),
        }

        let series_id = self
            .series
            .get(region_code)
            .ok_or_else(|| PriceError::unsupported_region(region_code))?;

        info!(
            region = region_code,
            series = %series_id,
            provider = self.provider.provider_name(),
            stale = cached.is_some(),
            "Fetching newest price data"
        );

        let started = Instant::now();
        let observation = match self.provider.latest_observation(series_id).await {
            Ok(obs) => {
                metrics::record_fetch(region_code, "success", started.elapsed());
                obs
            }
            Err(e) => {
                metrics::record_fetch(region_code, e.kind(), started.elapsed());
                warn!(region = region_code, error = %e, "Gas price fetch failed");
                return Err(e);
            }
        };

        if !(observation.value.is_finite() && observation.value > 0.0) {
            let err = PriceError::upstream_data_invalid(format!(
                "Invalid gas price {} for series {}",
                observation.value, series_id
            ));
            warn!(region = region_code, error = %err, "Rejected provider price");
            return Err(err);
        }

        let entry = RegionPrice::new(region_code, observation.value, now);
        self.store.upsert(&entry).await?;

        info!(
            region = region_code,
            price = entry.price,
            period = observation.period.as_deref().unwrap_or("unknown"),
            "Gas price cache updated"
        );

        Ok(entry.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::models::SeriesObservation;
    use crate::price::store::MemoryPriceStore;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        value: f64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceProvider for FixedProvider {
        async fn latest_observation(&self, series_id: &str) -> Result<SeriesObservation, PriceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SeriesObservation {
                series_id: series_id.to_string(),
                period: Some("2025-01-06".to_string()),
                value: self.value,
            })
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    fn resolver_with(store: Arc<MemoryPriceStore>, provider: Arc<FixedProvider>) -> PriceResolver {
        let series = HashMap::from([("NC".to_string(), "EMM_EPMR_PTE_R10_DPG".to_string())]);
        PriceResolver::new(store, provider, series)
    }

    #[tokio::test]
    async fn test_miss_fetches_and_caches() {
        let store = Arc::new(MemoryPriceStore::new());
        let provider = Arc::new(FixedProvider { value: 3.05, calls: AtomicUsize::new(0) });
        let resolver = resolver_with(store.clone(), provider.clone());
        let now = Utc::now();

        let price = resolver.resolve_price_at("NC", now).await.unwrap();

        assert_eq!(price, 3.05);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let cached = store.get("NC").await.unwrap().unwrap();
        assert_eq!(cached.price, 3.05);
        assert_eq!(cached.observed_at, now);
    }

    #[tokio::test]
    async fn test_fresh_entry_for_unmapped_region_served_from_cache() {
        let now = Utc::now();
        let store = Arc::new(MemoryPriceStore::with_prices([RegionPrice::new(
            "TX",
            2.75,
            now - Duration::hours(1),
        )]));
        let provider = Arc::new(FixedProvider { value: 9.99, calls: AtomicUsize::new(0) });
        let resolver = resolver_with(store, provider.clone());

        assert_eq!(resolver.resolve_price_at("TX", now).await.unwrap(), 2.75);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
