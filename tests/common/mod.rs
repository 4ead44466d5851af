#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use drive_cost::price::{
    MemoryPriceStore, PriceError, PriceProvider, PriceStore, RegionPrice, SeriesObservation,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Provider that replays a scripted outcome and counts calls
pub struct MockProvider {
    outcome: Mutex<Result<f64, PriceError>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn returning(value: f64) -> Self {
        Self::with_outcome(Ok(value))
    }

    pub fn failing(error: PriceError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<f64, PriceError>) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn set_outcome(&self, outcome: Result<f64, PriceError>) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_series(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    async fn latest_observation(&self, series_id: &str) -> Result<SeriesObservation, PriceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(series_id.to_string());
        let outcome = self.outcome.lock().unwrap().clone();
        outcome.map(|value| SeriesObservation {
            series_id: series_id.to_string(),
            period: Some("2025-03-03".to_string()),
            value,
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// In-memory store that counts reads and writes
pub struct CountingStore {
    inner: MemoryPriceStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
    written: Mutex<Vec<f64>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryPriceStore::new(),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            written: Mutex::new(Vec::new()),
        }
    }

    /// Seed an entry without counting it as a write
    pub async fn seed(&self, region: &str, price: f64, observed_at: DateTime<Utc>) {
        self.inner
            .upsert(&RegionPrice::new(region, price, observed_at))
            .await
            .unwrap();
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Prices in the order they were upserted
    pub fn written_prices(&self) -> Vec<f64> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceStore for CountingStore {
    async fn get(&self, region_code: &str) -> Result<Option<RegionPrice>, PriceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(region_code).await
    }

    async fn upsert(&self, price: &RegionPrice) -> Result<(), PriceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.written.lock().unwrap().push(price.price);
        self.inner.upsert(price).await
    }
}

pub fn nc_series() -> HashMap<String, String> {
    HashMap::from([("NC".to_string(), "EMM_EPMR_PTE_R10_DPG".to_string())])
}
