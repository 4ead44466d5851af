use async_trait::async_trait;
use chrono::DateTime;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::price::error::PriceError;
use crate::price::models::RegionPrice;

/// Storage for cached region prices.
///
/// Only two operations are required: read by key and upsert by key. Writes for
/// the same key are last-writer-wins.
#[async_trait]
pub trait PriceStore: Send + Sync {
    async fn get(&self, region_code: &str) -> Result<Option<RegionPrice>, PriceError>;

    /// Insert the record, or overwrite the existing one for the same region.
    async fn upsert(&self, price: &RegionPrice) -> Result<(), PriceError>;
}

/// SQLite-backed store using the `gas_prices` table
pub struct SqlitePriceStore {
    pool: SqlitePool,
}

impl SqlitePriceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceStore for SqlitePriceStore {
    async fn get(&self, region_code: &str) -> Result<Option<RegionPrice>, PriceError> {
        let row = sqlx::query("SELECT state, price, last_updated FROM gas_prices WHERE state = ?")
            .bind(region_code)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let last_updated: i64 = row.try_get("last_updated")?;
        let observed_at = DateTime::from_timestamp_millis(last_updated).ok_or_else(|| {
            PriceError::Store(format!(
                "invalid last_updated timestamp {} for region {}",
                last_updated, region_code
            ))
        })?;

        Ok(Some(RegionPrice {
            region_code: row.try_get("state")?,
            price: row.try_get("price")?,
            observed_at,
        }))
    }

    async fn upsert(&self, price: &RegionPrice) -> Result<(), PriceError> {
        sqlx::query(
            r#"
            INSERT INTO gas_prices (state, price, last_updated)
            VALUES (?, ?, ?)
            ON CONFLICT(state) DO UPDATE SET
                price = excluded.price,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&price.region_code)
        .bind(price.price)
        .bind(price.observed_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        debug!(region = %price.region_code, price = price.price, "Stored region price");
        Ok(())
    }
}

/// Process-local store for tests
#[derive(Default)]
pub struct MemoryPriceStore {
    prices: RwLock<HashMap<String, RegionPrice>>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `prices`
    pub fn with_prices(prices: impl IntoIterator<Item = RegionPrice>) -> Self {
        let prices = prices
            .into_iter()
            .map(|p| (p.region_code.clone(), p))
            .collect();
        Self {
            prices: RwLock::new(prices),
        }
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    async fn get(&self, region_code: &str) -> Result<Option<RegionPrice>, PriceError> {
        Ok(self.prices.read().await.get(region_code).cloned())
    }

    async fn upsert(&self, price: &RegionPrice) -> Result<(), PriceError> {
        self.prices
            .write()
            .await
            .insert(price.region_code.clone(), price.clone());
        Ok(())
    }
}
