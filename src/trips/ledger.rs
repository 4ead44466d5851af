use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::calculator::CostResult;
use crate::trips::models::{DriveStats, DriveType, MonthlySummary, TripRecord, TripRequest};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Entry not found: {0}")]
    NotFound(i64),

    #[error("Invalid month '{0}', expected an ISO date such as 2025-03-01")]
    InvalidMonth(String),

    #[error("Corrupt trip row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const TRIP_COLUMNS: &str = "id, miles, mpg_city, mpg_highway, highway_percent, state_code, \
     blended_mpg, gallons_used, total_cost, gas_price, calculated_at, drive_type, reason, start_time";

/// Persistence and reporting for calculated trips (`calculations` table)
pub struct TripLedger {
    pool: SqlitePool,
}

impl TripLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        trip: &TripRequest,
        result: &CostResult,
    ) -> Result<TripRecord, LedgerError> {
        let calculated_at = Utc::now().timestamp_millis();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO calculations (
                miles, mpg_city, mpg_highway, highway_percent, state_code,
                blended_mpg, gallons_used, total_cost, gas_price, calculated_at,
                drive_type, reason, start_time
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            TRIP_COLUMNS
        ))
        .bind(trip.miles)
        .bind(trip.mpg_city)
        .bind(trip.mpg_highway)
        .bind(trip.highway_percent)
        .bind(&trip.state_code)
        .bind(result.blended_economy)
        .bind(result.volume_consumed)
        .bind(result.total_cost)
        .bind(result.unit_price)
        .bind(calculated_at)
        .bind(trip.drive_type.as_str())
        .bind(&trip.reason)
        .bind(trip.start_time.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        let record = trip_from_row(&row)?;
        debug!(id = record.id, state = %record.state_code, "Stored trip calculation");
        Ok(record)
    }

    /// Trips ordered newest calculation first
    pub async fn history(&self, limit: Option<u32>) -> Result<Vec<TripRecord>, LedgerError> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM calculations ORDER BY calculated_at DESC, id DESC LIMIT ?",
            TRIP_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(trip_from_row).collect()
    }

    /// Overwrite a trip with a fresh calculation
    pub async fn update(
        &self,
        id: i64,
        trip: &TripRequest,
        result: &CostResult,
    ) -> Result<TripRecord, LedgerError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE calculations
            SET
                miles = ?,
                mpg_city = ?,
                mpg_highway = ?,
                highway_percent = ?,
                state_code = ?,
                drive_type = ?,
                reason = ?,
                start_time = ?,
                blended_mpg = ?,
                gallons_used = ?,
                total_cost = ?,
                gas_price = ?,
                calculated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            TRIP_COLUMNS
        ))
        .bind(trip.miles)
        .bind(trip.mpg_city)
        .bind(trip.mpg_highway)
        .bind(trip.highway_percent)
        .bind(&trip.state_code)
        .bind(trip.drive_type.as_str())
        .bind(&trip.reason)
        .bind(trip.start_time.timestamp_millis())
        .bind(result.blended_economy)
        .bind(result.volume_consumed)
        .bind(result.total_cost)
        .bind(result.unit_price)
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(LedgerError::NotFound(id))?;
        info!(id, "Updated trip entry");
        trip_from_row(&row)
    }

    pub async fn delete(&self, id: i64) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM calculations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound(id));
        }

        info!(id, "Deleted trip entry");
        Ok(())
    }

    pub async fn stats(&self) -> Result<DriveStats, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(id) AS num_drives,
                CAST(COALESCE(SUM(total_cost), 0) AS REAL) AS sum_costs,
                CAST(COALESCE(AVG(total_cost), 0) AS REAL) AS avg_cost,
                CAST(COALESCE(SUM(miles), 0) AS REAL) AS total_miles,
                COUNT(CASE WHEN drive_type = 'required' THEN 1 END) AS required_drives_count,
                CAST(COALESCE(AVG(blended_mpg), 0) AS REAL) AS overall_efficiency,
                CAST(COALESCE(AVG(gas_price), 0) AS REAL) AS avg_gas_price,
                SUM(CASE WHEN drive_type = 'required' THEN total_cost END) AS required_drives_cost,
                SUM(CASE WHEN drive_type = 'recreational' THEN total_cost END) AS recreational_drives_cost
            FROM calculations
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DriveStats {
            num_drives: row.try_get("num_drives")?,
            sum_costs: row.try_get("sum_costs")?,
            avg_cost: row.try_get("avg_cost")?,
            total_miles: row.try_get("total_miles")?,
            required_drives_count: row.try_get("required_drives_count")?,
            overall_efficiency: row.try_get("overall_efficiency")?,
            avg_gas_price: row.try_get("avg_gas_price")?,
            required_drives_cost: row.try_get("required_drives_cost")?,
            recreational_drives_cost: row.try_get("recreational_drives_cost")?,
        })
    }

    /// Distinct months of `start_time`, newest first
    pub async fn available_months(&self) -> Result<Vec<String>, LedgerError> {
        let months = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT strftime('%Y-%m-01T00:00:00', start_time / 1000, 'unixepoch') AS month
            FROM calculations
            ORDER BY month DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(months)
    }

    /// Summaries for `month` and the month before it, or for every month when `month` is None
    pub async fn monthly_summary(
        &self,
        month: Option<&str>,
    ) -> Result<Vec<MonthlySummary>, LedgerError> {
        let Some(month) = month else {
            return self.all_months().await;
        };

        let target = parse_month(month)?;
        let previous = previous_month(target);

        let rows = sqlx::query(
            r#"
            SELECT
                strftime('%Y-%m-01T00:00:00', start_time / 1000, 'unixepoch') AS month,
                COUNT(*) AS trip_count,
                CAST(SUM(total_cost) AS REAL) AS total_spent,
                CAST(AVG(total_cost) AS REAL) AS avg_cost,
                CAST(SUM(miles) AS REAL) AS total_miles,
                COUNT(CASE WHEN drive_type = 'required' THEN 1 END) AS required_drives_count,
                SUM(CASE WHEN drive_type = 'required' THEN total_cost END) AS required_drives_cost,
                SUM(CASE WHEN drive_type = 'recreational' THEN total_cost END) AS recreational_drives_cost
            FROM calculations
            WHERE strftime('%Y-%m', start_time / 1000, 'unixepoch') IN (?, ?)
            GROUP BY month
            ORDER BY month DESC
            "#,
        )
        .bind(target.format("%Y-%m").to_string())
        .bind(previous.format("%Y-%m").to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<MonthlySummary, LedgerError> {
                Ok(MonthlySummary {
                    month: row.try_get("month")?,
                    trip_count: row.try_get("trip_count")?,
                    total_spent: row.try_get("total_spent")?,
                    avg_cost: row.try_get("avg_cost")?,
                    total_miles: row.try_get("total_miles")?,
                    required_drives_count: Some(row.try_get("required_drives_count")?),
                    required_drives_cost: row.try_get("required_drives_cost")?,
                    recreational_drives_cost: row.try_get("recreational_drives_cost")?,
                })
            })
            .collect()
    }

    async fn all_months(&self) -> Result<Vec<MonthlySummary>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT
                strftime('%Y-%m-01T00:00:00', start_time / 1000, 'unixepoch') AS month,
                COUNT(*) AS trip_count,
                CAST(SUM(total_cost) AS REAL) AS total_spent,
                CAST(AVG(total_cost) AS REAL) AS avg_cost,
                CAST(SUM(miles) AS REAL) AS total_miles
            FROM calculations
            GROUP BY month
            ORDER BY month DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<MonthlySummary, LedgerError> {
                Ok(MonthlySummary {
                    month: row.try_get("month")?,
                    trip_count: row.try_get("trip_count")?,
                    total_spent: row.try_get("total_spent")?,
                    avg_cost: row.try_get("avg_cost")?,
                    total_miles: row.try_get("total_miles")?,
                    required_drives_count: None,
                    required_drives_cost: None,
                    recreational_drives_cost: None,
                })
            })
            .collect()
    }

    pub async fn ping(&self) -> Result<(), LedgerError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

fn trip_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TripRecord, LedgerError> {
    let drive_type: String = row.try_get("drive_type")?;
    let drive_type = drive_type.parse::<DriveType>().map_err(LedgerError::Corrupt)?;

    Ok(TripRecord {
        id: row.try_get("id")?,
        miles: row.try_get("miles")?,
        mpg_city: row.try_get("mpg_city")?,
        mpg_highway: row.try_get("mpg_highway")?,
        highway_percent: row.try_get("highway_percent")?,
        state_code: row.try_get("state_code")?,
        blended_mpg: row.try_get("blended_mpg")?,
        gallons_used: row.try_get("gallons_used")?,
        total_cost: row.try_get("total_cost")?,
        gas_price: row.try_get("gas_price")?,
        calculated_at: millis_to_datetime(row.try_get("calculated_at")?)?,
        drive_type,
        reason: row.try_get("reason")?,
        start_time: millis_to_datetime(row.try_get("start_time")?)?,
    })
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, LedgerError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| LedgerError::Corrupt(format!("timestamp out of range: {}", millis)))
}

/// Accepts "2025-03", "2025-03-01", "2025-03-01T00:00:00" and RFC 3339 (including a trailing Z).
/// Returns the first day of the month.
fn parse_month(value: &str) -> Result<NaiveDate, LedgerError> {
    let value = value.trim();
    let date = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok())
        .ok_or_else(|| LedgerError::InvalidMonth(value.to_string()))?;

    date.with_day(1)
        .ok_or_else(|| LedgerError::InvalidMonth(value.to_string()))
}

fn previous_month(first_of_month: NaiveDate) -> NaiveDate {
    first_of_month
        .pred_opt()
        .and_then(|d| d.with_day(1))
        .unwrap_or(first_of_month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_trip_cost;
    use chrono::TimeZone;

    async fn ledger() -> TripLedger {
        TripLedger::new(crate::db::memory_pool().await.unwrap())
    }

    fn request(miles: f64, drive_type: DriveType, start: DateTime<Utc>) -> TripRequest {
        TripRequest {
            miles,
            mpg_city: 20.0,
            mpg_highway: 30.0,
            highway_percent: 50.0,
            state_code: "NC".to_string(),
            drive_type,
            reason: "groceries".to_string(),
            start_time: start,
        }
    }

    async fn store(ledger: &TripLedger, trip: &TripRequest, price: f64) -> TripRecord {
        let result = calculate_trip_cost(&trip.trip_input(), price);
        ledger.insert(trip, &result).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_history() {
        let ledger = ledger().await;
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 8, 30, 0).unwrap();

        let first = store(&ledger, &request(100.0, DriveType::Required, start), 3.0).await;
        let second = store(&ledger, &request(50.0, DriveType::Recreational, start), 3.0).await;

        assert_eq!(first.total_cost, 12.5);
        assert_eq!(first.blended_mpg, 24.0);
        assert_eq!(first.start_time, start);
        assert_eq!(second.drive_type, DriveType::Recreational);

        let history = ledger.history(None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);

        let limited = ledger.history(Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_update_recalculates() {
        let ledger = ledger().await;
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 8, 30, 0).unwrap();
        let record = store(&ledger, &request(100.0, DriveType::Required, start), 3.0).await;

        let edited = request(200.0, DriveType::Recreational, start);
        let result = calculate_trip_cost(&edited.trip_input(), 3.0);
        let updated = ledger.update(record.id, &edited, &result).await.unwrap();

        assert_eq!(updated.id, record.id);
        assert_eq!(updated.miles, 200.0);
        assert_eq!(updated.total_cost, 25.0);
        assert_eq!(updated.drive_type, DriveType::Recreational);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_entry() {
        let ledger = ledger().await;
        let trip = request(10.0, DriveType::Required, Utc::now());
        let result = calculate_trip_cost(&trip.trip_input(), 3.0);

        assert!(matches!(
            ledger.update(42, &trip, &result).await,
            Err(LedgerError::NotFound(42))
        ));
        assert!(matches!(ledger.delete(42).await, Err(LedgerError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let ledger = ledger().await;
        let record = store(&ledger, &request(10.0, DriveType::Required, Utc::now()), 3.0).await;

        ledger.delete(record.id).await.unwrap();
        assert!(ledger.history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_empty_and_populated() {
        let ledger = ledger().await;

        let empty = ledger.stats().await.unwrap();
        assert_eq!(empty.num_drives, 0);
        assert_eq!(empty.sum_costs, 0.0);
        assert_eq!(empty.required_drives_cost, None);

        let start = Utc.with_ymd_and_hms(2025, 3, 4, 8, 30, 0).unwrap();
        store(&ledger, &request(100.0, DriveType::Required, start), 3.0).await;
        store(&ledger, &request(200.0, DriveType::Recreational, start), 3.0).await;

        let stats = ledger.stats().await.unwrap();
        assert_eq!(stats.num_drives, 2);
        assert_eq!(stats.sum_costs, 37.5);
        assert_eq!(stats.avg_cost, 18.75);
        assert_eq!(stats.total_miles, 300.0);
        assert_eq!(stats.required_drives_count, 1);
        assert_eq!(stats.overall_efficiency, 24.0);
        assert_eq!(stats.avg_gas_price, 3.0);
        assert_eq!(stats.required_drives_cost, Some(12.5));
        assert_eq!(stats.recreational_drives_cost, Some(25.0));
    }

    #[tokio::test]
    async fn test_months_and_summaries() {
        let ledger = ledger().await;
        let jan = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2025, 2, 3, 9, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();

        store(&ledger, &request(100.0, DriveType::Required, jan), 3.0).await;
        store(&ledger, &request(100.0, DriveType::Required, feb), 3.0).await;
        store(&ledger, &request(200.0, DriveType::Recreational, feb), 3.0).await;
        store(&ledger, &request(100.0, DriveType::Required, mar), 3.0).await;

        let months = ledger.available_months().await.unwrap();
        assert_eq!(
            months,
            vec!["2025-03-01T00:00:00", "2025-02-01T00:00:00", "2025-01-01T00:00:00"]
        );

        let all = ledger.monthly_summary(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].trip_count, 2);
        assert_eq!(all[1].total_spent, 37.5);
        assert_eq!(all[1].required_drives_count, None);

        let pair = ledger
            .monthly_summary(Some("2025-02-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].month, "2025-02-01T00:00:00");
        assert_eq!(pair[0].required_drives_count, Some(1));
        assert_eq!(pair[0].recreational_drives_cost, Some(25.0));
        assert_eq!(pair[1].month, "2025-01-01T00:00:00");
        assert_eq!(pair[1].recreational_drives_cost, None);
    }

    #[test]
    fn test_parse_month_formats() {
        let march = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(parse_month("2025-03").unwrap(), march);
        assert_eq!(parse_month("2025-03-17").unwrap(), march);
        assert_eq!(parse_month("2025-03-17T10:00:00").unwrap(), march);
        assert_eq!(parse_month("2025-03-01T00:00:00Z").unwrap(), march);
        assert!(matches!(parse_month("March"), Err(LedgerError::InvalidMonth(_))));
    }

    #[test]
    fn test_previous_month_crosses_year() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(previous_month(jan), NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    }
}
