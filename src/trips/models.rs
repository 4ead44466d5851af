use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calculator::TripInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveType {
    #[default]
    Required,
    Recreational,
}

impl DriveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveType::Required => "required",
            DriveType::Recreational => "recreational",
        }
    }
}

impl fmt::Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(DriveType::Required),
            "recreational" => Ok(DriveType::Recreational),
            other => Err(format!("unknown drive type: {}", other)),
        }
    }
}

/// Trip as submitted to the calculate and update endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub miles: f64,
    pub mpg_city: f64,
    pub mpg_highway: f64,
    pub highway_percent: f64,
    pub state_code: String,
    #[serde(default)]
    pub drive_type: DriveType,
    #[serde(default)]
    pub reason: String,
    pub start_time: DateTime<Utc>,
}

impl TripRequest {
    /// Check ranges and normalize the state code to upper case.
    pub fn validate(mut self) -> Result<Self, String> {
        if !(self.miles.is_finite() && self.miles > 0.0) {
            return Err("miles must be a positive number".to_string());
        }
        if !(self.mpg_city.is_finite() && self.mpg_city > 0.0) {
            return Err("mpg_city must be a positive number".to_string());
        }
        if !(self.mpg_highway.is_finite() && self.mpg_highway > 0.0) {
            return Err("mpg_highway must be a positive number".to_string());
        }
        if !(0.0..=100.0).contains(&self.highway_percent) {
            return Err("highway_percent must be between 0 and 100".to_string());
        }

        let state_code = self.state_code.trim();
        if state_code.len() != 2 || !state_code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("state_code must be a two-letter code, got '{}'", self.state_code));
        }
        self.state_code = state_code.to_ascii_uppercase();

        Ok(self)
    }

    pub fn trip_input(&self) -> TripInput {
        TripInput {
            distance: self.miles,
            city_economy: self.mpg_city,
            highway_economy: self.mpg_highway,
            highway_fraction: self.highway_percent,
            region_code: self.state_code.clone(),
        }
    }
}

/// A persisted trip calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: i64,
    pub miles: f64,
    pub mpg_city: f64,
    pub mpg_highway: f64,
    pub highway_percent: f64,
    pub state_code: String,
    pub blended_mpg: f64,
    pub gallons_used: f64,
    pub total_cost: f64,
    pub gas_price: f64,
    pub calculated_at: DateTime<Utc>,
    pub drive_type: DriveType,
    pub reason: String,
    pub start_time: DateTime<Utc>,
}

/// Aggregates over every stored trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveStats {
    pub num_drives: i64,
    pub sum_costs: f64,
    pub avg_cost: f64,
    pub total_miles: f64,
    pub required_drives_count: i64,
    pub overall_efficiency: f64,
    pub avg_gas_price: f64,
    pub required_drives_cost: Option<f64>,
    pub recreational_drives_cost: Option<f64>,
}

/// Per-month aggregates; the drive-type breakdown is only filled for single-month queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// First instant of the month, e.g. "2025-03-01T00:00:00"
    pub month: String,
    pub trip_count: i64,
    pub total_spent: f64,
    pub avg_cost: f64,
    pub total_miles: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_drives_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_drives_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recreational_drives_cost: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TripRequest {
        serde_json::from_value(serde_json::json!({
            "miles": 100.0,
            "mpg_city": 20,
            "mpg_highway": 30,
            "highway_percent": 50,
            "state_code": "nc",
            "start_time": "2025-03-04T08:30:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = request();
        assert_eq!(req.drive_type, DriveType::Required);
        assert_eq!(req.reason, "");
        assert_eq!(req.mpg_city, 20.0);
    }

    #[test]
    fn test_validate_normalizes_state_code() {
        let req = request().validate().unwrap();
        assert_eq!(req.state_code, "NC");
        assert_eq!(req.trip_input().region_code, "NC");
        assert_eq!(req.trip_input().highway_fraction, 50.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut req = request();
        req.highway_percent = 100.5;
        assert!(req.validate().unwrap_err().contains("highway_percent"));

        let mut req = request();
        req.miles = 0.0;
        assert!(req.validate().unwrap_err().contains("miles"));

        let mut req = request();
        req.mpg_highway = -3.0;
        assert!(req.validate().unwrap_err().contains("mpg_highway"));

        let mut req = request();
        req.state_code = "N1".to_string();
        assert!(req.validate().unwrap_err().contains("state_code"));
    }

    #[test]
    fn test_drive_type_parsing() {
        assert_eq!("recreational".parse::<DriveType>().unwrap(), DriveType::Recreational);
        assert!("commute".parse::<DriveType>().is_err());
        assert_eq!(DriveType::Required.to_string(), "required");
    }
}
