pub mod ledger;
pub mod models;

pub use ledger::{LedgerError, TripLedger};
pub use models::{DriveStats, DriveType, MonthlySummary, TripRecord, TripRequest};
