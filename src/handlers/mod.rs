pub mod calculate;
pub mod reports;
pub mod system;
pub mod trips;

use std::sync::Arc;

use crate::price::PriceResolver;
use crate::trips::TripLedger;

/// Shared state for the `/api` routes
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PriceResolver>,
    pub ledger: Arc<TripLedger>,
}
