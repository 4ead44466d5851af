pub mod eia;
pub mod error;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod store;

pub use eia::EiaClient;
pub use error::PriceError;
pub use models::{freshness_window, RegionPrice, SeriesObservation, FRESHNESS_WINDOW_HOURS};
pub use provider::PriceProvider;
pub use resolver::PriceResolver;
pub use store::{MemoryPriceStore, PriceStore, SqlitePriceStore};
