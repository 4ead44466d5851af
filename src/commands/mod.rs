//! Command implementations for the CLI
//!
//! - start: Start the HTTP server
//! - test: Test configuration validity
//! - price: Resolve the gas price for one region
//! - calc: Calculate a single trip cost

pub mod calc;
pub mod price;
pub mod start;
