use anyhow::Result;
use colored::Colorize;
use drive_cost::{config, db, server};
use std::path::Path;

/// Execute the price command
///
/// Resolves through the same cache and provider the server uses, so a
/// fresh cached value is printed without a network call.
pub async fn execute(config_path: &Path, region: &str) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let pool = db::connect(&cfg.database).await?;
    let state = server::build_state(&cfg, pool)?;

    let region = region.trim().to_ascii_uppercase();
    let price = state.resolver.resolve_price(&region).await?;

    println!("{}: ${:.3}/gal", region.bold(), price);
    Ok(())
}
