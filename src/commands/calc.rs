use anyhow::Result;
use colored::Colorize;
use drive_cost::calculator::{calculate_trip_cost, TripInput};
use drive_cost::{config, db, server};
use std::path::Path;

pub struct CalcArgs {
    pub miles: f64,
    pub mpg_city: f64,
    pub mpg_highway: f64,
    pub highway_percent: f64,
    pub state: String,
    pub price: Option<f64>,
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn validate(args: &CalcArgs) -> Result<()> {
    if !(0.0..=100.0).contains(&args.highway_percent) {
        anyhow::bail!("highway percent must be between 0 and 100");
    }
    if ![args.miles, args.mpg_city, args.mpg_highway].into_iter().all(is_positive) {
        anyhow::bail!("miles and mpg values must be positive numbers");
    }
    if let Some(price) = args.price {
        if !is_positive(price) {
            anyhow::bail!("gas price must be a positive number");
        }
    }
    Ok(())
}

/// Execute the calc command
///
/// With `--price` no configuration or database is touched.
pub async fn execute(config_path: &Path, args: CalcArgs) -> Result<()> {
    validate(&args)?;

    let input = TripInput {
        distance: args.miles,
        city_economy: args.mpg_city,
        highway_economy: args.mpg_highway,
        highway_fraction: args.highway_percent,
        region_code: args.state.trim().to_ascii_uppercase(),
    };

    let price = match args.price {
        Some(price) => price,
        None => {
            let cfg = config::load_config(config_path)?;
            let pool = db::connect(&cfg.database).await?;
            let state = server::build_state(&cfg, pool)?;
            state.resolver.resolve_price(&input.region_code).await?
        }
    };

    let result = calculate_trip_cost(&input, price);

    println!("{}", "Trip cost".bold());
    println!("  {}: {:.1} mpg", "Blended economy".bold(), result.blended_economy);
    println!("  {}: {:.2} gal", "Fuel used".bold(), result.volume_consumed);
    println!("  {}: ${:.3}/gal ({})", "Gas price".bold(), result.unit_price, input.region_code);
    println!("  {}: ${:.2}", "Total cost".bold(), result.total_cost);

    Ok(())
}
