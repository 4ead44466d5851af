use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use drive_cost::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // The server initializes tracing itself once the configured level is known
    let command = args.get_command();
    if !matches!(command, cli::Commands::Start) {
        init_tracing("warn");
    }

    match command {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Price { region } => {
            commands::price::execute(&args.config, &region).await?;
        }
        cli::Commands::Calc {
            miles,
            mpg_city,
            mpg_highway,
            highway_percent,
            state,
            price,
        } => {
            let calc_args = commands::calc::CalcArgs {
                miles,
                mpg_city,
                mpg_highway,
                highway_percent,
                state,
                price,
            };
            commands::calc::execute(&args.config, calc_args).await?;
        }
        cli::Commands::Version => {
            println!("Drive Cost v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
