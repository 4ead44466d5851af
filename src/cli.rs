use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "drive-cost", version, about = "Drive cost calculator service")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default)
    Start,

    /// Test configuration file validity
    Test,

    /// Resolve the current gas price for a region
    Price {
        /// Two-letter region code, e.g. NC
        region: String,
    },

    /// Calculate the fuel cost of a single trip
    Calc {
        /// Trip distance in miles
        #[arg(long)]
        miles: f64,

        /// City fuel economy (mpg)
        #[arg(long)]
        mpg_city: f64,

        /// Highway fuel economy (mpg)
        #[arg(long)]
        mpg_highway: f64,

        /// Percent of the trip driven on the highway
        #[arg(long, default_value = "50")]
        highway_percent: f64,

        /// Region code used to resolve the gas price
        #[arg(long, default_value = "NC")]
        state: String,

        /// Use this gas price instead of resolving one
        #[arg(long)]
        price: Option<f64>,
    },

    /// Show version information
    Version,
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_start() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };

        assert!(matches!(cli.get_command(), Commands::Start));
    }

    #[test]
    fn test_cli_parsing_price() {
        let cli = Cli::try_parse_from(["drive-cost", "price", "NC"]).unwrap();

        match cli.get_command() {
            Commands::Price { region } => assert_eq!(region, "NC"),
            _ => panic!("Expected Price command"),
        }
    }

    #[test]
    fn test_cli_parsing_calc_defaults() {
        let cli = Cli::try_parse_from([
            "drive-cost",
            "calc",
            "--miles",
            "100",
            "--mpg-city",
            "20",
            "--mpg-highway",
            "30",
            "--config",
            "/etc/drive-cost.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/drive-cost.toml"));
        match cli.get_command() {
            Commands::Calc {
                miles,
                highway_percent,
                state,
                price,
                ..
            } => {
                assert_eq!(miles, 100.0);
                assert_eq!(highway_percent, 50.0);
                assert_eq!(state, "NC");
                assert!(price.is_none());
            }
            _ => panic!("Expected Calc command"),
        }
    }
}
