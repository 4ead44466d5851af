use anyhow::Result;
use colored::Colorize;
use drive_cost::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration first so the configured log level applies, then
/// serves until shutdown.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting drive cost service...".green());

    let cfg = config::load_config(config_path)?;
    init_tracing(&cfg.server.log_level);

    info!(
        config = %config_path.display(),
        host = %cfg.server.host,
        port = cfg.server.port,
        "Configuration loaded"
    );

    server::start_server(cfg).await
}
