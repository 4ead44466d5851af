use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub eia: EiaConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Origins allowed by the CORS layer
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database path (default: "./data/drive_cost.db")
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// EIA open-data API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EiaConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_eia_base_url")]
    pub base_url: String,
    #[serde(default = "default_eia_timeout")]
    pub timeout_seconds: u64,
    /// Region code -> EIA series identifier
    #[serde(default = "default_series")]
    pub series: HashMap<String, String>,
}

impl Default for EiaConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_eia_base_url(),
            timeout_seconds: default_eia_timeout(),
            series: default_series(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_database_path() -> String {
    "./data/drive_cost.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_eia_base_url() -> String {
    "https://api.eia.gov".to_string()
}

fn default_eia_timeout() -> u64 {
    30
}

fn default_series() -> HashMap<String, String> {
    HashMap::from([("NC".to_string(), "EMM_EPMR_PTE_R10_DPG".to_string())])
}

/// Load configuration from `path` (optional) layered with `DRIVE_COST__*` environment variables.
///
/// `EIA_API_KEY` is honoured as the lowest-priority source for `eia.api_key`.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .set_default("eia.api_key", std::env::var("EIA_API_KEY").unwrap_or_default())?
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("DRIVE_COST").separator("__"))
        .build()?;

    let mut cfg: Config = config.try_deserialize()?;
    normalize_series(&mut cfg.eia);
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Region keys may arrive lowercased from environment sources
fn normalize_series(eia: &mut EiaConfig) {
    eia.series = std::mem::take(&mut eia.series)
        .into_iter()
        .map(|(region, series_id)| (region.trim().to_ascii_uppercase(), series_id.trim().to_string()))
        .collect();
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    if cfg.database.max_connections == 0 {
        anyhow::bail!("Database max_connections must be at least 1");
    }

    if cfg.eia.api_key.trim().is_empty() {
        anyhow::bail!("EIA API key must be configured (eia.api_key or EIA_API_KEY)");
    }

    if cfg.eia.series.is_empty() {
        anyhow::bail!("At least one region series mapping must be configured");
    }

    for (region, series_id) in &cfg.eia.series {
        if !is_region_code(region) {
            anyhow::bail!(
                "Region '{}' must be a two-letter uppercase code",
                region
            );
        }
        if series_id.trim().is_empty() {
            anyhow::bail!("Series id for region '{}' cannot be empty", region);
        }
    }

    Ok(())
}

fn is_region_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())
}
