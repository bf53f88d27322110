//! Configuration loader for the `envflow` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Pipeline parameters are resolved here once and
//! handed to the core as an explicit [`PipelineConfig`].
use std::env;

use anyhow::{anyhow, Result};
use envflow::{AnomalyMethod, PipelineConfig, Window};

/// Parse an optional numeric environment variable with a default value.
macro_rules! parse_env_num {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// TCP port the HTTP server binds on all interfaces.
    pub listen_port: u16,

    /// Resample window and anomaly rule for uploads.
    pub pipeline: PipelineConfig,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `LISTEN_PORT` – HTTP port (default: 8080)
/// - `RESAMPLE_WINDOW` – ingestion grid spacing, e.g. `30min`, `1h` (default: `1h`)
/// - `ANOMALY_METHOD` – `iqr` or `zscore` (default: `iqr`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_num!("DB_POOL_MAX", u32, 5);
    let listen_port = parse_env_num!("LISTEN_PORT", u16, 8080);

    let resample_window = match env::var("RESAMPLE_WINDOW") {
        Ok(v) => v
            .parse::<Window>()
            .map_err(|e| anyhow!("Invalid RESAMPLE_WINDOW: {}", e))?,
        Err(_) => Window::default(),
    };
    let anomaly_method = match env::var("ANOMALY_METHOD") {
        Ok(v) => v
            .parse::<AnomalyMethod>()
            .map_err(|e| anyhow!("Invalid ANOMALY_METHOD: {}", e))?,
        Err(_) => AnomalyMethod::default(),
    };

    Ok(Config {
        db_url,
        db_pool_max,
        listen_port,
        pipeline: PipelineConfig {
            resample_window,
            anomaly_method,
        },
    })
}

impl Config {
    /// Database URL with the password replaced by `****`.
    pub fn masked_db_url(&self) -> String {
        // ---
        if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                return format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                );
            }
        }
        self.db_url.clone()
    }

    /// Log the loaded configuration, masking the database password.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL    : {}", self.masked_db_url());
        tracing::info!("  DB_POOL_MAX     : {}", self.db_pool_max);
        tracing::info!("  LISTEN_PORT     : {}", self.listen_port);
        tracing::info!("  RESAMPLE_WINDOW : {}", self.pipeline.resample_window);
        tracing::info!("  ANOMALY_METHOD  : {:?}", self.pipeline.anomaly_method);
    }
}
