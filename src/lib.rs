// src/lib.rs

//! Data access for a proxy-quota database, an email validation cache and a
//! flagged-domain set, all living in logical databases of one Redis server.

pub mod cli;
pub mod config;
pub mod error;
pub mod manager;
pub mod storage;

use std::path::PathBuf;
use tracing::info;

pub use cli::Cli;
pub use config::{AppConfig, RedisConfig};
pub use error::{AppError, Result};
pub use manager::Manager;
pub use storage::{EmailRecord, Proxy};

/// Configuration file path: the explicit override, else `config.yaml`.
pub fn config_path(config_path_override: Option<PathBuf>) -> PathBuf {
    config_path_override.unwrap_or_else(|| PathBuf::from("config.yaml"))
}

/// Load and validate configuration, logging where it came from.
pub fn setup_configuration(config_path_override: Option<PathBuf>) -> Result<AppConfig> {
    let path = config_path(config_path_override);
    let app_config = config::load_config(&path)?;

    info!(
        config.path = %path.display(),
        redis.addr = %app_config.redis.addr,
        redis.proxy_db = app_config.redis.proxy_db,
        redis.email_db = app_config.redis.email_db,
        redis.domain_db = app_config.redis.domain_db,
        "Configuration loaded and validated successfully."
    );
    Ok(app_config)
}

/// Resolve configuration, connect, and run one command.
///
/// Errors are returned without being logged; the caller reports them once.
#[cfg(feature = "redis")]
pub async fn run(cli: &Cli) -> Result<serde_json::Value> {
    let mut config = setup_configuration(cli.config.clone())?;
    if let Some(addr) = &cli.redis_addr {
        info!(redis.addr = %addr, "Overriding Redis address from command line");
        config.redis.addr = addr.clone();
        config::ConfigValidator::validate(&config)?;
    }

    let manager = Manager::connect(&config.redis).await?;
    cli.command.execute(&manager).await
}
