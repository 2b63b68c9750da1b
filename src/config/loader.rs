// src/config/loader.rs

use crate::config::{AppConfig, ConfigValidator};
use crate::error::{AppError, Result};
use secrecy::Secret;
use std::path::Path;
use tracing::{debug, info};

pub const REDIS_ADDR_ENV: &str = "REDIS_ADDR";
pub const REDIS_PASSWORD_ENV: &str = "REDIS_PASSWORD";

/// Load configuration from file or environment variables
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut config = if config_path.exists() {
        info!("Loading configuration from file: {}", config_path.display());
        load_from_file(config_path)?
    } else {
        info!("Configuration file not found, using defaults");
        AppConfig::default()
    };

    override_with_env(&mut config);

    ConfigValidator::validate(&config)?;

    debug!("Configuration loaded and validated successfully");
    Ok(config)
}

fn load_from_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AppError::ConfigNotFound {
            path: config_path.display().to_string(),
        },
        _ => e.into(),
    })?;

    if content.trim().is_empty() {
        debug!("Configuration file is empty, using defaults");
        return Ok(AppConfig::default());
    }

    Ok(serde_yaml::from_str(&content)?)
}

fn override_with_env(config: &mut AppConfig) {
    // An empty REDIS_ADDR counts as unset.
    match std::env::var(REDIS_ADDR_ENV) {
        Ok(addr) if !addr.trim().is_empty() => {
            info!(redis.addr = %addr.trim(), "Overriding Redis address from environment variable");
            config.redis.addr = addr.trim().to_string();
        }
        _ => {}
    }

    if let Ok(password) = std::env::var(REDIS_PASSWORD_ENV) {
        if !password.is_empty() {
            info!("Overriding Redis password from environment variable");
            config.redis.password = Some(Secret::new(password));
        }
    }
}
