// src/config/app.rs

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};

/// Logical database holding proxy address -> remaining uses.
pub const DEFAULT_PROXY_DB: i64 = 2;
/// Logical database holding cached email validation results.
pub const DEFAULT_EMAIL_DB: i64 = 4;
/// Logical database holding flagged domains.
pub const DEFAULT_DOMAIN_DB: i64 = 5;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub redis: RedisConfig,
}

/// Connection settings shared by the three logical databases.
#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    /// `host:port`, or a full `redis://` / `rediss://` URL.
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default)]
    pub password: Option<Secret<String>>,
    #[serde(default = "default_proxy_db")]
    pub proxy_db: i64,
    #[serde(default = "default_email_db")]
    pub email_db: i64,
    #[serde(default = "default_domain_db")]
    pub domain_db: i64,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: usize,
    /// Decrement a proxy's counter when it is handed out instead of
    /// rewriting it unchanged.
    #[serde(default)]
    pub consume_quota: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            password: None,
            proxy_db: default_proxy_db(),
            email_db: default_email_db(),
            domain_db: default_domain_db(),
            pool_max_size: default_pool_max_size(),
            consume_quota: false,
        }
    }
}

impl RedisConfig {
    /// Build the connection URL for one logical database.
    ///
    /// The database index always comes from the argument, even when `addr`
    /// already carries a path.
    pub fn connection_url(&self, db: i64) -> Result<String> {
        let base = if self.addr.contains("://") {
            self.addr.clone()
        } else {
            format!("redis://{}", self.addr)
        };

        let mut url = Url::parse(&base).map_err(|e| {
            AppError::config_validation(
                format!("Invalid Redis address '{}': {e}", self.addr),
                Some("redis.addr"),
            )
        })?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(AppError::config_validation(
                format!("Redis address '{}' has no host", self.addr),
                Some("redis.addr"),
            ));
        }

        url.set_path(&format!("/{db}"));
        if let Some(password) = &self.password {
            url.set_password(Some(password.expose_secret()))
                .map_err(|()| {
                    AppError::config_validation(
                        "Redis password cannot be set on this address",
                        Some("redis.password"),
                    )
                })?;
        }
        Ok(url.to_string())
    }
}

// Default value functions
pub(crate) fn default_addr() -> String {
    "0.0.0.0:6379".to_string()
}

fn default_proxy_db() -> i64 {
    DEFAULT_PROXY_DB
}

fn default_email_db() -> i64 {
    DEFAULT_EMAIL_DB
}

fn default_domain_db() -> i64 {
    DEFAULT_DOMAIN_DB
}

fn default_pool_max_size() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_logical_databases() {
        let config = RedisConfig::default();
        assert_eq!(config.addr, "0.0.0.0:6379");
        assert_eq!(
            (config.proxy_db, config.email_db, config.domain_db),
            (2, 4, 5)
        );
        assert!(!config.consume_quota);
    }

    #[test]
    fn connection_url_from_host_port() {
        let config = RedisConfig::default();
        assert_eq!(
            config.connection_url(4).unwrap(),
            "redis://0.0.0.0:6379/4"
        );
    }

    #[test]
    fn connection_url_replaces_existing_db() {
        let config = RedisConfig {
            addr: "redis://cache.internal:6380/0".to_string(),
            ..RedisConfig::default()
        };
        assert_eq!(
            config.connection_url(5).unwrap(),
            "redis://cache.internal:6380/5"
        );
    }

    #[test]
    fn connection_url_with_password() {
        let config = RedisConfig {
            addr: "localhost:6379".to_string(),
            password: Some(Secret::new("secret".to_string())),
            ..RedisConfig::default()
        };
        assert_eq!(
            config.connection_url(2).unwrap(),
            "redis://:secret@localhost:6379/2"
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let config = RedisConfig {
            password: Some(Secret::new("hunter2".to_string())),
            ..RedisConfig::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
