// src/config/validation.rs

use crate::config::{AppConfig, RedisConfig};
use crate::error::{AppError, Result};
use tracing::{debug, warn};

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> Result<()> {
        debug!("Starting configuration validation");

        if let Err(e) = Self::validate_redis_config(&config.redis) {
            warn!("Redis config validation failed: {}", e);
            return Err(e);
        }

        debug!("Configuration validation completed successfully");
        Ok(())
    }

    fn validate_redis_config(redis: &RedisConfig) -> Result<()> {
        if redis.addr.trim().is_empty() {
            return Err(AppError::config_validation(
                "Redis address cannot be empty",
                Some("redis.addr"),
            ));
        }

        // Surfaces malformed addresses before any connection attempt.
        redis.connection_url(redis.email_db)?;

        let databases = [
            ("redis.proxy_db", redis.proxy_db),
            ("redis.email_db", redis.email_db),
            ("redis.domain_db", redis.domain_db),
        ];
        for (field, db) in databases {
            if db < 0 {
                return Err(AppError::config_validation(
                    format!("Database index must be non-negative, got {db}"),
                    Some(field),
                ));
            }
        }
        for (i, (field, db)) in databases.iter().enumerate() {
            if let Some((other, _)) = databases[..i].iter().find(|(_, d)| d == db) {
                return Err(AppError::config_validation(
                    format!("Database index {db} is already used by {other}"),
                    Some(*field),
                ));
            }
        }

        if redis.pool_max_size == 0 {
            return Err(AppError::config_validation(
                "Pool size must be greater than 0",
                Some("redis.pool_max_size"),
            ));
        }

        Ok(())
    }
}
