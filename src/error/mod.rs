//! Error handling for the store layer
//!
//! Every fallible operation returns [`Result`]. Backend failures are passed
//! through as [`AppError::RedisConnection`] / [`AppError::RedisOperation`]
//! without retries or extra wrapping; the only error that is treated as fatal
//! at runtime is a failed startup ping ([`AppError::Connection`]).

pub mod types;

use thiserror::Error;
use tracing::{error, warn};

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String, line: Option<usize> },

    // Startup
    #[error("Failed to connect to Redis: {message}")]
    Connection { message: String },

    // Storage errors
    #[error("Redis connection failed: {message}")]
    RedisConnection { message: String },

    #[error("Redis operation failed: {operation} - {message}")]
    RedisOperation { operation: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO operation failed: {operation} - {message}")]
    Io { operation: String, message: String },
}

impl AppError {
    /// Create a new configuration validation error
    pub fn config_validation(message: impl Into<String>, field: Option<impl Into<String>>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            field: field.map(Into::into),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn redis_operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RedisOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Short machine-friendly category name, used as a log field
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigValidation { .. } | Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => {
                "configuration"
            }
            Self::Connection { .. } => "connection",
            Self::RedisConnection { .. } | Self::RedisOperation { .. } => "storage",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
        }
    }

    /// Errors the process cannot continue after: bad configuration or a
    /// backend that failed its startup ping.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigValidation { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigParse { .. }
                | Self::Connection { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        if self.is_fatal() {
            error!(error = %self, error.category = self.category(), "Fatal error occurred");
        } else {
            warn!(error = %self, error.category = self.category(), "Operation failed");
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_fatal() {
        let err = AppError::Connection {
            message: "connection refused".to_string(),
        };
        assert!(err.is_fatal());
        assert_eq!(err.category(), "connection");
        assert_eq!(err.to_string(), "Failed to connect to Redis: connection refused");
    }

    #[test]
    fn backend_errors_are_not_fatal() {
        let err = AppError::redis_operation("GET", "timeout");
        assert!(!err.is_fatal());
        assert_eq!(err.category(), "storage");
        assert_eq!(err.to_string(), "Redis operation failed: GET - timeout");
    }

    #[test]
    fn config_validation_keeps_field() {
        let err = AppError::config_validation("must not be empty", Some("redis.addr"));
        match err {
            AppError::ConfigValidation { field, .. } => {
                assert_eq!(field.as_deref(), Some("redis.addr"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
