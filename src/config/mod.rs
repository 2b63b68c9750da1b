// src/config/mod.rs

pub mod app;
pub mod loader;
pub mod validation;

pub use app::{AppConfig, RedisConfig, DEFAULT_DOMAIN_DB, DEFAULT_EMAIL_DB, DEFAULT_PROXY_DB};
pub use loader::load_config;
pub use validation::ConfigValidator;
