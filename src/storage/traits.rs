// src/storage/traits.rs

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Lightweight reachability check
#[async_trait]
pub trait Liveness: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// Proxy address -> remaining uses
#[async_trait]
pub trait ProxyQuotaStore: Send + Sync {
    /// All proxy addresses currently known to the store
    async fn proxy_addresses(&self) -> Result<Vec<String>>;

    /// Atomically check that `addr` has a positive integer counter and claim it.
    ///
    /// Returns the counter observed at claim time, or `None` when the key is
    /// missing, not an integer, or not positive. Whether the counter is
    /// decremented depends on the store's quota mode.
    async fn claim_quota(&self, addr: &str) -> Result<Option<i64>>;
}

/// Email -> serialized validation result
#[async_trait]
pub trait EmailCacheStore: Liveness {
    async fn get_email(&self, email: &str) -> Result<Option<String>>;

    /// Overwrite the entry for `email`. `None` stores without expiry.
    async fn put_email(&self, email: &str, payload: &str, ttl: Option<Duration>) -> Result<()>;
}

/// Domain -> any value; presence means flagged
#[async_trait]
pub trait FlaggedDomainStore: Send + Sync {
    async fn domain_value(&self, domain: &str) -> Result<Option<String>>;
}
