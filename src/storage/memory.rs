// src/storage/memory.rs

use crate::error::Result;
use crate::storage::{
    parse_quota_counter, EmailCacheStore, FlaggedDomainStore, Liveness, ProxyQuotaStore,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory implementation of one logical database.
///
/// Cloning shares the underlying map, so a test can keep a handle to seed or
/// inspect values after handing the store to a [`Manager`](crate::Manager).
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    consume_quota: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that decrements proxy counters when they are claimed
    pub fn consuming() -> Self {
        Self {
            consume_quota: true,
            ..Self::default()
        }
    }

    pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.insert_with_ttl(key, value, None).await;
    }

    pub async fn insert_with_ttl(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Option<Duration>,
    ) {
        let entry = Entry {
            value: value.into(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Raw live value for `key`
    pub async fn value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Remaining time to live, `None` for missing or persistent keys
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at - now)
    }
}

#[async_trait]
impl Liveness for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ProxyQuotaStore for InMemoryStore {
    async fn proxy_addresses(&self) -> Result<Vec<String>> {
        trace!("InMemoryStore::proxy_addresses: waiting for read lock");
        let now = Instant::now();
        let guard = self.entries.read().await;
        Ok(guard
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn claim_quota(&self, addr: &str) -> Result<Option<i64>> {
        trace!("InMemoryStore::claim_quota: waiting for write lock");
        let now = Instant::now();
        let mut guard = self.entries.write().await;
        trace!("InMemoryStore::claim_quota: got write lock");

        let Some(entry) = guard.get_mut(addr).filter(|entry| entry.is_live(now)) else {
            return Ok(None);
        };
        let Some(counter) = parse_quota_counter(&entry.value) else {
            return Ok(None);
        };

        if self.consume_quota {
            entry.value = (counter - 1).to_string();
        } else {
            // Rewriting the counter also drops any expiry, like a plain SET.
            entry.expires_at = None;
        }
        Ok(Some(counter))
    }
}

#[async_trait]
impl EmailCacheStore for InMemoryStore {
    async fn get_email(&self, email: &str) -> Result<Option<String>> {
        Ok(self.value(email).await)
    }

    async fn put_email(&self, email: &str, payload: &str, ttl: Option<Duration>) -> Result<()> {
        self.insert_with_ttl(email, payload, ttl).await;
        Ok(())
    }
}

#[async_trait]
impl FlaggedDomainStore for InMemoryStore {
    async fn domain_value(&self, domain: &str) -> Result<Option<String>> {
        Ok(self.value(domain).await)
    }
}
