//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use mailcheck_store::{
    error::{AppError, Result},
    storage::{EmailCacheStore, FlaggedDomainStore, InMemoryStore, Liveness, ProxyQuotaStore},
    Manager,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The three logical databases behind a test manager
#[derive(Clone, Default)]
pub struct TestStores {
    pub proxies: InMemoryStore,
    pub emails: InMemoryStore,
    pub domains: InMemoryStore,
}

impl TestStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consuming() -> Self {
        Self {
            proxies: InMemoryStore::consuming(),
            ..Self::default()
        }
    }

    pub async fn with_proxy(self, addr: &str, counter: i64) -> Self {
        self.proxies.insert(addr, counter.to_string()).await;
        self
    }

    pub async fn manager(&self) -> Manager {
        Manager::from_stores(
            Arc::new(self.proxies.clone()),
            Arc::new(self.emails.clone()),
            Arc::new(self.domains.clone()),
        )
        .await
        .expect("in-memory stores are always reachable")
    }
}

/// Store whose every call fails like an unreachable backend
#[derive(Clone, Default)]
pub struct UnreachableStore;

fn unreachable_error() -> AppError {
    AppError::RedisConnection {
        message: "Connection refused (os error 111)".to_string(),
    }
}

#[async_trait]
impl Liveness for UnreachableStore {
    async fn ping(&self) -> Result<()> {
        Err(unreachable_error())
    }
}

#[async_trait]
impl ProxyQuotaStore for UnreachableStore {
    async fn proxy_addresses(&self) -> Result<Vec<String>> {
        Err(unreachable_error())
    }

    async fn claim_quota(&self, _addr: &str) -> Result<Option<i64>> {
        Err(unreachable_error())
    }
}

#[async_trait]
impl EmailCacheStore for UnreachableStore {
    async fn get_email(&self, _email: &str) -> Result<Option<String>> {
        Err(unreachable_error())
    }

    async fn put_email(&self, _email: &str, _payload: &str, _ttl: Option<Duration>) -> Result<()> {
        Err(unreachable_error())
    }
}

#[async_trait]
impl FlaggedDomainStore for UnreachableStore {
    async fn domain_value(&self, _domain: &str) -> Result<Option<String>> {
        Err(unreachable_error())
    }
}

/// Proxy store that counts claim attempts before delegating
pub struct CountingProxyStore {
    inner: InMemoryStore,
    claims: AtomicUsize,
}

impl CountingProxyStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            claims: AtomicUsize::new(0),
        }
    }

    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProxyQuotaStore for CountingProxyStore {
    async fn proxy_addresses(&self) -> Result<Vec<String>> {
        self.inner.proxy_addresses().await
    }

    async fn claim_quota(&self, addr: &str) -> Result<Option<i64>> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        self.inner.claim_quota(addr).await
    }
}
