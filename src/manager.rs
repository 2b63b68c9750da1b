// src/manager.rs

use crate::error::{AppError, Result};
use crate::storage::{EmailCacheStore, EmailRecord, FlaggedDomainStore, Proxy, ProxyQuotaStore};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "redis")]
use crate::config::RedisConfig;
#[cfg(feature = "redis")]
use crate::storage::RedisStore;

const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Access to the proxy quota, email cache and flagged-domain databases.
///
/// The proxy list is snapshotted once at construction and never refreshed;
/// proxies added to or removed from the backend afterwards are not seen.
#[derive(Clone)]
pub struct Manager {
    proxies: Arc<dyn ProxyQuotaStore>,
    emails: Arc<dyn EmailCacheStore>,
    domains: Arc<dyn FlaggedDomainStore>,
    proxy_list: Arc<[String]>,
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("proxy_count", &self.proxy_list.len())
            .finish_non_exhaustive()
    }
}

impl Manager {
    /// Connect to the three logical databases described by `config`.
    ///
    /// Only the email database is pinged; the other two surface connection
    /// problems on first use.
    #[cfg(feature = "redis")]
    #[instrument(skip(config), fields(redis.addr = %config.addr), name = "manager_connect")]
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let emails = RedisStore::new(config, config.email_db)?;
        let proxies = RedisStore::new(config, config.proxy_db)?;
        let domains = RedisStore::new(config, config.domain_db)?;

        Self::from_stores(Arc::new(proxies), Arc::new(emails), Arc::new(domains)).await
    }

    /// Build a manager over arbitrary store implementations.
    ///
    /// Fails with [`AppError::Connection`] if the email store does not answer
    /// a ping. A failure to list proxies is logged and leaves the list empty.
    pub async fn from_stores(
        proxies: Arc<dyn ProxyQuotaStore>,
        emails: Arc<dyn EmailCacheStore>,
        domains: Arc<dyn FlaggedDomainStore>,
    ) -> Result<Self> {
        emails.ping().await.map_err(|e| AppError::Connection {
            message: e.to_string(),
        })?;

        let proxy_list: Vec<String> = match proxies.proxy_addresses().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list fast proxies, starting with an empty list");
                Vec::new()
            }
        };
        info!(proxy.count = proxy_list.len(), "Total fast proxy count");

        Ok(Self {
            proxies,
            emails,
            domains,
            proxy_list: proxy_list.into(),
        })
    }

    /// The proxy addresses snapshotted at construction
    pub fn proxy_list(&self) -> &[String] {
        &self.proxy_list
    }

    /// Pick a random proxy that still has quota.
    ///
    /// Makes at most one claim attempt per cached proxy, drawing with
    /// replacement, so some proxies may not be tried at all. Returns
    /// `Ok(None)` when nothing with a positive counter was found. A backend
    /// error on one attempt does not stop the search; only when every attempt
    /// failed is the last error returned.
    #[instrument(level = "debug", skip(self))]
    pub async fn fast_proxy(&self) -> Result<Option<Proxy>> {
        let mut last_error = None;
        let mut answered = false;

        for attempt in 0..self.proxy_list.len() {
            let Some(addr) = self.proxy_list.choose(&mut rand::thread_rng()).cloned() else {
                break;
            };

            match self.proxies.claim_quota(&addr).await {
                Ok(Some(counter)) => {
                    debug!(proxy.addr = %addr, proxy.counter = counter, attempt, "Selected proxy");
                    return Ok(Some(Proxy { addr, counter }));
                }
                Ok(None) => answered = true,
                Err(e) => {
                    warn!(proxy.addr = %addr, error = %e, attempt, "Failed to read proxy quota");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e),
            _ => {
                debug!("No proxy with remaining quota found");
                Ok(None)
            }
        }
    }

    /// Cache a validation result for `lifetime_hours`. Non-positive lifetimes
    /// store the entry without expiry.
    #[instrument(level = "debug", skip(self))]
    pub async fn save_email(&self, email: &str, status: i8, lifetime_hours: i16) -> Result<()> {
        let payload = EmailRecord::now(status)?.encode()?;
        let ttl = u64::try_from(lifetime_hours)
            .ok()
            .filter(|hours| *hours > 0)
            .map(|hours| Duration::from_secs(hours * SECONDS_PER_HOUR));

        self.emails.put_email(email, &payload, ttl).await
    }

    /// Cached status for `email`, `None` if nothing is cached.
    #[instrument(level = "debug", skip(self))]
    pub async fn check_email(&self, email: &str) -> Result<Option<i8>> {
        Ok(self.email_record(email).await?.map(|record| record.status))
    }

    /// Full cached record for `email`, including when it was stored
    pub async fn email_record(&self, email: &str) -> Result<Option<EmailRecord>> {
        match self.emails.get_email(email).await? {
            Some(raw) if !raw.is_empty() => EmailRecord::decode(&raw).map(Some),
            _ => Ok(None),
        }
    }

    /// Whether `domain` is in the flagged set. Backend errors are returned,
    /// not reported as "not flagged".
    #[instrument(level = "debug", skip(self))]
    pub async fn check_domain(&self, domain: &str) -> Result<bool> {
        let value = self.domains.domain_value(domain).await?;
        Ok(value.is_some_and(|v| !v.is_empty()))
    }
}
