// src/storage/redis.rs

use crate::config::RedisConfig;
use crate::error::{AppError, Result};
use crate::storage::{
    parse_quota_counter, EmailCacheStore, FlaggedDomainStore, Liveness, ProxyQuotaStore,
};
use async_trait::async_trait;
use deadpool_redis::{Config as PoolSettings, Connection as RedisConnection, Pool, PoolConfig, Runtime};
use once_cell::sync::Lazy;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace};

/// Claims a proxy counter in one server-side step.
///
/// KEYS[1] is the proxy address, ARGV[1] is "1" to decrement on claim and "0"
/// to rewrite the value unchanged (which also clears any expiry). Only plain
/// positive decimals of at most 19 digits pass the guard, the same shape
/// [`parse_quota_counter`] accepts. The raw value seen before the claim is
/// returned so it is parsed as an i64 rather than a Lua double; nil means
/// missing, not an integer, or not positive.
static CLAIM_QUOTA_SCRIPT: Lazy<redis::Script> = Lazy::new(|| {
    redis::Script::new(
        r"
local raw = redis.call('GET', KEYS[1])
if not raw or #raw > 19 or not string.match(raw, '^[1-9]%d*$') then
    return false
end
if ARGV[1] == '1' then
    local reply = redis.pcall('DECR', KEYS[1])
    if type(reply) == 'table' and reply.err then
        return false
    end
else
    redis.call('SET', KEYS[1], raw)
end
return raw
",
    )
});

/// Redis implementation of one logical database
pub struct RedisStore {
    pool: Pool,
    db: i64,
    consume_quota: bool,
}

impl RedisStore {
    /// Create a pool for logical database `db`. No connection is opened until
    /// the first command.
    pub fn new(config: &RedisConfig, db: i64) -> Result<Self> {
        let url = config.connection_url(db)?;
        let mut settings = PoolSettings::from_url(url);
        settings.pool = Some(PoolConfig::new(config.pool_max_size));
        let pool = settings.create_pool(Some(Runtime::Tokio1))?;

        debug!(redis.db = db, pool.max_size = config.pool_max_size, "Created Redis pool");
        Ok(Self {
            pool,
            db,
            consume_quota: config.consume_quota,
        })
    }

    async fn get_connection(&self) -> Result<RedisConnection> {
        self.pool.get().await.map_err(Into::into)
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }
}

#[async_trait]
impl Liveness for RedisStore {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(AppError::redis_operation(
                "PING",
                format!("unexpected reply '{reply}'"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProxyQuotaStore for RedisStore {
    async fn proxy_addresses(&self) -> Result<Vec<String>> {
        trace!(redis.db = self.db, "RedisStore::proxy_addresses: start");
        let mut conn = self.get_connection().await?;
        let keys: Vec<String> = conn.keys("*").await?;
        trace!(redis.db = self.db, "RedisStore::proxy_addresses: found {} keys", keys.len());
        Ok(keys)
    }

    async fn claim_quota(&self, addr: &str) -> Result<Option<i64>> {
        let mut conn = self.get_connection().await?;
        let mode = if self.consume_quota { "1" } else { "0" };
        let raw: Option<String> = CLAIM_QUOTA_SCRIPT
            .key(addr)
            .arg(mode)
            .invoke_async(&mut conn)
            .await?;
        Ok(raw.as_deref().and_then(parse_quota_counter))
    }
}

#[async_trait]
impl EmailCacheStore for RedisStore {
    async fn get_email(&self, email: &str) -> Result<Option<String>> {
        self.get_string(email).await
    }

    async fn put_email(&self, email: &str, payload: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.get_connection().await?;
        match ttl {
            Some(ttl) => {
                let _: () = redis::cmd("SET")
                    .arg(email)
                    .arg(payload)
                    .arg("EX")
                    .arg(ttl.as_secs())
                    .query_async(&mut conn)
                    .await?;
            }
            None => {
                let _: () = conn.set(email, payload).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FlaggedDomainStore for RedisStore {
    async fn domain_value(&self, domain: &str) -> Result<Option<String>> {
        self.get_string(domain).await
    }
}
