// src/storage/mod.rs

pub mod memory;
pub mod records;
#[cfg(feature = "redis")]
pub mod redis;
pub mod traits;

pub use memory::InMemoryStore;
pub use records::{parse_quota_counter, EmailRecord, Proxy};
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
pub use traits::{EmailCacheStore, FlaggedDomainStore, Liveness, ProxyQuotaStore};
