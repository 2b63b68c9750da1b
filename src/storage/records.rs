// src/storage/records.rs

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// A proxy handed out by [`Manager::fast_proxy`](crate::Manager::fast_proxy).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Proxy {
    pub addr: String,
    /// Remaining uses observed when the proxy was claimed.
    pub counter: i64,
}

/// Parse a stored proxy counter that can be claimed.
///
/// Accepts only plain positive decimals without sign, padding or leading
/// zeros, i.e. values Redis itself treats as integers. Anything else,
/// including `"5.0"`, `" 5"` and `"0x5"`, is not claimable.
pub fn parse_quota_counter(raw: &str) -> Option<i64> {
    let mut bytes = raw.bytes();
    let first = bytes.next()?;
    if !(b'1'..=b'9').contains(&first) || !bytes.all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Cached result of an email validation.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct EmailRecord {
    #[serde(rename = "validation_type")]
    pub status: i8,
    /// Epoch seconds at the time the result was cached.
    pub timestamp: i32,
}

impl EmailRecord {
    /// Record stamped with the current time.
    pub fn now(status: i8) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();
        let timestamp = i32::try_from(now)
            .map_err(|_| AppError::serialization(format!("Timestamp {now} does not fit in i32")))?;
        Ok(Self { status, timestamp })
    }

    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            AppError::serialization(format!("Failed to encode email record: {e}"))
        })
    }

    /// Decode a stored record. Some writers store Python-style dicts with
    /// single quotes, so those are rewritten to double quotes first.
    pub fn decode(raw: &str) -> Result<Self> {
        let normalized = raw.replace('\'', "\"");
        serde_json::from_str(&normalized).map_err(|e| {
            AppError::serialization(format!("Failed to decode email record: {e}"))
        })
    }
}
