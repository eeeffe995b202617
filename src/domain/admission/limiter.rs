use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::records::{run_transaction, RecordStore, RecordStoreError};

/// Fixed-window counter persisted per (identity, action).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RateCounter {
    count: u32,
    /// Epoch millis at which the window rolls over.
    window_reset_at: i64,
}

/// Outcome of an admission check. Rejection is terminal for the call and maps
/// to its own HTTP status, distinct from every other failure kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected { retry_after_ms: u64 },
}

/// Fixed-window rate limiter over the shared record store.
///
/// Same atomic-transaction shape as the cache coordinator, applied to a
/// per-caller counter instead of a cache entry: read, roll the window if it
/// has elapsed, otherwise increment or reject.
pub struct RateLimiter {
    store: Arc<dyn RecordStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn admit(
        &self,
        identity: &str,
        action: &str,
        window: Duration,
        max_count: u32,
    ) -> Result<Admission, RecordStoreError> {
        let key = format!("rate:{}:{}", identity, action);
        let window_ms = window.as_millis() as i64;

        let admission = run_transaction(self.store.as_ref(), &key, |current| {
            let now = Utc::now().timestamp_millis();
            let counter = current.and_then(parse_counter);

            match counter {
                // Live window with headroom: count the request
                Some(counter) if counter.window_reset_at > now && counter.count < max_count => {
                    let next = RateCounter {
                        count: counter.count + 1,
                        window_reset_at: counter.window_reset_at,
                    };
                    (Some(to_record(&next)), Admission::Allowed)
                }
                // Live window at capacity: reject until the window rolls over
                Some(counter) if counter.window_reset_at > now => {
                    let retry_after_ms = (counter.window_reset_at - now).max(0) as u64;
                    (None, Admission::Rejected { retry_after_ms })
                }
                // Absent, expired, or unparseable: start a fresh window
                _ => {
                    let fresh = RateCounter {
                        count: 1,
                        window_reset_at: now + window_ms,
                    };
                    (Some(to_record(&fresh)), Admission::Allowed)
                }
            }
        })
        .await?;

        if let Admission::Rejected { retry_after_ms } = admission {
            tracing::warn!(
                identity = %identity,
                action = %action,
                retry_after_ms = retry_after_ms,
                "Request rejected by rate limiter"
            );
        }

        Ok(admission)
    }
}

fn parse_counter(value: &Value) -> Option<RateCounter> {
    serde_json::from_value(value.clone()).ok()
}

fn to_record(counter: &RateCounter) -> Value {
    serde_json::to_value(counter).unwrap_or(Value::Null)
}
