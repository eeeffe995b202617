use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::records::{run_transaction, RecordStore, RecordStoreError};

/// Lifecycle state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Generating,
    Ready,
    Failed,
}

/// Logical request fields stored alongside the entry. Kept for observability
/// and collision auditing only; lookup is by fingerprint alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub voice_id: String,
    pub story_id: String,
    pub page_index: u32,
    pub lang: String,
    pub text_digest: String,
}

/// Persisted record tracking the lifecycle of work for one fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub status: EntryStatus,
    /// Epoch millis; meaningful only while `status == Generating`.
    pub lock_expires_at: Option<i64>,
    /// Object-store path of the produced audio; present iff `status == Ready`.
    pub result_location: Option<String>,
    /// Failure reason; present only when `status == Failed`.
    pub error_detail: Option<String>,
    pub metadata: EntryMetadata,
    /// Epoch millis, advanced on every transition.
    pub updated_at: i64,
}

/// What a caller should do after asking to work on a fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// Result already produced; serve it, no work allowed.
    Ready { result_location: String },
    /// Another worker holds a live lock; poll again after the hint.
    Wait { retry_hint_ms: u64 },
    /// Caller is the sole worker until the lock expires or it publishes.
    Granted,
}

/// Owns the cache-entry state machine.
///
/// Mutual exclusion is enforced purely by the record transaction in `claim`:
/// no in-process lock is held, and a worker that never publishes is healed by
/// the next claim after its lock expires.
pub struct NarrationCoordinator {
    store: Arc<dyn RecordStore>,
    lock_duration: Duration,
    retry_hint: Duration,
}

impl NarrationCoordinator {
    pub fn new(store: Arc<dyn RecordStore>, lock_duration: Duration, retry_hint: Duration) -> Self {
        Self {
            store,
            lock_duration,
            retry_hint,
        }
    }

    /// Decide, in one atomic transaction, whether the caller serves the cached
    /// result, waits for another worker, or becomes the worker itself.
    ///
    /// Decision table per entry state:
    /// - absent → create `Generating` with a fresh lock, `Granted`
    /// - `Ready` → `Ready` (idempotent, never transitions)
    /// - `Generating`, lock still live → `Wait`
    /// - `Failed`, `Generating` past its lock, or `Ready` missing its
    ///   result location → re-claim, `Granted`
    pub async fn claim(
        &self,
        cache_key: &str,
        metadata: &EntryMetadata,
    ) -> Result<ClaimOutcome, RecordStoreError> {
        let lock_ms = self.lock_duration.as_millis() as i64;
        let retry_hint_ms = self.retry_hint.as_millis() as u64;

        let outcome = run_transaction(self.store.as_ref(), cache_key, |current| {
            let now = Utc::now().timestamp_millis();

            // A record that does not parse as a cache entry is treated like an
            // abandoned one and overwritten
            let entry = current.and_then(parse_entry);

            match entry {
                Some(CacheEntry {
                    status: EntryStatus::Ready,
                    result_location: Some(result_location),
                    ..
                }) if !result_location.is_empty() => {
                    (None, ClaimOutcome::Ready { result_location })
                }
                Some(entry)
                    if entry.status == EntryStatus::Generating
                        && entry.lock_expires_at.is_some_and(|at| at > now) =>
                {
                    (None, ClaimOutcome::Wait { retry_hint_ms })
                }
                // Absent, Failed, Generating with an expired lock, or Ready
                // with no usable result location: the caller repairs the
                // entry and takes the work
                _ => {
                    let claimed = CacheEntry {
                        status: EntryStatus::Generating,
                        lock_expires_at: Some(now + lock_ms),
                        result_location: None,
                        error_detail: None,
                        metadata: metadata.clone(),
                        updated_at: now,
                    };
                    (Some(to_record(&claimed)), ClaimOutcome::Granted)
                }
            }
        })
        .await?;

        tracing::debug!(
            cache_key = %cache_key,
            outcome = ?outcome,
            "Cache claim decided"
        );

        Ok(outcome)
    }

    /// Mark the entry `Ready` with the produced artifact's location.
    ///
    /// A plain merge write: lock-holder identity is not re-validated, so two
    /// holders racing past an expired lock resolve as last-write-wins.
    pub async fn publish_success(
        &self,
        cache_key: &str,
        result_location: &str,
    ) -> Result<(), RecordStoreError> {
        let patch = json!({
            "status": EntryStatus::Ready,
            "result_location": result_location,
            "lock_expires_at": Value::Null,
            "error_detail": Value::Null,
            "updated_at": Utc::now().timestamp_millis(),
        });
        self.store.merge(cache_key, patch).await
    }

    /// Mark the entry `Failed` with a human-readable reason. The entry stays
    /// reclaimable by the next claim, so a failure never poisons a key.
    pub async fn publish_failure(
        &self,
        cache_key: &str,
        reason: &str,
    ) -> Result<(), RecordStoreError> {
        let patch = json!({
            "status": EntryStatus::Failed,
            "result_location": Value::Null,
            "lock_expires_at": Value::Null,
            "error_detail": reason,
            "updated_at": Utc::now().timestamp_millis(),
        });
        self.store.merge(cache_key, patch).await
    }
}

fn parse_entry(value: &Value) -> Option<CacheEntry> {
    serde_json::from_value(value.clone()).ok()
}

fn to_record(entry: &CacheEntry) -> Value {
    // CacheEntry is a plain data struct; serialization cannot fail
    serde_json::to_value(entry).unwrap_or(Value::Null)
}
