use async_trait::async_trait;
use serde_json::Value;

/// How many times an optimistic transaction re-reads and retries after
/// losing a compare-and-swap race before giving up.
const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// A document as read from the store: its JSON value plus the version the
/// backend will check on a conditional write.
#[derive(Debug, Clone)]
pub struct VersionedRecord {
    pub value: Value,
    pub version: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("transaction on record '{0}' lost too many races")]
    TransactionConflict(String),

    #[error("record store backend error: {0}")]
    Backend(String),
}

/// Shared document store with per-key atomic read-modify-write.
///
/// This is the only shared mutable resource in the system: cache entries and
/// rate-limit counters both live here, and all coordination correctness is
/// derived from `put_if` being an atomic compare-and-swap on the record's
/// version.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read a single record, with its current version.
    async fn get(&self, key: &str) -> Result<Option<VersionedRecord>, RecordStoreError>;

    /// Conditionally write a record.
    ///
    /// `expected` is the version observed by a prior `get`; `None` means the
    /// record must not exist yet (insert-if-absent). Returns `false` when the
    /// record changed underneath the caller and nothing was written.
    async fn put_if(
        &self,
        key: &str,
        expected: Option<i64>,
        value: Value,
    ) -> Result<bool, RecordStoreError>;

    /// Unconditionally merge top-level fields into a record, creating it if
    /// absent. Explicit `null` fields overwrite (used to clear lock state).
    /// Last write wins; callers that need exclusion must use `put_if`.
    async fn merge(&self, key: &str, value: Value) -> Result<(), RecordStoreError>;
}

/// Run an optimistic read-modify-write transaction against a single record.
///
/// The decision closure is synchronous and pure: it sees the current value
/// (if any) and returns what to write (or `None` for a read-only outcome)
/// plus the result handed back to the caller. The slow external work a caller
/// performs after the transaction never happens inside it.
///
/// On a CAS loss the record is re-read and the closure re-run, up to
/// `MAX_TRANSACTION_ATTEMPTS` times; exhaustion surfaces as
/// `TransactionConflict`. With a backend whose `put_if` is atomic this makes
/// each committed transaction linearizable with respect to other transactions
/// on the same key.
pub async fn run_transaction<T, F>(
    store: &dyn RecordStore,
    key: &str,
    mut decide: F,
) -> Result<T, RecordStoreError>
where
    F: FnMut(Option<&Value>) -> (Option<Value>, T) + Send,
    T: Send,
{
    for attempt in 0..MAX_TRANSACTION_ATTEMPTS {
        let current = store.get(key).await?;
        let (write, outcome) = decide(current.as_ref().map(|r| &r.value));

        let value = match write {
            // Read-only decision commits trivially
            None => return Ok(outcome),
            Some(value) => value,
        };

        let expected = current.map(|r| r.version);
        if store.put_if(key, expected, value).await? {
            return Ok(outcome);
        }

        tracing::debug!(
            key = %key,
            attempt = attempt + 1,
            "Record transaction lost compare-and-swap race, retrying"
        );
    }

    Err(RecordStoreError::TransactionConflict(key.to_string()))
}
