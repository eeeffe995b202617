use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::store::{RecordStore, RecordStoreError, VersionedRecord};

/// In-memory record store for tests and local development.
///
/// Per-key linearizability comes from the single mutex: `put_if` checks the
/// version and writes under one lock acquisition, which is the same atomic
/// compare-and-swap contract the Postgres implementation provides.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, VersionedRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedRecord>, RecordStoreError> {
        let records = self.records.lock().map_err(poisoned)?;
        Ok(records.get(key).cloned())
    }

    async fn put_if(
        &self,
        key: &str,
        expected: Option<i64>,
        value: Value,
    ) -> Result<bool, RecordStoreError> {
        let mut records = self.records.lock().map_err(poisoned)?;
        let current_version = records.get(key).map(|r| r.version);

        if current_version != expected {
            return Ok(false);
        }

        let version = current_version.unwrap_or(0) + 1;
        records.insert(key.to_string(), VersionedRecord { value, version });
        Ok(true)
    }

    async fn merge(&self, key: &str, value: Value) -> Result<(), RecordStoreError> {
        let mut records = self.records.lock().map_err(poisoned)?;

        match records.get_mut(key) {
            Some(record) => {
                merge_fields(&mut record.value, value);
                record.version += 1;
            }
            None => {
                records.insert(key.to_string(), VersionedRecord { value, version: 1 });
            }
        }
        Ok(())
    }
}

/// Top-level field merge, Firestore-style: incoming fields replace existing
/// ones (including explicit nulls), untouched fields survive.
fn merge_fields(target: &mut Value, incoming: Value) {
    match (target.as_object_mut(), incoming) {
        (Some(target_map), Value::Object(incoming_map)) => {
            for (field, value) in incoming_map {
                target_map.insert(field, value);
            }
        }
        (_, incoming) => *target = incoming,
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RecordStoreError {
    RecordStoreError::Backend("record store mutex poisoned".to_string())
}
