use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::store::{RecordStore, RecordStoreError, VersionedRecord};
use crate::infrastructure::db::DbPool;

/// Postgres-backed record store.
///
/// One row per record in the `records` table; the version column carries the
/// compare-and-swap check, so `put_if` is atomic at the row level without any
/// explicit locking.
pub struct PgRecordStore {
    pool: Arc<DbPool>,
}

impl PgRecordStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedRecord>, RecordStoreError> {
        let row = sqlx::query_as::<_, (Value, i64)>(
            r#"
            SELECT value, version
            FROM records
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(backend)?;

        Ok(row.map(|(value, version)| VersionedRecord { value, version }))
    }

    async fn put_if(
        &self,
        key: &str,
        expected: Option<i64>,
        value: Value,
    ) -> Result<bool, RecordStoreError> {
        let result = match expected {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO records (key, value, version, updated_at)
                    VALUES ($1, $2, 1, NOW())
                    ON CONFLICT (key) DO NOTHING
                    "#,
                )
                .bind(key)
                .bind(value)
                .execute(self.pool.as_ref())
                .await
            }
            Some(version) => {
                sqlx::query(
                    r#"
                    UPDATE records
                    SET value = $3, version = version + 1, updated_at = NOW()
                    WHERE key = $1 AND version = $2
                    "#,
                )
                .bind(key)
                .bind(version)
                .bind(value)
                .execute(self.pool.as_ref())
                .await
            }
        }
        .map_err(backend)?;

        // Zero rows affected means another writer got there first
        Ok(result.rows_affected() == 1)
    }

    async fn merge(&self, key: &str, value: Value) -> Result<(), RecordStoreError> {
        // jsonb || does the same top-level field merge as the in-memory store
        sqlx::query(
            r#"
            INSERT INTO records (key, value, version, updated_at)
            VALUES ($1, $2, 1, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = records.value || EXCLUDED.value,
                version = records.version + 1,
                updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.pool.as_ref())
        .await
        .map_err(backend)?;

        Ok(())
    }
}

fn backend(err: sqlx::Error) -> RecordStoreError {
    RecordStoreError::Backend(err.to_string())
}
