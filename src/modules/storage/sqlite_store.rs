//! SQLite-backed blob store
//!
//! Records live in the `files` table created by the migrations in
//! `migrations/`. Deletion is a tombstone (`deleted_at`), every read path
//! filters on its absence.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use super::blob_store::{BlobStore, FileRecord, StoreError};

const RECORD_COLUMNS: &str = "id, filename, blob, created_at, updated_at, deleted_at";

pub struct SqliteBlobStore {
    pool: SqlitePool,
    // SQLite allows one writer at a time
    write_lock: Mutex<()>,
}

impl SqliteBlobStore {
    /// Wrap a pool whose schema has already been migrated.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn create(&self, filename: &str, blob: Vec<u8>) -> Result<FileRecord, StoreError> {
        let now = Utc::now();
        let _guard = self.write_lock.lock().await;

        let record = sqlx::query_as::<_, FileRecord>(&format!(
            r#"
            INSERT INTO files (filename, blob, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(filename)
        .bind(blob)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find(&self, id: i64) -> Result<FileRecord, StoreError> {
        sqlx::query_as::<_, FileRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM files
            WHERE id = ? AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let now = Utc::now();
        let _guard = self.write_lock.lock().await;

        // Zero affected rows is fine: the id is already absent.
        sqlx::query(
            r#"
            UPDATE files
            SET deleted_at = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<FileRecord>, StoreError> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM files
            WHERE deleted_at IS NULL
            ORDER BY id ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
