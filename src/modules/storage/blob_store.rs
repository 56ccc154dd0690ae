//! Blob store contract
//!
//! The gateway talks to persistence exclusively through [`BlobStore`].
//! Implementations own their medium (schema, connections, write locking)
//! and report every failure as a [`StoreError`]; they never log and never
//! know about HTTP.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;

/// A stored file.
///
/// `filename` and `blob` are immutable once created. A record with
/// `deleted_at` set is a tombstone and is invisible to `find` and `list`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FileRecord {
    pub id: i64,
    pub filename: String,
    pub blob: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Size of the blob in bytes
    pub fn size(&self) -> usize {
        self.blob.len()
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// No live record has this id (absent or soft-deleted)
    #[error("file {0} not found")]
    NotFound(i64),

    /// The backing medium could not complete the operation
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Capability interface over the durable file store.
///
/// Each operation is atomic with respect to the single record it touches.
/// Concurrent `create` calls always receive distinct ids.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Insert a new record and return it with its assigned id and timestamps.
    async fn create(&self, filename: &str, blob: Vec<u8>) -> Result<FileRecord, StoreError>;

    /// Fetch the live record with this id.
    async fn find(&self, id: i64) -> Result<FileRecord, StoreError>;

    /// Soft-delete a record. Deleting a missing or already deleted id succeeds.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// All live records, in id order.
    async fn list(&self) -> Result<Vec<FileRecord>, StoreError>;
}
