//! In-memory blob store used as a test double for the gateway.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::blob_store::{BlobStore, FileRecord, StoreError};

#[derive(Default)]
struct Inner {
    records: Vec<FileRecord>,
    next_id: i64,
}

/// Vec-backed store with failure injection.
///
/// `fail_create_at(n)` makes the n-th `create` call (1-based) fail with
/// `Unavailable`; `set_unavailable(true)` fails every operation.
#[derive(Default)]
pub struct MemoryBlobStore {
    inner: Mutex<Inner>,
    create_calls: AtomicUsize,
    fail_create_at: Mutex<Option<usize>>,
    unavailable: Mutex<bool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create_at(&self, call: usize) {
        *self.fail_create_at.lock().unwrap() = Some(call);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// Number of `create` calls attempted, including failed ones
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Every row including tombstones
    pub fn rows(&self) -> Vec<FileRecord> {
        self.inner.lock().unwrap().records.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.unavailable.lock().unwrap() {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn create(&self, filename: &str, blob: Vec<u8>) -> Result<FileRecord, StoreError> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_available()?;
        if *self.fail_create_at.lock().unwrap() == Some(call) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }

        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let now = Utc::now();
        let record = FileRecord {
            id: inner.next_id,
            filename: filename.to_string(),
            blob,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn find(&self, id: i64) -> Result<FileRecord, StoreError> {
        self.check_available()?;
        self.inner
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id == id && r.is_live())
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.check_available()?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.records.iter_mut().find(|r| r.id == id && r.is_live()) {
            let now = Utc::now();
            record.deleted_at = Some(now);
            record.updated_at = now;
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<FileRecord>, StoreError> {
        self.check_available()?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| r.is_live())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_matches_store_contract() {
        let store = MemoryBlobStore::new();

        let created = store.create("a.txt", b"hello".to_vec()).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(store.find(1).await.unwrap().blob, b"hello");

        store.delete(1).await.unwrap();
        store.delete(1).await.unwrap();
        assert!(matches!(store.find(1).await, Err(StoreError::NotFound(1))));
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_failure_injection() {
        let store = MemoryBlobStore::new();
        store.fail_create_at(2);

        assert!(store.create("1", vec![1]).await.is_ok());
        assert!(matches!(
            store.create("2", vec![2]).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.create("3", vec![3]).await.is_ok());
        assert_eq!(store.create_calls(), 3);

        store.set_unavailable(true);
        assert!(matches!(
            store.list().await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
