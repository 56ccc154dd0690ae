use std::sync::Arc;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{BlobStore, FileRecord};

/// Service for file operations
///
/// Holds no per-request state; every call maps to exactly one store operation.
pub struct FileService {
    store: Arc<dyn BlobStore>,
}

impl FileService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Store one uploaded file
    ///
    /// Rejects an empty filename or empty content before touching the store,
    /// so a failed upload never leaves a partial record behind.
    pub async fn upload_file(&self, filename: &str, data: Vec<u8>) -> Result<FileRecord> {
        if filename.trim().is_empty() {
            return Err(AppError::BadRequest("Filename is required".to_string()));
        }
        if data.is_empty() {
            return Err(AppError::BadRequest(format!("File '{}' is empty", filename)));
        }

        let record = self.store.create(filename, data).await?;

        info!(
            "File stored: id={}, filename={}, size={}",
            record.id,
            record.filename,
            record.size()
        );

        Ok(record)
    }

    /// Get a live file by id
    pub async fn get_file(&self, id: i64) -> Result<FileRecord> {
        Ok(self.store.find(id).await?)
    }

    /// Soft delete a file; unknown or already deleted ids are not an error
    pub async fn delete_file(&self, id: i64) -> Result<()> {
        self.store.delete(id).await?;

        info!("File soft deleted: id={}", id);

        Ok(())
    }

    /// List all live files
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        Ok(self.store.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::{MemoryBlobStore, StoreError};

    fn service() -> (Arc<MemoryBlobStore>, FileService) {
        let store = Arc::new(MemoryBlobStore::new());
        let service = FileService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_content_without_store_call() {
        let (store, service) = service();

        let result = service.upload_file("empty.txt", Vec::new()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_blank_filename() {
        let (store, service) = service();

        let result = service.upload_file("  ", b"data".to_vec()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_store_errors_pass_through_typed() {
        let (store, service) = service();

        assert!(matches!(
            service.get_file(999).await,
            Err(AppError::Storage(StoreError::NotFound(999)))
        ));

        store.set_unavailable(true);
        assert!(matches!(
            service.list_files().await,
            Err(AppError::Storage(StoreError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_store, service) = service();
        let record = service.upload_file("a.txt", b"hello".to_vec()).await.unwrap();

        service.delete_file(record.id).await.unwrap();
        service.delete_file(record.id).await.unwrap();

        assert!(matches!(
            service.get_file(record.id).await,
            Err(AppError::Storage(StoreError::NotFound(_)))
        ));
    }
}
