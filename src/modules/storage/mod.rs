//! Storage module for file persistence
//!
//! Defines the [`BlobStore`] contract consumed by the gateway and its
//! SQLite reference backend. An in-memory double backs the gateway tests.

mod blob_store;
#[cfg(test)]
mod memory_store;
mod sqlite_store;

pub use blob_store::{BlobStore, FileRecord, StoreError};
#[cfg(test)]
pub use memory_store::MemoryBlobStore;
pub use sqlite_store::SqliteBlobStore;
