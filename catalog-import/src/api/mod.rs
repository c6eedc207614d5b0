//! Store clients
//!
//! The import pipelines talk to the two target stores through small
//! capability traits so the same dispatch code runs against the real REST
//! APIs and against the in-memory stores used for dry runs and tests.

pub mod document;
pub mod error;
pub mod firestore;
pub mod memory;
pub mod path;
pub mod realtime;

pub use document::{Document, DocumentWrite, FieldValue, WriteBatch};
pub use error::StoreError;
pub use firestore::FirestoreClient;
pub use memory::{MemoryDocumentStore, MemoryPathStore};
pub use path::StorePath;
pub use realtime::RealtimeClient;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::MAX_BATCH_SIZE;

/// A tree-structured store addressed by slash-separated paths
#[async_trait]
pub trait PathStore: Send + Sync {
    /// Merge `payload`'s keys into the object at `path`
    ///
    /// Keys not present in `payload` are left untouched at the target.
    async fn partial_update(
        &self,
        path: &StorePath,
        payload: &Map<String, Value>,
    ) -> Result<(), StoreError>;
}

/// A store of named collections of documents with atomic grouped writes
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Largest batch [`DocumentStore::commit`] accepts
    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    /// Apply every write in `batch`, or none of them
    async fn commit(&self, batch: &WriteBatch) -> Result<(), StoreError>;
}
