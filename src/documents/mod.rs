//! Persisted document metadata and the store capability that holds it.

mod memory;
mod record;

pub use memory::InMemoryDocumentStore;
pub use record::{DocumentRecord, NewDocument};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identifier was not in the store's id format.
    #[error("Invalid document id: {0}")]
    InvalidId(String),
    /// Store has been closed.
    #[error("Document store is closed")]
    Closed,
}

/// Capability persisting composite document records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a record and return its assigned id.
    async fn insert(&self, document: NewDocument) -> Result<String, StoreError>;

    /// Look up a record by id.
    async fn find(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError>;

    /// List up to `limit` records in insertion order.
    async fn list(&self, limit: usize) -> Result<Vec<DocumentRecord>, StoreError>;

    /// Release backend resources; later calls fail with [`StoreError::Closed`].
    async fn close(&self) {}
}
