use super::{DocumentRecord, DocumentStore, NewDocument, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local [`DocumentStore`] keeping records in insertion order.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<Vec<DocumentRecord>>,
    closed: AtomicBool,
}

impl InMemoryDocumentStore {
    /// Create an empty, open store.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, document: NewDocument) -> Result<String, StoreError> {
        self.ensure_open()?;
        let id = Uuid::new_v4().to_string();
        self.records.write().await.push(DocumentRecord {
            id: id.clone(),
            document,
        });
        Ok(id)
    }

    async fn find(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        self.ensure_open()?;
        let parsed = Uuid::parse_str(id.trim())
            .map_err(|_| StoreError::InvalidId(id.to_string()))?
            .to_string();
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == parsed).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<DocumentRecord>, StoreError> {
        self.ensure_open()?;
        let records = self.records.read().await;
        Ok(records.iter().take(limit).cloned().collect())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        tracing::info!("Document store closed");
    }
}
