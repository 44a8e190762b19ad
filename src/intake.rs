//! Upload workflow wrapped around the processing pipeline.
//!
//! One upload is stored, handed to [`DocumentPipeline::process`] under a timeout, and persisted
//! together with both outcome fragments. The HTTP layer talks to this module only through the
//! [`IntakeApi`] trait so handlers can be exercised against doubles.

use crate::{
    documents::{DocumentRecord, DocumentStore, NewDocument, StoreError},
    metrics::{IntakeMetrics, MetricsSnapshot},
    processing::{
        DocumentPipeline, ExtractionResult, ProcessingMethod, ProcessingOutcome, classify,
        reconcile, sanitize::sanitize_string,
    },
    storage::{ObjectStorage, StorageError},
};
use async_trait::async_trait;
use std::{path::Path, sync::Arc, time::Duration};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Key prefix under which uploads are stored.
pub const STORAGE_PREFIX: &str = "documents";

/// Content type recorded when the uploader declared none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Maximum number of records returned by a listing.
pub const LIST_LIMIT: usize = 100;

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name supplied by the client.
    pub original_filename: Option<String>,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// File bytes.
    pub bytes: Vec<u8>,
}

/// Errors raised by the intake workflow.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Request carried no file part.
    #[error("No file provided")]
    MissingFile,
    /// File part carried no usable name.
    #[error("Uploaded file has no filename")]
    MissingFilename,
    /// No document with this id exists.
    #[error("Document not found: {0}")]
    NotFound(String),
    /// Object storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Document store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Operations the HTTP surface needs from the intake workflow.
#[async_trait]
pub trait IntakeApi: Send + Sync {
    /// Store, process, and persist one upload.
    async fn upload(&self, upload: Upload) -> Result<DocumentRecord, IntakeError>;

    /// List stored documents, oldest first.
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, IntakeError>;

    /// Fetch one stored document.
    async fn get_document(&self, id: &str) -> Result<DocumentRecord, IntakeError>;

    /// Read back the bytes stored under `key`.
    async fn open_file(&self, key: &str) -> Result<Vec<u8>, IntakeError>;

    /// Current intake counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Default [`IntakeApi`] implementation.
pub struct IntakeService {
    storage: Arc<dyn ObjectStorage>,
    documents: Arc<dyn DocumentStore>,
    pipeline: DocumentPipeline,
    metrics: Arc<IntakeMetrics>,
    pipeline_timeout: Duration,
}

impl IntakeService {
    /// Assemble the service from its collaborators.
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        documents: Arc<dyn DocumentStore>,
        pipeline: DocumentPipeline,
        pipeline_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            documents,
            pipeline,
            metrics: Arc::new(IntakeMetrics::new()),
            pipeline_timeout,
        }
    }

    /// Release the document store.
    pub async fn shutdown(&self) {
        self.documents.close().await;
    }

    async fn run_pipeline(
        &self,
        content_type: &str,
        file_size: u64,
        filename: &str,
        file_reference: &str,
    ) -> ProcessingOutcome {
        let run = self
            .pipeline
            .process(content_type, file_size, filename, file_reference);
        match tokio::time::timeout(self.pipeline_timeout, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    filename,
                    timeout_secs = self.pipeline_timeout.as_secs(),
                    "Pipeline timed out"
                );
                timed_out_outcome(content_type, self.pipeline_timeout)
            }
        }
    }
}

#[async_trait]
impl IntakeApi for IntakeService {
    async fn upload(&self, upload: Upload) -> Result<DocumentRecord, IntakeError> {
        let original_filename =
            sanitize_string(upload.original_filename).ok_or(IntakeError::MissingFilename)?;
        let declared_type = sanitize_string(upload.content_type);
        let filename = unique_filename(&original_filename);
        let storage_key = format!("{STORAGE_PREFIX}/{filename}");
        let file_size = upload.bytes.len() as u64;

        let storage_url = self
            .storage
            .store(&upload.bytes, &storage_key, declared_type.as_deref())
            .await?;
        tracing::info!(
            original_filename = %original_filename,
            storage_key = %storage_key,
            file_size,
            "Stored upload"
        );

        let outcome = self
            .run_pipeline(
                declared_type.as_deref().unwrap_or_default(),
                file_size,
                &original_filename,
                &storage_url,
            )
            .await;
        self.metrics.record_outcome(&outcome);

        let document = NewDocument {
            filename,
            original_filename,
            file_size,
            content_type: declared_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            storage_key,
            storage_url,
            uploaded_at: OffsetDateTime::now_utc(),
            ai_workflow: None,
            processing_results: None,
        }
        .with_outcome(outcome);

        let id = self.documents.insert(document.clone()).await?;
        tracing::info!(id = %id, "Document recorded");
        Ok(DocumentRecord { id, document })
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, IntakeError> {
        Ok(self.documents.list(LIST_LIMIT).await?)
    }

    async fn get_document(&self, id: &str) -> Result<DocumentRecord, IntakeError> {
        self.documents
            .find(id)
            .await?
            .ok_or_else(|| IntakeError::NotFound(id.to_string()))
    }

    async fn open_file(&self, key: &str) -> Result<Vec<u8>, IntakeError> {
        Ok(self.storage.load(key).await?)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// `{uuid}{extension}`, keeping the extension of the uploaded name as-is.
fn unique_filename(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{}{}", Uuid::new_v4(), extension)
}

fn timed_out_outcome(content_type: &str, timeout: Duration) -> ProcessingOutcome {
    let decision = classify(content_type);
    let method = ProcessingMethod::for_workflow(decision.workflow_type());
    match method {
        Some(method) if decision.should_process() => {
            let message = format!("pipeline timed out after {}s", timeout.as_secs());
            reconcile(decision, Some(ExtractionResult::failed(method, message)))
        }
        _ => reconcile(decision, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::InMemoryDocumentStore;
    use crate::fetch::{FetchError, Fetcher};
    use crate::processing::WorkflowType;
    use crate::storage::LocalObjectStorage;
    use crate::summarization::{GenerationError, GenerativeModel, SummarizationAdapter};

    const BASE_URL: &str = "http://intake.test";

    /// Serves stored objects straight from the local storage root.
    struct StorageFetcher {
        storage: Arc<LocalObjectStorage>,
    }

    #[async_trait]
    impl Fetcher for StorageFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            let key = url
                .strip_prefix(&format!("{BASE_URL}/files/"))
                .ok_or_else(|| FetchError::InvalidReference(url.to_string()))?;
            self.storage
                .load(key)
                .await
                .map_err(|error| FetchError::InvalidReference(error.to_string()))
        }
    }

    struct SlowModel;

    #[async_trait]
    impl GenerativeModel for SlowModel {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".into())
        }

        async fn generate_vision(
            &self,
            _reference: &str,
            _prompt: &str,
        ) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".into())
        }
    }

    fn service(
        dir: &tempfile::TempDir,
        summarizer: SummarizationAdapter,
        timeout: Duration,
    ) -> IntakeService {
        let storage = Arc::new(LocalObjectStorage::new(dir.path(), BASE_URL));
        let fetcher = Arc::new(StorageFetcher {
            storage: storage.clone(),
        });
        IntakeService::new(
            storage,
            Arc::new(InMemoryDocumentStore::new()),
            DocumentPipeline::new(fetcher, summarizer),
            timeout,
        )
    }

    fn upload(name: &str, content_type: Option<&str>, bytes: &[u8]) -> Upload {
        Upload {
            original_filename: Some(name.to_string()),
            content_type: content_type.map(str::to_string),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn short_text_upload_is_stored_and_extracted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir, SummarizationAdapter::disabled(), Duration::from_secs(5));

        let record = service
            .upload(upload("notes.txt", Some("text/plain"), b"hello world"))
            .await
            .expect("upload");

        let document = &record.document;
        assert!(document.filename.ends_with(".txt"));
        assert_eq!(document.storage_key, format!("documents/{}", document.filename));
        assert_eq!(
            document.storage_url,
            format!("{BASE_URL}/files/{}", document.storage_key)
        );
        assert_eq!(document.file_size, 11);
        let results = document.processing_results.as_ref().expect("results");
        assert_eq!(results.content(), Some("hello world"));
        assert_eq!(results.word_count(), Some(2));

        let fetched = service.get_document(&record.id).await.expect("found");
        assert_eq!(fetched, record);
        assert_eq!(service.metrics_snapshot().documents_extracted, 1);
        assert_eq!(
            service.open_file(&document.storage_key).await.expect("bytes"),
            b"hello world"
        );
    }

    #[tokio::test]
    async fn upload_without_content_type_defaults_and_skips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir, SummarizationAdapter::disabled(), Duration::from_secs(5));

        let record = service
            .upload(upload("blob", None, b"\x00\x01"))
            .await
            .expect("upload");

        assert_eq!(record.document.content_type, DEFAULT_CONTENT_TYPE);
        assert!(!record.document.filename.contains('.'));
        let decision = record.document.ai_workflow.as_ref().expect("decision");
        assert_eq!(decision.reason(), "missing content type");
        assert!(record.document.processing_results.is_none());
        assert_eq!(service.metrics_snapshot().documents_skipped, 1);
    }

    #[tokio::test]
    async fn missing_filename_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir, SummarizationAdapter::disabled(), Duration::from_secs(5));

        let mut bad = upload("", Some("text/plain"), b"x");
        bad.original_filename = Some("   ".into());
        let error = service.upload(bad).await.expect_err("rejected");
        assert!(matches!(error, IntakeError::MissingFilename));
        assert!(service.list_documents().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn timed_out_pipeline_records_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(
            &dir,
            SummarizationAdapter::new(Arc::new(SlowModel)),
            Duration::from_millis(50),
        );

        let record = service
            .upload(upload("cat.png", Some("image/png"), b"\x89PNG"))
            .await
            .expect("upload");

        let decision = record.document.ai_workflow.as_ref().expect("decision");
        assert_eq!(decision.workflow_type(), WorkflowType::ImageProcessing);
        let results = record.document.processing_results.as_ref().expect("results");
        assert!(!results.success());
        assert!(results.error().expect("error").contains("timed out"));
        assert_eq!(service.metrics_snapshot().extraction_failures, 1);
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir, SummarizationAdapter::disabled(), Duration::from_secs(5));

        let error = service
            .get_document(&Uuid::new_v4().to_string())
            .await
            .expect_err("missing");
        assert!(matches!(error, IntakeError::NotFound(_)));

        let error = service.get_document("nope").await.expect_err("invalid");
        assert!(matches!(error, IntakeError::Store(StoreError::InvalidId(_))));
    }

    #[test]
    fn unique_filename_keeps_extension() {
        assert!(unique_filename("report.final.PDF").ends_with(".PDF"));
        assert_eq!(unique_filename("README").len(), 36);
    }

    #[test]
    fn timeout_for_skipped_type_has_no_results() {
        let outcome = timed_out_outcome("video/mp4", Duration::from_secs(1));
        assert!(outcome.processing_results().is_none());
    }
}
