use crate::processing::{ClassificationDecision, ExtractionResult, ProcessingOutcome};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Metadata for an upload that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Generated unique name (`{uuid}{extension}`).
    pub filename: String,
    /// Name supplied by the uploader.
    pub original_filename: String,
    /// Size of the uploaded bytes.
    pub file_size: u64,
    /// Declared MIME type, `application/octet-stream` when absent.
    pub content_type: String,
    /// Key of the object in storage.
    pub storage_key: String,
    /// URL the stored object can be fetched from.
    pub storage_url: String,
    /// Upload time.
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    /// Routing decision fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_workflow: Option<ClassificationDecision>,
    /// Extraction fragment, present only when an extractor ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_results: Option<ExtractionResult>,
}

impl NewDocument {
    /// Attach a pipeline outcome, splitting it into its two fragments.
    pub fn with_outcome(mut self, outcome: ProcessingOutcome) -> Self {
        let (ai_workflow, processing_results) = outcome.into_parts();
        self.ai_workflow = Some(ai_workflow);
        self.processing_results = processing_results;
        self
    }
}

/// Stored document as returned by the store and the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Identifier assigned by the store.
    pub id: String,
    /// Stored metadata.
    #[serde(flatten)]
    pub document: NewDocument,
}
