//! Core data types and error definitions for the intake pipeline.

use crate::fetch::FetchError;
use crate::summarization::GenerationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse family a content type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCategory {
    /// Text-bearing documents (plain text, PDF, CSV, DOCX).
    Text,
    /// Raster images handed to the vision model.
    Image,
    /// Stored as-is without extraction.
    Skip,
}

/// Extractor selected by a content-type rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    /// Parse text out of the document and summarize it.
    TextParser,
    /// Describe the image with a vision-capable model.
    ImageAnalyzer,
}

/// One row of the static routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTypeRule {
    /// Normalized MIME type matched by this rule.
    pub content_type: &'static str,
    /// Family the MIME type belongs to.
    pub category: ContentCategory,
    /// Extractor to run, absent for skipped types.
    pub extractor: Option<ExtractorKind>,
}

/// Workflow chosen for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    /// Text extraction followed by summarization.
    TextProcessing,
    /// Vision analysis of an image.
    ImageProcessing,
    /// No extraction.
    SkipProcessing,
}

impl From<ContentCategory> for WorkflowType {
    fn from(category: ContentCategory) -> Self {
        match category {
            ContentCategory::Text => Self::TextProcessing,
            ContentCategory::Image => Self::ImageProcessing,
            ContentCategory::Skip => Self::SkipProcessing,
        }
    }
}

/// Routing decision produced once per upload.
///
/// Fields are read-only after construction; decisions come from [`super::classify`] or from a
/// [`ClassificationFault`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AiWorkflowRecord", try_from = "AiWorkflowRecord")]
pub struct ClassificationDecision {
    should_process: bool,
    workflow_type: WorkflowType,
    reason: String,
}

/// Persisted shape of [`ClassificationDecision`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AiWorkflowRecord {
    should_process: bool,
    workflow_type: WorkflowType,
    reason: String,
}

impl From<ClassificationDecision> for AiWorkflowRecord {
    fn from(decision: ClassificationDecision) -> Self {
        Self {
            should_process: decision.should_process,
            workflow_type: decision.workflow_type,
            reason: decision.reason,
        }
    }
}

impl TryFrom<AiWorkflowRecord> for ClassificationDecision {
    type Error = String;

    fn try_from(record: AiWorkflowRecord) -> Result<Self, Self::Error> {
        let decision = Self::new(record.workflow_type, record.reason);
        if decision.should_process != record.should_process {
            return Err(format!(
                "should_process={} contradicts workflow_type {:?}",
                record.should_process, record.workflow_type
            ));
        }
        Ok(decision)
    }
}

impl ClassificationDecision {
    pub(crate) fn new(workflow_type: WorkflowType, reason: impl Into<String>) -> Self {
        Self {
            should_process: workflow_type != WorkflowType::SkipProcessing,
            workflow_type,
            reason: reason.into(),
        }
    }

    /// Decision that stores the upload without extraction.
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::new(WorkflowType::SkipProcessing, reason)
    }

    /// Whether an extractor should run.
    pub fn should_process(&self) -> bool {
        self.should_process
    }

    /// Workflow selected for the upload.
    pub fn workflow_type(&self) -> WorkflowType {
        self.workflow_type
    }

    /// Human readable explanation of the decision.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<&ClassificationFault> for ClassificationDecision {
    fn from(fault: &ClassificationFault) -> Self {
        Self::skip(fault.to_string())
    }
}

/// How extracted content was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingMethod {
    /// Text parsed from the document, summarized when long enough.
    #[serde(rename = "ai_text_summarization")]
    TextSummarization,
    /// Image described by a vision model.
    #[serde(rename = "ai_vision_analysis")]
    VisionAnalysis,
}

impl ProcessingMethod {
    /// Method used by the extractor serving `workflow`, if any.
    pub fn for_workflow(workflow: WorkflowType) -> Option<Self> {
        match workflow {
            WorkflowType::TextProcessing => Some(Self::TextSummarization),
            WorkflowType::ImageProcessing => Some(Self::VisionAnalysis),
            WorkflowType::SkipProcessing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExtractionStatus {
    Succeeded {
        content: Option<String>,
        word_count: Option<usize>,
    },
    Failed {
        error: String,
    },
}

/// Output of one extractor run.
///
/// A failed result never carries content; a successful one never carries an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ProcessingResultsRecord", try_from = "ProcessingResultsRecord")]
pub struct ExtractionResult {
    processing_method: ProcessingMethod,
    status: ExtractionStatus,
}

impl ExtractionResult {
    /// Successful extraction.
    pub fn succeeded(
        processing_method: ProcessingMethod,
        content: Option<String>,
        word_count: Option<usize>,
    ) -> Self {
        Self {
            processing_method,
            status: ExtractionStatus::Succeeded {
                content,
                word_count,
            },
        }
    }

    /// Failed extraction carrying the rendered error.
    pub fn failed(processing_method: ProcessingMethod, error: impl Into<String>) -> Self {
        Self {
            processing_method,
            status: ExtractionStatus::Failed {
                error: error.into(),
            },
        }
    }

    /// Whether the extractor completed.
    pub fn success(&self) -> bool {
        matches!(self.status, ExtractionStatus::Succeeded { .. })
    }

    /// Summary, short text, or image description.
    pub fn content(&self) -> Option<&str> {
        match &self.status {
            ExtractionStatus::Succeeded { content, .. } => content.as_deref(),
            ExtractionStatus::Failed { .. } => None,
        }
    }

    /// Whitespace-delimited word count of the extracted text.
    pub fn word_count(&self) -> Option<usize> {
        match &self.status {
            ExtractionStatus::Succeeded { word_count, .. } => *word_count,
            ExtractionStatus::Failed { .. } => None,
        }
    }

    /// Extraction strategy that produced this result.
    pub fn processing_method(&self) -> ProcessingMethod {
        self.processing_method
    }

    /// Failure description when the extractor did not complete.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ExtractionStatus::Failed { error } => Some(error),
            ExtractionStatus::Succeeded { .. } => None,
        }
    }
}

/// Flat persisted shape of [`ExtractionResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProcessingResultsRecord {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    word_count: Option<usize>,
    processing_method: ProcessingMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ExtractionResult> for ProcessingResultsRecord {
    fn from(result: ExtractionResult) -> Self {
        let processing_method = result.processing_method;
        match result.status {
            ExtractionStatus::Succeeded {
                content,
                word_count,
            } => Self {
                success: true,
                content,
                word_count,
                processing_method,
                error: None,
            },
            ExtractionStatus::Failed { error } => Self {
                success: false,
                content: None,
                word_count: None,
                processing_method,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<ProcessingResultsRecord> for ExtractionResult {
    type Error = String;

    fn try_from(record: ProcessingResultsRecord) -> Result<Self, Self::Error> {
        match (record.success, record.error) {
            (true, None) => Ok(Self::succeeded(
                record.processing_method,
                record.content,
                record.word_count,
            )),
            (true, Some(_)) => Err("successful processing results must not carry an error".into()),
            (false, Some(error)) => {
                if record.content.is_some() {
                    return Err("failed processing results must not carry content".into());
                }
                Ok(Self::failed(record.processing_method, error))
            }
            (false, None) => Err("failed processing results require an error".into()),
        }
    }
}

/// Final product of one pipeline run: the routing decision and, when an extractor ran, its
/// result. The two fragments are persisted separately as `ai_workflow` and
/// `processing_results`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    ai_workflow: ClassificationDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    processing_results: Option<ExtractionResult>,
}

impl ProcessingOutcome {
    /// Outcome for uploads that never reach an extractor.
    pub fn skipped(decision: ClassificationDecision) -> Self {
        Self {
            ai_workflow: decision,
            processing_results: None,
        }
    }

    pub(crate) fn extracted(decision: ClassificationDecision, result: ExtractionResult) -> Self {
        debug_assert!(decision.should_process());
        Self {
            ai_workflow: decision,
            processing_results: Some(result),
        }
    }

    /// Routing metadata fragment.
    pub fn ai_workflow(&self) -> &ClassificationDecision {
        &self.ai_workflow
    }

    /// Extraction fragment, present only when an extractor ran.
    pub fn processing_results(&self) -> Option<&ExtractionResult> {
        self.processing_results.as_ref()
    }

    /// Split the outcome into its persisted fragments.
    pub fn into_parts(self) -> (ClassificationDecision, Option<ExtractionResult>) {
        (self.ai_workflow, self.processing_results)
    }
}

/// Input problems detected before classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationFault {
    /// Upload did not declare a content type.
    #[error("missing content type")]
    MissingContentType,
}

/// Document bytes could not be turned into text.
#[derive(Debug, Error)]
pub enum ParseError {
    /// PDF structure was unreadable.
    #[error("failed to read PDF: {0}")]
    Pdf(String),
    /// DOCX archive or XML was unreadable.
    #[error("failed to read DOCX: {0}")]
    Docx(String),
    /// Parser panicked on malformed input.
    #[error("document parser aborted on malformed {0} input")]
    Panicked(&'static str),
    /// Background extraction task was cancelled before completing.
    #[error("text extraction task failed: {0}")]
    Interrupted(String),
}

/// Failures surfaced by an extractor; encoded into [`ExtractionResult::error`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// File bytes could not be fetched.
    #[error("Failed to fetch document: {0}")]
    Transport(#[from] FetchError),
    /// File bytes were structurally unreadable.
    #[error("Failed to parse document: {0}")]
    Parse(#[from] ParseError),
    /// Generative model call failed or returned unusable output.
    #[error("Model call failed: {0}")]
    Capability(#[source] GenerationError),
}

impl From<GenerationError> for ExtractionError {
    /// An image the model could not retrieve is a transport fault, not a model fault.
    fn from(error: GenerationError) -> Self {
        match error {
            GenerationError::ReferenceUnavailable(fetch) => Self::Transport(fetch),
            other => Self::Capability(other),
        }
    }
}
