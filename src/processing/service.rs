//! Pipeline orchestrator: classification, extraction, and reconciliation for one upload.

use crate::{
    fetch::Fetcher,
    processing::{
        classifier::{classify, require_content_type},
        extractors::{CondensedText, condense_text, describe_image, extract_text_blocking},
        reconcile::reconcile,
        types::{
            ClassificationDecision, ExtractionError, ExtractionResult, ProcessingMethod,
            ProcessingOutcome, WorkflowType,
        },
    },
    summarization::{GenerationError, SummarizationAdapter, get_generative_model},
};
use std::sync::Arc;
use tracing::Instrument;

/// Runs the intake pipeline for individual uploads.
///
/// The pipeline holds only shared, read-only handles (fetcher and summarizer), so one instance
/// can serve any number of concurrent uploads. Each [`DocumentPipeline::process`] call walks
/// classified → extracted | skipped → reconciled and always returns an outcome; failures are
/// encoded in the outcome rather than returned.
#[derive(Clone)]
pub struct DocumentPipeline {
    fetcher: Arc<dyn Fetcher>,
    summarizer: SummarizationAdapter,
}

/// Where a run stands after the extraction step.
enum Stage {
    Skipped(ClassificationDecision),
    Extracted(ClassificationDecision, Option<ExtractionResult>),
}

impl DocumentPipeline {
    /// Build a pipeline from its capabilities.
    pub fn new(fetcher: Arc<dyn Fetcher>, summarizer: SummarizationAdapter) -> Self {
        Self {
            fetcher,
            summarizer,
        }
    }

    /// Build a pipeline whose summarizer follows the loaded configuration.
    pub fn from_config(fetcher: Arc<dyn Fetcher>) -> Result<Self, GenerationError> {
        let model = get_generative_model(fetcher.clone())?;
        if model.is_none() {
            tracing::warn!("No summarization provider configured; extraction of long texts and images will fail");
        }
        Ok(Self::new(fetcher, SummarizationAdapter::from_model(model)))
    }

    /// Classify, extract, and reconcile one uploaded file.
    pub async fn process(
        &self,
        content_type: &str,
        file_size: u64,
        filename: &str,
        file_reference: &str,
    ) -> ProcessingOutcome {
        let span = tracing::info_span!("pipeline", filename, file_size);
        async move {
            let content_type = match require_content_type(content_type) {
                Ok(normalized) => normalized,
                Err(fault) => {
                    tracing::warn!(error = %fault, "Upload cannot be classified");
                    return reconcile(ClassificationDecision::from(&fault), None);
                }
            };

            let decision = classify(&content_type);
            tracing::debug!(
                content_type = %content_type,
                workflow = ?decision.workflow_type(),
                should_process = decision.should_process(),
                "Classified upload"
            );

            let stage = if decision.should_process() {
                let result = self.extract(&decision, &content_type, file_reference).await;
                Stage::Extracted(decision, result)
            } else {
                tracing::debug!(content_type = %content_type, "Skipping extraction");
                Stage::Skipped(decision)
            };

            let outcome = match stage {
                Stage::Skipped(decision) => reconcile(decision, None),
                Stage::Extracted(decision, result) => reconcile(decision, result),
            };
            tracing::info!(
                content_type = %content_type,
                workflow = ?outcome.ai_workflow().workflow_type(),
                extracted = outcome.processing_results().map(ExtractionResult::success),
                "Pipeline finished"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    async fn extract(
        &self,
        decision: &ClassificationDecision,
        content_type: &str,
        file_reference: &str,
    ) -> Option<ExtractionResult> {
        let result = match decision.workflow_type() {
            WorkflowType::TextProcessing => {
                let method = ProcessingMethod::TextSummarization;
                match self.extract_text_content(content_type, file_reference).await {
                    Ok(CondensedText {
                        content,
                        word_count,
                        summarized,
                    }) => {
                        tracing::debug!(word_count, summarized, "Extracted text content");
                        ExtractionResult::succeeded(method, Some(content), Some(word_count))
                    }
                    Err(error) => failed_extraction(method, error),
                }
            }
            WorkflowType::ImageProcessing => {
                let method = ProcessingMethod::VisionAnalysis;
                match describe_image(&self.summarizer, file_reference, content_type).await {
                    Ok(description) => ExtractionResult::succeeded(method, Some(description), None),
                    Err(error) => failed_extraction(method, ExtractionError::from(error)),
                }
            }
            WorkflowType::SkipProcessing => return None,
        };
        Some(result)
    }

    /// Fetch, parse, and condense a text-family document.
    pub async fn extract_text_content(
        &self,
        content_type: &str,
        file_reference: &str,
    ) -> Result<CondensedText, ExtractionError> {
        let bytes = self.fetcher.fetch(file_reference).await?;
        let raw_text = extract_text_blocking(bytes, content_type.to_string()).await?;
        Ok(condense_text(&raw_text, &self.summarizer).await?)
    }
}

fn failed_extraction(method: ProcessingMethod, error: ExtractionError) -> ExtractionResult {
    tracing::warn!(method = ?method, error = %error, "Extraction failed");
    ExtractionResult::failed(method, error.to_string())
}
