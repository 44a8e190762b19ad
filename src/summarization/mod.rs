//! Generative model access for text summaries and image descriptions.
//!
//! [`GenerativeModel`] is the raw capability (one round trip per call, no streaming).
//! [`SummarizationAdapter`] wraps it for the pipeline: it cleans markdown out of replies, rejects
//! empty output, and never retries. When no provider is configured the adapter still exists but
//! every call fails with [`GenerationError::ProviderUnavailable`].

mod ollama;
pub mod prompts;

pub use ollama::OllamaClient;

use crate::config::{SummarizationProvider, get_config};
use crate::fetch::{FetchError, Fetcher};
use crate::processing::sanitize::strip_markdown_markers;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced by the generative model capability.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider was explicitly disabled or unreachable.
    #[error("Generative model unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or was empty.
    #[error("Malformed model response: {0}")]
    InvalidResponse(String),
    /// Image behind a vision reference could not be retrieved.
    #[error("Image reference unavailable: {0}")]
    ReferenceUnavailable(#[source] FetchError),
}

/// Interface implemented by generative model backends.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Complete a text prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Complete a prompt about the image found at `reference`.
    async fn generate_vision(&self, reference: &str, prompt: &str)
    -> Result<String, GenerationError>;
}

/// Build the generative model selected by configuration.
pub fn get_generative_model(
    fetcher: Arc<dyn Fetcher>,
) -> Result<Option<Arc<dyn GenerativeModel>>, GenerationError> {
    let config = get_config();
    match config.summarization_provider {
        SummarizationProvider::None => Ok(None),
        SummarizationProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            let client = OllamaClient::new(
                base_url,
                config.summarization_model.clone(),
                config.vision_model.clone(),
                config.generation_timeout(),
                fetcher,
            )?;
            Ok(Some(Arc::new(client)))
        }
    }
}

/// Pipeline-facing wrapper around a [`GenerativeModel`].
#[derive(Clone)]
pub struct SummarizationAdapter {
    model: Option<Arc<dyn GenerativeModel>>,
}

impl SummarizationAdapter {
    /// Adapter backed by `model`.
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Adapter whose calls always fail; used when no provider is configured.
    pub fn disabled() -> Self {
        Self { model: None }
    }

    /// Adapter for an optional model.
    pub fn from_model(model: Option<Arc<dyn GenerativeModel>>) -> Self {
        Self { model }
    }

    /// Whether a backing model is configured.
    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Run one text completion and return the cleaned reply.
    pub async fn summarize(&self, prompt: &str) -> Result<String, GenerationError> {
        let raw = self.model()?.generate(prompt).await?;
        clean_response(&raw)
    }

    /// Run one vision completion against `reference` and return the cleaned reply.
    pub async fn describe_image(
        &self,
        reference: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let raw = self.model()?.generate_vision(reference, prompt).await?;
        clean_response(&raw)
    }

    fn model(&self) -> Result<&Arc<dyn GenerativeModel>, GenerationError> {
        self.model.as_ref().ok_or_else(|| {
            GenerationError::ProviderUnavailable("no summarization provider configured".into())
        })
    }
}

fn clean_response(raw: &str) -> Result<String, GenerationError> {
    let cleaned = strip_markdown_markers(raw);
    if cleaned.is_empty() {
        return Err(GenerationError::InvalidResponse(
            "model returned an empty response".into(),
        ));
    }
    Ok(cleaned)
}
