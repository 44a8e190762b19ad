use super::{GenerationError, GenerativeModel};
use crate::fetch::Fetcher;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Ollama-backed [`GenerativeModel`] issuing non-streaming `/api/generate` requests.
///
/// Vision calls download the referenced image through the injected [`Fetcher`] and attach it
/// base64-encoded, since Ollama does not dereference URLs itself.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    text_model: String,
    vision_model: String,
    fetcher: Arc<dyn Fetcher>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

impl OllamaClient {
    /// Build a client for the Ollama runtime at `base_url`.
    pub fn new(
        base_url: String,
        text_model: String,
        vision_model: String,
        timeout: Duration,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .user_agent("doc-intake/summary")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                GenerationError::ProviderUnavailable(format!(
                    "failed to construct HTTP client: {error}"
                ))
            })?;
        Ok(Self {
            http,
            base_url,
            text_model,
            vision_model,
            fetcher,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, payload: Value) -> Result<String, GenerationError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            GenerationError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(GenerationError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[async_trait]
impl GenerativeModel for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        tracing::debug!(model = %self.text_model, prompt_chars = prompt.len(), "Requesting completion");
        self.complete(json!({
            "model": self.text_model,
            "prompt": prompt,
            "stream": false,
            "options": {
                // Low temperature keeps summaries factual.
                "temperature": 0.1,
            }
        }))
        .await
    }

    async fn generate_vision(
        &self,
        reference: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let image = self
            .fetcher
            .fetch(reference)
            .await
            .map_err(GenerationError::ReferenceUnavailable)?;
        tracing::debug!(
            model = %self.vision_model,
            reference,
            image_bytes = image.len(),
            "Requesting image description"
        );
        self.complete(json!({
            "model": self.vision_model,
            "prompt": prompt,
            "images": [BASE64.encode(&image)],
            "stream": false,
            "options": {
                "temperature": 0.1,
            }
        }))
        .await
    }
}
