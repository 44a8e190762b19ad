use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use doc_intake::{
    fetch::{FetchError, Fetcher},
    processing::{DocumentPipeline, ProcessingMethod, WorkflowType, classify},
    summarization::{GenerationError, GenerativeModel, SummarizationAdapter},
};
use reqwest::StatusCode;

/// Serves fixed bodies; unknown URLs fail like an unreachable file server.
#[derive(Default)]
struct FixtureFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl FixtureFetcher {
    fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.files.insert(url.to_string(), body.to_vec());
        self
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::UnexpectedStatus {
                status: StatusCode::BAD_GATEWAY,
                url: url.to_string(),
            })
    }
}

/// Model double that records every call.
#[derive(Default)]
struct RecordingModel {
    text_prompts: Mutex<Vec<String>>,
    vision_references: Mutex<Vec<String>>,
}

#[async_trait]
impl GenerativeModel for RecordingModel {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.text_prompts.lock().unwrap().push(prompt.to_string());
        Ok("A short summary.".into())
    }

    async fn generate_vision(
        &self,
        reference: &str,
        _prompt: &str,
    ) -> Result<String, GenerationError> {
        self.vision_references
            .lock()
            .unwrap()
            .push(reference.to_string());
        Ok("A cat on a windowsill.".into())
    }
}

fn pipeline(fetcher: FixtureFetcher) -> (DocumentPipeline, Arc<RecordingModel>) {
    let model = Arc::new(RecordingModel::default());
    let pipeline =
        DocumentPipeline::new(Arc::new(fetcher), SummarizationAdapter::new(model.clone()));
    (pipeline, model)
}

#[tokio::test]
async fn short_plain_text_is_kept_verbatim() {
    let url = "http://files.test/documents/hello.txt";
    let (pipeline, model) = pipeline(FixtureFetcher::default().with(url, b"hello world"));

    let outcome = pipeline.process("text/plain", 11, "hello.txt", url).await;

    let decision = outcome.ai_workflow();
    assert!(decision.should_process());
    assert_eq!(decision.workflow_type(), WorkflowType::TextProcessing);
    let results = outcome.processing_results().expect("results present");
    assert!(results.success());
    assert_eq!(results.content(), Some("hello world"));
    assert_eq!(results.word_count(), Some(2));
    assert_eq!(
        results.processing_method(),
        ProcessingMethod::TextSummarization
    );
    assert!(model.text_prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pdf_text_is_extracted_across_pages() {
    let url = "http://files.test/documents/three_pages.pdf";
    let body = include_bytes!("fixtures/three_pages.pdf");
    let (pipeline, model) = pipeline(FixtureFetcher::default().with(url, body));

    let outcome = pipeline
        .process("application/pdf", body.len() as u64, "three_pages.pdf", url)
        .await;

    let results = outcome.processing_results().expect("results present");
    assert!(results.success(), "{:?}", results.error());
    assert_eq!(results.word_count(), Some(2));
    let content = results.content().expect("content");
    assert!(content.starts_with("Alpha"), "{content:?}");
    assert!(content.ends_with("Omega"), "{content:?}");
    assert!(model.text_prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn audio_is_skipped_without_results() {
    let (pipeline, model) = pipeline(FixtureFetcher::default());

    let outcome = pipeline
        .process(
            "audio/mpeg",
            4096,
            "song.mp3",
            "http://files.test/documents/song.mp3",
        )
        .await;

    assert!(!outcome.ai_workflow().should_process());
    assert_eq!(
        outcome.ai_workflow().workflow_type(),
        WorkflowType::SkipProcessing
    );
    assert!(outcome.processing_results().is_none());
    assert_eq!(outcome.ai_workflow(), &classify("audio/mpeg"));
    assert!(model.vision_references.lock().unwrap().is_empty());

    let value = serde_json::to_value(outcome.ai_workflow()).expect("serialize");
    assert_eq!(value["workflow_type"], "skip_processing");
}

#[tokio::test]
async fn pdf_fetch_failure_is_recorded() {
    let (pipeline, _) = pipeline(FixtureFetcher::default());

    let outcome = pipeline
        .process(
            "application/pdf",
            2048,
            "report.pdf",
            "http://files.test/documents/report.pdf",
        )
        .await;

    assert!(outcome.ai_workflow().should_process());
    let results = outcome.processing_results().expect("results present");
    assert!(!results.success());
    assert!(results.content().is_none());
    let error = results.error().expect("error populated");
    assert!(error.contains("Failed to fetch document"), "{error}");
}

#[tokio::test]
async fn png_is_described_by_vision_model() {
    let url = "http://files.test/documents/cat.png";
    let (pipeline, model) = pipeline(FixtureFetcher::default());

    let outcome = pipeline.process("image/png", 512, "cat.png", url).await;

    assert_eq!(
        outcome.ai_workflow().workflow_type(),
        WorkflowType::ImageProcessing
    );
    let results = outcome.processing_results().expect("results present");
    assert!(results.success());
    assert_eq!(results.content(), Some("A cat on a windowsill."));
    assert_eq!(
        results.processing_method(),
        ProcessingMethod::VisionAnalysis
    );
    assert_eq!(
        *model.vision_references.lock().unwrap(),
        vec![url.to_string()]
    );

    let value = serde_json::to_value(results).expect("serialize");
    assert_eq!(value["processing_method"], "ai_vision_analysis");
}

#[tokio::test]
async fn concurrent_runs_are_independent() {
    let text_url = "http://files.test/documents/a.txt";
    let (pipeline, _) = pipeline(FixtureFetcher::default().with(text_url, b"alpha beta"));

    let (text, video) = tokio::join!(
        pipeline.process("text/plain", 10, "a.txt", text_url),
        pipeline.process(
            "video/mp4",
            10,
            "b.mp4",
            "http://files.test/documents/b.mp4",
        ),
    );

    assert_eq!(
        text.processing_results().and_then(|r| r.content()),
        Some("alpha beta")
    );
    assert!(video.processing_results().is_none());
}
