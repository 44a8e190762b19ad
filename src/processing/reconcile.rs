//! Merge a routing decision with an optional extraction result.

use super::types::{ClassificationDecision, ExtractionResult, ProcessingOutcome};

/// Combine `decision` and `extraction` into the persisted outcome.
///
/// Decision and extraction fields live in distinct types, so neither fragment can absorb the
/// other's fields. An extraction paired with a decision that did not ask for processing is
/// dropped: `processing_results` exists only when processing was requested and an extractor ran.
pub fn reconcile(
    decision: ClassificationDecision,
    extraction: Option<ExtractionResult>,
) -> ProcessingOutcome {
    match extraction {
        Some(result) if decision.should_process() => ProcessingOutcome::extracted(decision, result),
        Some(_) => {
            tracing::warn!(
                workflow = ?decision.workflow_type(),
                "Discarding extraction result for a decision that skipped processing"
            );
            ProcessingOutcome::skipped(decision)
        }
        None => ProcessingOutcome::skipped(decision),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{ProcessingMethod, classify};
    use serde_json::Value;

    const DECISION_KEYS: [&str; 3] = ["should_process", "workflow_type", "reason"];
    const RESULT_KEYS: [&str; 5] = [
        "success",
        "content",
        "word_count",
        "processing_method",
        "error",
    ];

    fn fragment_keys(value: &Value, fragment: &str) -> Vec<String> {
        value[fragment]
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn assert_disjoint(outcome: &ProcessingOutcome) {
        let value = serde_json::to_value(outcome).expect("serialize");
        for key in fragment_keys(&value, "ai_workflow") {
            assert!(DECISION_KEYS.contains(&key.as_str()), "ai_workflow leaked {key}");
        }
        for key in fragment_keys(&value, "processing_results") {
            assert!(RESULT_KEYS.contains(&key.as_str()), "processing_results leaked {key}");
        }
    }

    #[test]
    fn absent_extraction_yields_decision_only() {
        let outcome = reconcile(classify("audio/mpeg"), None);
        assert!(outcome.processing_results().is_none());
        assert!(!outcome.ai_workflow().should_process());
        assert_disjoint(&outcome);
    }

    #[test]
    fn present_extraction_is_kept_separate() {
        let outcome = reconcile(
            classify("text/plain"),
            Some(ExtractionResult::succeeded(
                ProcessingMethod::TextSummarization,
                Some("hello world".into()),
                Some(2),
            )),
        );
        let results = outcome.processing_results().expect("results");
        assert_eq!(results.content(), Some("hello world"));
        assert_eq!(outcome.ai_workflow(), &classify("text/plain"));
        assert_disjoint(&outcome);
    }

    #[test]
    fn failed_extraction_keeps_fragments_disjoint() {
        let outcome = reconcile(
            classify("application/pdf"),
            Some(ExtractionResult::failed(
                ProcessingMethod::TextSummarization,
                "connection refused",
            )),
        );
        assert!(outcome.ai_workflow().should_process());
        assert_eq!(
            outcome.processing_results().and_then(ExtractionResult::error),
            Some("connection refused")
        );
        assert_disjoint(&outcome);
    }

    #[test]
    fn extraction_for_skipped_decision_is_dropped() {
        let outcome = reconcile(
            classify("video/mp4"),
            Some(ExtractionResult::succeeded(
                ProcessingMethod::VisionAnalysis,
                Some("stray".into()),
                None,
            )),
        );
        assert!(outcome.processing_results().is_none());
    }
}
