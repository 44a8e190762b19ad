use std::sync::atomic::{AtomicU64, Ordering};

use crate::processing::ProcessingOutcome;

/// Thread-safe counters describing intake activity.
#[derive(Default)]
pub struct IntakeMetrics {
    documents_received: AtomicU64,
    documents_extracted: AtomicU64,
    extraction_failures: AtomicU64,
    documents_skipped: AtomicU64,
}

impl IntakeMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished pipeline run.
    pub fn record_outcome(&self, outcome: &ProcessingOutcome) {
        self.documents_received.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome.processing_results() {
            None => &self.documents_skipped,
            Some(result) if result.success() => &self.documents_extracted,
            Some(_) => &self.extraction_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_received: self.documents_received.load(Ordering::Relaxed),
            documents_extracted: self.documents_extracted.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            documents_skipped: self.documents_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of intake counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    /// Uploads that went through the pipeline since startup.
    pub documents_received: u64,
    /// Uploads whose extraction succeeded.
    pub documents_extracted: u64,
    /// Uploads whose extraction ran and failed.
    pub extraction_failures: u64,
    /// Uploads stored without extraction.
    pub documents_skipped: u64,
}
