//! Intake pipeline: routing, extraction, and result reconciliation.

pub mod classifier;
pub mod extractors;
mod reconcile;
pub mod sanitize;
mod service;
pub mod types;

pub use classifier::{CONTENT_TYPE_RULES, classify, lookup_rule};
pub use extractors::{CondensedText, condense_text, describe_image, extract_text};
pub use reconcile::reconcile;
pub use service::DocumentPipeline;
pub use types::{
    ClassificationDecision, ClassificationFault, ContentCategory, ContentTypeRule,
    ExtractionError, ExtractionResult, ExtractorKind, ParseError, ProcessingMethod,
    ProcessingOutcome, WorkflowType,
};
