//! Static content-type routing.
//!
//! Every upload is routed by a table lookup on its declared MIME type. The table is the single
//! source of truth: a content type maps to exactly one rule, and anything unmatched is skipped.

use super::types::{
    ClassificationDecision, ClassificationFault, ContentCategory, ContentTypeRule, ExtractorKind,
    WorkflowType,
};

/// MIME type of Word documents; also matched by any `wordprocessingml` variant.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const DOCX_VARIANT_MARKER: &str = "wordprocessingml";

/// Reason recorded for content types missing from [`CONTENT_TYPE_RULES`].
pub const UNSUPPORTED_REASON: &str = "unsupported content type";

const fn text(content_type: &'static str) -> ContentTypeRule {
    ContentTypeRule {
        content_type,
        category: ContentCategory::Text,
        extractor: Some(ExtractorKind::TextParser),
    }
}

const fn image(content_type: &'static str) -> ContentTypeRule {
    ContentTypeRule {
        content_type,
        category: ContentCategory::Image,
        extractor: Some(ExtractorKind::ImageAnalyzer),
    }
}

const fn skip(content_type: &'static str) -> ContentTypeRule {
    ContentTypeRule {
        content_type,
        category: ContentCategory::Skip,
        extractor: None,
    }
}

/// Routing table consulted by [`classify`].
pub const CONTENT_TYPE_RULES: &[ContentTypeRule] = &[
    text("text/plain"),
    text("application/pdf"),
    text("text/csv"),
    text(DOCX_CONTENT_TYPE),
    image("image/png"),
    image("image/jpeg"),
    skip("audio/mpeg"),
    skip("video/mp4"),
    skip("video/webm"),
];

/// Normalize a declared content type for lookup: drop parameters, trim, lowercase.
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Reject blank content types before they reach the table.
pub fn require_content_type(raw: &str) -> Result<String, ClassificationFault> {
    let normalized = normalize_content_type(raw);
    if normalized.is_empty() {
        Err(ClassificationFault::MissingContentType)
    } else {
        Ok(normalized)
    }
}

/// Find the rule for a content type, matching exactly first and then by DOCX variant.
pub fn lookup_rule(content_type: &str) -> Option<&'static ContentTypeRule> {
    let normalized = normalize_content_type(content_type);
    if normalized.is_empty() {
        return None;
    }
    CONTENT_TYPE_RULES
        .iter()
        .find(|rule| rule.content_type == normalized)
        .or_else(|| {
            normalized
                .contains(DOCX_VARIANT_MARKER)
                .then(|| {
                    CONTENT_TYPE_RULES
                        .iter()
                        .find(|rule| rule.content_type == DOCX_CONTENT_TYPE)
                })
                .flatten()
        })
}

/// Decide whether and how an upload with `content_type` is processed.
pub fn classify(content_type: &str) -> ClassificationDecision {
    let Some(rule) = lookup_rule(content_type) else {
        return ClassificationDecision::skip(UNSUPPORTED_REASON);
    };

    let workflow = WorkflowType::from(rule.category);
    let reason = match workflow {
        WorkflowType::TextProcessing => format!(
            "{} is a text document: extract its text and summarize it",
            rule.content_type
        ),
        WorkflowType::ImageProcessing => {
            format!("{} is an image: describe its visual content", rule.content_type)
        }
        WorkflowType::SkipProcessing => {
            format!("{} is stored as-is without processing", rule.content_type)
        }
    };
    ClassificationDecision::new(workflow, reason)
}
