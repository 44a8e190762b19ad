//! Content extractors: document bytes to text, text to condensed content, images to descriptions.
//!
//! Parsing is synchronous and CPU-bound; [`extract_text_blocking`] moves it onto tokio's blocking
//! pool and converts parser panics (malformed fonts and similar) into [`ParseError`].

use super::classifier::{DOCX_CONTENT_TYPE, normalize_content_type};
use super::sanitize::{count_words, truncate_chars};
use super::types::ParseError;
use crate::summarization::{GenerationError, SummarizationAdapter, prompts};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Placeholder returned for text-family formats without a dedicated parser.
pub const UNSUPPORTED_TEXT_FORMAT: &str = "Unsupported text format";

/// Texts with at most this many words are kept verbatim instead of summarized.
pub const SHORT_TEXT_WORD_LIMIT: usize = 5;

/// Characters of extracted text forwarded to the summarizer.
pub const SUMMARY_INPUT_CHAR_LIMIT: usize = 4000;

/// Characters kept in the persisted content.
pub const CONTENT_CHAR_LIMIT: usize = 1000;

/// Parsing strategy for a text-family content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Decoded verbatim.
    Plain,
    /// Decoded verbatim, no structural parsing.
    Csv,
    /// Text layer of every page.
    Pdf,
    /// Paragraph text from the Word document body.
    Docx,
    /// No parser; extraction yields [`UNSUPPORTED_TEXT_FORMAT`].
    Unsupported,
}

impl TextFormat {
    /// Select the parser for a declared content type.
    pub fn detect(content_type: &str) -> Self {
        let normalized = normalize_content_type(content_type);
        match normalized.as_str() {
            "text/plain" => Self::Plain,
            "text/csv" => Self::Csv,
            "application/pdf" => Self::Pdf,
            DOCX_CONTENT_TYPE => Self::Docx,
            other if other.contains("wordprocessingml") => Self::Docx,
            _ => Self::Unsupported,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Plain => "text",
            Self::Csv => "CSV",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Turn raw document bytes into plain text according to `content_type`.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ParseError> {
    match TextFormat::detect(content_type) {
        TextFormat::Plain | TextFormat::Csv => Ok(String::from_utf8_lossy(bytes).into_owned()),
        TextFormat::Pdf => extract_pdf_text(bytes),
        TextFormat::Docx => extract_docx_text(bytes),
        TextFormat::Unsupported => Ok(UNSUPPORTED_TEXT_FORMAT.to_string()),
    }
}

/// Run [`extract_text`] on the blocking pool, isolating parser panics.
pub async fn extract_text_blocking(
    bytes: Vec<u8>,
    content_type: String,
) -> Result<String, ParseError> {
    let format = TextFormat::detect(&content_type);
    let task = tokio::task::spawn_blocking(move || {
        catch_unwind(AssertUnwindSafe(|| extract_text(&bytes, &content_type)))
    });
    match task.await {
        Ok(Ok(result)) => result,
        Ok(Err(_panic)) => {
            tracing::error!(format = format.label(), "Document parser panicked");
            Err(ParseError::Panicked(format.label()))
        }
        Err(join_error) => Err(ParseError::Interrupted(join_error.to_string())),
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ParseError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|error| ParseError::Pdf(error.to_string()))?;
    tracing::debug!(chars = text.len(), "Extracted PDF text");
    Ok(text)
}

fn extract_docx_text(bytes: &[u8]) -> Result<String, ParseError> {
    let document =
        docx_rs::read_docx(bytes).map_err(|error| ParseError::Docx(error.to_string()))?;
    let paragraphs: Vec<String> = document
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();
    tracing::debug!(paragraphs = paragraphs.len(), "Extracted DOCX paragraphs");
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut output = String::new();
    for child in &paragraph.children {
        push_paragraph_child(child, &mut output);
    }
    output
}

fn push_paragraph_child(child: &docx_rs::ParagraphChild, output: &mut String) {
    match child {
        docx_rs::ParagraphChild::Run(run) => {
            for run_child in &run.children {
                match run_child {
                    docx_rs::RunChild::Text(text) => output.push_str(&text.text),
                    docx_rs::RunChild::Tab(_) => output.push('\t'),
                    _ => {}
                }
            }
        }
        docx_rs::ParagraphChild::Hyperlink(link) => {
            for nested in &link.children {
                push_paragraph_child(nested, output);
            }
        }
        _ => {}
    }
}

/// Extracted text reduced to what gets persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondensedText {
    /// Summary, or the trimmed text itself for short documents (empty when nothing was extracted).
    pub content: String,
    /// Word count of the trimmed raw text.
    pub word_count: usize,
    /// Whether the summarizer produced `content`.
    pub summarized: bool,
}

/// Condense extracted text: short texts are kept verbatim, longer ones summarized.
///
/// At most [`SUMMARY_INPUT_CHAR_LIMIT`] characters reach the summarizer and at most
/// [`CONTENT_CHAR_LIMIT`] characters are kept. Summarizer failures propagate; the raw text is
/// never substituted for a failed summary.
pub async fn condense_text(
    raw_text: &str,
    summarizer: &SummarizationAdapter,
) -> Result<CondensedText, GenerationError> {
    let trimmed = raw_text.trim();
    let word_count = count_words(trimmed);

    if word_count <= SHORT_TEXT_WORD_LIMIT {
        return Ok(CondensedText {
            content: truncate_chars(trimmed, CONTENT_CHAR_LIMIT).to_string(),
            word_count,
            summarized: false,
        });
    }

    let excerpt = truncate_chars(trimmed, SUMMARY_INPUT_CHAR_LIMIT);
    let summary = summarizer
        .summarize(&prompts::text_summary_prompt(excerpt))
        .await?;
    Ok(CondensedText {
        content: truncate_chars(&summary, CONTENT_CHAR_LIMIT).to_string(),
        word_count,
        summarized: true,
    })
}

/// Describe the image at `file_reference` with the vision model.
pub async fn describe_image(
    summarizer: &SummarizationAdapter,
    file_reference: &str,
    content_type: &str,
) -> Result<String, GenerationError> {
    let prompt = prompts::image_analysis_prompt(file_reference, content_type);
    summarizer.describe_image(file_reference, &prompt).await
}
