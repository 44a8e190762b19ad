//! Helpers for normalizing extracted text and model output.

/// Markdown markers removed from model responses.
const MARKDOWN_MARKERS: [&str; 2] = ["```", "**"];

/// Sanitize arbitrary string input by trimming whitespace and dropping empties.
pub(crate) fn sanitize_string(value: Option<String>) -> Option<String> {
    value.and_then(|input| {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Remove code-fence and bold markers, then trim.
pub fn strip_markdown_markers(text: &str) -> String {
    MARKDOWN_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
        .trim()
        .to_string()
}

/// Keep at most `max_chars` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Count whitespace-delimited words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_string_trims_and_drops_empty() {
        assert_eq!(sanitize_string(Some("  a.txt ".into())), Some("a.txt".into()));
        assert_eq!(sanitize_string(Some("   ".into())), None);
        assert_eq!(sanitize_string(None), None);
    }

    #[test]
    fn strips_fences_and_bold() {
        let raw = "```\n**Summary:** A quarterly report.\n```";
        assert_eq!(strip_markdown_markers(raw), "Summary: A quarterly report.");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn counts_words_across_whitespace() {
        assert_eq!(count_words(" one\ttwo\n three  "), 3);
        assert_eq!(count_words(""), 0);
    }
}
