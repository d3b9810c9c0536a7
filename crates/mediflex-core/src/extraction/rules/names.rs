//! Name inference and summary-row detection.

use regex::Regex;
use tracing::warn;

use super::patterns::{FIELD_LABEL, NAME_EXCLUDED};

const EDGE_PUNCTUATION: &[char] = &[':', '|', ',', ';', '-', '/', '*', '#', '@', '='];

/// Turn the text left over after field extraction into a name.
///
/// Label words are dropped, whitespace collapsed and edge punctuation
/// trimmed. Returns `None` unless a letter remains.
pub fn clean_name(residual: &str) -> Option<String> {
    let without_labels = FIELD_LABEL.replace_all(residual, " ");
    let collapsed = without_labels.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c.is_whitespace() || EDGE_PUNCTUATION.contains(&c));

    if trimmed.chars().any(char::is_alphabetic) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

/// Whether a line mentions batch, lot, expiry or price and so cannot be a
/// product label name.
pub fn has_excluded_keyword(line: &str) -> bool {
    NAME_EXCLUDED.is_match(line)
}

/// Recognises rows that carry document totals rather than products.
#[derive(Debug, Clone, Default)]
pub struct SummaryMatcher {
    pattern: Option<Regex>,
}

impl SummaryMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut words: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if words.is_empty() {
            return Self::disabled();
        }

        // Longest first so "grand total" is preferred over "total".
        words.sort_by_key(|w| std::cmp::Reverse(w.len()));
        let alternatives: Vec<String> = words
            .iter()
            .map(|w| {
                w.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();

        let source = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
        match Regex::new(&source) {
            Ok(pattern) => Self {
                pattern: Some(pattern),
            },
            Err(e) => {
                warn!("Ignoring summary keywords: {}", e);
                Self::disabled()
            }
        }
    }

    /// A matcher that never matches.
    pub fn disabled() -> Self {
        Self { pattern: None }
    }

    pub fn is_summary(&self, line: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_name_strips_labels_and_punctuation() {
        assert_eq!(clean_name("Paracetamol 500mg   "), Some("Paracetamol 500mg".to_string()));
        assert_eq!(clean_name("- Ibuprofen |  Qty:   Price: "), Some("Ibuprofen".to_string()));
        assert_eq!(clean_name("Cough Syrup, MRP"), Some("Cough Syrup".to_string()));
    }

    #[test]
    fn test_clean_name_requires_letter() {
        assert_eq!(clean_name("  ---  "), None);
        assert_eq!(clean_name("123 / 45"), None);
        assert_eq!(clean_name("Qty Price"), None);
    }

    #[test]
    fn test_excluded_keywords() {
        assert!(has_excluded_keyword("Batch AB12345"));
        assert!(has_excluded_keyword("EXP. 12/25"));
        assert!(has_excluded_keyword("Price 4.50"));
        assert!(!has_excluded_keyword("Expectorant Syrup"));
        assert!(!has_excluded_keyword("Dolo 650"));
    }

    #[test]
    fn test_summary_matcher() {
        let matcher = SummaryMatcher::new(&["total", "grand total", "gst"]);
        assert!(matcher.is_summary("Grand  Total 450.00"));
        assert!(matcher.is_summary("GST 18% 12.00"));
        assert!(!matcher.is_summary("Totalin Cream 15g 2 3.50"));
        assert!(!SummaryMatcher::disabled().is_summary("Total 4.00"));
        assert!(!SummaryMatcher::new::<&str>(&[]).is_summary("Total 4.00"));
    }
}
