//! Batch / lot code extraction.

use regex::Regex;

use super::patterns::{BATCH_LOOSE, BATCH_STRICT};
use super::{ExtractionMatch, FieldExtractor};

/// How strictly a batch label must be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchStyle {
    /// `batch` or `lot` followed by a code of five or more alphanumerics.
    #[default]
    Loose,
    /// `batch:`, `lot:` or `b/no:` with an explicit colon.
    Strict,
}

/// Batch field extractor.
pub struct BatchExtractor {
    style: BatchStyle,
}

impl BatchExtractor {
    pub fn new(style: BatchStyle) -> Self {
        Self { style }
    }

    fn pattern(&self) -> &'static Regex {
        match self.style {
            BatchStyle::Loose => &BATCH_LOOSE,
            BatchStyle::Strict => &BATCH_STRICT,
        }
    }
}

impl Default for BatchExtractor {
    fn default() -> Self {
        Self::new(BatchStyle::default())
    }
}

impl FieldExtractor for BatchExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern()
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                let code = caps.get(1)?.as_str().trim_end_matches(['-', '/']);
                if code.is_empty() {
                    return None;
                }
                Some(
                    ExtractionMatch::new(code.to_uppercase(), 0.85, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}
