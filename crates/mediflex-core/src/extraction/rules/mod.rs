//! Rule-based field extractors for pharmacy documents.

pub mod amounts;
pub mod batch;
pub mod dates;
pub mod names;
pub mod patterns;
pub mod quantity;

pub use amounts::{parse_amount, AmountExtractor};
pub use batch::{BatchExtractor, BatchStyle};
pub use dates::{normalize_date, DateExtractor, ExpiryExtractor};
pub use names::{clean_name, has_excluded_keyword, SummaryMatcher};
pub use quantity::QuantityExtractor;

/// Trait for field extractors.
///
/// Extractors are total: malformed input yields `None` or an empty list.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, in text order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte span in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
