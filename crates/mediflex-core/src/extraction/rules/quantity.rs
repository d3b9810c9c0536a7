//! Quantity extraction.

use super::patterns::{BARE_INTEGER, MULTIPLIER_QUANTITY};
use super::{ExtractionMatch, FieldExtractor};

/// Quantity field extractor.
///
/// An explicit `x 10` / `× 10` wins over bare integers. Zero and
/// out-of-range tokens are never quantities.
pub struct QuantityExtractor;

impl QuantityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Explicit multiplier quantities only.
    pub fn extract_multiplier(&self, text: &str) -> Option<ExtractionMatch<u32>> {
        MULTIPLIER_QUANTITY.captures_iter(text).find_map(|caps| {
            let full_match = caps.get(0)?;
            let value = positive(caps.get(1)?.as_str())?;
            Some(
                ExtractionMatch::new(value, 0.9, full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            )
        })
    }

    fn bare_integers(&self, text: &str) -> Vec<ExtractionMatch<u32>> {
        BARE_INTEGER
            .find_iter(text)
            .filter_map(|m| {
                let value = positive(m.as_str())?;
                Some(ExtractionMatch::new(value, 0.6, m.as_str()).with_position(m.start(), m.end()))
            })
            .collect()
    }
}

impl Default for QuantityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for QuantityExtractor {
    type Output = ExtractionMatch<u32>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_multiplier(text)
            .or_else(|| self.bare_integers(text).into_iter().next())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();
        if let Some(multiplier) = self.extract_multiplier(text) {
            results.push(multiplier);
        }
        for candidate in self.bare_integers(text) {
            let overlaps = results.iter().any(|r| match (r.position, candidate.position) {
                (Some((start, end)), Some((c_start, c_end))) => c_start < end && start < c_end,
                _ => false,
            });
            if !overlaps {
                results.push(candidate);
            }
        }
        results
    }
}

fn positive(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|&n| n >= 1)
}
