//! Looser second pass used when the accumulator finds nothing.

use tracing::debug;

use super::classifier::{ClassifiedLine, LineCategory};
use crate::models::document::ExtractedProduct;

/// Treats any sufficiently long priced line as one product.
pub struct FallbackScanner {
    min_line_length: usize,
}

impl FallbackScanner {
    /// Lines must be strictly longer than `min_line_length` characters.
    pub fn new(min_line_length: usize) -> Self {
        Self { min_line_length }
    }

    /// Scan every line of the document, header or not.
    pub fn scan(&self, lines: &[ClassifiedLine<'_>]) -> Vec<ExtractedProduct> {
        lines
            .iter()
            .filter(|line| line.category != LineCategory::Summary)
            .filter(|line| line.text.trim().chars().count() > self.min_line_length)
            .filter_map(|line| {
                let price = line.fields.price?;
                let name = line.fields.name.clone()?;
                debug!(line = line.text, "fallback product");

                let mut product = ExtractedProduct::new(name, line.fields.quantity.unwrap_or(1), price);
                product.batch = line.fields.batch.clone();
                product.expiry = line.fields.date;
                Some(product)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::classifier::LineClassifier;
    use crate::extraction::rules::{BatchStyle, SummaryMatcher};
    use rust_decimal::Decimal;

    fn scan(text: &str) -> Vec<ExtractedProduct> {
        let summary = SummaryMatcher::new(&["total"]);
        let lines = LineClassifier::new(BatchStyle::Loose, &summary).classify_all(text.lines());
        FallbackScanner::new(10).scan(&lines)
    }

    #[test]
    fn test_priced_lines_without_header() {
        let products = scan("City Pharmacy\nCrocin Advance x 2 ₹30.50\nTotal 61.00");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Crocin Advance");
        assert_eq!(products[0].quantity, 2);
        assert_eq!(products[0].price, Decimal::new(3050, 2));
    }

    #[test]
    fn test_short_lines_ignored() {
        // "Gel 4.50" is only 8 characters.
        assert!(scan("Gel 4.50").is_empty());
        assert_eq!(scan("Ointment 4.50").len(), 1);
    }

    #[test]
    fn test_lines_without_name_ignored() {
        assert!(scan("4.50 12.00 100").is_empty());
    }
}
