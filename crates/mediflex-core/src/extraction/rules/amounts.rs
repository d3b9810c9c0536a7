//! Price extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::PRICE;
use super::{ExtractionMatch, FieldExtractor};

const CURRENCY_PREFIXES: [&str; 7] = ["inr", "rs.", "rs", "$", "£", "€", "₹"];

/// Price field extractor.
///
/// The matched span covers the currency symbol so callers can mask it.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in PRICE.captures_iter(text) {
            let (Some(full_match), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(amount) = parse_amount(number.as_str()) {
                results.push(
                    ExtractionMatch::new(amount, 0.8, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Parse a printed amount into a decimal.
///
/// Handles currency symbols, `1,234.56` thousands separators and
/// `12,50` decimal commas. Negative amounts are rejected.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let lowered = s.trim().to_lowercase();
    let mut rest = lowered.as_str();
    for symbol in CURRENCY_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(symbol) {
            rest = stripped;
            break;
        }
    }
    let cleaned: String = rest.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() || cleaned.starts_with('-') {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // 1,234.56
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // 12,50
        (Some(comma), None) if cleaned.len() - comma - 1 <= 2 => cleaned.replacen(',', ".", 1),
        // 1,234
        (Some(_), None) => cleaned.replace(',', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}
