//! Date extraction.
//!
//! Dates are read positionally (day / month / year, or ISO year first) and
//! are not checked against the calendar.

use regex::Captures;

use super::patterns::{DATE_DMY, DATE_YMD, EXPIRY_MONTH_YEAR};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::document::DocumentDate;

/// Full date extractor (`15/01/2024`, `5-3-24`, `2024-01-15`).
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<DocumentDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in DATE_DMY.captures_iter(text) {
            let day = parse_component(&caps, 1);
            let month = parse_component(&caps, 2);
            let year = parse_year(&caps[3]);
            push_match(&mut results, &caps, DocumentDate::new(year, month, day), 0.9);
        }

        for caps in DATE_YMD.captures_iter(text) {
            let year = parse_component(&caps, 1);
            let month = parse_component(&caps, 2);
            let day = parse_component(&caps, 3);
            push_match(&mut results, &caps, DocumentDate::new(year, month, day), 0.95);
        }

        results.sort_by_key(|m| m.position.map(|(start, _)| start));
        results
    }
}

/// Month / year expiry extractor (`EXP 12/2025`, `Expiry: 03-26`).
///
/// The day is always the first of the month.
pub struct ExpiryExtractor;

impl ExpiryExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExpiryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ExpiryExtractor {
    type Output = ExtractionMatch<DocumentDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in EXPIRY_MONTH_YEAR.captures_iter(text) {
            let month = parse_component(&caps, 1);
            let year = parse_year(&caps[2]);
            push_match(&mut results, &caps, DocumentDate::new(year, month, 1), 0.8);
        }

        results
    }
}

/// Normalize the first date found in `text`.
///
/// `"5/3/24"` becomes 2024-03-05 and `"15-01-2023"` becomes 2023-01-15.
pub fn normalize_date(text: &str) -> Option<DocumentDate> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

fn push_match(
    results: &mut Vec<ExtractionMatch<DocumentDate>>,
    caps: &Captures<'_>,
    date: DocumentDate,
    confidence: f32,
) {
    if let Some(full_match) = caps.get(0) {
        results.push(
            ExtractionMatch::new(date, confidence, full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        );
    }
}

fn parse_component(caps: &Captures<'_>, index: usize) -> u32 {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Two-digit years are taken as 20xx.
fn parse_year(s: &str) -> u32 {
    let year: u32 = s.parse().unwrap_or(0);
    if s.len() == 2 { 2000 + year } else { year }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_date_expands_year() {
        assert_eq!(normalize_date("5/3/24"), Some(DocumentDate::new(2024, 3, 5)));
        assert_eq!(normalize_date("5/3/24").unwrap().to_string(), "2024-03-05");
    }

    #[test]
    fn test_dash_date_is_positional() {
        let date = normalize_date("Dated 15-01-2023").unwrap();
        assert_eq!(date.to_string(), "2023-01-15");
    }

    #[test]
    fn test_iso_date() {
        let result = DateExtractor::new().extract("Date: 2024-01-15").unwrap();
        assert_eq!(result.value, DocumentDate::new(2024, 1, 15));
        assert_eq!(result.source, "2024-01-15");
        assert_eq!(result.position, Some((6, 16)));
    }

    #[test]
    fn test_invalid_calendar_date_passes_through() {
        let date = normalize_date("31/02/2024").unwrap();
        assert_eq!(date.to_string(), "2024-02-31");
        assert!(!date.is_calendar_valid());

        let date = normalize_date("01.13.2024").unwrap();
        assert_eq!(date.month(), 13);
    }

    #[test]
    fn test_dates_in_text_order() {
        let dates = DateExtractor::new().extract_all("2024-06-01 then 01/02/2025");
        let values: Vec<String> = dates.iter().map(|m| m.value.to_string()).collect();
        assert_eq!(values, vec!["2024-06-01", "2025-02-01"]);
    }

    #[test]
    fn test_month_year_expiry() {
        let result = ExpiryExtractor::new().extract("EXP 12/2025").unwrap();
        assert_eq!(result.value, DocumentDate::new(2025, 12, 1));

        let result = ExpiryExtractor::new().extract("Expiry Date: 03-26").unwrap();
        assert_eq!(result.value, DocumentDate::new(2026, 3, 1));

        assert!(ExpiryExtractor::new().extract("12/2025").is_none());
    }

    #[test]
    fn test_no_date() {
        assert!(normalize_date("Paracetamol 500mg").is_none());
        assert!(normalize_date("").is_none());
    }
}
