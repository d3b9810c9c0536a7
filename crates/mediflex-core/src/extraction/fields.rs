//! Per-line field scan shared by every parser.

use rust_decimal::Decimal;

use super::rules::{
    clean_name, has_excluded_keyword, AmountExtractor, BatchExtractor, BatchStyle, DateExtractor, ExpiryExtractor,
    ExtractionMatch, FieldExtractor, QuantityExtractor,
};
use crate::models::document::DocumentDate;

/// Fields found on a single line of OCR text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineFields {
    /// First date on the line. On product rows this is the expiry.
    pub date: Option<DocumentDate>,
    pub batch: Option<String>,
    /// First price on the line.
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
    /// What is left once every field above is removed, if it reads as a name.
    pub name: Option<String>,
}

impl LineFields {
    /// Scan one line.
    ///
    /// Extractors run in a fixed order and blank out what they consume:
    /// dates, month/year expiry, batch, prices, quantity. A price token is
    /// therefore never read back as a quantity.
    pub fn scan(line: &str, batch_style: BatchStyle) -> Self {
        let mut working = line.to_string();
        let mut fields = Self::default();

        let dates = DateExtractor::new().extract_all(&working);
        fields.date = dates.first().map(|m| m.value);
        for date in &dates {
            mask(&mut working, date);
        }

        if fields.date.is_none() {
            if let Some(expiry) = ExpiryExtractor::new().extract(&working) {
                fields.date = Some(expiry.value);
                mask(&mut working, &expiry);
            }
        }

        if let Some(batch) = BatchExtractor::new(batch_style).extract(&working) {
            mask(&mut working, &batch);
            fields.batch = Some(batch.value);
        }

        let prices = AmountExtractor::new().extract_all(&working);
        fields.price = prices.first().map(|m| m.value);
        for price in &prices {
            mask(&mut working, price);
        }

        // Unpriced lines also accept the loose batch form.
        if fields.price.is_none() && fields.batch.is_none() && batch_style == BatchStyle::Strict {
            if let Some(batch) = BatchExtractor::new(BatchStyle::Loose).extract(&working) {
                mask(&mut working, &batch);
                fields.batch = Some(batch.value);
            }
        }

        if let Some(quantity) = QuantityExtractor::new().extract(&working) {
            mask(&mut working, &quantity);
            fields.quantity = Some(quantity.value);
        }

        // Bare keyword or date lines carry detail only.
        let bare = fields.price.is_none() && fields.quantity.is_none();
        if !(bare && (fields.date.is_some() || has_excluded_keyword(line))) {
            fields.name = clean_name(&working);
        }
        fields
    }

    /// Whether the line carries a batch code or a date.
    pub fn has_detail(&self) -> bool {
        self.batch.is_some() || self.date.is_some()
    }

    /// A batch / expiry line with nothing else on it.
    pub fn is_detail_only(&self) -> bool {
        self.has_detail() && self.name.is_none() && self.price.is_none() && self.quantity.is_none()
    }
}

/// Name and explicit `x N` quantity of a product label line.
///
/// Unlike [`LineFields::scan`], bare numbers stay in the name so strengths
/// such as `Dolo 650` survive.
pub fn label_name(line: &str) -> (Option<String>, Option<u32>) {
    let mut working = line.to_string();

    for price in AmountExtractor::new().extract_all(&working) {
        mask(&mut working, &price);
    }

    let quantity = QuantityExtractor::new().extract_multiplier(&working);
    if let Some(found) = &quantity {
        mask(&mut working, found);
    }

    (clean_name(&working), quantity.map(|q| q.value))
}

/// Overwrite a matched span with spaces, keeping byte offsets stable.
fn mask<T>(text: &mut String, found: &ExtractionMatch<T>) {
    let Some((start, end)) = found.position else {
        return;
    };
    if let Some(span) = text.get(start..end) {
        let blank = " ".repeat(span.len());
        text.replace_range(start..end, &blank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scan_product_row() {
        let fields = LineFields::scan("Paracetamol 500mg 100 4.50", BatchStyle::Loose);
        assert_eq!(
            fields,
            LineFields {
                date: None,
                batch: None,
                price: Some(Decimal::new(450, 2)),
                quantity: Some(100),
                name: Some("Paracetamol 500mg".to_string()),
            }
        );
    }

    #[test]
    fn test_price_digits_never_become_quantity() {
        let fields = LineFields::scan("Syrup ₹99.00", BatchStyle::Loose);
        assert_eq!(fields.price, Some(Decimal::new(9900, 2)));
        assert_eq!(fields.quantity, None);
        assert_eq!(fields.name.as_deref(), Some("Syrup"));
    }

    #[test]
    fn test_scan_detail_row() {
        let fields = LineFields::scan("Batch No: AB12345 Exp: 31/12/2025", BatchStyle::Loose);
        assert_eq!(fields.batch.as_deref(), Some("AB12345"));
        assert_eq!(fields.date, Some(DocumentDate::new(2025, 12, 31)));
        assert_eq!(fields.quantity, None);
        assert_eq!(fields.name, None);
        assert!(fields.has_detail());
    }

    #[test]
    fn test_month_year_expiry_and_multiplier() {
        let fields = LineFields::scan("Amoxicillin 250mg x 10 EXP 06/2026 12.00", BatchStyle::Loose);
        assert_eq!(fields.date, Some(DocumentDate::new(2026, 6, 1)));
        assert_eq!(fields.quantity, Some(10));
        assert_eq!(fields.price, Some(Decimal::new(1200, 2)));
        assert_eq!(fields.name.as_deref(), Some("Amoxicillin 250mg"));
    }

    #[test]
    fn test_strict_batch_leaves_loose_label_in_name() {
        let fields = LineFields::scan("Cetirizine batch: CT5521", BatchStyle::Strict);
        assert_eq!(fields.batch.as_deref(), Some("CT5521"));
        assert_eq!(fields.name.as_deref(), Some("Cetirizine"));

        let fields = LineFields::scan("Cetirizine Lot CT5521 4.50", BatchStyle::Strict);
        assert_eq!(fields.batch, None);
    }

    #[test]
    fn test_unpriced_batch_line_is_detail_in_strict_mode() {
        let fields = LineFields::scan("Batch No: AB12345", BatchStyle::Strict);
        assert_eq!(fields.batch.as_deref(), Some("AB12345"));
        assert_eq!(fields.name, None);
        assert!(fields.is_detail_only());

        let fields = LineFields::scan("Lot 77123", BatchStyle::Strict);
        assert_eq!(fields.batch.as_deref(), Some("77123"));
        assert_eq!(fields.quantity, None);
        assert!(fields.is_detail_only());
    }

    #[test]
    fn test_keyword_lines_never_name() {
        let fields = LineFields::scan("Price on request", BatchStyle::Strict);
        assert_eq!(fields.name, None);
        assert!(!fields.is_detail_only());

        let fields = LineFields::scan("Expires soon", BatchStyle::Loose);
        assert_eq!(fields.name, None);

        let fields = LineFields::scan("Vitamin C Chewable", BatchStyle::Strict);
        assert_eq!(fields.name.as_deref(), Some("Vitamin C Chewable"));
    }

    #[test]
    fn test_label_name_keeps_strength() {
        assert_eq!(label_name("Dolo 650 x 2 ₹30.50"), (Some("Dolo 650".to_string()), Some(2)));
        assert_eq!(label_name("Crocin Advance"), (Some("Crocin Advance".to_string()), None));
    }

    #[test]
    fn test_scan_empty_and_noise() {
        assert_eq!(LineFields::scan("", BatchStyle::Loose), LineFields::default());
        let fields = LineFields::scan("@@## ||", BatchStyle::Strict);
        assert_eq!(fields.name, None);
    }
}
