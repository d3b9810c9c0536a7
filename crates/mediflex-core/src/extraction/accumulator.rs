//! Folds product lines into closed records.

use rust_decimal::Decimal;
use tracing::debug;

use super::fields::LineFields;
use crate::models::document::{DocumentDate, ExtractedProduct};

/// A record whose fields are still being collected.
#[derive(Debug, Clone, Default, PartialEq)]
struct PartialRecord {
    name: Option<String>,
    quantity: Option<u32>,
    price: Option<Decimal>,
    batch: Option<String>,
    expiry: Option<DocumentDate>,
}

impl PartialRecord {
    /// Attach batch and expiry, keeping values already collected.
    fn merge_detail(&mut self, fields: &LineFields) {
        if self.batch.is_none() {
            self.batch = fields.batch.clone();
        }
        if self.expiry.is_none() {
            self.expiry = fields.date;
        }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Named and priced, only waiting for detail lines.
    fn is_complete(&self) -> bool {
        self.name.is_some() && self.price.is_some()
    }

    fn into_product(self) -> Option<ExtractedProduct> {
        let name = self.name?;
        let mut product = ExtractedProduct::new(
            name,
            self.quantity.unwrap_or(1),
            self.price.unwrap_or(Decimal::ZERO),
        );
        product.batch = self.batch;
        product.expiry = self.expiry;
        Some(product)
    }
}

/// Product / medicine accumulator.
///
/// Holds at most one in-progress record. A record closes when a price
/// line arrives after its name, or when a single line carries both. A name
/// that follows its price keeps the record open until the next named line.
/// Detail lines arriving with no record open belong to the last closed one,
/// or to the first record when none has closed yet.
#[derive(Debug, Default)]
pub struct Accumulator {
    current: PartialRecord,
    records: Vec<ExtractedProduct>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one product-list line.
    pub fn push(&mut self, fields: &LineFields) {
        if self.current.is_complete() && fields.name.is_some() {
            self.close();
        }

        if self.current.is_empty() && fields.is_detail_only() {
            if let Some(last) = self.records.last_mut() {
                if last.batch.is_none() {
                    last.batch = fields.batch.clone();
                }
                if last.expiry.is_none() {
                    last.expiry = fields.date;
                }
                return;
            }
        }

        let current = &mut self.current;

        if let Some(price) = fields.price {
            if current.name.is_some() {
                current.price = Some(price);
                if current.quantity.is_none() {
                    current.quantity = fields.quantity;
                }
                current.merge_detail(fields);
                self.close();
            } else {
                current.price = Some(price);
                current.quantity = fields.quantity.or(current.quantity);
                current.merge_detail(fields);
                if let Some(name) = &fields.name {
                    current.name = Some(name.clone());
                    self.close();
                }
            }
        } else if let Some(quantity) = fields.quantity {
            if current.name.is_none() {
                current.quantity = Some(quantity);
                current.name = fields.name.clone();
            } else if current.quantity.is_none() {
                current.quantity = Some(quantity);
            }
            current.merge_detail(fields);
        } else if current.name.is_none() {
            current.merge_detail(fields);
            current.name = fields.name.clone();
        } else {
            current.merge_detail(fields);
        }
    }

    /// Flush the in-progress record and return every record in order.
    pub fn finish(mut self) -> Vec<ExtractedProduct> {
        self.close();
        self.records
    }

    fn close(&mut self) {
        if let Some(product) = std::mem::take(&mut self.current).into_product() {
            debug!(name = %product.name, quantity = product.quantity, "closed record");
            self.records.push(product);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::rules::BatchStyle;
    use pretty_assertions::assert_eq;

    fn accumulate(lines: &[&str]) -> Vec<ExtractedProduct> {
        let mut accumulator = Accumulator::new();
        for line in lines {
            accumulator.push(&LineFields::scan(line, BatchStyle::Loose));
        }
        accumulator.finish()
    }

    fn product(name: &str, quantity: u32, price: Decimal) -> ExtractedProduct {
        ExtractedProduct::new(name, quantity, price)
    }

    #[test]
    fn test_single_line_records_keep_order() {
        let records = accumulate(&[
            "Paracetamol 500mg 100 4.50",
            "Ibuprofen 200mg 50 3.20",
            "Cetirizine 10mg 30 1.10",
        ]);
        assert_eq!(
            records,
            vec![
                product("Paracetamol 500mg", 100, Decimal::new(450, 2)),
                product("Ibuprofen 200mg", 50, Decimal::new(320, 2)),
                product("Cetirizine 10mg", 30, Decimal::new(110, 2)),
            ]
        );
    }

    #[test]
    fn test_record_split_across_lines() {
        let records = accumulate(&["Amoxicillin 250mg", "Batch AX77120", "20", "6.75"]);

        let mut expected = product("Amoxicillin 250mg", 20, Decimal::new(675, 2));
        expected.batch = Some("AX77120".to_string());
        assert_eq!(records, vec![expected]);
    }

    #[test]
    fn test_quantity_then_price_line() {
        let records = accumulate(&["Dolo Tablets 15", "Rs. 30.00"]);
        assert_eq!(records, vec![product("Dolo Tablets", 15, Decimal::new(3000, 2))]);
    }

    #[test]
    fn test_price_before_name() {
        let records = accumulate(&["12.00", "Vitamin C Chewable"]);
        assert_eq!(records, vec![product("Vitamin C Chewable", 1, Decimal::new(1200, 2))]);
    }

    #[test]
    fn test_price_before_name_keeps_following_detail() {
        let lines = ["12.00", "Vitamin C Chewable", "Batch No: AB12345", "Zinc Tablets 3.00"];
        let mut accumulator = Accumulator::new();
        for line in lines {
            accumulator.push(&LineFields::scan(line, BatchStyle::Strict));
        }

        let mut vitamin = product("Vitamin C Chewable", 1, Decimal::new(1200, 2));
        vitamin.batch = Some("AB12345".to_string());
        assert_eq!(
            accumulator.finish(),
            vec![vitamin, product("Zinc Tablets", 1, Decimal::new(300, 2))]
        );
    }

    #[test]
    fn test_detail_line_after_closed_record() {
        let records = accumulate(&[
            "Paracetamol 500mg 100 4.50",
            "Batch PCM2301 Exp 31/12/2025",
            "Ibuprofen 200mg 50 3.20",
        ]);

        let mut paracetamol = product("Paracetamol 500mg", 100, Decimal::new(450, 2));
        paracetamol.batch = Some("PCM2301".to_string());
        paracetamol.expiry = Some(DocumentDate::new(2025, 12, 31));
        assert_eq!(
            records,
            vec![paracetamol, product("Ibuprofen 200mg", 50, Decimal::new(320, 2))]
        );
    }

    #[test]
    fn test_expiry_on_price_line() {
        let records = accumulate(&["Azithromycin 500mg", "3 45.00 Exp 09/2026"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quantity, 3);
        assert_eq!(records[0].expiry, Some(DocumentDate::new(2026, 9, 1)));
    }

    #[test]
    fn test_end_of_stream_defaults() {
        let records = accumulate(&["ORS Sachet"]);
        assert_eq!(records, vec![product("ORS Sachet", 1, Decimal::ZERO)]);
    }

    #[test]
    fn test_nameless_state_discarded() {
        assert!(accumulate(&["4.50", "10", "Batch ZZ99881"]).is_empty());
        assert!(accumulate(&[]).is_empty());
    }
}
