//! Property tests: extraction is total and its records keep their guarantees
//! for arbitrary input.

use chrono::NaiveDate;
use mediflex_core::{DocumentExtractor, HeuristicParser, ScanMode};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn parser() -> HeuristicParser {
    HeuristicParser::new().with_reference_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
}

/// Text built from receipt-like fragments so the rules actually fire.
fn receipt_like() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("Item Qty Price".to_string()),
        Just("Distributor: ".to_string()),
        Just("Batch: ".to_string()),
        Just("Total".to_string()),
        "[A-Za-z]{3,12}",
        "[0-9]{1,4}",
        "[0-9]{1,3}\\.[0-9]{2}",
        "[0-9]{2}/[0-9]{2}/[0-9]{2,4}",
        "x ?[0-9]{1,3}",
        "[ \\t:,-]{1,3}",
    ];
    prop::collection::vec(prop::collection::vec(fragment, 0..6), 0..12).prop_map(|lines| {
        lines
            .into_iter()
            .map(|parts| parts.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// A product row in the `name price quantity` shape the CLI prints.
fn formatted_row() -> impl Strategy<Value = (String, Decimal, u32)> {
    let base = prop::sample::select(vec![
        "Paracetamol",
        "Ibuprofen",
        "Cetirizine",
        "Amoxicillin",
        "Azithral",
        "Metformin",
        "Crocin Advance",
    ]);
    (base, 1u32..1000, 1i64..1_000_000, 1u32..10_000).prop_map(|(base, strength, cents, quantity)| {
        (format!("{base} {strength}mg"), Decimal::new(cents, 2), quantity)
    })
}

proptest! {
    #[test]
    fn formatted_rows_parse_back((name, price, quantity) in formatted_row()) {
        let line = format!("{name} {price} {quantity}");
        for text in [line.clone(), format!("Item Qty Price\n{line}")] {
            let receipt = parser().parse_order_receipt(&text);
            prop_assert_eq!(receipt.products.len(), 1);
            let product = &receipt.products[0];
            prop_assert_eq!(&product.name, &name);
            prop_assert_eq!(product.price, price);
            prop_assert_eq!(product.quantity, quantity);
        }
    }

    #[test]
    fn extraction_never_panics(text in "\\PC*") {
        let parser = parser();
        for mode in [ScanMode::Product, ScanMode::Patient, ScanMode::Order] {
            parser.scan(mode, &text);
        }
    }

    #[test]
    fn receipt_products_keep_their_guarantees(text in receipt_like()) {
        let receipt = parser().parse_order_receipt(&text);
        for product in &receipt.products {
            prop_assert!(!product.name.trim().is_empty());
            prop_assert!(product.quantity >= 1);
            prop_assert!(product.price >= Decimal::ZERO);
        }
    }

    #[test]
    fn patient_medicines_keep_their_guarantees(text in receipt_like()) {
        let patient = parser().parse_patient_medicines(&text);
        for medicine in &patient.medicines {
            prop_assert!(!medicine.name.trim().is_empty());
            prop_assert!(medicine.quantity >= 1);
            prop_assert!(medicine.price >= Decimal::ZERO);
        }
    }

    #[test]
    fn single_product_quantity_is_positive(text in receipt_like()) {
        let guess = parser().parse_single_product(&text);
        prop_assert!(guess.quantity >= 1);
        if let Some(price) = guess.price {
            prop_assert!(price >= Decimal::ZERO);
        }
    }

    #[test]
    fn extraction_is_deterministic(text in receipt_like()) {
        let parser = parser();
        prop_assert_eq!(parser.parse_order_receipt(&text), parser.parse_order_receipt(&text));
    }
}
