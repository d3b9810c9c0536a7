//! OCR text extraction.
//!
//! Raw text is split into trimmed lines, each line is scanned for fields and
//! classified, product lines are folded into records by the accumulator, and
//! a looser fallback scan runs when that finds nothing.

mod accumulator;
mod classifier;
mod fallback;
mod fields;
mod parser;
pub mod rules;

pub use accumulator::Accumulator;
pub use classifier::{ClassifiedLine, LineCategory, LineClassifier};
pub use fallback::FallbackScanner;
pub use fields::{label_name, LineFields};
pub use parser::{
    parse_order_receipt, parse_patient_medicines, parse_single_product, DocumentExtractor,
    HeuristicParser, ScanResult,
};
