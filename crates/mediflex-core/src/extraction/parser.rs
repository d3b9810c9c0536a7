//! Heuristic document parser: classification, accumulation, fallback and
//! result assembly behind one configurable type.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::accumulator::Accumulator;
use super::classifier::{ClassifiedLine, LineCategory, LineClassifier};
use super::fallback::FallbackScanner;
use super::fields::{label_name, LineFields};
use super::rules::{has_excluded_keyword, BatchStyle, SummaryMatcher};
use crate::models::config::ExtractionConfig;
use crate::models::document::{
    DocumentDate, ExtractedDocument, ExtractedProduct, OrderReceiptData, PatientRecipient,
    ScanMode, SingleProductGuess,
};

/// Result of a timed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    /// Extracted document.
    pub document: ExtractedDocument,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Whether the records came from the fallback scan.
    pub used_fallback: bool,
    /// Number of non-empty lines read.
    pub line_count: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// The three document shapes a parser can produce.
///
/// Every method is total: noise, empty input and partial documents produce
/// a (possibly empty) result, never an error.
pub trait DocumentExtractor {
    /// Best guess at one product from a label.
    fn parse_single_product(&self, text: &str) -> SingleProductGuess;

    /// Patient details and prescribed medicines.
    fn parse_patient_medicines(&self, text: &str) -> PatientRecipient;

    /// Distributor order receipt.
    fn parse_order_receipt(&self, text: &str) -> OrderReceiptData;

    /// Dispatch on the scan mode.
    fn extract(&self, mode: ScanMode, text: &str) -> ExtractedDocument {
        match mode {
            ScanMode::Product => ExtractedDocument::Product(self.parse_single_product(text)),
            ScanMode::Patient => ExtractedDocument::Patient(self.parse_patient_medicines(text)),
            ScanMode::Order => ExtractedDocument::Order(self.parse_order_receipt(text)),
        }
    }
}

/// Lines and records produced by one pass over a list document.
struct ListPass<'a> {
    lines: Vec<ClassifiedLine<'a>>,
    products: Vec<ExtractedProduct>,
    used_fallback: bool,
}

/// Parsed value with the pass details needed for warnings.
struct Assembled<T> {
    value: T,
    line_count: usize,
    used_fallback: bool,
    date_defaulted: bool,
}

/// Rule-based parser for OCR text.
#[derive(Debug, Clone)]
pub struct HeuristicParser {
    config: ExtractionConfig,
    summary: SummaryMatcher,
    /// Date used when a receipt prints none. Local clock when unset.
    reference_date: Option<NaiveDate>,
}

impl HeuristicParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        let summary = if config.skip_summary_rows {
            SummaryMatcher::new(&config.summary_keywords)
        } else {
            SummaryMatcher::disabled()
        };

        Self {
            config,
            summary,
            reference_date: None,
        }
    }

    /// Fix the date used for receipts that print no date.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Parse `text` in the given mode, collecting warnings and timing.
    pub fn scan(&self, mode: ScanMode, text: &str) -> ScanResult {
        let stopwatch = Stopwatch::start();
        info!(mode = mode.as_str(), "Scanning {} characters of text", text.len());

        let (document, line_count, used_fallback, date_defaulted) = match mode {
            ScanMode::Product => {
                let assembled = self.single_product(text);
                (
                    ExtractedDocument::Product(assembled.value),
                    assembled.line_count,
                    assembled.used_fallback,
                    assembled.date_defaulted,
                )
            }
            ScanMode::Patient => {
                let assembled = self.patient_medicines(text);
                (
                    ExtractedDocument::Patient(assembled.value),
                    assembled.line_count,
                    assembled.used_fallback,
                    assembled.date_defaulted,
                )
            }
            ScanMode::Order => {
                let assembled = self.order_receipt(text);
                (
                    ExtractedDocument::Order(assembled.value),
                    assembled.line_count,
                    assembled.used_fallback,
                    assembled.date_defaulted,
                )
            }
        };

        let mut warnings = Vec::new();

        if document.record_count() == 0 {
            warn!(mode = mode.as_str(), "Nothing extracted");
            warnings.push(match mode {
                ScanMode::Product => "Could not find a product name".to_string(),
                ScanMode::Patient => "No medicines found".to_string(),
                ScanMode::Order => "No products found".to_string(),
            });
        }

        if used_fallback {
            warnings.push("No product list header found, records come from the fallback scan".to_string());
        }

        if let ExtractedDocument::Order(receipt) = &document {
            if date_defaulted {
                warnings.push(format!("No receipt date found, using {}", receipt.date));
            }
        }

        for date in document_dates(&document) {
            if !date.is_calendar_valid() {
                warn!(%date, "Date is not a calendar date");
                warnings.push(format!("{} is not a valid calendar date", date));
            }
        }

        ScanResult {
            document,
            warnings,
            used_fallback,
            line_count,
            processing_time_ms: stopwatch.elapsed_ms(),
        }
    }

    fn reference_date(&self) -> DocumentDate {
        self.reference_date
            .map(DocumentDate::from_naive)
            .unwrap_or_else(DocumentDate::today)
    }

    fn receipt_batch_style(&self) -> BatchStyle {
        if self.config.strict_receipt_batch {
            BatchStyle::Strict
        } else {
            BatchStyle::Loose
        }
    }

    /// Label lines outside the configured length never hold the name.
    fn line_length_ok(&self, line: &str) -> bool {
        let length = line.trim().chars().count();
        length >= self.config.name_min_length && length <= self.config.name_max_length
    }

    /// Classify, accumulate, and fall back when the accumulator is empty.
    fn list_pass<'a>(&self, text: &'a str, batch_style: BatchStyle) -> ListPass<'a> {
        let mut classifier = LineClassifier::new(batch_style, &self.summary);
        let lines: Vec<ClassifiedLine<'a>> = document_lines(text)
            .map(|line| classifier.classify(line))
            .collect();

        let mut accumulator = Accumulator::new();
        for line in lines
            .iter()
            .filter(|line| line.category == LineCategory::ProductCandidate)
        {
            accumulator.push(&line.fields);
        }

        let mut products = accumulator.finish();
        let mut used_fallback = false;

        if products.is_empty() {
            products = FallbackScanner::new(self.config.fallback_min_line_length).scan(&lines);
            used_fallback = !products.is_empty();
            debug!(
                header_seen = classifier.header_seen(),
                found = products.len(),
                "Primary pass found no records, ran fallback scan"
            );
        }

        ListPass {
            lines,
            products,
            used_fallback,
        }
    }

    fn single_product(&self, text: &str) -> Assembled<SingleProductGuess> {
        let mut guess = SingleProductGuess::default();
        let mut line_count = 0;

        for line in document_lines(text) {
            line_count += 1;
            let fields = LineFields::scan(line, BatchStyle::Loose);

            if guess.batch.is_none() {
                guess.batch = fields.batch.clone();
            }
            if guess.expiry.is_none() {
                guess.expiry = fields.date;
            }
            if guess.price.is_none() {
                guess.price = fields.price;
            }

            if guess.name.is_none()
                && fields.date.is_none()
                && !has_excluded_keyword(line)
                && self.line_length_ok(line)
            {
                let (name, quantity) = label_name(line);
                if let Some(name) = name {
                    guess.name = Some(name);
                    guess.quantity = quantity.unwrap_or(1);
                }
            }
        }

        Assembled {
            value: guess,
            line_count,
            used_fallback: false,
            date_defaulted: false,
        }
    }

    fn patient_medicines(&self, text: &str) -> Assembled<PatientRecipient> {
        let pass = self.list_pass(text, BatchStyle::Loose);
        let mut patient = PatientRecipient::default();

        for line in &pass.lines {
            match &line.category {
                LineCategory::Patient { name, id } => {
                    if patient.name.is_empty() {
                        if let Some(name) = name {
                            patient.name = name.clone();
                        }
                    }
                    if patient.id.is_none() {
                        patient.id = id.clone();
                    }
                }
                LineCategory::Contact(Some(contact)) if patient.contact.is_none() => {
                    patient.contact = Some(contact.clone());
                }
                _ => {}
            }
        }

        let line_count = pass.lines.len();
        patient.medicines = pass.products;

        Assembled {
            value: patient,
            line_count,
            used_fallback: pass.used_fallback,
            date_defaulted: false,
        }
    }

    fn order_receipt(&self, text: &str) -> Assembled<OrderReceiptData> {
        let pass = self.list_pass(text, self.receipt_batch_style());

        let mut distributor_name = None;
        let mut distributor_contact = None;
        let mut receipt_id = None;
        let mut date = None;

        for line in &pass.lines {
            match &line.category {
                LineCategory::Distributor(Some(name)) if distributor_name.is_none() => {
                    distributor_name = Some(name.clone());
                }
                LineCategory::Contact(Some(contact)) if distributor_contact.is_none() => {
                    distributor_contact = Some(contact.clone());
                }
                LineCategory::ReceiptId(Some(id)) if receipt_id.is_none() => {
                    receipt_id = Some(id.clone());
                }
                LineCategory::Date(found) if date.is_none() => {
                    date = Some(*found);
                }
                _ => {}
            }
        }

        let date_defaulted = date.is_none();
        let line_count = pass.lines.len();

        Assembled {
            value: OrderReceiptData {
                distributor_name,
                distributor_contact,
                distributor_id: None,
                receipt_id,
                date: date.unwrap_or_else(|| self.reference_date()),
                products: pass.products,
            },
            line_count,
            used_fallback: pass.used_fallback,
            date_defaulted,
        }
    }
}

impl Default for HeuristicParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for HeuristicParser {
    fn parse_single_product(&self, text: &str) -> SingleProductGuess {
        self.single_product(text).value
    }

    fn parse_patient_medicines(&self, text: &str) -> PatientRecipient {
        self.patient_medicines(text).value
    }

    fn parse_order_receipt(&self, text: &str) -> OrderReceiptData {
        self.order_receipt(text).value
    }
}

/// Parse a single product label with default settings.
pub fn parse_single_product(text: &str) -> SingleProductGuess {
    HeuristicParser::new().parse_single_product(text)
}

/// Parse a prescription with default settings.
pub fn parse_patient_medicines(text: &str) -> PatientRecipient {
    HeuristicParser::new().parse_patient_medicines(text)
}

/// Parse an order receipt with default settings.
///
/// The receipt date falls back to today's local date.
pub fn parse_order_receipt(text: &str) -> OrderReceiptData {
    HeuristicParser::new().parse_order_receipt(text)
}

/// Scan timer. `Instant` panics on wasm32, where callers time scans themselves.
#[cfg(not(target_arch = "wasm32"))]
struct Stopwatch(Instant);

#[cfg(not(target_arch = "wasm32"))]
impl Stopwatch {
    fn start() -> Self {
        Self(Instant::now())
    }

    fn elapsed_ms(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
}

#[cfg(target_arch = "wasm32")]
struct Stopwatch;

#[cfg(target_arch = "wasm32")]
impl Stopwatch {
    fn start() -> Self {
        Self
    }

    fn elapsed_ms(&self) -> u64 {
        0
    }
}

/// Non-empty trimmed lines.
fn document_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn document_dates(document: &ExtractedDocument) -> Vec<DocumentDate> {
    match document {
        ExtractedDocument::Product(guess) => guess.expiry.into_iter().collect(),
        ExtractedDocument::Patient(patient) => {
            patient.medicines.iter().filter_map(|m| m.expiry).collect()
        }
        ExtractedDocument::Order(receipt) => std::iter::once(receipt.date)
            .chain(receipt.products.iter().filter_map(|p| p.expiry))
            .collect(),
    }
}
