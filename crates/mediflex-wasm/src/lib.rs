//! WASM bindings for pharmacy OCR document extraction.
//!
//! The browser runs OCR and hands the recognised text to these functions,
//! which return plain JS objects in the same camelCase shape the UI stores.

use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use mediflex_core::extraction::rules::{normalize_date as normalize, parse_amount};
use mediflex_core::models::config::ExtractionConfig;
use mediflex_core::models::document::{ExtractedDocument, ScanMode};
use mediflex_core::{DocumentExtractor, HeuristicParser};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Best guess at a single product from label text.
#[wasm_bindgen(js_name = parseSingleProduct)]
pub fn parse_single_product(text: &str) -> Result<JsValue, JsValue> {
    to_js(&browser_parser(ExtractionConfig::default()).parse_single_product(text))
}

/// Patient details and medicines from prescription text.
#[wasm_bindgen(js_name = parsePatientMedicines)]
pub fn parse_patient_medicines(text: &str) -> Result<JsValue, JsValue> {
    let patient = browser_parser(ExtractionConfig::default()).parse_patient_medicines(text);
    if patient.medicines.is_empty() {
        warn("No medicines found in scanned text");
    }
    to_js(&patient)
}

/// Distributor, receipt metadata and products from order receipt text.
#[wasm_bindgen(js_name = parseOrderReceipt)]
pub fn parse_order_receipt(text: &str) -> Result<JsValue, JsValue> {
    let receipt = browser_parser(ExtractionConfig::default()).parse_order_receipt(text);
    if receipt.products.is_empty() {
        warn("No products found in scanned text");
    }
    to_js(&receipt)
}

/// Normalize a printed date to `YYYY-MM-DD`.
#[wasm_bindgen(js_name = normalizeDate)]
pub fn normalize_date(date: &str) -> Option<String> {
    normalize(date).map(|d| d.to_string())
}

/// Parse a printed price such as `₹1,234.50` or `12,50`.
#[wasm_bindgen(js_name = parsePrice)]
pub fn parse_price(price: &str) -> Option<f64> {
    parse_amount(price).and_then(|d| d.to_string().parse().ok())
}

/// Configured document scanner for browser use.
#[wasm_bindgen]
pub struct DocumentScanner {
    config: ExtractionConfig,
}

#[wasm_bindgen]
impl DocumentScanner {
    /// Create a scanner with default extraction settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Create a scanner from a partial extraction config object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<DocumentScanner, JsValue> {
        let config: ExtractionConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { config })
    }

    /// Extract a document in the given mode (`product`, `patient` or `order`).
    #[wasm_bindgen]
    pub fn extract(&self, mode: &str, text: &str) -> Result<JsValue, JsValue> {
        let mode: ScanMode = mode.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
        to_js(&self.parser().extract(mode, text))
    }

    /// Extract a document along with warnings and timing.
    #[wasm_bindgen(js_name = extractWithMetadata)]
    pub fn extract_with_metadata(&self, mode: &str, text: &str) -> Result<JsValue, JsValue> {
        let mode: ScanMode = mode.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;

        let started = js_sys::Date::now();
        let result = self.parser().scan(mode, text);
        let elapsed = (js_sys::Date::now() - started).max(0.0);

        for warning in &result.warnings {
            warn(warning);
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ExtractResult {
            document: ExtractedDocument,
            warnings: Vec<String>,
            used_fallback: bool,
            line_count: usize,
            processing_time_ms: u64,
        }

        to_js(&ExtractResult {
            document: result.document,
            warnings: result.warnings,
            used_fallback: result.used_fallback,
            line_count: result.line_count,
            processing_time_ms: elapsed as u64,
        })
    }

    fn parser(&self) -> HeuristicParser {
        browser_parser(self.config.clone())
    }
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Parser whose receipt default date is today on the browser clock.
fn browser_parser(config: ExtractionConfig) -> HeuristicParser {
    let parser = HeuristicParser::with_config(config);
    match browser_today() {
        Some(today) => parser.with_reference_date(today),
        None => parser,
    }
}

fn browser_today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("15/01/23").as_deref(), Some("2023-01-15"));
        assert_eq!(normalize_date("not a date"), None);
    }

    #[wasm_bindgen_test]
    fn test_parse_price() {
        let price = parse_price("₹1,234.50").unwrap();
        assert!((price - 1234.5).abs() < 0.001);
        assert_eq!(parse_price("abc"), None);
    }

    #[wasm_bindgen_test]
    fn test_browser_today_is_a_calendar_date() {
        assert!(browser_today().is_some());
    }

    #[wasm_bindgen_test]
    fn test_scanner_rejects_unknown_mode() {
        assert!(DocumentScanner::new().extract("invoice", "text").is_err());
    }

    #[wasm_bindgen_test]
    fn test_parse_order_receipt_returns_object() {
        let value = parse_order_receipt(
            "Distributor: Acme Pharma\nItem Qty Price\nParacetamol 500mg 100 4.50",
        )
        .unwrap();
        let name = js_sys::Reflect::get(&value, &JsValue::from_str("distributorName")).unwrap();
        assert_eq!(name.as_string().as_deref(), Some("Acme Pharma"));
    }
}
