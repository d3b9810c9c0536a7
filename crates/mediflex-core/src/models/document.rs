//! Records produced by OCR text extraction.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A date normalized to `YYYY-MM-DD`.
///
/// Scanned documents are noisy, so the components are kept exactly as read:
/// `31/02/2024` becomes `2024-02-31`. Use [`DocumentDate::is_calendar_valid`]
/// or [`DocumentDate::to_naive`] where a real calendar date is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DocumentDate {
    year: u32,
    month: u32,
    day: u32,
}

impl DocumentDate {
    pub fn new(year: u32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self::new(date.year().max(0) as u32, date.month(), date.day())
    }

    /// Today's date on the local clock.
    pub fn today() -> Self {
        Self::from_naive(Local::now().date_naive())
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Convert to a calendar date, if the components form one.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(i32::try_from(self.year).ok()?, self.month, self.day)
    }

    pub fn is_calendar_valid(&self) -> bool {
        self.to_naive().is_some()
    }

    /// Whether both dates fall in the same calendar month.
    pub fn same_month(&self, other: &DocumentDate) -> bool {
        self.year == other.year && self.month == other.month
    }
}

impl fmt::Display for DocumentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Error returned when a stored date string is not `YYYY-MM-DD`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid date {0:?}, expected YYYY-MM-DD")]
pub struct DateParseError(String);

impl FromStr for DocumentDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept full ISO timestamps as written by browsers.
        let date_part = s.trim().split('T').next().unwrap_or_default();
        let parts: Vec<&str> = date_part.split('-').collect();
        let err = || DateParseError(s.to_string());

        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(err());
        }

        let year = parts[0].parse().map_err(|_| err())?;
        let month = parts[1].parse().map_err(|_| err())?;
        let day = parts[2].parse().map_err(|_| err())?;

        Ok(Self::new(year, month, day))
    }
}

impl From<DocumentDate> for String {
    fn from(date: DocumentDate) -> Self {
        date.to_string()
    }
}

impl TryFrom<String> for DocumentDate {
    type Error = DateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A product row read from a list document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProduct {
    /// Product name, never empty.
    pub name: String,

    /// Quantity, always at least 1.
    pub quantity: u32,

    /// Unit price, never negative.
    pub price: Decimal,

    /// Batch or lot code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,

    /// Expiry date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DocumentDate>,
}

impl ExtractedProduct {
    pub fn new(name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.max(1),
            price: price.max(Decimal::ZERO),
            batch: None,
            expiry: None,
        }
    }

    /// Price multiplied by quantity.
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Medicines on a prescription share the product record shape.
pub type Medicine = ExtractedProduct;

/// A patient and the medicines listed for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecipient {
    /// Patient name, empty when not found.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Medicines in document order.
    pub medicines: Vec<Medicine>,
}

/// A distributor order receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceiptData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor_contact: Option<String>,

    /// Distributor identifier assigned by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,

    /// Receipt date, or the extraction date when none was printed.
    pub date: DocumentDate,

    /// Products in document order.
    pub products: Vec<ExtractedProduct>,
}

impl OrderReceiptData {
    /// An empty receipt dated `date`.
    pub fn empty(date: DocumentDate) -> Self {
        Self {
            distributor_name: None,
            distributor_contact: None,
            distributor_id: None,
            receipt_id: None,
            date,
            products: Vec::new(),
        }
    }

    /// Sum of all product line totals.
    pub fn total(&self) -> Decimal {
        self.products.iter().map(ExtractedProduct::line_total).sum()
    }
}

/// Best guess at a single product from a label photograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleProductGuess {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DocumentDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    /// Quantity printed on the name line, 1 otherwise.
    pub quantity: u32,
}

impl Default for SingleProductGuess {
    fn default() -> Self {
        Self {
            name: None,
            batch: None,
            expiry: None,
            price: None,
            quantity: 1,
        }
    }
}

impl SingleProductGuess {
    /// True when nothing at all was recognised.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.batch.is_none() && self.expiry.is_none() && self.price.is_none()
    }
}

/// Which kind of document the caller is scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// A single product label.
    Product,
    /// A patient prescription listing medicines.
    Patient,
    /// A distributor order receipt.
    Order,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Product => "product",
            ScanMode::Patient => "patient",
            ScanMode::Order => "order",
        }
    }
}

/// Error returned for an unknown scan mode name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scan mode {0:?}, expected product, patient or order")]
pub struct UnknownScanMode(String);

impl FromStr for ScanMode {
    type Err = UnknownScanMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" => Ok(ScanMode::Product),
            "patient" => Ok(ScanMode::Patient),
            "order" => Ok(ScanMode::Order),
            _ => Err(UnknownScanMode(s.to_string())),
        }
    }
}

/// A typed extraction result for any [`ScanMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExtractedDocument {
    Product(SingleProductGuess),
    Patient(PatientRecipient),
    Order(OrderReceiptData),
}

impl ExtractedDocument {
    pub fn mode(&self) -> ScanMode {
        match self {
            ExtractedDocument::Product(_) => ScanMode::Product,
            ExtractedDocument::Patient(_) => ScanMode::Patient,
            ExtractedDocument::Order(_) => ScanMode::Order,
        }
    }

    /// Number of product records found.
    pub fn record_count(&self) -> usize {
        match self {
            ExtractedDocument::Product(guess) => usize::from(guess.name.is_some()),
            ExtractedDocument::Patient(patient) => patient.medicines.len(),
            ExtractedDocument::Order(order) => order.products.len(),
        }
    }
}
