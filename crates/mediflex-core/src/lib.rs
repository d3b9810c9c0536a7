//! Core library for pharmacy inventory OCR processing.
//!
//! This crate provides:
//! - Extraction of products, patient medicines and order receipts from OCR text
//! - Field rules for dates, prices, quantities, batch numbers and names
//! - Inventory, distributor and buyer records
//! - Storage services over a pluggable key-value store

pub mod error;
pub mod extraction;
pub mod models;
pub mod store;

pub use error::{MediflexError, Result, StoreError};
pub use extraction::{
    parse_order_receipt, parse_patient_medicines, parse_single_product, DocumentExtractor,
    HeuristicParser, ScanResult,
};
pub use models::config::{ExtractionConfig, MediflexConfig, StorageConfig};
pub use models::document::{
    DocumentDate, ExtractedDocument, ExtractedProduct, Medicine, OrderReceiptData,
    PatientRecipient, ScanMode, SingleProductGuess,
};
pub use store::{
    BuyerService, DashboardService, DistributorService, InventoryService, JsonFileStore,
    KeyValueStore, MemoryStore,
};
