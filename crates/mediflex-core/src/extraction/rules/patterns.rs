//! Common regex patterns for pharmacy document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Dates: day/month/year in print order, separators / - .
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})\b"
    ).unwrap();

    // "EXP 12/2025" style month/year expiry
    pub static ref EXPIRY_MONTH_YEAR: Regex = Regex::new(
        r"(?i)\bexp(?:iry|ires|iration)?\b(?:\s*date)?\.?\s*[:\-]?\s*(\d{1,2})[/\-.](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref EXPIRY_KEYWORD: Regex = Regex::new(
        r"(?i)\bexp(?:iry|ires|iration|\.|\b)"
    ).unwrap();

    pub static ref DATE_KEYWORD: Regex = Regex::new(
        r"(?i)\bdated?\b"
    ).unwrap();

    // Prices: optional currency symbol, then 1,234.56 or 12.50 / 12,50
    pub static ref PRICE: Regex = Regex::new(
        r"(?i)(?:(?:[$£€₹]|\brs\.?|\binr)\s*|\b)(\d{1,3}(?:,\d{3})+\.\d{1,2}|\d+[.,]\d{1,2})\b"
    ).unwrap();

    // Quantities
    pub static ref MULTIPLIER_QUANTITY: Regex = Regex::new(
        r"(?i)(?:\bx|×)\s*(\d+)\b"
    ).unwrap();

    pub static ref BARE_INTEGER: Regex = Regex::new(
        r"\b\d+\b"
    ).unwrap();

    // Batch / lot codes
    pub static ref BATCH_LOOSE: Regex = Regex::new(
        r"(?i)\b(?:batch|lot)\b(?:\s*(?:no|number|num)\b\.?|\s*#)?\s*[:\-]?\s*([a-z0-9]{5,})\b"
    ).unwrap();

    pub static ref BATCH_STRICT: Regex = Regex::new(
        r"(?i)\b(?:batch|lot|b/no)\s*:\s*([a-z0-9][a-z0-9\-/]*)"
    ).unwrap();

    // Words that label a field rather than name a product
    pub static ref FIELD_LABEL: Regex = Regex::new(
        r"(?i)\b(?:qty|quantity|unit\s+price|price|rate|mrp|amount|exp(?:iry|ires|iration)?(?:\s*date)?|batch|lot)\b\.?\s*:?"
    ).unwrap();

    pub static ref NAME_EXCLUDED: Regex = Regex::new(
        r"(?i)\b(?:batch|lot|price)\b|\bexp(?:iry|ires|iration|\.|\b)"
    ).unwrap();

    // Metadata lines
    pub static ref DISTRIBUTOR: Regex = Regex::new(
        r"(?i)\b(?:distributor|supplier|vendor)\b(?:\s+name\b)?\s*[:\-]?\s*(.*)$"
    ).unwrap();

    pub static ref PATIENT_ID: Regex = Regex::new(
        r"(?i)\bpatient\s*(?:id|no\.?|number|#)\s*[:#\-]?\s*([a-z0-9][a-z0-9\-/]*)"
    ).unwrap();

    pub static ref PATIENT_NAME: Regex = Regex::new(
        r"(?i)(?:\bpatient(?:'s)?\b(?:\s+name\b)?|^\s*name\s*[:\-])\s*[:\-]?\s*(.*)$"
    ).unwrap();

    pub static ref CONTACT: Regex = Regex::new(
        r"(?i)\b(?:contact|phone|telephone|tel|mobile|mob|ph)\b\.?(?:\s*(?:no|number)\b\.?)?\s*[:\-]?\s*(.*)$"
    ).unwrap();

    pub static ref PHONE_LINE: Regex = Regex::new(
        r"^\+?\(?\d[\d\s\-()]{5,}\d$"
    ).unwrap();

    pub static ref RECEIPT_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:receipt|order|invoice|bill)\b"
    ).unwrap();

    pub static ref RECEIPT_ID: Regex = Regex::new(
        r"(?i)\b(?:receipt|order|invoice|bill)\b\s*(?:no\b\.?|number\b|num\b|id\b|#)?\s*[:#\-]?\s*([a-z0-9][a-z0-9/\-_]*\d[a-z0-9/\-_]*)"
    ).unwrap();

    // List header columns
    pub static ref HEADER_NAME_COLUMN: Regex = Regex::new(
        r"(?i)\b(?:item|items|product|products|medicine|medicines|description|particulars|drug|name)\b"
    ).unwrap();

    pub static ref HEADER_QUANTITY_COLUMN: Regex = Regex::new(
        r"(?i)\b(?:qty|quantity)\b"
    ).unwrap();

    pub static ref HEADER_PRICE_COLUMN: Regex = Regex::new(
        r"(?i)\b(?:price|rate|mrp|amount)\b"
    ).unwrap();
}
