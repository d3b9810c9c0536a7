//! Line classification for list documents.
//!
//! A single forward pass tags each line with the metadata it most likely
//! carries. The first matching rule wins:
//!
//! 1. distributor / supplier / vendor
//! 2. patient ID, then patient name
//! 3. contact keyword, or a line that is only a phone number
//! 4. receipt / order / invoice / bill id
//! 5. document date
//! 6. list header (name, quantity and price columns)
//! 7. summary rows (totals, taxes)
//! 8. product candidate once a header has been seen

use tracing::trace;

use super::fields::LineFields;
use super::rules::patterns::{
    CONTACT, DATE_DMY, DATE_KEYWORD, DISTRIBUTOR, EXPIRY_KEYWORD, HEADER_NAME_COLUMN,
    HEADER_PRICE_COLUMN, HEADER_QUANTITY_COLUMN, PATIENT_ID, PATIENT_NAME, PHONE_LINE,
    RECEIPT_ID, RECEIPT_KEYWORD,
};
use super::rules::{BatchStyle, SummaryMatcher};
use crate::models::document::DocumentDate;

/// Minimum digits for a bare line to count as a phone number.
const PHONE_MIN_DIGITS: usize = 7;

/// What a line most likely represents.
#[derive(Debug, Clone, PartialEq)]
pub enum LineCategory {
    Distributor(Option<String>),
    Contact(Option<String>),
    ReceiptId(Option<String>),
    Patient {
        name: Option<String>,
        id: Option<String>,
    },
    Date(DocumentDate),
    ListHeader,
    Summary,
    ProductCandidate,
    Unclassified,
}

/// A line with its category and scanned fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLine<'a> {
    pub text: &'a str,
    pub category: LineCategory,
    pub fields: LineFields,
}

/// A party keyword seen without a value on its own line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingParty {
    Distributor,
    Patient,
}

/// Stateful single-pass line classifier.
pub struct LineClassifier<'c> {
    batch_style: BatchStyle,
    summary: &'c SummaryMatcher,
    header_seen: bool,
    pending: Option<PendingParty>,
}

impl<'c> LineClassifier<'c> {
    pub fn new(batch_style: BatchStyle, summary: &'c SummaryMatcher) -> Self {
        Self {
            batch_style,
            summary,
            header_seen: false,
            pending: None,
        }
    }

    /// Whether a list header has been seen so far.
    pub fn header_seen(&self) -> bool {
        self.header_seen
    }

    /// Classify every line of a document.
    pub fn classify_all<'a, I>(mut self, lines: I) -> Vec<ClassifiedLine<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().map(|line| self.classify(line)).collect()
    }

    /// Classify the next line.
    pub fn classify<'a>(&mut self, text: &'a str) -> ClassifiedLine<'a> {
        let fields = LineFields::scan(text, self.batch_style);
        let category = self.categorize(text, &fields);
        trace!(?category, line = text, "classified line");

        ClassifiedLine {
            text,
            category,
            fields,
        }
    }

    fn categorize(&mut self, text: &str, fields: &LineFields) -> LineCategory {
        if let Some(caps) = DISTRIBUTOR.captures(text) {
            let name = non_empty(caps.get(1).map(|m| m.as_str()));
            self.pending = name.is_none().then_some(PendingParty::Distributor);
            return LineCategory::Distributor(name);
        }

        if let Some(caps) = PATIENT_ID.captures(text) {
            return LineCategory::Patient {
                name: None,
                id: non_empty(caps.get(1).map(|m| m.as_str())),
            };
        }

        if let Some(caps) = PATIENT_NAME.captures(text) {
            let name = non_empty(caps.get(1).map(|m| m.as_str()));
            self.pending = name.is_none().then_some(PendingParty::Patient);
            return LineCategory::Patient { name, id: None };
        }

        if let Some(caps) = CONTACT.captures(text) {
            return LineCategory::Contact(non_empty(caps.get(1).map(|m| m.as_str())));
        }

        if !self.header_seen && is_phone_number(text) {
            return LineCategory::Contact(Some(text.trim().to_string()));
        }

        if RECEIPT_KEYWORD.is_match(text) {
            let id = RECEIPT_ID
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|id| !is_date_token(id));
            match id {
                Some(id) => return LineCategory::ReceiptId(Some(id.to_string())),
                None if fields.date.is_none() && !is_list_header(text) => {
                    return LineCategory::ReceiptId(None);
                }
                None => {}
            }
        }

        if let Some(date) = fields.date {
            let mentions_expiry = EXPIRY_KEYWORD.is_match(text);
            let labelled = DATE_KEYWORD.is_match(text);
            if !mentions_expiry && fields.price.is_none() && (labelled || !self.header_seen) {
                return LineCategory::Date(date);
            }
        }

        if is_list_header(text) {
            self.header_seen = true;
            self.pending = None;
            return LineCategory::ListHeader;
        }

        if self.summary.is_summary(text) {
            return LineCategory::Summary;
        }

        if self.header_seen {
            return LineCategory::ProductCandidate;
        }

        match self.pending.take() {
            Some(PendingParty::Distributor) => LineCategory::Distributor(Some(text.trim().to_string())),
            Some(PendingParty::Patient) => LineCategory::Patient {
                name: Some(text.trim().to_string()),
                id: None,
            },
            None => LineCategory::Unclassified,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().trim_matches(|c: char| c == ':' || c == '-').trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_list_header(text: &str) -> bool {
    HEADER_NAME_COLUMN.is_match(text)
        && HEADER_QUANTITY_COLUMN.is_match(text)
        && HEADER_PRICE_COLUMN.is_match(text)
}

fn is_phone_number(text: &str) -> bool {
    let trimmed = text.trim();
    PHONE_LINE.is_match(trimmed)
        && trimmed.chars().filter(char::is_ascii_digit).count() >= PHONE_MIN_DIGITS
}

fn is_date_token(token: &str) -> bool {
    DATE_DMY
        .find(token)
        .is_some_and(|m| m.start() == 0 && m.end() == token.len())
}
