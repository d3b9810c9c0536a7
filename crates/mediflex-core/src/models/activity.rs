//! Dashboard activity feed entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a recorded activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Barcode,
    Ocr,
    Distribution,
    Report,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Barcode => "barcode",
            ActivityKind::Ocr => "ocr",
            ActivityKind::Distribution => "distribution",
            ActivityKind::Report => "report",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub timestamp: DateTime<Utc>,
}
