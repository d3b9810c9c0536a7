//! Configuration structures for extraction and storage.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for mediflex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediflexConfig {
    /// Text extraction configuration.
    pub extraction: ExtractionConfig,

    /// Local storage configuration.
    pub storage: StorageConfig,
}

/// OCR text extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// A line must be longer than this to be picked up by the fallback scan.
    pub fallback_min_line_length: usize,

    /// Minimum length of a label line that may hold the product name.
    pub name_min_length: usize,

    /// Maximum length of a label line that may hold the product name.
    pub name_max_length: usize,

    /// Only accept `batch:` / `lot:` / `b/no:` batch labels on priced receipt rows.
    pub strict_receipt_batch: bool,

    /// Never treat document totals as product rows.
    pub skip_summary_rows: bool,

    /// Words that mark a summary row.
    pub summary_keywords: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_min_line_length: 10,
            name_min_length: 4,
            name_max_length: 49,
            strict_receipt_batch: true,
            skip_summary_rows: true,
            summary_keywords: [
                "total",
                "subtotal",
                "sub total",
                "grand total",
                "net amount",
                "amount due",
                "balance",
                "discount",
                "tax",
                "gst",
                "cgst",
                "sgst",
                "vat",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON record files. Platform data dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl MediflexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: MediflexConfig =
            serde_json::from_str(r#"{"extraction": {"fallback_min_line_length": 20}}"#).unwrap();
        assert_eq!(config.extraction.fallback_min_line_length, 20);
        assert_eq!(config.extraction.name_max_length, 49);
        assert!(config.extraction.strict_receipt_batch);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = MediflexConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/var/lib/mediflex"));
        config.extraction.skip_summary_rows = false;
        config.save(&path).unwrap();

        assert_eq!(MediflexConfig::from_file(&path).unwrap(), config);
    }
}
