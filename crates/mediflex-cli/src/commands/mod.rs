//! Subcommands and the state they share.

pub mod batch;
pub mod buyers;
pub mod config;
pub mod dashboard;
pub mod distributors;
pub mod inventory;
pub mod report;
pub mod scan;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::debug;

use mediflex_core::models::config::MediflexConfig;
use mediflex_core::models::document::DocumentDate;
use mediflex_core::{HeuristicParser, JsonFileStore};

/// Output format shared by the commands that print records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Options given before the subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

/// Loaded configuration plus the resolved data directory.
pub struct Session {
    config: MediflexConfig,
    data_dir: PathBuf,
}

impl Session {
    /// Load the configuration file and resolve where records live.
    ///
    /// An explicit `--config` must exist; the default location is optional.
    pub fn load(options: &GlobalOptions) -> anyhow::Result<Self> {
        let config = match &options.config_path {
            Some(path) => MediflexConfig::from_file(path).map_err(|e| {
                anyhow::anyhow!("Failed to read config {}: {}", path.display(), e)
            })?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    MediflexConfig::from_file(&path)?
                } else {
                    MediflexConfig::default()
                }
            }
        };

        let data_dir = options
            .data_dir
            .clone()
            .or_else(|| config.storage.data_dir.clone())
            .unwrap_or_else(default_data_dir);
        debug!("Using data directory {}", data_dir.display());

        Ok(Self { config, data_dir })
    }

    pub fn open_store(&self) -> anyhow::Result<JsonFileStore> {
        JsonFileStore::open(&self.data_dir).map_err(|e| {
            anyhow::anyhow!("Failed to open data directory {}: {}", self.data_dir.display(), e)
        })
    }

    /// Parser configured from the `extraction` section.
    pub fn parser(&self, reference_date: NaiveDate) -> HeuristicParser {
        HeuristicParser::with_config(self.config.extraction.clone())
            .with_reference_date(reference_date)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mediflex")
        .join("config.json")
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mediflex")
}

/// The date given on the command line, or today on the local clock.
pub fn effective_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

pub fn document_date(date: Option<NaiveDate>) -> DocumentDate {
    DocumentDate::from_naive(effective_date(date))
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn emit(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)?;
            println!(
                "{} Output written to {}",
                console::style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn csv_to_string(wtr: csv::Writer<Vec<u8>>) -> anyhow::Result<String> {
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
