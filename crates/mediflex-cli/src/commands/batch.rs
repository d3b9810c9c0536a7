//! Batch command - scan many OCR text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use mediflex_core::{HeuristicParser, ScanResult};

use super::scan::{format_result, record_scan, DocumentKind};
use super::{effective_date, GlobalOptions, OutputFormat, Session};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching OCR text files
    #[arg(required = true)]
    input: String,

    /// Kind of document in every file
    #[arg(short, long, value_enum, default_value = "order")]
    mode: DocumentKind,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Date used as "today" (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
}

/// Result of scanning a single file.
struct FileResult {
    path: PathBuf,
    scan: Option<ScanResult>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let start = Instant::now();
    let session = Session::load(options)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to scan",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = session.parser(effective_date(args.date));
    let mut store = session.open_store()?;
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        match scan_file(&path, &parser, args.mode) {
            Ok(scan) => {
                record_scan(&mut store, &scan.document)?;
                results.push(FileResult {
                    path,
                    scan: Some(scan),
                    error: None,
                });
            }
            Err(e) => {
                let message = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to scan {}: {}", path.display(), message);
                    results.push(FileResult {
                        path,
                        scan: None,
                        error: Some(message),
                    });
                } else {
                    error!("Failed to scan {}: {}", path.display(), message);
                    progress.abandon();
                    anyhow::bail!("Scanning failed: {}", message);
                }
            }
        }

        progress.inc(1);
    }

    progress.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(scan) = &result.scan {
                let stem = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");
                let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));
                fs::write(&output_path, format_result(scan, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Scanned {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn scan_file(path: &Path, parser: &HeuristicParser, mode: DocumentKind) -> anyhow::Result<ScanResult> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        anyhow::bail!("No text in file");
    }
    Ok(parser.scan(mode.into(), &text))
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "mode",
        "records",
        "used_fallback",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.scan {
            Some(scan) => wtr.write_record([
                filename,
                "success",
                scan.document.mode().as_str(),
                &scan.document.record_count().to_string(),
                &scan.used_fallback.to_string(),
                &scan.warnings.join("; "),
                &scan.processing_time_ms.to_string(),
                "",
            ])?,
            None => wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                result.error.as_deref().unwrap_or(""),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_file_rejects_blank_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        fs::write(&path, "  \n\n").unwrap();

        let err = scan_file(&path, &HeuristicParser::new(), DocumentKind::Patient).unwrap_err();
        assert_eq!(err.to_string(), "No text in file");
    }

    #[test]
    fn test_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rx.txt");
        fs::write(&input, "Patient Name: Ravi\nMedicine Qty Price\nCough Syrup 1 85.00").unwrap();

        let scan = scan_file(&input, &HeuristicParser::new(), DocumentKind::Patient).unwrap();
        let results = vec![
            FileResult {
                path: input,
                scan: Some(scan),
                error: None,
            },
            FileResult {
                path: PathBuf::from("bad.txt"),
                scan: None,
                error: Some("No text in file".to_string()),
            },
        ];

        let summary = dir.path().join("summary.csv");
        write_summary(&summary, &results).unwrap();
        let content = fs::read_to_string(&summary).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("rx.txt,success,patient,1,false,"));
        assert_eq!(lines[2], "bad.txt,error,,,,,,No text in file");
    }
}
