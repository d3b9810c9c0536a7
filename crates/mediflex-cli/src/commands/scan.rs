//! Scan command - extract records from one OCR text file.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info};

use mediflex_core::models::activity::ActivityKind;
use mediflex_core::models::document::{
    DocumentDate, ExtractedDocument, ExtractedProduct, OrderReceiptData, PatientRecipient,
    ScanMode, SingleProductGuess,
};
use mediflex_core::models::inventory::NewInventoryItem;
use mediflex_core::store::{
    DashboardService, DistributorService, InventoryService, JsonFileStore, UNKNOWN_BATCH,
};
use mediflex_core::ScanResult;

use super::{csv_to_string, effective_date, emit, optional, GlobalOptions, OutputFormat, Session};

/// Kind of document being scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentKind {
    /// A single product label
    Product,
    /// A patient prescription
    Patient,
    /// A distributor order receipt
    Order,
}

impl From<DocumentKind> for ScanMode {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Product => ScanMode::Product,
            DocumentKind::Patient => ScanMode::Patient,
            DocumentKind::Order => ScanMode::Order,
        }
    }
}

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// OCR text file, or `-` for stdin
    #[arg(required = true)]
    input: String,

    /// Kind of document
    #[arg(short, long, value_enum, default_value = "order")]
    mode: DocumentKind,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the extracted records to inventory and distributors
    #[arg(long)]
    save: bool,

    /// Date used as "today" (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
}

pub async fn run(args: ScanArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let session = Session::load(options)?;
    let text = read_input(&args.input)?;
    let today = effective_date(args.date);

    let result = session.parser(today).scan(args.mode.into(), &text);
    info!(
        "Extracted {} records in {}ms",
        result.document.record_count(),
        result.processing_time_ms
    );

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_result(&result, args.format)?;
    emit(&output, args.output.as_deref())?;

    let mut store = session.open_store()?;
    record_scan(&mut store, &result.document)?;

    if args.save {
        save_document(&mut store, &result.document, DocumentDate::from_naive(today))?;
    }

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(&path)?)
}

/// Count the scan and add it to the activity feed.
pub fn record_scan(store: &mut JsonFileStore, document: &ExtractedDocument) -> anyhow::Result<()> {
    let mut dashboard = DashboardService::new(store);
    let total = dashboard.track_ocr_scan()?;
    dashboard.add_activity(ActivityKind::Ocr, scan_title(document))?;
    debug!("OCR scan count is now {}", total);
    Ok(())
}

fn scan_title(document: &ExtractedDocument) -> String {
    match document {
        ExtractedDocument::Product(guess) => match &guess.name {
            Some(name) => format!("Scanned product label: {}", name),
            None => "Scanned product label".to_string(),
        },
        ExtractedDocument::Patient(patient) => format!(
            "Scanned prescription with {} medicines",
            patient.medicines.len()
        ),
        ExtractedDocument::Order(receipt) => format!(
            "Scanned order receipt with {} products",
            receipt.products.len()
        ),
    }
}

fn save_document(
    store: &mut JsonFileStore,
    document: &ExtractedDocument,
    today: DocumentDate,
) -> anyhow::Result<()> {
    match document {
        ExtractedDocument::Product(guess) => {
            let Some(name) = &guess.name else {
                anyhow::bail!("Cannot save a product without a name");
            };
            let item = InventoryService::new(store).save_item(NewInventoryItem {
                name: name.clone(),
                expiry: guess.expiry.unwrap_or(today),
                batch: guess.batch.clone().unwrap_or_else(|| UNKNOWN_BATCH.to_string()),
                price: guess.price.unwrap_or(Decimal::ZERO),
                stock: guess.quantity.max(1),
                distributor_id: None,
            })?;
            println!(
                "{} Added {} to inventory (id {})",
                style("✓").green(),
                item.name,
                item.id
            );
        }
        ExtractedDocument::Patient(patient) => {
            let saved = InventoryService::new(store).save_patient_medicines(patient, today)?;
            println!(
                "{} Saved {} medicines to inventory",
                style("✓").green(),
                saved.len()
            );
        }
        ExtractedDocument::Order(receipt) => {
            let import = DistributorService::new(&mut *store).process_order_receipt(receipt)?;
            let stocked = InventoryService::new(store)
                .add_order_to_inventory(receipt, Some(import.distributor_id))?;
            println!(
                "{} Recorded {} products from {} distributor (id {})",
                style("✓").green(),
                import.products_added.len(),
                if import.created { "new" } else { "existing" },
                import.distributor_id
            );
            println!(
                "   {} new inventory items, {} restocked",
                stocked.created.len(),
                stocked.restocked.len()
            );
        }
    }
    Ok(())
}

pub fn format_result(result: &ScanResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&result.document)?),
        OutputFormat::Csv => format_csv(&result.document),
        OutputFormat::Text => Ok(format_text(&result.document)),
    }
}

fn format_csv(document: &ExtractedDocument) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["name", "quantity", "price", "batch", "expiry"])?;

    match document {
        ExtractedDocument::Product(guess) => {
            wtr.write_record([
                guess.name.clone().unwrap_or_default(),
                guess.quantity.to_string(),
                optional(guess.price),
                guess.batch.clone().unwrap_or_default(),
                optional(guess.expiry),
            ])?;
        }
        ExtractedDocument::Patient(PatientRecipient { medicines, .. })
        | ExtractedDocument::Order(OrderReceiptData {
            products: medicines, ..
        }) => {
            for product in medicines {
                wtr.write_record(product_row(product))?;
            }
        }
    }

    csv_to_string(wtr)
}

fn product_row(product: &ExtractedProduct) -> [String; 5] {
    [
        product.name.clone(),
        product.quantity.to_string(),
        product.price.to_string(),
        product.batch.clone().unwrap_or_default(),
        optional(product.expiry),
    ]
}

fn format_text(document: &ExtractedDocument) -> String {
    let mut output = String::new();

    match document {
        ExtractedDocument::Product(guess) => format_guess(&mut output, guess),
        ExtractedDocument::Patient(patient) => {
            output.push_str(&format!("Patient: {}\n", display_or_dash(&patient.name)));
            if let Some(id) = &patient.id {
                output.push_str(&format!("ID: {}\n", id));
            }
            if let Some(contact) = &patient.contact {
                output.push_str(&format!("Contact: {}\n", contact));
            }
            output.push('\n');
            output.push_str("Medicines:\n");
            format_products(&mut output, &patient.medicines);
        }
        ExtractedDocument::Order(receipt) => {
            output.push_str(&format!(
                "Distributor: {}\n",
                receipt.distributor_name.as_deref().unwrap_or("-")
            ));
            if let Some(contact) = &receipt.distributor_contact {
                output.push_str(&format!("Contact: {}\n", contact));
            }
            if let Some(id) = &receipt.receipt_id {
                output.push_str(&format!("Receipt: {}\n", id));
            }
            output.push_str(&format!("Date: {}\n", receipt.date));
            output.push('\n');
            output.push_str("Products:\n");
            format_products(&mut output, &receipt.products);
            output.push_str(&format!("\nTotal: {}\n", receipt.total()));
        }
    }

    output
}

fn format_guess(output: &mut String, guess: &SingleProductGuess) {
    output.push_str(&format!("Name: {}\n", guess.name.as_deref().unwrap_or("-")));
    output.push_str(&format!("Batch: {}\n", guess.batch.as_deref().unwrap_or("-")));
    output.push_str(&format!(
        "Expiry: {}\n",
        guess.expiry.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!(
        "Price: {}\n",
        guess.price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!("Quantity: {}\n", guess.quantity));
}

fn format_products(output: &mut String, products: &[ExtractedProduct]) {
    if products.is_empty() {
        output.push_str("  (none)\n");
        return;
    }
    for product in products {
        output.push_str(&format!(
            "  {} x{} @ {}",
            product.name, product.quantity, product.price
        ));
        if let Some(batch) = &product.batch {
            output.push_str(&format!("  batch {}", batch));
        }
        if let Some(expiry) = product.expiry {
            output.push_str(&format!("  exp {}", expiry));
        }
        output.push('\n');
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
