//! Report command - CSV exports of inventory, sales and purchases.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use tracing::info;

use mediflex_core::models::activity::ActivityKind;
use mediflex_core::models::buyer::Buyer;
use mediflex_core::models::distributor::Distributor;
use mediflex_core::models::document::DocumentDate;
use mediflex_core::models::inventory::InventoryItem;
use mediflex_core::store::{BuyerService, DashboardService, DistributorService, InventoryService};

use super::{csv_to_string, document_date, emit, optional, GlobalOptions, Session};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    /// Stock on hand
    Inventory,
    /// Purchases made by regular buyers
    Sales,
    /// Products delivered by distributors
    Purchases,
}

impl ReportKind {
    fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Inventory => "inventory",
            ReportKind::Sales => "sales",
            ReportKind::Purchases => "purchases",
        }
    }
}

/// Which dated records a report covers. Inventory reports ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Period {
    All,
    Today,
    Month,
}

impl Period {
    fn includes(&self, date: &DocumentDate, today: &DocumentDate) -> bool {
        match self {
            Period::All => true,
            Period::Today => date == today,
            Period::Month => date.same_month(today),
        }
    }
}

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Report to generate
    #[arg(value_enum)]
    kind: ReportKind,

    /// Period covered by sales and purchase reports
    #[arg(short, long, value_enum, default_value = "all")]
    period: Period,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Date used as "today" (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
}

pub async fn run(args: ReportArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let session = Session::load(options)?;
    let mut store = session.open_store()?;
    let today = document_date(args.date);

    let distributors = DistributorService::new(&mut store).distributors()?;
    let report = match args.kind {
        ReportKind::Inventory => {
            inventory_report(&InventoryService::new(&mut store).items()?, &distributors)?
        }
        ReportKind::Sales => {
            sales_report(&BuyerService::new(&mut store).buyers()?, args.period, today)?
        }
        ReportKind::Purchases => purchases_report(&distributors, args.period, today)?,
    };

    emit(report.trim_end(), args.output.as_deref())?;

    let mut dashboard = DashboardService::new(&mut store);
    let total = dashboard.track_report()?;
    dashboard.add_activity(
        ActivityKind::Report,
        format!("Generated {} report", args.kind.as_str()),
    )?;
    info!("Reports generated: {}", total);

    Ok(())
}

fn inventory_report(items: &[InventoryItem], distributors: &[Distributor]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "id",
        "product",
        "batch",
        "expiry",
        "stock",
        "price",
        "stock_value",
        "supplier",
    ])?;

    for item in items {
        let supplier = item
            .distributor_id
            .and_then(|id| distributors.iter().find(|d| d.id == id))
            .map(|d| d.name.as_str());
        wtr.write_record([
            item.id.to_string(),
            item.name.clone(),
            item.batch.clone(),
            item.expiry.to_string(),
            item.stock.to_string(),
            item.price.to_string(),
            item.stock_value().to_string(),
            optional(supplier),
        ])?;
    }

    csv_to_string(wtr)
}

fn sales_report(buyers: &[Buyer], period: Period, today: DocumentDate) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "customer", "contact", "product", "quantity", "price", "total"])?;

    for buyer in buyers {
        for purchase in buyer.purchases.iter().filter(|p| period.includes(&p.date, &today)) {
            wtr.write_record([
                purchase.date.to_string(),
                buyer.name.clone(),
                buyer.contact.clone(),
                purchase.medicine.clone(),
                purchase.quantity.to_string(),
                purchase.price.to_string(),
                purchase.total().to_string(),
            ])?;
        }
    }

    csv_to_string(wtr)
}

fn purchases_report(
    distributors: &[Distributor],
    period: Period,
    today: DocumentDate,
) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "supplier",
        "product",
        "quantity",
        "price",
        "total",
        "batch",
        "receipt",
    ])?;

    for distributor in distributors {
        for product in distributor
            .products
            .iter()
            .filter(|p| period.includes(&p.date, &today))
        {
            let total = product.price * rust_decimal::Decimal::from(product.quantity);
            wtr.write_record([
                product.date.to_string(),
                distributor.name.clone(),
                product.name.clone(),
                product.quantity.to_string(),
                product.price.to_string(),
                total.to_string(),
                product.batch_number.clone().unwrap_or_default(),
                product.receipt_id.clone().unwrap_or_default(),
            ])?;
        }
    }

    csv_to_string(wtr)
}
