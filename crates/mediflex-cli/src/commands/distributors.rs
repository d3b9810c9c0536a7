//! Distributors command - suppliers and the products they delivered.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use console::style;

use mediflex_core::models::distributor::{Distributor, NewDistributor};
use mediflex_core::models::document::ScanMode;
use mediflex_core::store::{DistributorService, InventoryService};
use mediflex_core::ExtractedDocument;

use super::scan::record_scan;
use super::{effective_date, GlobalOptions, Session};

/// Arguments for the distributors command.
#[derive(Args)]
pub struct DistributorsArgs {
    #[command(subcommand)]
    command: DistributorsCommand,
}

#[derive(Subcommand)]
enum DistributorsCommand {
    /// List distributors
    List {
        /// Also list delivered products
        #[arg(long)]
        products: bool,
    },

    /// Add a distributor
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        contact: String,

        #[arg(long, default_value = "")]
        address: String,
    },

    /// Search by name or contact
    Search { query: String },

    /// Import an order receipt from an OCR text file
    Import {
        file: PathBuf,

        /// Also add the products to inventory
        #[arg(long)]
        stock: bool,

        /// Date used when the receipt prints none (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub async fn run(args: DistributorsArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let session = Session::load(options)?;
    let mut store = session.open_store()?;

    match args.command {
        DistributorsCommand::List { products } => {
            print_distributors(&DistributorService::new(&mut store).distributors()?, products);
        }
        DistributorsCommand::Add {
            name,
            contact,
            address,
        } => {
            let distributor = DistributorService::new(&mut store).save_distributor(NewDistributor {
                name,
                contact,
                address,
            })?;
            println!(
                "{} Added distributor {} (id {})",
                style("✓").green(),
                distributor.name,
                distributor.id
            );
        }
        DistributorsCommand::Search { query } => {
            print_distributors(&DistributorService::new(&mut store).search(&query)?, false);
        }
        DistributorsCommand::Import { file, stock, date } => {
            if !file.exists() {
                anyhow::bail!("Input file not found: {}", file.display());
            }
            let text = fs::read_to_string(&file)?;
            let result = session.parser(effective_date(date)).scan(ScanMode::Order, &text);
            for warning in &result.warnings {
                eprintln!("{} {}", style("⚠").yellow(), warning);
            }
            record_scan(&mut store, &result.document)?;

            let ExtractedDocument::Order(receipt) = &result.document else {
                anyhow::bail!("Expected an order receipt");
            };

            let import = DistributorService::new(&mut store).process_order_receipt(receipt)?;
            println!(
                "{} Recorded {} products for {} distributor (id {})",
                style("✓").green(),
                import.products_added.len(),
                if import.created { "new" } else { "existing" },
                import.distributor_id
            );

            if stock {
                let stocked = InventoryService::new(&mut store)
                    .add_order_to_inventory(receipt, Some(import.distributor_id))?;
                println!(
                    "   {} new inventory items, {} restocked",
                    stocked.created.len(),
                    stocked.restocked.len()
                );
            }
        }
    }

    Ok(())
}

fn print_distributors(distributors: &[Distributor], with_products: bool) {
    if distributors.is_empty() {
        println!("{} No distributors", style("ℹ").blue());
        return;
    }

    for distributor in distributors {
        println!(
            "{:>4}  {}  {}  {} products",
            distributor.id,
            style(&distributor.name).bold(),
            distributor.contact,
            distributor.products.len()
        );
        if with_products {
            for product in &distributor.products {
                println!(
                    "        {} {} x{} @ {}{}",
                    product.date,
                    product.name,
                    product.quantity,
                    product.price,
                    product
                        .receipt_id
                        .as_deref()
                        .map(|id| format!("  ({})", id))
                        .unwrap_or_default()
                );
            }
        }
    }
}
