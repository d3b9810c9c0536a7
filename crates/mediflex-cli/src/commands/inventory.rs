//! Inventory command - list and edit stocked items.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use console::style;
use rust_decimal::Decimal;

use mediflex_core::models::document::DocumentDate;
use mediflex_core::models::inventory::{InventoryItem, InventoryUpdate, NewInventoryItem};
use mediflex_core::store::{InventoryService, UNKNOWN_BATCH};

use super::{csv_to_string, optional, GlobalOptions, OutputFormat, Session};

/// Arguments for the inventory command.
#[derive(Args)]
pub struct InventoryArgs {
    #[command(subcommand)]
    command: InventoryCommand,
}

#[derive(Subcommand)]
enum InventoryCommand {
    /// List every item
    List {
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add an item
    Add(AddArgs),

    /// Change fields of an item
    Update(UpdateArgs),

    /// Search by name or batch
    Search { query: String },

    /// Look up an item by its barcode (batch number)
    Barcode { code: String },

    /// Delete an item
    Delete { id: u64 },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,

    #[arg(long, default_value = UNKNOWN_BATCH)]
    batch: String,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    expiry: NaiveDate,

    #[arg(long, default_value = "0")]
    price: Decimal,

    #[arg(long, default_value = "1")]
    stock: u32,
}

#[derive(Args)]
struct UpdateArgs {
    id: u64,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    batch: Option<String>,

    #[arg(long)]
    expiry: Option<NaiveDate>,

    #[arg(long)]
    price: Option<Decimal>,

    #[arg(long)]
    stock: Option<u32>,
}

pub async fn run(args: InventoryArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let session = Session::load(options)?;
    let mut inventory = InventoryService::new(session.open_store()?);

    match args.command {
        InventoryCommand::List { format } => {
            let items = inventory.items()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&items)?),
                OutputFormat::Csv => print!("{}", items_csv(&items)?),
                OutputFormat::Text => print_items(&items),
            }
        }
        InventoryCommand::Add(add) => {
            if add.name.trim().is_empty() {
                anyhow::bail!("Item name must not be empty");
            }
            let item = inventory.save_item(NewInventoryItem {
                name: add.name.trim().to_string(),
                expiry: DocumentDate::from_naive(add.expiry),
                batch: add.batch,
                price: add.price,
                stock: add.stock,
                distributor_id: None,
            })?;
            println!("{} Added {} (id {})", style("✓").green(), item.name, item.id);
        }
        InventoryCommand::Update(update) => {
            let item = inventory.update_item(
                update.id,
                InventoryUpdate {
                    name: update.name,
                    expiry: update.expiry.map(DocumentDate::from_naive),
                    batch: update.batch,
                    price: update.price,
                    stock: update.stock,
                },
            )?;
            println!("{} Updated {} (id {})", style("✓").green(), item.name, item.id);
        }
        InventoryCommand::Search { query } => {
            let items = inventory.search(&query)?;
            if items.is_empty() {
                println!("{} No items match {:?}", style("ℹ").blue(), query);
            } else {
                print_items(&items);
            }
        }
        InventoryCommand::Barcode { code } => match inventory.find_by_barcode(&code)? {
            Some(item) => print_items(std::slice::from_ref(&item)),
            None => anyhow::bail!("No item with barcode {}", code),
        },
        InventoryCommand::Delete { id } => {
            let item = inventory.delete_item(id)?;
            println!("{} Deleted {} (id {})", style("✓").green(), item.name, item.id);
        }
    }

    Ok(())
}

fn print_items(items: &[InventoryItem]) {
    if items.is_empty() {
        println!("{} Inventory is empty", style("ℹ").blue());
        return;
    }

    println!(
        "{:>4}  {:<30} {:<12} {:<10} {:>6} {:>10}",
        "ID", "Name", "Batch", "Expiry", "Stock", "Price"
    );
    for item in items {
        println!(
            "{:>4}  {:<30} {:<12} {:<10} {:>6} {:>10}",
            item.id,
            item.name,
            item.batch,
            item.expiry.to_string(),
            item.stock,
            item.price.to_string()
        );
    }
}

fn items_csv(items: &[InventoryItem]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["id", "name", "batch", "expiry", "stock", "price", "distributor_id"])?;
    for item in items {
        wtr.write_record([
            item.id.to_string(),
            item.name.clone(),
            item.batch.clone(),
            item.expiry.to_string(),
            item.stock.to_string(),
            item.price.to_string(),
            optional(item.distributor_id),
        ])?;
    }
    csv_to_string(wtr)
}
