//! Buyers command - regular customers and their purchases.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use console::style;
use rust_decimal::Decimal;

use mediflex_core::models::buyer::{format_price, Buyer, NewBuyer, NewPurchase};
use mediflex_core::store::BuyerService;

use super::{document_date, GlobalOptions, Session};

/// Arguments for the buyers command.
#[derive(Args)]
pub struct BuyersArgs {
    #[command(subcommand)]
    command: BuyersCommand,
}

#[derive(Subcommand)]
enum BuyersCommand {
    /// List regular buyers
    List,

    /// Add a regular buyer
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        contact: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Search by name or contact
    Search { query: String },

    /// Record a purchase
    Purchase {
        /// Buyer id
        id: u64,

        #[arg(long)]
        medicine: String,

        #[arg(long, default_value = "1")]
        quantity: u32,

        #[arg(long)]
        price: Decimal,

        /// Purchase date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub async fn run(args: BuyersArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let session = Session::load(options)?;
    let mut buyers = BuyerService::new(session.open_store()?);

    match args.command {
        BuyersCommand::List => print_buyers(&buyers.buyers()?),
        BuyersCommand::Add {
            name,
            contact,
            notes,
        } => {
            let buyer = buyers.add_buyer(NewBuyer {
                name,
                contact,
                notes,
            })?;
            println!("{} Added buyer {} (id {})", style("✓").green(), buyer.name, buyer.id);
        }
        BuyersCommand::Search { query } => print_buyers(&buyers.search(&query)?),
        BuyersCommand::Purchase {
            id,
            medicine,
            quantity,
            price,
            date,
        } => {
            let purchase = buyers.add_purchase(
                id,
                NewPurchase {
                    medicine,
                    date: document_date(date),
                    quantity,
                    price,
                },
            )?;
            println!(
                "{} Recorded {} x{} for {}",
                style("✓").green(),
                purchase.medicine,
                purchase.quantity,
                format_price(purchase.total())
            );
        }
    }

    Ok(())
}

fn print_buyers(buyers: &[Buyer]) {
    if buyers.is_empty() {
        println!("{} No buyers", style("ℹ").blue());
        return;
    }

    println!(
        "{:>4}  {:<24} {:<16} {:>9} {:>10}",
        "ID", "Name", "Contact", "Purchases", "Spent"
    );
    for buyer in buyers {
        println!(
            "{:>4}  {:<24} {:<16} {:>9} {:>10}",
            buyer.id,
            buyer.name,
            buyer.contact,
            buyer.purchases.len(),
            format_price(buyer.total_spend())
        );
    }
}
