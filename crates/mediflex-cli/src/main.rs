//! CLI application for pharmacy inventory and OCR document capture.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{batch, buyers, config, dashboard, distributors, inventory, report, scan, GlobalOptions};

/// Mediflex - Turn OCR text from pharmacy documents into inventory records
#[derive(Parser)]
#[command(name = "mediflex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the record files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from one OCR text file
    Scan(scan::ScanArgs),

    /// Extract records from many OCR text files
    Batch(batch::BatchArgs),

    /// Manage inventory items
    Inventory(inventory::InventoryArgs),

    /// Manage distributors
    Distributors(distributors::DistributorsArgs),

    /// Manage regular buyers
    Buyers(buyers::BuyersArgs),

    /// Export a CSV report
    Report(report::ReportArgs),

    /// Show dashboard statistics
    Dashboard(dashboard::DashboardArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let options = GlobalOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };

    match cli.command {
        Commands::Scan(args) => scan::run(args, &options).await,
        Commands::Batch(args) => batch::run(args, &options).await,
        Commands::Inventory(args) => inventory::run(args, &options).await,
        Commands::Distributors(args) => distributors::run(args, &options).await,
        Commands::Buyers(args) => buyers::run(args, &options).await,
        Commands::Report(args) => report::run(args, &options).await,
        Commands::Dashboard(args) => dashboard::run(args, &options).await,
        Commands::Config(args) => config::run(args, &options).await,
    }
}
