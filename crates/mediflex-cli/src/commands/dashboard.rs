//! Dashboard command - headline numbers and recent activity.

use chrono::NaiveDate;
use clap::Args;
use console::style;

use mediflex_core::store::DashboardService;

use super::{document_date, GlobalOptions, Session};

/// Arguments for the dashboard command.
#[derive(Args)]
pub struct DashboardArgs {
    /// Print the statistics as JSON
    #[arg(long)]
    json: bool,

    /// Date used as "today" (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
}

pub async fn run(args: DashboardArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    let session = Session::load(options)?;
    let dashboard = DashboardService::new(session.open_store()?);

    let stats = dashboard.stats(document_date(args.date))?;
    let activities = dashboard.recent_activities()?;

    if args.json {
        let value = serde_json::json!({
            "stats": stats,
            "recentActivities": activities,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for card in stats.cards() {
        println!(
            "{:<18} {:>10}  {}",
            style(card.title).bold(),
            card.value,
            style(card.description).dim()
        );
    }

    println!();
    println!("{}", style("Recent activity").bold());
    if activities.is_empty() {
        println!("  (none)");
    }
    for activity in &activities {
        println!(
            "  {}  {:<12} {}",
            activity.timestamp.format("%Y-%m-%d %H:%M"),
            activity.kind.as_str(),
            activity.title
        );
    }

    Ok(())
}
