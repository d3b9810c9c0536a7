//! Dashboard activity feed and statistics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{
    increment_counter, load_counter, load_records, save_records, KeyValueStore, ACTIVITIES_KEY,
    BUYERS_KEY, DISTRIBUTORS_KEY, INVENTORY_KEY, OCR_SCANS_KEY, REPORTS_KEY,
};
use crate::error::Result;
use crate::models::activity::{Activity, ActivityKind};
use crate::models::buyer::{format_price, Buyer};
use crate::models::distributor::Distributor;
use crate::models::document::DocumentDate;
use crate::models::inventory::InventoryItem;

/// Activity feed length.
pub const MAX_RECENT_ACTIVITIES: usize = 10;

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: usize,
    pub ocr_scans: u64,
    pub regular_buyers: usize,
    /// Distributor deliveries dated this month or later.
    pub monthly_distributions: usize,
    /// Buyer purchase totals dated this month or later.
    pub monthly_sales: Decimal,
    pub reports_generated: u64,
}

/// One rendered dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCard {
    pub title: &'static str,
    pub value: String,
    pub description: &'static str,
}

impl DashboardStats {
    pub fn cards(&self) -> Vec<DashboardCard> {
        let card = |title, value: String, description| DashboardCard {
            title,
            value,
            description,
        };

        vec![
            card("Total Products", self.total_products.to_string(), "Products in database"),
            card("OCR Scans", self.ocr_scans.to_string(), "Documents scanned"),
            card("Regular Buyers", self.regular_buyers.to_string(), "Active customers"),
            card("Distributions", self.monthly_distributions.to_string(), "This month"),
            card("Total Sales", format_price(self.monthly_sales), "This month"),
            card("Reports Generated", self.reports_generated.to_string(), "This month"),
        ]
    }
}

/// Dashboard service over a key-value store.
pub struct DashboardService<S> {
    store: S,
}

impl<S: KeyValueStore> DashboardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Activities, newest first.
    pub fn recent_activities(&self) -> Result<Vec<Activity>> {
        Ok(load_records(&self.store, ACTIVITIES_KEY)?)
    }

    /// Record an activity now.
    pub fn add_activity(&mut self, kind: ActivityKind, title: impl Into<String>) -> Result<Activity> {
        self.add_activity_at(kind, title, Utc::now())
    }

    /// Record an activity with an explicit timestamp, keeping only the
    /// newest [`MAX_RECENT_ACTIVITIES`].
    pub fn add_activity_at(
        &mut self,
        kind: ActivityKind,
        title: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Activity> {
        let activity = Activity {
            kind,
            title: title.into(),
            timestamp,
        };

        let mut activities = self.recent_activities()?;
        activities.insert(0, activity.clone());
        activities.truncate(MAX_RECENT_ACTIVITIES);
        save_records(&mut self.store, ACTIVITIES_KEY, &activities)?;

        Ok(activity)
    }

    /// Count one OCR scan. Returns the new total.
    pub fn track_ocr_scan(&mut self) -> Result<u64> {
        Ok(increment_counter(&mut self.store, OCR_SCANS_KEY)?)
    }

    /// Count one generated report. Returns the new total.
    pub fn track_report(&mut self) -> Result<u64> {
        Ok(increment_counter(&mut self.store, REPORTS_KEY)?)
    }

    /// Compute statistics relative to `today`.
    pub fn stats(&self, today: DocumentDate) -> Result<DashboardStats> {
        let month_start = DocumentDate::new(today.year(), today.month(), 1);

        let inventory: Vec<InventoryItem> = load_records(&self.store, INVENTORY_KEY)?;
        let buyers: Vec<Buyer> = load_records(&self.store, BUYERS_KEY)?;
        let distributors: Vec<Distributor> = load_records(&self.store, DISTRIBUTORS_KEY)?;

        let monthly_distributions = distributors
            .iter()
            .flat_map(|d| &d.products)
            .filter(|p| p.date >= month_start)
            .count();

        let monthly_sales: Decimal = buyers
            .iter()
            .flat_map(|b| &b.purchases)
            .filter(|p| p.date >= month_start)
            .map(|p| p.total())
            .sum();

        Ok(DashboardStats {
            total_products: inventory.len(),
            ocr_scans: load_counter(&self.store, OCR_SCANS_KEY)?,
            regular_buyers: buyers.len(),
            monthly_distributions,
            monthly_sales,
            reports_generated: load_counter(&self.store, REPORTS_KEY)?,
        })
    }

    /// Render the six dashboard cards for `today`.
    pub fn cards(&self, today: DocumentDate) -> Result<Vec<DashboardCard>> {
        Ok(self.stats(today)?.cards())
    }
}
