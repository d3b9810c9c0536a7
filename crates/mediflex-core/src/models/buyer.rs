//! Regular buyer records.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::document::DocumentDate;

/// A regular customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: u64,
    pub name: String,
    pub contact: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub purchases: Vec<BuyerPurchase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerPurchase {
    pub id: u64,
    pub medicine: String,
    pub date: DocumentDate,
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBuyer {
    pub name: String,
    pub contact: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuyerUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

impl BuyerUpdate {
    pub(crate) fn apply(self, buyer: &mut Buyer) {
        if let Some(name) = self.name {
            buyer.name = name;
        }
        if let Some(contact) = self.contact {
            buyer.contact = contact;
        }
        if let Some(notes) = self.notes {
            buyer.notes = notes;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchase {
    pub medicine: String,
    pub date: DocumentDate,
    pub quantity: u32,
    pub price: Decimal,
}

impl BuyerPurchase {
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Buyer {
    /// Sum of price times quantity over all purchases.
    pub fn total_spend(&self) -> Decimal {
        self.purchases.iter().map(BuyerPurchase::total).sum()
    }

    /// Case-insensitive match on name or contact.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self.contact.to_lowercase().contains(needle_lowercase)
    }
}

/// Format an amount in rupees, rounded to whole units (e.g. `₹1235`).
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("₹{}", rounded.normalize())
}
