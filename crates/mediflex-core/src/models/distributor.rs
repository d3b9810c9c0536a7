//! Distributor records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::DocumentDate;

/// A supplier the pharmacy buys stock from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distributor {
    pub id: u64,
    pub name: String,
    pub contact: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub products: Vec<DistributionProduct>,
}

/// A product delivered by a distributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionProduct {
    pub id: u64,
    pub name: String,
    pub date: DocumentDate,
    pub quantity: u32,
    pub price: Decimal,
    /// Receipt that added this product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DocumentDate>,
}

/// A distributor that has not been assigned an id yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDistributor {
    pub name: String,
    pub contact: String,
    pub address: String,
}

/// Partial update of a distributor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributorUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

impl DistributorUpdate {
    pub(crate) fn apply(self, distributor: &mut Distributor) {
        if let Some(name) = self.name {
            distributor.name = name;
        }
        if let Some(contact) = self.contact {
            distributor.contact = contact;
        }
        if let Some(address) = self.address {
            distributor.address = address;
        }
    }
}

/// A delivered product that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDistributionProduct {
    pub name: String,
    pub date: DocumentDate,
    pub quantity: u32,
    pub price: Decimal,
    pub receipt_id: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DocumentDate>,
}

impl NewDistributionProduct {
    pub(crate) fn with_id(self, id: u64) -> DistributionProduct {
        DistributionProduct {
            id,
            name: self.name,
            date: self.date,
            quantity: self.quantity,
            price: self.price,
            receipt_id: self.receipt_id,
            batch_number: self.batch_number,
            expiry_date: self.expiry_date,
        }
    }
}

impl Distributor {
    /// Case-insensitive match on name or contact.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self.contact.to_lowercase().contains(needle_lowercase)
    }
}
