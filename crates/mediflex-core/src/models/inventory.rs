//! Inventory records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::DocumentDate;

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    pub expiry: DocumentDate,
    /// Batch number, doubling as the barcode value.
    pub batch: String,
    pub price: Decimal,
    pub stock: u32,
    /// Distributor the stock was received from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor_id: Option<u64>,
}

/// An inventory item that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
    pub name: String,
    pub expiry: DocumentDate,
    pub batch: String,
    pub price: Decimal,
    pub stock: u32,
    pub distributor_id: Option<u64>,
}

impl NewInventoryItem {
    pub(crate) fn with_id(self, id: u64) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            expiry: self.expiry,
            batch: self.batch,
            price: self.price,
            stock: self.stock,
            distributor_id: self.distributor_id,
        }
    }
}

/// Partial update of an inventory item; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryUpdate {
    pub name: Option<String>,
    pub expiry: Option<DocumentDate>,
    pub batch: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
}

impl InventoryUpdate {
    pub(crate) fn apply(self, item: &mut InventoryItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(expiry) = self.expiry {
            item.expiry = expiry;
        }
        if let Some(batch) = self.batch {
            item.batch = batch;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(stock) = self.stock {
            item.stock = stock;
        }
    }
}

impl InventoryItem {
    /// Case-insensitive match on name or batch.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self.batch.to_lowercase().contains(needle_lowercase)
    }

    /// Stock value at the current price.
    pub fn stock_value(&self) -> Decimal {
        self.price * Decimal::from(self.stock)
    }
}
