//! Regular buyer service.

use tracing::debug;

use super::dashboard::DashboardService;
use super::{load_records, next_id, save_records, KeyValueStore, BUYERS_KEY};
use crate::error::{MediflexError, Result};
use crate::models::activity::ActivityKind;
use crate::models::buyer::{Buyer, BuyerPurchase, BuyerUpdate, NewBuyer, NewPurchase};

pub struct BuyerService<S> {
    store: S,
}

impl<S: KeyValueStore> BuyerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn buyers(&self) -> Result<Vec<Buyer>> {
        Ok(load_records(&self.store, BUYERS_KEY)?)
    }

    pub fn get(&self, id: u64) -> Result<Buyer> {
        self.buyers()?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or(MediflexError::NotFound { entity: "buyer", id })
    }

    /// Register a buyer. Name and contact are required.
    pub fn add_buyer(&mut self, buyer: NewBuyer) -> Result<Buyer> {
        let name = buyer.name.trim();
        let contact = buyer.contact.trim();
        if name.is_empty() {
            return Err(MediflexError::validation("name", "buyer name is required"));
        }
        if contact.is_empty() {
            return Err(MediflexError::validation("contact", "buyer contact is required"));
        }

        let mut buyers = self.buyers()?;
        let saved = Buyer {
            id: next_id(BUYERS_KEY, buyers.iter().map(|b| b.id))?,
            name: name.to_string(),
            contact: contact.to_string(),
            notes: buyer.notes,
            purchases: Vec::new(),
        };
        buyers.push(saved.clone());
        save_records(&mut self.store, BUYERS_KEY, &buyers)?;

        DashboardService::new(&mut self.store)
            .add_activity(ActivityKind::Distribution, format!("Added new buyer: {}", saved.name))?;
        debug!(id = saved.id, "Added buyer");
        Ok(saved)
    }

    pub fn update_buyer(&mut self, id: u64, update: BuyerUpdate) -> Result<Buyer> {
        let mut buyers = self.buyers()?;
        let buyer = buyers
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(MediflexError::NotFound { entity: "buyer", id })?;
        update.apply(buyer);
        let updated = buyer.clone();
        save_records(&mut self.store, BUYERS_KEY, &buyers)?;
        Ok(updated)
    }

    pub fn delete_buyer(&mut self, id: u64) -> Result<Buyer> {
        let mut buyers = self.buyers()?;
        let index = buyers
            .iter()
            .position(|b| b.id == id)
            .ok_or(MediflexError::NotFound { entity: "buyer", id })?;
        let removed = buyers.remove(index);
        save_records(&mut self.store, BUYERS_KEY, &buyers)?;
        Ok(removed)
    }

    /// Case-insensitive search on name or contact. A blank query lists everyone.
    pub fn search(&self, query: &str) -> Result<Vec<Buyer>> {
        let needle = query.trim().to_lowercase();
        let buyers = self.buyers()?;
        if needle.is_empty() {
            return Ok(buyers);
        }
        Ok(buyers.into_iter().filter(|b| b.matches(&needle)).collect())
    }

    pub fn add_purchase(&mut self, buyer_id: u64, purchase: NewPurchase) -> Result<BuyerPurchase> {
        if purchase.medicine.trim().is_empty() {
            return Err(MediflexError::validation("medicine", "medicine name is required"));
        }

        let mut buyers = self.buyers()?;
        let buyer = buyers
            .iter_mut()
            .find(|b| b.id == buyer_id)
            .ok_or(MediflexError::NotFound {
                entity: "buyer",
                id: buyer_id,
            })?;

        let recorded = BuyerPurchase {
            id: next_id(BUYERS_KEY, buyer.purchases.iter().map(|p| p.id))?,
            medicine: purchase.medicine.trim().to_string(),
            date: purchase.date,
            quantity: purchase.quantity.max(1),
            price: purchase.price,
        };
        buyer.purchases.push(recorded.clone());
        save_records(&mut self.store, BUYERS_KEY, &buyers)?;
        Ok(recorded)
    }

    /// Remove every buyer.
    pub fn clear(&mut self) -> Result<()> {
        save_records::<Buyer, _>(&mut self.store, BUYERS_KEY, &[])?;
        Ok(())
    }
}
