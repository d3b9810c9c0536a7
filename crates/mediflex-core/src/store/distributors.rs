//! Distributor service.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::dashboard::DashboardService;
use super::{load_records, next_id, save_records, KeyValueStore, DISTRIBUTORS_KEY};
use crate::error::{MediflexError, Result};
use crate::models::activity::ActivityKind;
use crate::models::distributor::{
    DistributionProduct, Distributor, DistributorUpdate, NewDistributionProduct, NewDistributor,
};
use crate::models::document::OrderReceiptData;

/// Contact recorded for a distributor created from a receipt without one.
pub const UNKNOWN_CONTACT: &str = "Unknown";

/// Outcome of recording an order receipt against a distributor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptImport {
    pub distributor_id: u64,
    /// Whether the distributor was created by this receipt.
    pub created: bool,
    pub products_added: Vec<DistributionProduct>,
}

/// Distributor service over a key-value store.
pub struct DistributorService<S> {
    store: S,
}

impl<S: KeyValueStore> DistributorService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn distributors(&self) -> Result<Vec<Distributor>> {
        Ok(load_records(&self.store, DISTRIBUTORS_KEY)?)
    }

    pub fn get(&self, id: u64) -> Result<Distributor> {
        self.distributors()?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or(MediflexError::NotFound {
                entity: "distributor",
                id,
            })
    }

    pub fn save_distributor(&mut self, distributor: NewDistributor) -> Result<Distributor> {
        let name = distributor.name.trim();
        if name.is_empty() {
            return Err(MediflexError::validation("name", "distributor name is required"));
        }

        let mut distributors = self.distributors()?;
        let saved = Distributor {
            id: next_id(DISTRIBUTORS_KEY, distributors.iter().map(|d| d.id))?,
            name: name.to_string(),
            contact: distributor.contact,
            address: distributor.address,
            products: Vec::new(),
        };
        distributors.push(saved.clone());
        save_records(&mut self.store, DISTRIBUTORS_KEY, &distributors)?;

        debug!(id = saved.id, name = %saved.name, "Saved distributor");
        Ok(saved)
    }

    pub fn update_distributor(&mut self, id: u64, update: DistributorUpdate) -> Result<Distributor> {
        let mut distributors = self.distributors()?;
        let distributor = distributors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(MediflexError::NotFound {
                entity: "distributor",
                id,
            })?;
        update.apply(distributor);
        let updated = distributor.clone();
        save_records(&mut self.store, DISTRIBUTORS_KEY, &distributors)?;
        Ok(updated)
    }

    /// Record a delivered product and log it in the activity feed.
    pub fn add_product(
        &mut self,
        distributor_id: u64,
        product: NewDistributionProduct,
    ) -> Result<DistributionProduct> {
        let mut distributors = self.distributors()?;
        let distributor = distributors
            .iter_mut()
            .find(|d| d.id == distributor_id)
            .ok_or(MediflexError::NotFound {
                entity: "distributor",
                id: distributor_id,
            })?;

        let added = product.with_id(next_id(
            DISTRIBUTORS_KEY,
            distributor.products.iter().map(|p| p.id),
        )?);
        distributor.products.push(added.clone());
        let title = format!("{} distributed by {}", added.name, distributor.name);
        save_records(&mut self.store, DISTRIBUTORS_KEY, &distributors)?;

        DashboardService::new(&mut self.store).add_activity(ActivityKind::Distribution, title)?;
        Ok(added)
    }

    /// First distributor whose name contains `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Distributor>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        Ok(self
            .distributors()?
            .into_iter()
            .find(|d| d.name.to_lowercase().contains(&needle)))
    }

    /// Case-insensitive search on name or contact.
    pub fn search(&self, query: &str) -> Result<Vec<Distributor>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.distributors();
        }
        Ok(self
            .distributors()?
            .into_iter()
            .filter(|d| d.matches(&needle))
            .collect())
    }

    /// Attach the products of a scanned receipt to its distributor, creating
    /// the distributor when no existing one matches the printed name.
    pub fn process_order_receipt(&mut self, receipt: &OrderReceiptData) -> Result<ReceiptImport> {
        let name = receipt
            .distributor_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                warn!("Order receipt has no distributor name");
                MediflexError::UnknownDistributor
            })?;

        if !receipt.products.iter().any(|p| !p.name.trim().is_empty()) {
            return Err(MediflexError::validation("products", "no products found in the order receipt"));
        }

        let (distributor, created) = match self.find_by_name(name)? {
            Some(existing) => (existing, false),
            None => {
                let contact = receipt
                    .distributor_contact
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_CONTACT.to_string());
                let distributor = self.save_distributor(NewDistributor {
                    name: name.to_string(),
                    contact,
                    address: String::new(),
                })?;
                info!(id = distributor.id, "Created distributor {} from receipt", distributor.name);
                (distributor, true)
            }
        };

        let mut products_added = Vec::with_capacity(receipt.products.len());
        for product in receipt.products.iter().filter(|p| !p.name.trim().is_empty()) {
            let added = self.add_product(
                distributor.id,
                NewDistributionProduct {
                    name: product.name.clone(),
                    date: receipt.date,
                    quantity: product.quantity.max(1),
                    price: product.price,
                    receipt_id: receipt.receipt_id.clone(),
                    batch_number: product.batch.clone(),
                    expiry_date: product.expiry,
                },
            )?;
            products_added.push(added);
        }

        info!(
            distributor = %distributor.name,
            products = products_added.len(),
            "Processed order receipt"
        );

        Ok(ReceiptImport {
            distributor_id: distributor.id,
            created,
            products_added,
        })
    }

    /// Remove every distributor.
    pub fn clear(&mut self) -> Result<()> {
        save_records::<Distributor, _>(&mut self.store, DISTRIBUTORS_KEY, &[])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{DocumentDate, ExtractedProduct};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn new_distributor(name: &str) -> NewDistributor {
        NewDistributor {
            name: name.to_string(),
            contact: "022-5550100".to_string(),
            ..NewDistributor::default()
        }
    }

    fn receipt(name: Option<&str>) -> OrderReceiptData {
        let mut receipt = OrderReceiptData::empty(DocumentDate::new(2023, 1, 15));
        receipt.distributor_name = name.map(str::to_string);
        receipt.receipt_id = Some("INV-2023-001".to_string());
        receipt.products = vec![
            ExtractedProduct::new("Paracetamol 500mg", 100, Decimal::new(450, 2)),
            ExtractedProduct::new("Ibuprofen 200mg", 50, Decimal::new(320, 2)),
        ];
        receipt
    }

    #[test]
    fn test_save_requires_name() {
        let mut service = DistributorService::new(MemoryStore::new());
        assert!(matches!(
            service.save_distributor(new_distributor("  ")),
            Err(MediflexError::Validation { .. })
        ));

        let saved = service.save_distributor(new_distributor("ABC Pharma")).unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(service.get(1).unwrap(), saved);
    }

    #[test]
    fn test_update_and_search() {
        let mut service = DistributorService::new(MemoryStore::new());
        service.save_distributor(new_distributor("ABC Pharma")).unwrap();
        service.save_distributor(new_distributor("MedLine Supplies")).unwrap();

        service
            .update_distributor(2, DistributorUpdate {
                address: Some("12 Dock Road".to_string()),
                ..DistributorUpdate::default()
            })
            .unwrap();

        assert_eq!(service.get(2).unwrap().address, "12 Dock Road");
        assert_eq!(service.search("medline").unwrap().len(), 1);
        assert_eq!(service.search("").unwrap().len(), 2);
        assert!(service.update_distributor(9, DistributorUpdate::default()).is_err());
    }

    #[test]
    fn test_add_product_records_activity() {
        let mut store = MemoryStore::new();
        let mut service = DistributorService::new(&mut store);
        service.save_distributor(new_distributor("ABC Pharma")).unwrap();

        let product = service
            .add_product(1, NewDistributionProduct {
                name: "Cetirizine".to_string(),
                date: DocumentDate::new(2024, 2, 1),
                quantity: 20,
                price: Decimal::new(150, 2),
                receipt_id: None,
                batch_number: None,
                expiry_date: None,
            })
            .unwrap();
        assert_eq!(product.id, 1);

        let activities = DashboardService::new(&mut store).recent_activities().unwrap();
        assert_eq!(activities[0].title, "Cetirizine distributed by ABC Pharma");
        assert_eq!(activities[0].kind, ActivityKind::Distribution);
    }

    #[test]
    fn test_process_receipt_creates_distributor() {
        let mut service = DistributorService::new(MemoryStore::new());
        let import = service.process_order_receipt(&receipt(Some("ABC Pharmaceuticals Ltd."))).unwrap();

        assert!(import.created);
        assert_eq!(import.products_added.len(), 2);
        assert_eq!(import.products_added[0].date, DocumentDate::new(2023, 1, 15));
        assert_eq!(import.products_added[1].receipt_id.as_deref(), Some("INV-2023-001"));

        let distributor = service.get(import.distributor_id).unwrap();
        assert_eq!(distributor.contact, UNKNOWN_CONTACT);
        assert_eq!(distributor.products.len(), 2);
    }

    #[test]
    fn test_process_receipt_reuses_matching_distributor() {
        let mut service = DistributorService::new(MemoryStore::new());
        service.save_distributor(new_distributor("ABC Pharmaceuticals Ltd.")).unwrap();

        let import = service.process_order_receipt(&receipt(Some("abc pharma"))).unwrap();
        assert!(!import.created);
        assert_eq!(import.distributor_id, 1);
        assert_eq!(service.distributors().unwrap().len(), 1);
    }

    #[test]
    fn test_process_receipt_without_products_writes_nothing() {
        let mut store = MemoryStore::new();
        let mut empty = receipt(Some("Acme Pharma"));
        empty.products.clear();

        let err = DistributorService::new(&mut store).process_order_receipt(&empty).unwrap_err();
        assert!(matches!(err, MediflexError::Validation { .. }));

        let service = DistributorService::new(&mut store);
        assert!(service.distributors().unwrap().is_empty());
        assert!(DashboardService::new(&mut store).recent_activities().unwrap().is_empty());
    }

    #[test]
    fn test_process_receipt_without_distributor() {
        let mut service = DistributorService::new(MemoryStore::new());
        assert!(matches!(
            service.process_order_receipt(&receipt(None)),
            Err(MediflexError::UnknownDistributor)
        ));
        assert!(matches!(
            service.process_order_receipt(&receipt(Some(" "))),
            Err(MediflexError::UnknownDistributor)
        ));
    }
}
