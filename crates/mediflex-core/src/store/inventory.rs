//! Inventory service.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::{load_records, next_id, save_records, KeyValueStore, INVENTORY_KEY};
use crate::error::{MediflexError, Result};
use crate::models::document::{DocumentDate, OrderReceiptData, PatientRecipient};
use crate::models::inventory::{InventoryItem, InventoryUpdate, NewInventoryItem};

/// Batch recorded when a scanned document gives none.
pub const UNKNOWN_BATCH: &str = "UNKNOWN";
/// Name recorded when a scanned medicine has none.
pub const UNKNOWN_MEDICINE: &str = "Unknown Medicine";

/// Outcome of adding an order receipt to inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryImport {
    /// Items created by the receipt.
    pub created: Vec<InventoryItem>,
    /// Existing items whose stock was topped up.
    pub restocked: Vec<InventoryItem>,
}

impl InventoryImport {
    /// Number of receipt lines applied.
    pub fn len(&self) -> usize {
        self.created.len() + self.restocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.restocked.is_empty()
    }
}

/// Inventory service over a key-value store.
pub struct InventoryService<S> {
    store: S,
}

impl<S: KeyValueStore> InventoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All items in insertion order.
    pub fn items(&self) -> Result<Vec<InventoryItem>> {
        Ok(load_records(&self.store, INVENTORY_KEY)?)
    }

    /// Add an item under the next free id.
    pub fn save_item(&mut self, item: NewInventoryItem) -> Result<InventoryItem> {
        let mut items = self.items()?;
        let saved = item.with_id(next_id(INVENTORY_KEY, items.iter().map(|i| i.id))?);
        items.push(saved.clone());
        save_records(&mut self.store, INVENTORY_KEY, &items)?;
        debug!(id = saved.id, name = %saved.name, "Saved inventory item");
        Ok(saved)
    }

    pub fn update_item(&mut self, id: u64, update: InventoryUpdate) -> Result<InventoryItem> {
        let mut items = self.items()?;
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(MediflexError::NotFound {
                entity: "inventory item",
                id,
            })?;
        update.apply(item);
        let updated = item.clone();
        save_records(&mut self.store, INVENTORY_KEY, &items)?;
        Ok(updated)
    }

    pub fn delete_item(&mut self, id: u64) -> Result<InventoryItem> {
        let mut items = self.items()?;
        let index = items
            .iter()
            .position(|i| i.id == id)
            .ok_or(MediflexError::NotFound {
                entity: "inventory item",
                id,
            })?;
        let removed = items.remove(index);
        save_records(&mut self.store, INVENTORY_KEY, &items)?;
        Ok(removed)
    }

    /// Case-insensitive search on name or batch. A blank query finds nothing.
    pub fn search(&self, query: &str) -> Result<Vec<InventoryItem>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .items()?
            .into_iter()
            .filter(|item| item.matches(&needle))
            .collect())
    }

    /// Exact batch lookup; batch numbers double as barcodes.
    pub fn find_by_barcode(&self, barcode: &str) -> Result<Option<InventoryItem>> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Ok(None);
        }
        Ok(self.items()?.into_iter().find(|item| item.batch == barcode))
    }

    /// Save every medicine on a prescription as a new inventory item.
    ///
    /// Missing batches become `UNKNOWN` and missing expiries `today`.
    pub fn save_patient_medicines(
        &mut self,
        patient: &PatientRecipient,
        today: DocumentDate,
    ) -> Result<Vec<InventoryItem>> {
        if patient.medicines.is_empty() {
            return Err(MediflexError::validation("medicines", "no medicines found for patient"));
        }

        let mut items = self.items()?;
        let mut saved = Vec::with_capacity(patient.medicines.len());

        for medicine in &patient.medicines {
            let name = if medicine.name.trim().is_empty() {
                UNKNOWN_MEDICINE.to_string()
            } else {
                medicine.name.clone()
            };
            let item = NewInventoryItem {
                name,
                expiry: medicine.expiry.unwrap_or(today),
                batch: medicine.batch.clone().unwrap_or_else(|| UNKNOWN_BATCH.to_string()),
                price: medicine.price,
                stock: medicine.quantity.max(1),
                distributor_id: None,
            }
            .with_id(next_id(INVENTORY_KEY, items.iter().map(|i| i.id))?);

            items.push(item.clone());
            saved.push(item);
        }

        save_records(&mut self.store, INVENTORY_KEY, &items)?;
        info!("Saved {} medicines for patient {:?}", saved.len(), patient.name);
        Ok(saved)
    }

    /// Receive the products of an order receipt into stock.
    ///
    /// A product with the same name (ignoring case) and batch as an existing
    /// item tops up its stock and refreshes a non-zero price. Anything else
    /// becomes a new item expiring on the receipt date unless it prints one.
    pub fn add_order_to_inventory(
        &mut self,
        receipt: &OrderReceiptData,
        distributor_id: Option<u64>,
    ) -> Result<InventoryImport> {
        if receipt.products.is_empty() {
            return Err(MediflexError::validation("products", "no products found in the order receipt"));
        }

        let mut items = self.items()?;
        let mut import = InventoryImport::default();

        for product in receipt.products.iter().filter(|p| !p.name.trim().is_empty()) {
            let batch = product.batch.clone().unwrap_or_else(|| UNKNOWN_BATCH.to_string());
            let name = product.name.to_lowercase();

            let existing = items
                .iter_mut()
                .find(|item| item.name.to_lowercase() == name && item.batch == batch);

            match existing {
                Some(item) => {
                    item.stock = item.stock.saturating_add(product.quantity);
                    if product.price > Decimal::ZERO {
                        item.price = product.price;
                    }
                    if item.distributor_id.is_none() {
                        item.distributor_id = distributor_id;
                    }
                    import.restocked.push(item.clone());
                }
                None => {
                    let item = NewInventoryItem {
                        name: product.name.clone(),
                        expiry: product.expiry.unwrap_or(receipt.date),
                        batch,
                        price: product.price,
                        stock: product.quantity.max(1),
                        distributor_id,
                    }
                    .with_id(next_id(INVENTORY_KEY, items.iter().map(|i| i.id))?);
                    items.push(item.clone());
                    import.created.push(item);
                }
            }
        }

        save_records(&mut self.store, INVENTORY_KEY, &items)?;
        info!(
            created = import.created.len(),
            restocked = import.restocked.len(),
            "Added order receipt to inventory"
        );
        Ok(import)
    }

    /// Remove every inventory item.
    pub fn clear(&mut self) -> Result<()> {
        save_records::<InventoryItem, _>(&mut self.store, INVENTORY_KEY, &[])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::document::ExtractedProduct;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn new_item(name: &str, batch: &str, stock: u32) -> NewInventoryItem {
        NewInventoryItem {
            name: name.to_string(),
            expiry: DocumentDate::new(2025, 12, 31),
            batch: batch.to_string(),
            price: Decimal::new(450, 2),
            stock,
            distributor_id: None,
        }
    }

    fn receipt(products: Vec<ExtractedProduct>) -> OrderReceiptData {
        let mut receipt = OrderReceiptData::empty(DocumentDate::new(2024, 5, 1));
        receipt.products = products;
        receipt
    }

    #[test]
    fn test_exhausted_ids_are_refused() {
        let mut store = MemoryStore::new();
        let last = new_item("Paracetamol", "PCM001", 10).with_id(u64::MAX);
        save_records(&mut store, INVENTORY_KEY, &[last]).unwrap();

        let err = InventoryService::new(&mut store)
            .save_item(new_item("Ibuprofen", "IBU002", 5))
            .unwrap_err();
        assert!(matches!(err, MediflexError::Store(StoreError::Corrupt { .. })));
        assert_eq!(InventoryService::new(&mut store).items().unwrap().len(), 1);
    }

    #[test]
    fn test_crud() {
        let mut inventory = InventoryService::new(MemoryStore::new());
        let first = inventory.save_item(new_item("Paracetamol", "PCM001", 10)).unwrap();
        let second = inventory.save_item(new_item("Ibuprofen", "IBU002", 5)).unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let updated = inventory
            .update_item(2, InventoryUpdate {
                stock: Some(7),
                ..InventoryUpdate::default()
            })
            .unwrap();
        assert_eq!(updated.stock, 7);

        inventory.delete_item(1).unwrap();
        assert_eq!(inventory.items().unwrap(), vec![updated]);

        assert!(matches!(
            inventory.delete_item(1),
            Err(MediflexError::NotFound { id: 1, .. })
        ));
        assert_eq!(inventory.save_item(new_item("Cetirizine", "CT3", 1)).unwrap().id, 3);
    }

    #[test]
    fn test_search_and_barcode() {
        let mut inventory = InventoryService::new(MemoryStore::new());
        inventory.save_item(new_item("Paracetamol", "PCM001", 10)).unwrap();
        inventory.save_item(new_item("Amoxicillin", "AMX-77", 3)).unwrap();

        assert_eq!(inventory.search("para").unwrap().len(), 1);
        assert_eq!(inventory.search("amx").unwrap()[0].name, "Amoxicillin");
        assert!(inventory.search("   ").unwrap().is_empty());

        assert_eq!(inventory.find_by_barcode("PCM001").unwrap().unwrap().name, "Paracetamol");
        assert!(inventory.find_by_barcode("pcm001").unwrap().is_none());
        assert!(inventory.find_by_barcode("").unwrap().is_none());
    }

    #[test]
    fn test_save_patient_medicines_defaults() {
        let mut inventory = InventoryService::new(MemoryStore::new());
        let patient = PatientRecipient {
            name: "Ravi".to_string(),
            medicines: vec![ExtractedProduct::new("Amoxicillin", 15, Decimal::new(350, 2))],
            ..PatientRecipient::default()
        };

        let saved = inventory
            .save_patient_medicines(&patient, DocumentDate::new(2024, 6, 1))
            .unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].batch, UNKNOWN_BATCH);
        assert_eq!(saved[0].expiry, DocumentDate::new(2024, 6, 1));
        assert_eq!(saved[0].stock, 15);

        let empty = PatientRecipient::default();
        assert!(matches!(
            inventory.save_patient_medicines(&empty, DocumentDate::new(2024, 6, 1)),
            Err(MediflexError::Validation { .. })
        ));
    }

    #[test]
    fn test_add_order_restocks_matching_items() {
        let mut inventory = InventoryService::new(MemoryStore::new());
        inventory.save_item(new_item("Paracetamol 500mg", UNKNOWN_BATCH, 10)).unwrap();

        let import = inventory
            .add_order_to_inventory(
                &receipt(vec![
                    ExtractedProduct::new("PARACETAMOL 500MG", 100, Decimal::new(420, 2)),
                    ExtractedProduct::new("Ibuprofen 200mg", 50, Decimal::ZERO),
                ]),
                Some(4),
            )
            .unwrap();

        assert_eq!(import.len(), 2);
        assert_eq!(import.restocked[0].stock, 110);
        assert_eq!(import.restocked[0].price, Decimal::new(420, 2));
        assert_eq!(import.restocked[0].distributor_id, Some(4));

        let created = &import.created[0];
        assert_eq!(created.id, 2);
        assert_eq!(created.expiry, DocumentDate::new(2024, 5, 1));
        assert_eq!(created.batch, UNKNOWN_BATCH);
        assert_eq!(inventory.items().unwrap().len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut store = MemoryStore::new();
        let mut inventory = InventoryService::new(&mut store);
        inventory.save_item(new_item("Paracetamol", "PCM001", 10)).unwrap();
        inventory.clear().unwrap();
        assert!(inventory.items().unwrap().is_empty());
    }
}
