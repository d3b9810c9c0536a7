//! Key-value storage port and the record services built on it.
//!
//! Every collection is stored as one JSON array under a fixed key, the same
//! layout the browser application keeps in local storage.

mod backend;
mod buyers;
mod dashboard;
mod distributors;
mod inventory;

pub use backend::{JsonFileStore, MemoryStore};
pub use buyers::BuyerService;
pub use dashboard::{DashboardCard, DashboardService, DashboardStats, MAX_RECENT_ACTIVITIES};
pub use distributors::{DistributorService, ReceiptImport, UNKNOWN_CONTACT};
pub use inventory::{InventoryImport, InventoryService, UNKNOWN_BATCH, UNKNOWN_MEDICINE};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Inventory items.
pub const INVENTORY_KEY: &str = "mediflex_inventory";
/// Distributors with their delivered products.
pub const DISTRIBUTORS_KEY: &str = "distributors";
/// Regular buyers with their purchases.
pub const BUYERS_KEY: &str = "regularBuyers";
/// Dashboard activity feed.
pub const ACTIVITIES_KEY: &str = "recentActivities";
/// Number of OCR scans performed.
pub const OCR_SCANS_KEY: &str = "ocrScansCount";
/// Number of reports generated.
pub const REPORTS_KEY: &str = "reportsCount";

/// String key-value storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Remove every key.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Allow services to borrow a store they do not own.
impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Load a JSON array of records. A missing key is an empty collection.
pub(crate) fn load_records<T, S>(store: &S, key: &str) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        None => Ok(Vec::new()),
        Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Replace the JSON array stored under `key`.
pub(crate) fn save_records<T, S>(store: &mut S, key: &str, records: &[T]) -> Result<(), StoreError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(records)?;
    store.set(key, &json)
}

/// Read a counter. A missing key counts as zero.
pub(crate) fn load_counter<S>(store: &S, key: &str) -> Result<u64, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        None => Ok(0),
        Some(raw) => raw.trim().parse().map_err(|_| StoreError::Corrupt {
            key: key.to_string(),
            reason: format!("{raw:?} is not a count"),
        }),
    }
}

/// Add one to a counter and return the new value.
pub(crate) fn increment_counter<S>(store: &mut S, key: &str) -> Result<u64, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let next = load_counter(store, key)?.saturating_add(1);
    store.set(key, &next.to_string())?;
    Ok(next)
}

/// Next id for a collection stored under `key`: one more than the largest
/// in use.
pub(crate) fn next_id(key: &str, ids: impl Iterator<Item = u64>) -> Result<u64, StoreError> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| StoreError::Corrupt {
            key: key.to_string(),
            reason: "record id space exhausted".to_string(),
        })
}
