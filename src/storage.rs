use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use crate::models::{Purchase, PurchaseInput};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("purchase not found: {0}")]
    NotFound(u64),
    #[error("purchase store lock poisoned")]
    Poisoned,
}

/// Ordered collection of purchases with dense, 1-based ids.
///
/// Ids always form the sequence `1..=len`. Creating appends with
/// `id = len + 1`; deleting shifts every higher id down by one, so ids are
/// not stable across deletes.
pub trait PurchaseStore: Send + Sync {
    fn list(&self) -> Result<Vec<Purchase>, StorageError>;
    fn get(&self, id: u64) -> Result<Purchase, StorageError>;
    fn create(&self, input: PurchaseInput) -> Result<Purchase, StorageError>;
    fn update(&self, id: u64, input: PurchaseInput) -> Result<Purchase, StorageError>;
    fn delete(&self, id: u64) -> Result<Purchase, StorageError>;
    fn len(&self) -> Result<usize, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

pub struct InMemoryStore {
    purchases: RwLock<Vec<Purchase>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            purchases: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Purchase>>, StorageError> {
        self.purchases.read().map_err(|_| StorageError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Purchase>>, StorageError> {
        self.purchases.write().map_err(|_| StorageError::Poisoned)
    }
}

fn position(purchases: &[Purchase], id: u64) -> Result<usize, StorageError> {
    purchases
        .iter()
        .position(|p| p.id == id)
        .ok_or(StorageError::NotFound(id))
}

impl PurchaseStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Purchase>, StorageError> {
        Ok(self.read()?.clone())
    }

    fn get(&self, id: u64) -> Result<Purchase, StorageError> {
        let purchases = self.read()?;
        let index = position(&purchases, id)?;
        Ok(purchases[index].clone())
    }

    fn create(&self, input: PurchaseInput) -> Result<Purchase, StorageError> {
        let mut purchases = self.write()?;
        let purchase = Purchase::new(purchases.len() as u64 + 1, input);
        purchases.push(purchase.clone());
        tracing::debug!(id = purchase.id, "Purchase created");
        Ok(purchase)
    }

    fn update(&self, id: u64, input: PurchaseInput) -> Result<Purchase, StorageError> {
        let mut purchases = self.write()?;
        let index = position(&purchases, id)?;
        let purchase = &mut purchases[index];
        purchase.apply(input);
        tracing::debug!(id, "Purchase updated");
        Ok(purchase.clone())
    }

    fn delete(&self, id: u64) -> Result<Purchase, StorageError> {
        let mut purchases = self.write()?;
        let index = position(&purchases, id)?;
        let removed = purchases.remove(index);
        for purchase in purchases.iter_mut().filter(|p| p.id > removed.id) {
            purchase.id -= 1;
        }
        tracing::debug!(id, remaining = purchases.len(), "Purchase deleted");
        Ok(removed)
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }
}
