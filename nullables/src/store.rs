//! Nullable store: thread-safe in-memory storage for testing.

use givpower_store::{PowerStore, StoreError};
use givpower_types::HolderAddress;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// An in-memory [`PowerStore`].
///
/// Holder records iterate in address order, so saved ledgers reload
/// deterministically.
pub struct NullStore {
    holders: Mutex<BTreeMap<HolderAddress, Vec<u8>>>,
    meta: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            holders: Mutex::new(BTreeMap::new()),
            meta: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of holder records currently stored.
    pub fn holder_count(&self) -> usize {
        self.holders.lock().map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    m.lock().map_err(|e| StoreError::Backend(e.to_string()))
}

impl PowerStore for NullStore {
    fn get_holder_record(&self, holder: &HolderAddress) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.holders)?.get(holder).cloned())
    }

    fn put_holder_record(&self, holder: &HolderAddress, record: &[u8]) -> Result<(), StoreError> {
        lock(&self.holders)?.insert(*holder, record.to_vec());
        Ok(())
    }

    fn delete_holder_record(&self, holder: &HolderAddress) -> Result<(), StoreError> {
        lock(&self.holders)?.remove(holder);
        Ok(())
    }

    fn iter_holder_records(&self) -> Result<Vec<(HolderAddress, Vec<u8>)>, StoreError> {
        Ok(lock(&self.holders)?
            .iter()
            .map(|(h, r)| (*h, r.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.meta)?.get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        lock(&self.meta)?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
