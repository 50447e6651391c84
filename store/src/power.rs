use crate::StoreError;
use givpower_types::HolderAddress;

/// Store trait for persisting ledger state to durable storage.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the ledger crates
/// (which would create a circular dependency). The ledger serializes and
/// deserializes its own records: one record per holder plus a handful of
/// metadata entries for the global reward state and the round clock.
pub trait PowerStore {
    fn get_holder_record(&self, holder: &HolderAddress) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_holder_record(&self, holder: &HolderAddress, record: &[u8]) -> Result<(), StoreError>;
    fn delete_holder_record(&self, holder: &HolderAddress) -> Result<(), StoreError>;
    fn iter_holder_records(&self) -> Result<Vec<(HolderAddress, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
