//! Key-value blob storage.
//!
//! The player keeps two namespaces: fetched audio keyed by video id, and the
//! serialized playlist under a single state key. Both go through
//! [`BlobStore`] so tests and `storage.in_memory` sessions can swap the disk
//! out for a map.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

pub trait BlobStore: Send + Sync {
    /// Fetch the value under `key`, or `None` when nothing was stored.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    /// Drop `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
