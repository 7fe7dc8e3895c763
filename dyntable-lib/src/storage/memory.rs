//! In-memory storage implementation using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::StorageProvider;

/// An in-memory provider backed by a concurrent hash map.
///
/// The default provider. Fast and thread-safe; data is lost when the
/// process exits.
///
/// # Example
///
/// ```
/// use dyntable_lib::storage::MemoryStorage;
///
/// let storage = MemoryStorage::new();
/// assert!(storage.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: DashMap<String, serde_json::Value>,
}

impl MemoryStorage {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Creates a new store with the specified initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored collections.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    async fn set(&self, key: &str, value: serde_json::Value) {
        self.store.insert(key.to_string(), value);
    }

    async fn remove(&self, key: &str) {
        self.store.remove(key);
    }

    async fn clear(&self) {
        self.store.clear();
    }
}
