// # Memory State Store
//
// In-memory implementation of StateStore. Nothing survives a restart, so
// the first pass after a restart creates every resource again.
//
// ## When to Use
//
// - Tests
// - One-shot runs against a fresh account

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateStore, StoredResource};

/// In-memory state store implementation
///
/// # Example
///
/// ```rust,no_run
/// use zonesync_core::state::MemoryStateStore;
/// use zonesync_core::{ResourceData, StateStore, StoredResource};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///
///     let data = ResourceData::new().with("domain", "example.com").with_id("example.com");
///     store.set("cloudns_dns_zone.main", &StoredResource::new("cloudns_dns_zone", data)).await?;
///
///     assert!(store.get("cloudns_dns_zone.main").await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, StoredResource>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of tracked resources
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Forget every tracked resource
    pub async fn clear(&self) -> Result<(), Error> {
        self.inner.write().await.clear();
        Ok(())
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, address: &str) -> Result<Option<StoredResource>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(address).cloned())
    }

    async fn set(&self, address: &str, resource: &StoredResource) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(address.to_string(), resource.clone());
        Ok(())
    }

    async fn delete(&self, address: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(address);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        let mut addresses: Vec<String> = guard.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }

    async fn flush(&self) -> Result<(), Error> {
        // Nothing buffered
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceData;

    fn zone(domain: &str) -> StoredResource {
        StoredResource::new(
            "cloudns_dns_zone",
            ResourceData::new().with("domain", domain).with_id(domain),
        )
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStateStore::new();
        assert!(store.is_empty().await);

        store.set("cloudns_dns_zone.main", &zone("example.com")).await.unwrap();
        assert_eq!(store.len().await, 1);

        let retrieved = store.get("cloudns_dns_zone.main").await.unwrap().unwrap();
        assert_eq!(retrieved.data.id(), Some("example.com"));

        store.delete("cloudns_dns_zone.main").await.unwrap();
        assert!(store.is_empty().await);

        // deleting again is fine
        store.delete("cloudns_dns_zone.main").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_list_is_sorted() {
        let store = MemoryStateStore::new();
        store.set("cloudns_dns_zone.b", &zone("b.com")).await.unwrap();
        store.set("cloudns_dns_zone.a", &zone("a.com")).await.unwrap();

        assert_eq!(
            store.list().await.unwrap(),
            vec!["cloudns_dns_zone.a".to_string(), "cloudns_dns_zone.b".to_string()]
        );
    }
}
