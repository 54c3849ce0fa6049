// # State Store Trait
//
// Persists what the apply engine last observed for each managed resource,
// so the next pass can read, diff and delete instead of re-creating.
//
// ## Implementations
//
// - `MemoryStateStore`: no persistence, for tests and dry runs
// - `FileStateStore`: JSON file with atomic writes and backup recovery
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::{StateStore, StoredResource};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* StateStore implementation */;
//
//     if let Some(stored) = store.get("cloudns_dns_record.www").await? {
//         println!("tracked as {:?}", stored.data.id());
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::ResourceData;

/// Observed state of one managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResource {
    /// Resource kind, e.g. `cloudns_dns_record`
    pub kind: String,
    /// Identity plus last observed attributes
    pub data: ResourceData,
    /// When the resource was last created, read or updated
    pub last_synced: chrono::DateTime<chrono::Utc>,
}

impl StoredResource {
    /// Stamp a freshly synced resource
    pub fn new(kind: impl Into<String>, data: ResourceData) -> Self {
        Self {
            kind: kind.into(),
            data,
            last_synced: chrono::Utc::now(),
        }
    }
}

/// Address of a resource in the store: `<kind>.<name>`
pub fn address(kind: &str, name: &str) -> String {
    format!("{}.{}", kind, name)
}

/// Trait for state store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Forbidden Capabilities
///
/// - Calling the remote API
/// - Deciding whether a resource needs to change (owned by `ApplyEngine`)
/// - Spawning background tasks; periodic flushing belongs to the caller
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get a stored resource by address
    ///
    /// - `Ok(Some(_))`: tracked
    /// - `Ok(None)`: not tracked
    async fn get(&self, address: &str) -> Result<Option<StoredResource>, crate::Error>;

    /// Create or replace a stored resource
    async fn set(&self, address: &str, resource: &StoredResource) -> Result<(), crate::Error>;

    /// Stop tracking a resource (no-op when not tracked)
    async fn delete(&self, address: &str) -> Result<(), crate::Error>;

    /// Addresses of every tracked resource
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address() {
        assert_eq!(address("cloudns_dns_zone", "main"), "cloudns_dns_zone.main");
    }
}
