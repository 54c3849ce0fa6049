// # State Store Implementations
//
// Implementations of the StateStore trait for different persistence
// strategies.

pub mod file;
pub mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use std::sync::Arc;

use crate::config::StateStoreConfig;
use crate::traits::StateStore;

/// Build the state store selected by configuration
pub async fn from_config(config: &StateStoreConfig) -> Result<Arc<dyn StateStore>, crate::Error> {
    match config {
        StateStoreConfig::Memory => Ok(Arc::new(MemoryStateStore::new())),
        StateStoreConfig::File { path } => Ok(Arc::new(FileStateStore::new(path).await?)),
    }
}
