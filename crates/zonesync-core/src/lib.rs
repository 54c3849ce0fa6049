// # zonesync-core
//
// Core library for declarative DNS management against ClouDNS.
//
// ## Architecture Overview
//
// - **codec**: Translates the host's attribute bag to and from typed records,
//   zones, failover bindings and dynamic URLs
// - **normalize**: Nameserver list normalization and filter resolution
// - **driver**: Rate-limited remote calls with absence turned into `None`
// - **reconcile**: Create/read/update/delete/import entry points per kind
// - **engine**: Applies a manifest and reports what changed
// - **RemoteZoneApi**: Trait implemented by transports (see `zonesync-cloudns`)
// - **StateStore**: Observed state between passes
//
// ## Design Principles
//
// 1. **Typed at the edges**: Only the variant's own fields reach the wire
// 2. **Absence is not failure**: Missing remote objects drop out of state
// 3. **Plugin-Based**: Transports are registered, not hard-coded
// 4. **Library-First**: The daemon is a thin shell over this crate

pub mod codec;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod registry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, ProviderConfig, RateLimitConfig, StateStoreConfig, SyncConfig};
pub use driver::SyncDriver;
pub use engine::{ApplyEngine, ApplyEvent, ApplySummary, Manifest, ManifestEntry};
pub use error::{Error, Result};
pub use model::{AttributeValue, ResourceData};
pub use reconcile::{Diagnostic, Outcome, Resource, Severity};
pub use registry::ResourceRegistry;
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{RateLimiter, RemoteZoneApi, StateStore, StoredResource, TokenBucket, Unlimited};
