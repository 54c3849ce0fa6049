//! Resource and provider registry
//!
//! Maps resource kind names to their entry points, and provider names to
//! transport factories, so the apply engine never hardcodes either.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zonesync_core::registry::ResourceRegistry;
//!
//! let registry = ResourceRegistry::with_builtin();
//! zonesync_cloudns::register(&registry);
//!
//! let api = registry.create_api(&config.provider)?;
//! let record = registry.resource("cloudns_dns_record")?;
//! ```
//!
//! ## Registration
//!
//! Transport crates register their factory during initialization:
//!
//! ```rust,ignore
//! pub fn register(registry: &ResourceRegistry) {
//!     registry.register_api("cloudns", Box::new(CloudnsFactory));
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::reconcile::{
    DynamicUrlResource, FailoverResource, RecordResource, Resource, ZoneResource,
};
use crate::traits::{RemoteZoneApi, RemoteZoneApiFactory};

/// Registry of resource kinds and transport factories
///
/// Uses interior mutability with RwLock, allowing concurrent reads and
/// exclusive writes.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: RwLock<HashMap<String, Arc<dyn Resource>>>,
    apis: RwLock<HashMap<String, Box<dyn RemoteZoneApiFactory>>>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the four built-in resource kinds
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_resource(Arc::new(RecordResource));
        registry.register_resource(Arc::new(ZoneResource));
        registry.register_resource(Arc::new(FailoverResource));
        registry.register_resource(Arc::new(DynamicUrlResource));
        registry
    }

    /// Register a resource kind under its own `kind()` name
    pub fn register_resource(&self, resource: Arc<dyn Resource>) {
        let mut resources = self.resources.write().unwrap_or_else(|e| e.into_inner());
        resources.insert(resource.kind().to_string(), resource);
    }

    /// Register a transport factory
    pub fn register_api(&self, name: impl Into<String>, factory: Box<dyn RemoteZoneApiFactory>) {
        let mut apis = self.apis.write().unwrap_or_else(|e| e.into_inner());
        apis.insert(name.into(), factory);
    }

    /// Look up a resource kind
    pub fn resource(&self, kind: &str) -> Result<Arc<dyn Resource>> {
        let resources = self.resources.read().unwrap_or_else(|e| e.into_inner());
        resources
            .get(kind)
            .cloned()
            .ok_or_else(|| Error::config(format!("Unknown resource kind: {}", kind)))
    }

    /// Create a transport from configuration
    pub fn create_api(&self, config: &ProviderConfig) -> Result<Box<dyn RemoteZoneApi>> {
        let provider_type = config.type_name();
        let apis = self.apis.read().unwrap_or_else(|e| e.into_inner());

        let factory = apis
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// Registered resource kinds, sorted
    pub fn list_resources(&self) -> Vec<String> {
        let resources = self.resources.read().unwrap_or_else(|e| e.into_inner());
        let mut kinds: Vec<String> = resources.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Registered provider names
    pub fn list_apis(&self) -> Vec<String> {
        let apis = self.apis.read().unwrap_or_else(|e| e.into_inner());
        apis.keys().cloned().collect()
    }

    /// Check if a provider is registered
    pub fn has_api(&self, name: &str) -> bool {
        let apis = self.apis.read().unwrap_or_else(|e| e.into_inner());
        apis.contains_key(name)
    }
}
