// # Remote Zone API Trait
//
// The transport to a DNS provider's management API. Each method is one
// remote operation; the sync driver owns ordering, rate limiting and the
// interpretation of "not found".
//
// ## Implementations
//
// - ClouDNS: `zonesync-cloudns` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::RemoteZoneApi;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* RemoteZoneApi implementation */;
//
//     for record in api.list_records("example.com").await? {
//         println!("{}", record);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::model::{DynamicUrlBinding, FailoverBinding, Nameserver, Record, Zone};

/// Trait for DNS provider transports
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Errors
///
/// A transport reports the provider's own failure text unchanged (as
/// `Error::Remote`). "Not found" detection happens in one place,
/// [`crate::error::classify`], and relies on that text.
///
/// # Forbidden Capabilities
///
/// - Retrying or backing off (a failed call is returned as is)
/// - Rate limiting (owned by the sync driver)
/// - Caching responses between calls
/// - Touching the state store
#[async_trait]
pub trait RemoteZoneApi: Send + Sync {
    /// Create a record and return the provider-assigned ID
    async fn create_record(&self, record: &Record) -> Result<String, crate::Error>;

    /// List every record in a zone
    async fn list_records(&self, zone: &str) -> Result<Vec<Record>, crate::Error>;

    /// Modify a record in place; `record.id` must be set
    async fn update_record(&self, record: &Record) -> Result<(), crate::Error>;

    /// Delete a record by ID
    async fn delete_record(&self, zone: &str, record_id: &str) -> Result<(), crate::Error>;

    /// Register a zone
    async fn create_zone(&self, zone: &Zone) -> Result<(), crate::Error>;

    /// Fetch a zone's type
    ///
    /// The returned zone carries no nameservers; those are derived from the
    /// zone's NS records by the caller. A slave zone may come back with an
    /// empty master, which the caller resolves with [`read_zone_master`].
    ///
    /// [`read_zone_master`]: RemoteZoneApi::read_zone_master
    async fn read_zone(&self, domain: &str) -> Result<Zone, crate::Error>;

    /// First master server IP of a slave zone
    async fn read_zone_master(&self, domain: &str) -> Result<Option<String>, crate::Error>;

    /// Delete a zone
    async fn delete_zone(&self, domain: &str) -> Result<(), crate::Error>;

    /// The provider's nameserver catalog
    async fn list_nameservers(&self) -> Result<Vec<Nameserver>, crate::Error>;

    /// Return the record's dynamic URL, issuing one if none exists
    async fn create_or_read_dynamic_url(
        &self,
        domain: &str,
        record_id: &str,
    ) -> Result<DynamicUrlBinding, crate::Error>;

    /// Revoke a record's dynamic URL
    async fn delete_dynamic_url(&self, domain: &str, record_id: &str)
    -> Result<(), crate::Error>;

    /// Activate failover on a record
    async fn create_failover(&self, binding: &FailoverBinding) -> Result<(), crate::Error>;

    /// Fetch failover settings and health for a record
    async fn read_failover(
        &self,
        domain: &str,
        record_id: &str,
    ) -> Result<FailoverBinding, crate::Error>;

    /// Modify failover settings
    async fn update_failover(&self, binding: &FailoverBinding) -> Result<(), crate::Error>;

    /// Deactivate failover on a record
    async fn delete_failover(&self, domain: &str, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing transports from configuration
pub trait RemoteZoneApiFactory: Send + Sync {
    /// Create a RemoteZoneApi instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn RemoteZoneApi>, crate::Error>;
}
