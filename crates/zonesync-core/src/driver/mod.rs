// # Remote Sync Driver
//
// Wraps a `RemoteZoneApi` with the two rules every reconciliation relies
// on:
//
// - every remote call first takes a token from the shared rate limiter
// - "not found" is absence, not failure: lookups return `Ok(None)` and
//   deletes of missing objects succeed
//
// The driver never retries. A failed call is returned to the caller as is.

use std::sync::Arc;

use crate::error::{Classification, Error, Result, classify};
use crate::model::{
    DynamicUrlBinding, FailoverBinding, Nameserver, Record, RecordType, Zone, ZoneKind,
};
use crate::normalize::normalize;
use crate::traits::{RateLimiter, RemoteZoneApi};

/// Rate-limited, absence-aware access to a remote zone API
#[derive(Clone)]
pub struct SyncDriver {
    api: Arc<dyn RemoteZoneApi>,
    limiter: Arc<dyn RateLimiter>,
}

impl std::fmt::Debug for SyncDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncDriver")
            .field("provider", &self.api.provider_name())
            .finish()
    }
}

/// Turn an absence-classified error into `None`
fn absent_as_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => match classify(&err) {
            Classification::Absence => {
                tracing::debug!("Remote reported absence: {}", err);
                Ok(None)
            }
            Classification::Fatal => Err(err),
        },
    }
}

/// Turn an absence-classified error into success
fn absent_as_ok(result: Result<()>) -> Result<()> {
    absent_as_none(result).map(|_| ())
}

impl SyncDriver {
    /// Create a driver over a transport and a shared limiter
    pub fn new(api: Arc<dyn RemoteZoneApi>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { api, limiter }
    }

    /// Provider name of the underlying transport
    pub fn provider_name(&self) -> &'static str {
        self.api.provider_name()
    }

    async fn admit(&self) {
        self.limiter.take().await;
    }

    // ---- records ----

    /// Create a record and return its new identity
    pub async fn create_record(&self, record: &Record) -> Result<String> {
        self.admit().await;
        tracing::debug!("CREATE {}", record);
        let id = self.api.create_record(record).await?;
        if id.is_empty() {
            return Err(Error::remote(
                self.provider_name(),
                format!("no identity returned for created record {}", record.fqdn()),
            ));
        }
        Ok(id)
    }

    /// Look a record up by identity within its zone
    ///
    /// Lists the zone and scans for a match. A missing zone and a missing
    /// record both yield `Ok(None)`.
    pub async fn find_record(&self, zone: &str, record_id: &str) -> Result<Option<Record>> {
        self.admit().await;
        tracing::debug!("READ record {} in {}", record_id, zone);
        let records = match absent_as_none(self.api.list_records(zone).await)? {
            Some(records) => records,
            None => return Ok(None),
        };

        Ok(records
            .into_iter()
            .find(|record| record.id.as_deref() == Some(record_id)))
    }

    /// Modify a record in place
    pub async fn update_record(&self, record: &Record) -> Result<()> {
        self.admit().await;
        tracing::debug!("UPDATE {}", record);
        self.api.update_record(record).await
    }

    /// Delete a record; a record that is already gone is not an error
    pub async fn delete_record(&self, zone: &str, record_id: &str) -> Result<()> {
        self.admit().await;
        tracing::debug!("DELETE record {} in {}", record_id, zone);
        absent_as_ok(self.api.delete_record(zone, record_id).await)
    }

    // ---- zones ----

    /// Register a zone
    pub async fn create_zone(&self, zone: &Zone) -> Result<()> {
        self.admit().await;
        match &zone.nameservers {
            Some(ns) => tracing::debug!(
                "CREATE DNS zone: {}, type: {}, ns: {}",
                zone.domain,
                zone.kind,
                ns.join(", ")
            ),
            None => tracing::debug!("CREATE DNS zone: {}, type: {}", zone.domain, zone.kind),
        }
        self.api.create_zone(zone).await
    }

    /// Look a zone up by domain
    ///
    /// An empty domain in the response counts as absence. A slave zone's
    /// master is fetched with a separate call. Nameservers are taken from
    /// the zone's NS records and normalized; if those cannot be listed the
    /// zone is returned without them.
    pub async fn find_zone(&self, domain: &str) -> Result<Option<Zone>> {
        self.admit().await;
        tracing::debug!("READ DNS zone: {}", domain);
        let mut zone = match absent_as_none(self.api.read_zone(domain).await)? {
            Some(zone) if !zone.domain.is_empty() => zone,
            Some(_) => {
                tracing::warn!("Received unexpected empty response for DNS zone: {}", domain);
                return Ok(None);
            }
            None => return Ok(None),
        };

        if let ZoneKind::Slave { master } = &mut zone.kind
            && master.is_empty()
        {
            self.admit().await;
            tracing::debug!("READ DNS zone master: {}", domain);
            match absent_as_none(self.api.read_zone_master(domain).await)? {
                Some(Some(ip)) => *master = ip,
                Some(None) => {}
                None => return Ok(None),
            }
        }

        self.admit().await;
        match self.api.list_records(domain).await {
            Ok(records) => {
                let ns: Vec<&str> = records
                    .iter()
                    .filter(|record| record.record_type() == RecordType::Ns)
                    .map(|record| record.value.as_str())
                    .collect();
                if !ns.is_empty() {
                    zone.nameservers = Some(normalize(&ns));
                }
            }
            Err(err) => {
                tracing::debug!("Could not list NS records of {}: {}", domain, err);
            }
        }

        Ok(Some(zone))
    }

    /// Delete a zone; a zone that is already gone is not an error
    pub async fn delete_zone(&self, domain: &str) -> Result<()> {
        self.admit().await;
        tracing::debug!("DELETE DNS zone: {}", domain);
        absent_as_ok(self.api.delete_zone(domain).await)
    }

    /// Fetch the provider's nameserver catalog
    pub async fn nameserver_catalog(&self) -> Result<Vec<Nameserver>> {
        self.admit().await;
        tracing::debug!("LIST nameservers");
        self.api.list_nameservers().await
    }

    // ---- dynamic URLs ----

    /// Get the record's dynamic URL, issuing one if needed
    ///
    /// `Ok(None)` when the record (or its zone) does not exist.
    pub async fn dynamic_url(
        &self,
        domain: &str,
        record_id: &str,
    ) -> Result<Option<DynamicUrlBinding>> {
        self.admit().await;
        tracing::debug!("READ dynamic URL {}@{}", record_id, domain);
        absent_as_none(self.api.create_or_read_dynamic_url(domain, record_id).await)
    }

    /// Revoke a dynamic URL; one that is already gone is not an error
    pub async fn delete_dynamic_url(&self, domain: &str, record_id: &str) -> Result<()> {
        self.admit().await;
        tracing::debug!("DELETE dynamic URL {}@{}", record_id, domain);
        absent_as_ok(self.api.delete_dynamic_url(domain, record_id).await)
    }

    // ---- failover ----

    /// Activate failover on a record
    pub async fn create_failover(&self, binding: &FailoverBinding) -> Result<()> {
        self.admit().await;
        tracing::debug!(
            "CREATE failover {} checktype {}",
            binding.locator(),
            binding.check.code()
        );
        self.api.create_failover(binding).await
    }

    /// Look a failover binding up by record
    pub async fn find_failover(
        &self,
        domain: &str,
        record_id: &str,
    ) -> Result<Option<FailoverBinding>> {
        self.admit().await;
        tracing::debug!("READ failover {}@{}", record_id, domain);
        absent_as_none(self.api.read_failover(domain, record_id).await)
    }

    /// Modify failover settings
    pub async fn update_failover(&self, binding: &FailoverBinding) -> Result<()> {
        self.admit().await;
        tracing::debug!(
            "UPDATE failover {} checktype {}",
            binding.locator(),
            binding.check.code()
        );
        self.api.update_failover(binding).await
    }

    /// Deactivate failover; one that is already gone is not an error
    pub async fn delete_failover(&self, domain: &str, record_id: &str) -> Result<()> {
        self.admit().await;
        tracing::debug!("DELETE failover {}@{}", record_id, domain);
        absent_as_ok(self.api.delete_failover(domain, record_id).await)
    }
}
