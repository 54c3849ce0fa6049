// # ClouDNS Transport
//
// `RemoteZoneApi` over the ClouDNS HTTP API (`https://api.cloudns.net`).
//
// - ✅ One HTTP request per trait call
// - ✅ Provider error text propagated unchanged, so "not found" is
//   classified by the core in one place
// - ✅ HTTP timeout configured (30 seconds)
// - ❌ NO retry logic (a failed call is returned as is)
// - ❌ NO rate limiting (owned by `SyncDriver`)
// - ❌ NO caching (observed state is owned by the StateStore)
//
// ## Security Requirements
//
// - The auth password NEVER appears in logs or Debug output
// - Exactly one of auth-id / sub-auth-id is sent with every request
//
// ## API Reference
//
// - https://www.cloudns.net/wiki/article/41/
// - Records: `dns/add-record.json`, `dns/records.json`, `dns/mod-record.json`,
//   `dns/delete-record.json`
// - Zones: `dns/register.json`, `dns/get-zone-info.json`, `dns/delete.json`,
//   `dns/master-servers.json`, `dns/available-name-servers.json`
// - Dynamic URL: `dns/get-dynamic-url.json`, `dns/disable-dynamic-url.json`
// - Failover: `dns/create-failover.json`, `dns/failover-settings.json`,
//   `dns/failover-modify.json`, `dns/failover-delete.json`

mod wire;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use zonesync_core::config::ProviderConfig;
use zonesync_core::model::{DynamicUrlBinding, FailoverBinding, Nameserver, Record, Zone};
use zonesync_core::registry::ResourceRegistry;
use zonesync_core::traits::{RemoteZoneApi, RemoteZoneApiFactory};
use zonesync_core::{Error, Result};

use wire::Params;

/// Provider name used in errors and the registry
pub const PROVIDER: &str = "cloudns";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Which account the password belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Main account (`auth-id`)
    User(String),
    /// Sub-user (`sub-auth-id`)
    SubUser(String),
}

impl Credential {
    fn param(&self) -> (&'static str, String) {
        match self {
            Credential::User(id) => ("auth-id", id.clone()),
            Credential::SubUser(id) => ("sub-auth-id", id.clone()),
        }
    }
}

/// ClouDNS API client
///
/// # Trust Level: Untrusted
///
/// Stateless and single-shot. Ordering, rate limiting and the meaning of
/// "not found" are owned by `SyncDriver`.
pub struct CloudnsApi {
    credential: Credential,

    /// API password
    /// ⚠️ NEVER log this value
    password: String,

    api_base: String,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for CloudnsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudnsApi")
            .field("credential", &self.credential)
            .field("password", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudnsApi {
    /// Create a client
    ///
    /// Fails if the password is empty or the HTTP client cannot be built.
    pub fn new(
        credential: Credential,
        password: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        let password = password.into();
        if password.is_empty() {
            return Err(Error::config("ClouDNS password cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credential,
            password,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/dns/{}", self.api_base, path)
    }

    fn auth_params(&self) -> Params {
        vec![
            self.credential.param(),
            ("auth-password", self.password.clone()),
        ]
    }

    /// POST one form to an endpoint and unwrap the status envelope
    async fn call(&self, path: &str, params: Params) -> Result<Value> {
        let mut form = self.auth_params();
        form.extend(params);

        tracing::trace!("POST dns/{}", path);
        let response = self
            .client
            .post(self.endpoint(path))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match status.as_u16() {
                401 | 403 => Error::remote(
                    PROVIDER,
                    format!("Authentication failed. Status: {}", status),
                ),
                429 => Error::remote(
                    PROVIDER,
                    format!("Rate limit exceeded. Status: {}", status),
                ),
                500..=599 => Error::remote(
                    PROVIDER,
                    format!("ClouDNS server error: {} - {}", status, error_text),
                ),
                _ => Error::remote(
                    PROVIDER,
                    format!("Request to dns/{} failed: {} - {}", path, status, error_text),
                ),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::remote(PROVIDER, format!("Failed to parse response: {}", e)))?;

        wire::check_status(&json)?;
        Ok(json)
    }

    fn target(domain: &str, record_id: &str) -> Params {
        vec![
            ("domain-name", domain.to_string()),
            ("record-id", record_id.to_string()),
        ]
    }
}

#[async_trait]
impl RemoteZoneApi for CloudnsApi {
    async fn create_record(&self, record: &Record) -> Result<String> {
        let mut params = wire::record_params(record);
        params.retain(|(key, _)| *key != "record-id");
        let json = self.call("add-record.json", params).await?;
        wire::parse_created_id(&json)
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<Record>> {
        let json = self
            .call("records.json", vec![("domain-name", zone.to_string())])
            .await?;
        wire::parse_records(zone, &json)
    }

    async fn update_record(&self, record: &Record) -> Result<()> {
        if record.id.is_none() {
            return Err(Error::validation("Cannot modify a record without an ID"));
        }
        self.call("mod-record.json", wire::record_params(record))
            .await
            .map(|_| ())
    }

    async fn delete_record(&self, zone: &str, record_id: &str) -> Result<()> {
        self.call("delete-record.json", Self::target(zone, record_id))
            .await
            .map(|_| ())
    }

    async fn create_zone(&self, zone: &Zone) -> Result<()> {
        self.call("register.json", wire::zone_params(zone))
            .await
            .map(|_| ())
    }

    async fn read_zone(&self, domain: &str) -> Result<Zone> {
        let info = self
            .call("get-zone-info.json", vec![("domain-name", domain.to_string())])
            .await?;
        wire::parse_zone(&info)
    }

    async fn read_zone_master(&self, domain: &str) -> Result<Option<String>> {
        let servers = self
            .call("master-servers.json", vec![("domain-name", domain.to_string())])
            .await?;
        Ok(wire::parse_master(&servers))
    }

    async fn delete_zone(&self, domain: &str) -> Result<()> {
        self.call("delete.json", vec![("domain-name", domain.to_string())])
            .await
            .map(|_| ())
    }

    async fn list_nameservers(&self) -> Result<Vec<Nameserver>> {
        let json = self.call("available-name-servers.json", Vec::new()).await?;
        wire::parse_nameservers(&json)
    }

    async fn create_or_read_dynamic_url(
        &self,
        domain: &str,
        record_id: &str,
    ) -> Result<DynamicUrlBinding> {
        let json = self
            .call("get-dynamic-url.json", Self::target(domain, record_id))
            .await?;
        wire::parse_dynamic_url(domain, record_id, &json)
    }

    async fn delete_dynamic_url(&self, domain: &str, record_id: &str) -> Result<()> {
        self.call("disable-dynamic-url.json", Self::target(domain, record_id))
            .await
            .map(|_| ())
    }

    async fn create_failover(&self, binding: &FailoverBinding) -> Result<()> {
        self.call("create-failover.json", wire::failover_params(binding))
            .await
            .map(|_| ())
    }

    async fn read_failover(&self, domain: &str, record_id: &str) -> Result<FailoverBinding> {
        let json = self
            .call("failover-settings.json", Self::target(domain, record_id))
            .await?;
        wire::parse_failover(domain, record_id, &json)
    }

    async fn update_failover(&self, binding: &FailoverBinding) -> Result<()> {
        self.call("failover-modify.json", wire::failover_params(binding))
            .await
            .map(|_| ())
    }

    async fn delete_failover(&self, domain: &str, record_id: &str) -> Result<()> {
        self.call("failover-delete.json", Self::target(domain, record_id))
            .await
            .map(|_| ())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating ClouDNS clients
pub struct CloudnsFactory;

impl RemoteZoneApiFactory for CloudnsFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn RemoteZoneApi>> {
        config.validate()?;
        match config {
            ProviderConfig::Cloudns {
                auth_id,
                sub_auth_id,
                password,
                api_base,
            } => {
                let credential = match (
                    auth_id.as_deref().filter(|s| !s.is_empty()),
                    sub_auth_id.as_deref().filter(|s| !s.is_empty()),
                ) {
                    (Some(id), None) => Credential::User(id.to_string()),
                    (None, Some(id)) => Credential::SubUser(id.to_string()),
                    _ => {
                        return Err(Error::config(
                            "ClouDNS requires exactly one of auth_id or sub_auth_id",
                        ));
                    }
                };

                Ok(Box::new(CloudnsApi::new(
                    credential,
                    password.clone(),
                    api_base.clone(),
                )?))
            }
            _ => Err(Error::config("Invalid config for ClouDNS provider")),
        }
    }
}

/// Register the ClouDNS transport with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::ResourceRegistry;
///
/// let registry = ResourceRegistry::with_builtin();
/// zonesync_cloudns::register(&registry);
/// assert!(registry.has_api("cloudns"));
/// ```
pub fn register(registry: &ResourceRegistry) {
    registry.register_api(PROVIDER, Box::new(CloudnsFactory));
}
