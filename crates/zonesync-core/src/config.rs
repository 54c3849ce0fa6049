//! Configuration types
//!
//! Everything the daemon needs to build a driver, a state store and an
//! apply engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default ClouDNS API endpoint
pub const DEFAULT_CLOUDNS_API_BASE: &str = "https://api.cloudns.net";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Remote provider configuration
    pub provider: ProviderConfig,

    /// State store configuration
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// Remote call rate limit
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Path to the JSON manifest of desired resources
    pub manifest_path: String,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.manifest_path.is_empty() {
            return Err(crate::Error::config("No manifest configured"));
        }

        self.provider.validate()?;
        self.state_store.validate()?;
        self.rate_limit.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// Remote provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// ClouDNS HTTP API
    Cloudns {
        /// Main account user ID; exclusive with `sub_auth_id`
        #[serde(default)]
        auth_id: Option<String>,
        /// Sub-user ID; exclusive with `auth_id`
        #[serde(default)]
        sub_auth_id: Option<String>,
        /// API password
        password: String,
        /// API endpoint
        #[serde(default = "default_api_base")]
        api_base: String,
    },

    /// Custom transport
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudns {
                auth_id,
                sub_auth_id,
                password,
                api_base,
            } => {
                let auth_id = auth_id.as_deref().filter(|s| !s.is_empty());
                let sub_auth_id = sub_auth_id.as_deref().filter(|s| !s.is_empty());
                match (auth_id, sub_auth_id) {
                    (Some(_), Some(_)) => {
                        return Err(crate::Error::config(
                            "ClouDNS auth_id and sub_auth_id are mutually exclusive",
                        ));
                    }
                    (None, None) => {
                        return Err(crate::Error::config(
                            "ClouDNS requires either auth_id or sub_auth_id",
                        ));
                    }
                    _ => {}
                }
                if password.is_empty() {
                    return Err(crate::Error::config("ClouDNS password cannot be empty"));
                }
                if api_base.is_empty() {
                    return Err(crate::Error::config("ClouDNS API base cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudns { .. } => "cloudns",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Credentials never reach logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Cloudns {
                auth_id,
                sub_auth_id,
                api_base,
                ..
            } => f
                .debug_struct("Cloudns")
                .field("auth_id", auth_id)
                .field("sub_auth_id", sub_auth_id)
                .field("password", &"<redacted>")
                .field("api_base", api_base)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", &"<redacted>")
                .finish(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_CLOUDNS_API_BASE.to_string()
}

/// State store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based state store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent)
    #[default]
    Memory,
}

impl StateStoreConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StateStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("State file path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

/// Remote call rate limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sustained remote calls per second
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Calls allowed back to back before throttling starts
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.requests_per_second == 0 {
            return Err(crate::Error::config("Rate limit must be > 0"));
        }
        if self.burst == 0 {
            return Err(crate::Error::config("Rate limit burst must be > 0"));
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    1
}

/// Apply engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the apply event channel
    ///
    /// When full, further events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Delete tracked resources that are no longer in the manifest
    #[serde(default = "default_prune")]
    pub prune: bool,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            prune: default_prune(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_prune() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloudns(auth_id: Option<&str>, sub_auth_id: Option<&str>) -> ProviderConfig {
        ProviderConfig::Cloudns {
            auth_id: auth_id.map(str::to_string),
            sub_auth_id: sub_auth_id.map(str::to_string),
            password: "secret".to_string(),
            api_base: default_api_base(),
        }
    }

    #[test]
    fn test_exactly_one_auth_id() {
        assert!(cloudns(Some("1234"), None).validate().is_ok());
        assert!(cloudns(None, Some("5678")).validate().is_ok());
        assert!(cloudns(Some("1234"), Some("5678")).validate().is_err());
        assert!(cloudns(None, None).validate().is_err());
        assert!(cloudns(Some(""), None).validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", cloudns(Some("1234"), None));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_defaults_from_json() {
        let config: SyncConfig = serde_json::from_value(serde_json::json!({
            "provider": { "type": "cloudns", "auth_id": "1234", "password": "pw" },
            "manifest_path": "zones.json"
        }))
        .unwrap();

        assert_eq!(config.rate_limit.requests_per_second, 10);
        assert_eq!(config.rate_limit.burst, 1);
        assert!(matches!(config.state_store, StateStoreConfig::Memory));
        assert!(config.engine.prune);
        assert_eq!(config.provider.type_name(), "cloudns");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rate_limit_validation() {
        let config = RateLimitConfig {
            requests_per_second: 0,
            burst: 1,
        };
        assert!(config.validate().is_err());
    }
}
