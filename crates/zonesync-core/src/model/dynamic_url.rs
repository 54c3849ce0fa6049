// # Dynamic URL Bindings
//
// A provider-issued update URL attached to an A/AAAA record. The URL is
// always issued by the provider and never supplied by the caller.

use serde::{Deserialize, Serialize};

/// Dynamic-update URL bound to a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicUrlBinding {
    pub domain: String,
    /// Identity: the bound record's ID
    pub record_id: String,
    /// Provider-issued URL, `None` until read back
    pub url: Option<String>,
}

impl DynamicUrlBinding {
    pub fn new(domain: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record_id: record_id.into(),
            url: None,
        }
    }

    /// Log-friendly identity
    pub fn locator(&self) -> String {
        format!("{}@{}", self.record_id, self.domain)
    }
}
