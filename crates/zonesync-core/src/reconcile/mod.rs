//! Reconciliation entry points
//!
//! One [`Resource`] implementation per managed kind. Every kind follows the
//! same lifecycle:
//!
//! ```text
//! absent -> created -> synced <-> updated -> deleted -> absent
//! ```
//!
//! - `create` encodes, calls the driver, then re-reads with the new identity
//! - `read` clears the identity when the remote object is gone
//! - `update` encodes the full desired state, then re-reads
//! - `delete` calls the driver, then re-reads to confirm absence
//! - `import` resolves a locator and fails hard if nothing matches
//!
//! Observed state is written back into the same [`ResourceData`] the
//! desired state came in.

pub mod dynamic_url;
pub mod failover;
pub mod record;
pub mod zone;

pub use dynamic_url::DynamicUrlResource;
pub use failover::FailoverResource;
pub use record::RecordResource;
pub use zone::ZoneResource;

use async_trait::async_trait;
use std::fmt;

use crate::driver::SyncDriver;
use crate::error::Error;
use crate::model::ResourceData;

/// How the host should treat a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recoverable: keep going
    Warning,
    /// Fatal: stop working on this resource
    Error,
}

/// Human-readable outcome of a failed entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
}

impl Diagnostic {
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
        }
    }

    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
        }
    }

    pub fn fatal(err: &Error) -> Self {
        Self::error(err.to_string())
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }
}

// Absence never leaves the driver as an error, so anything that reaches an
// entry point is fatal, whatever its text says.
impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        Self::fatal(&err)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.summary),
            Severity::Error => write!(f, "error: {}", self.summary),
        }
    }
}

/// Outcome of an entry point
pub type Outcome<T = ()> = std::result::Result<T, Diagnostic>;

/// Reconciliation entry points for one resource kind
///
/// Implementations hold no state; everything they touch comes in through
/// the driver and the resource data.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Kind name, e.g. `cloudns_dns_record`
    fn kind(&self) -> &'static str;

    /// Attributes whose change requires delete-then-create
    fn force_new_fields(&self) -> &'static [&'static str];

    /// Attributes never compared against observed state
    ///
    /// Input-only directives and provider-owned fields.
    fn diff_ignored_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the kind can be modified in place at all
    fn supports_update(&self) -> bool {
        true
    }

    /// Pre-flight check; makes no remote calls
    fn validate(&self, desired: &ResourceData) -> Outcome;

    async fn create(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome;

    async fn read(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome;

    async fn update(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome;

    async fn delete(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome;

    /// Resolve an existing remote object from a locator
    async fn import(&self, driver: &SyncDriver, locator: &str) -> Outcome<ResourceData>;
}

/// Shared tail of every delete: the confirmatory read must observe absence
pub(crate) async fn confirm_deleted<R: Resource + ?Sized>(
    resource: &R,
    driver: &SyncDriver,
    data: &mut ResourceData,
) -> Outcome {
    resource.read(driver, data).await?;
    match data.id() {
        None => Ok(()),
        Some(id) => Err(Diagnostic::error(format!(
            "{} {} still exists after delete",
            resource.kind(),
            id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_from_error() {
        let diag = Diagnostic::from(Error::remote("cloudns", "Zone is locked"));
        assert!(diag.is_fatal());
        assert_eq!(diag.summary, "Remote error (cloudns): Zone is locked");

        // not-found text is only absence inside the driver
        let diag = Diagnostic::from(Error::remote("cloudns", "Record not found"));
        assert_eq!(diag.severity, Severity::Error);

        let diag = Diagnostic::warning("zone already gone");
        assert!(!diag.is_fatal());
        assert_eq!(diag.to_string(), "warning: zone already gone");
    }

    #[test]
    fn test_fatal_from_not_found() {
        let diag = Diagnostic::fatal(&Error::not_found("Record not found: \"123\""));
        assert!(diag.is_fatal());
        assert_eq!(diag.to_string(), "error: Record not found: \"123\"");
    }
}
