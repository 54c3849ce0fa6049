//! Apply engine
//!
//! A thin host over the reconciliation entry points. One pass takes a
//! manifest of desired resources and brings the remote side in line with
//! it:
//!
//! ```text
//!                      ┌─────────────┐
//!         Manifest ───▶│ ApplyEngine │───▶ ApplyEvent channel
//!                      └─────────────┘
//!                             │
//!           ┌─────────────────┼──────────────┐
//!           ▼                 ▼              ▼
//! ┌──────────────────┐ ┌────────────┐ ┌────────────┐
//! │ ResourceRegistry │ │ SyncDriver │ │ StateStore │
//! │  (entry points)  │ │  (remote)  │ │ (observed) │
//! └──────────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! ## Per-resource flow
//!
//! 1. No stored state: `create`
//! 2. Stored state: `read`; if the remote object is gone, `create` again
//! 3. Compare desired against observed on the desired keys
//! 4. Changed: `update`, or `delete` + `create` when a force-new field
//!    changed or the kind cannot be updated
//! 5. Persist the observed state
//!
//! Tracked resources missing from the manifest are deleted afterwards.
//! A failure on one resource is reported and the pass moves on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::driver::SyncDriver;
use crate::error::{Error, Result};
use crate::model::{AttributeMap, AttributeValue, ResourceData};
use crate::normalize::same_set;
use crate::reconcile::{Diagnostic, Resource, ZoneResource};
use crate::registry::ResourceRegistry;
use crate::traits::state_store::{StateStore, StoredResource, address};

/// One desired resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Resource kind, e.g. `cloudns_dns_record`
    pub kind: String,
    /// Name unique within the kind
    pub name: String,
    /// Desired attributes
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl ManifestEntry {
    /// State store address of this entry
    pub fn address(&self) -> String {
        address(&self.kind, &self.name)
    }
}

/// Desired state for a whole pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse and validate a JSON manifest
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and validate a JSON manifest file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Every entry needs a kind and a name, and addresses must be unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.resources {
            if entry.kind.is_empty() || entry.name.is_empty() {
                return Err(Error::validation(
                    "Manifest entries need both a kind and a name",
                ));
            }
            if !seen.insert(entry.address()) {
                return Err(Error::validation(format!(
                    "Duplicate resource in manifest: {}",
                    entry.address()
                )));
            }
        }
        Ok(())
    }
}

/// Events emitted by the ApplyEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyEvent {
    /// Pass started
    Started { resources: usize },

    /// Resource did not exist and was created
    Created { address: String, id: String },

    /// Resource was modified in place
    Updated { address: String },

    /// Resource was deleted and created again
    Replaced { address: String, id: String },

    /// Resource already matched the manifest
    Unchanged { address: String },

    /// Resource was removed from the manifest and deleted remotely
    Deleted { address: String },

    /// Resource had disappeared remotely and was dropped from state
    Dropped { address: String },

    /// Resource could not be reconciled
    Failed { address: String, error: String },

    /// Pass finished
    Finished { summary: ApplySummary },
}

/// Counts of what one pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub unchanged: usize,
    pub deleted: usize,
    pub dropped: usize,
    pub failed: usize,
}

impl ApplySummary {
    /// Whether every resource was reconciled
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// What happened to one manifest entry
enum Action {
    Created(String),
    Updated,
    Replaced(String),
    Unchanged,
}

/// Apply engine
///
/// ## Lifecycle
///
/// 1. Create with [`ApplyEngine::new()`]
/// 2. Call [`ApplyEngine::apply()`] once per pass
/// 3. Drain the event receiver for reporting
///
/// ## Load Resistance
///
/// Events go through a bounded channel; when it is full, events are
/// dropped with a warning instead of blocking the pass.
pub struct ApplyEngine {
    registry: Arc<ResourceRegistry>,
    driver: SyncDriver,
    state_store: Arc<dyn StateStore>,
    prune: bool,
    event_tx: mpsc::Sender<ApplyEvent>,
}

impl ApplyEngine {
    /// Create a new apply engine
    ///
    /// Returns the engine and the receiver its events are sent to.
    pub fn new(
        registry: Arc<ResourceRegistry>,
        driver: SyncDriver,
        state_store: Arc<dyn StateStore>,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<ApplyEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            registry,
            driver,
            state_store,
            prune: config.prune,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run one pass over the manifest
    ///
    /// Per-resource failures are reported as `Failed` events and counted in
    /// the summary. Only a failure to flush state fails the pass itself.
    pub async fn apply(&self, manifest: &Manifest) -> Result<ApplySummary> {
        manifest.validate()?;
        self.emit_event(ApplyEvent::Started {
            resources: manifest.resources.len(),
        });

        let mut summary = ApplySummary::default();

        for entry in &manifest.resources {
            let address = entry.address();
            match self.apply_entry(entry, &address, &mut summary).await {
                Ok(Action::Created(id)) => {
                    info!("{}: created ({})", address, id);
                    summary.created += 1;
                    self.emit_event(ApplyEvent::Created { address, id });
                }
                Ok(Action::Updated) => {
                    info!("{}: updated", address);
                    summary.updated += 1;
                    self.emit_event(ApplyEvent::Updated { address });
                }
                Ok(Action::Replaced(id)) => {
                    info!("{}: replaced ({})", address, id);
                    summary.replaced += 1;
                    self.emit_event(ApplyEvent::Replaced { address, id });
                }
                Ok(Action::Unchanged) => {
                    debug!("{}: unchanged", address);
                    summary.unchanged += 1;
                    self.emit_event(ApplyEvent::Unchanged { address });
                }
                Err(diag) => self.record_failure(address, diag, &mut summary),
            }
        }

        if self.prune {
            let wanted: HashSet<String> = manifest.resources.iter().map(|e| e.address()).collect();
            self.prune_orphans(&wanted, &mut summary).await;
        }

        self.state_store.flush().await?;
        info!(
            "Apply finished: {} created, {} updated, {} replaced, {} unchanged, {} deleted, {} dropped, {} failed",
            summary.created,
            summary.updated,
            summary.replaced,
            summary.unchanged,
            summary.deleted,
            summary.dropped,
            summary.failed
        );
        self.emit_event(ApplyEvent::Finished { summary });

        Ok(summary)
    }

    async fn apply_entry(
        &self,
        entry: &ManifestEntry,
        address: &str,
        summary: &mut ApplySummary,
    ) -> std::result::Result<Action, Diagnostic> {
        let resource = self.registry.resource(&entry.kind)?;
        let desired = ResourceData::from_attributes(entry.attributes.clone());
        resource.validate(&desired)?;

        let stored = match self.state_store.get(address).await? {
            Some(stored) => stored,
            None => {
                let id = self.create(resource.as_ref(), address, &desired).await?;
                return Ok(Action::Created(id));
            }
        };

        let mut observed = stored.data;
        resource.read(&self.driver, &mut observed).await?;

        if !observed.is_tracked() {
            warn!("{}: gone remotely, dropping from state", address);
            self.state_store.delete(address).await?;
            summary.dropped += 1;
            self.emit_event(ApplyEvent::Dropped {
                address: address.to_string(),
            });
            let id = self.create(resource.as_ref(), address, &desired).await?;
            return Ok(Action::Created(id));
        }

        let changed = changed_fields(resource.as_ref(), &desired, &observed);
        if changed.is_empty() {
            self.persist(resource.as_ref(), address, observed).await?;
            return Ok(Action::Unchanged);
        }
        debug!("{}: changed fields {:?}", address, changed);

        let force_new = changed
            .iter()
            .any(|field| resource.force_new_fields().iter().any(|f| f == field));

        if force_new || !resource.supports_update() {
            resource.delete(&self.driver, &mut observed).await?;
            self.state_store.delete(address).await?;
            let id = self.create(resource.as_ref(), address, &desired).await?;
            return Ok(Action::Replaced(id));
        }

        let mut data = desired.clone();
        if let Some(id) = observed.id() {
            data.set_id(id);
        }
        resource.update(&self.driver, &mut data).await?;
        if !data.is_tracked() {
            return Err(Diagnostic::error(format!(
                "{} disappeared while being updated",
                address
            )));
        }
        self.persist(resource.as_ref(), address, data).await?;
        Ok(Action::Updated)
    }

    async fn create(
        &self,
        resource: &dyn Resource,
        address: &str,
        desired: &ResourceData,
    ) -> std::result::Result<String, Diagnostic> {
        let mut data = desired.clone();
        resource.create(&self.driver, &mut data).await?;

        let id = data.id().map(str::to_string).ok_or_else(|| {
            Diagnostic::error(format!("{} was created but could not be read back", address))
        })?;
        self.persist(resource, address, data).await?;
        Ok(id)
    }

    async fn persist(
        &self,
        resource: &dyn Resource,
        address: &str,
        data: ResourceData,
    ) -> std::result::Result<(), Diagnostic> {
        let stored = StoredResource::new(resource.kind(), data);
        self.state_store.set(address, &stored).await?;
        Ok(())
    }

    /// Delete tracked resources that are not in the manifest
    ///
    /// Zones go last so their records are removed first.
    async fn prune_orphans(&self, wanted: &HashSet<String>, summary: &mut ApplySummary) {
        let mut orphans = match self.state_store.list().await {
            Ok(addresses) => addresses
                .into_iter()
                .filter(|address| !wanted.contains(address))
                .collect::<Vec<_>>(),
            Err(e) => {
                error!("Failed to list tracked resources: {}", e);
                return;
            }
        };
        orphans.sort_by_key(|address| (address.starts_with(ZoneResource::KIND), address.clone()));

        for address in orphans {
            match self.delete_orphan(&address).await {
                Ok(()) => {
                    info!("{}: deleted", address);
                    summary.deleted += 1;
                    self.emit_event(ApplyEvent::Deleted { address });
                }
                Err(diag) => self.record_failure(address, diag, summary),
            }
        }
    }

    async fn delete_orphan(&self, address: &str) -> std::result::Result<(), Diagnostic> {
        let stored = match self.state_store.get(address).await? {
            Some(stored) => stored,
            None => return Ok(()),
        };
        let resource = self.registry.resource(&stored.kind)?;

        let mut data = stored.data;
        resource.delete(&self.driver, &mut data).await?;
        self.state_store.delete(address).await?;
        Ok(())
    }

    fn record_failure(&self, address: String, diag: Diagnostic, summary: &mut ApplySummary) {
        if diag.is_fatal() {
            error!("{}: {}", address, diag.summary);
        } else {
            warn!("{}: {}", address, diag.summary);
        }
        summary.failed += 1;
        self.emit_event(ApplyEvent::Failed {
            address,
            error: diag.summary,
        });
    }

    fn emit_event(&self, event: ApplyEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

/// Desired keys whose value differs from the observed state
fn changed_fields(
    resource: &dyn Resource,
    desired: &ResourceData,
    observed: &ResourceData,
) -> Vec<String> {
    let ignored = resource.diff_ignored_fields();
    desired
        .keys()
        .filter(|key| !ignored.iter().any(|ignored| ignored == key))
        .filter(|key| !values_match(key, desired.get(key), observed.get(key)))
        .map(str::to_string)
        .collect()
}

fn values_match(key: &str, desired: Option<&AttributeValue>, observed: Option<&AttributeValue>) -> bool {
    match (desired, observed) {
        (Some(AttributeValue::List(want)), Some(AttributeValue::List(have))) => same_set(want, have),
        (Some(AttributeValue::List(want)), None) => want.is_empty(),
        (Some(want), Some(have)) => match (render(want), render(have)) {
            (Some(want), Some(have)) if key == "type" => want.eq_ignore_ascii_case(&have),
            (want, have) => want == have,
        },
        (Some(want), None) => render(want).is_some_and(|s| s.is_empty()),
        (None, _) => true,
    }
}

fn render(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::String(s) => Some(s.clone()),
        AttributeValue::Int(i) => Some(i.to_string()),
        AttributeValue::Float(f) => Some(f.to_string()),
        AttributeValue::List(_) => None,
    }
}
