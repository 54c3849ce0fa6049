//! Typed DNS objects and the host-side attribute bag
//!
//! - [`ResourceData`]: desired/observed attribute bag plus identity
//! - [`Record`], [`Zone`], [`FailoverBinding`], [`DynamicUrlBinding`]:
//!   the shapes exchanged with the remote API

pub mod dynamic_url;
pub mod failover;
pub mod record;
pub mod resource;
pub mod zone;

pub use dynamic_url::DynamicUrlBinding;
pub use failover::{CheckSettings, FailoverBinding, FailoverHealth, HttpCheck};
pub use record::{CertAssociation, GeoDns, Location, Record, RecordData, RecordType, WebRedirect};
pub use resource::{AttributeMap, AttributeValue, ResourceData};
pub use zone::{Nameserver, NameserverFilter, Zone, ZoneKind};
