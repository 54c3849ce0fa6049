// # Zone Codec
//
// A zone's nameservers can be requested three ways: not at all (provider
// default), as an explicit list, or as a catalog class via
// `nameserver_type`. The explicit list and the class are mutually
// exclusive.

use super::required_str;
use crate::error::{Error, Result};
use crate::model::{NameserverFilter, ResourceData, Zone, ZoneKind};
use crate::normalize::normalize;

/// How the desired state asks for nameservers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameserverSelection {
    /// Nothing requested; provider defaults apply
    Default,
    /// Explicit list, already normalized
    Explicit(Vec<String>),
    /// Class to resolve against the provider catalog
    Filter(NameserverFilter),
}

/// Pre-flight check of a zone's desired state
pub fn validate(data: &ResourceData) -> Result<()> {
    required_str(data, "domain")?;
    ZoneKind::from_parts(&required_str(data, "type")?, None)?;
    nameserver_selection(data)?;
    Ok(())
}

/// Work out which nameserver source the desired state uses
pub fn nameserver_selection(data: &ResourceData) -> Result<NameserverSelection> {
    let explicit = match data.get("nameservers") {
        Some(_) => Some(data.get_list("nameservers").ok_or_else(|| {
            Error::validation("\"nameservers\" must be a list of host names")
        })?),
        None => None,
    };
    let filter = data.get_str("nameserver_type");

    match (explicit, filter) {
        (Some(list), Some(_)) if !list.is_empty() => Err(Error::validation(
            "\"nameservers\" conflicts with \"nameserver_type\"",
        )),
        (_, Some(filter)) => Ok(NameserverSelection::Filter(filter.parse()?)),
        (Some(list), None) if !list.is_empty() => {
            Ok(NameserverSelection::Explicit(normalize(list)))
        }
        _ => Ok(NameserverSelection::Default),
    }
}

/// Build a `Zone` from desired state
///
/// A `nameserver_type` selection is left unresolved (`nameservers: None`);
/// the entry point resolves it against the catalog before sending.
pub fn encode(data: &ResourceData) -> Result<Zone> {
    let domain = required_str(data, "domain")?;
    let master = data.get_str("master").filter(|m| !m.is_empty());
    let kind = ZoneKind::from_parts(&required_str(data, "type")?, master)?;

    let nameservers = match nameserver_selection(data)? {
        NameserverSelection::Explicit(list) => Some(list),
        NameserverSelection::Default | NameserverSelection::Filter(_) => None,
    };

    Ok(Zone {
        domain,
        kind,
        nameservers,
    })
}

/// Domain of a zone's desired or stored state
pub fn encode_identity(data: &ResourceData) -> Result<String> {
    match data.id() {
        Some(id) => Ok(id.to_string()),
        None => required_str(data, "domain"),
    }
}

/// Write a zone's observed state into the host's attribute bag
///
/// `master` is written only for a slave zone with a known master; the
/// nameserver list is written normalized.
pub fn decode(zone: &Zone, data: &mut ResourceData) {
    data.set("domain", zone.domain.as_str());
    data.set("type", zone.kind.as_str());

    if let ZoneKind::Slave { master } = &zone.kind {
        if !master.is_empty() {
            data.set("master", master.as_str());
        }
    }

    if let Some(nameservers) = &zone.nameservers {
        data.set("nameservers", normalize(nameservers));
    }
}
