// # DNS Zones
//
// A zone's domain is its identity and never changes after creation. Only
// slave zones carry a master IP, so that field lives on the variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Kind of zone, with the fields only that kind carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ZoneKind {
    Master,
    Slave {
        /// IP of the master server to transfer from
        master: String,
    },
    Parked,
    Geodns,
}

impl ZoneKind {
    /// Wire name of the zone type
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Master => "master",
            ZoneKind::Slave { .. } => "slave",
            ZoneKind::Parked => "parked",
            ZoneKind::Geodns => "geodns",
        }
    }

    /// Build a kind from its wire name and an optional master IP
    pub fn from_parts(zone_type: &str, master: Option<String>) -> Result<Self, Error> {
        match zone_type.trim().to_ascii_lowercase().as_str() {
            "master" => Ok(ZoneKind::Master),
            "slave" => Ok(ZoneKind::Slave {
                master: master.unwrap_or_default(),
            }),
            "parked" => Ok(ZoneKind::Parked),
            "geodns" => Ok(ZoneKind::Geodns),
            other => Err(Error::validation(format!(
                "Unsupported zone type: {:?}. Expected one of master, slave, parked, geodns",
                other
            ))),
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone name; doubles as the identity
    pub domain: String,
    pub kind: ZoneKind,
    /// Explicit nameservers; `None` lets the provider pick its defaults
    pub nameservers: Option<Vec<String>>,
}

/// Class of nameservers to request for a new zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameserverFilter {
    /// Do not constrain; the provider picks
    All,
    Free,
    Premium,
}

impl NameserverFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameserverFilter::All => "all",
            NameserverFilter::Free => "free",
            NameserverFilter::Premium => "premium",
        }
    }
}

impl FromStr for NameserverFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(NameserverFilter::All),
            "free" => Ok(NameserverFilter::Free),
            "premium" => Ok(NameserverFilter::Premium),
            other => Err(Error::validation(format!(
                "\"nameserver_type\" must be one of all, free, premium, got {}",
                other
            ))),
        }
    }
}

/// One entry of the provider's nameserver catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nameserver {
    /// Host name of the nameserver
    pub name: String,
    /// "free" or "premium"
    pub kind: String,
    #[serde(default)]
    pub ipv4: Option<String>,
    #[serde(default)]
    pub ipv6: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}
