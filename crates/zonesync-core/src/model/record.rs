// # DNS Records
//
// Typed record shapes. Every record carries a host, zone, TTL and value;
// everything else lives in the `RecordData` variant selected by the record
// type, so a field can only exist on the type it belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Supported record types (the `type` discriminator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Mx,
    Cname,
    Txt,
    Spf,
    Ns,
    Srv,
    Wr,
    Alias,
    Rp,
    Sshfp,
    Ptr,
    Naptr,
    Caa,
    Tlsa,
    Ds,
    Cert,
    Hinfo,
    Loc,
    Smimea,
    Openpgpkey,
}

impl RecordType {
    /// All supported types
    pub const ALL: &'static [RecordType] = &[
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Mx,
        RecordType::Cname,
        RecordType::Txt,
        RecordType::Spf,
        RecordType::Ns,
        RecordType::Srv,
        RecordType::Wr,
        RecordType::Alias,
        RecordType::Rp,
        RecordType::Sshfp,
        RecordType::Ptr,
        RecordType::Naptr,
        RecordType::Caa,
        RecordType::Tlsa,
        RecordType::Ds,
        RecordType::Cert,
        RecordType::Hinfo,
        RecordType::Loc,
        RecordType::Smimea,
        RecordType::Openpgpkey,
    ];

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Mx => "MX",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::Spf => "SPF",
            RecordType::Ns => "NS",
            RecordType::Srv => "SRV",
            RecordType::Wr => "WR",
            RecordType::Alias => "ALIAS",
            RecordType::Rp => "RP",
            RecordType::Sshfp => "SSHFP",
            RecordType::Ptr => "PTR",
            RecordType::Naptr => "NAPTR",
            RecordType::Caa => "CAA",
            RecordType::Tlsa => "TLSA",
            RecordType::Ds => "DS",
            RecordType::Cert => "CERT",
            RecordType::Hinfo => "HINFO",
            RecordType::Loc => "LOC",
            RecordType::Smimea => "SMIMEA",
            RecordType::Openpgpkey => "OPENPGPKEY",
        }
    }

    /// Type-specific attribute names (beyond name/zone/type/value/ttl)
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            RecordType::Mx => &["priority"],
            RecordType::Srv => &["priority", "weight", "port"],
            RecordType::Wr => &[
                "frame",
                "frametitle",
                "framekeywords",
                "framedescription",
                "mobilemeta",
                "savepath",
                "redirecttype",
            ],
            RecordType::Rp => &["mail", "txt"],
            RecordType::Sshfp => &["algorithm", "fptype"],
            RecordType::Naptr => &["flag", "order", "pref", "params", "regexp", "replace"],
            RecordType::Caa => &["caaflag", "caatype", "caavalue"],
            RecordType::Tlsa => &["tlsausage", "tlsaselector", "tlsamatchingtype"],
            RecordType::Smimea => &["smimeausage", "smimeaselector", "smimeamatchingtype"],
            RecordType::Ds => &["keytag", "algorithm", "digesttype"],
            RecordType::Cert => &["certtype", "certkeytag", "certalgorithm"],
            RecordType::Hinfo => &["cpu", "os"],
            RecordType::Loc => &[
                "latdeg",
                "latmin",
                "latsec",
                "latdir",
                "longdeg",
                "longmin",
                "longsec",
                "longdir",
                "altitude",
                "size",
                "hprecision",
                "vprecision",
            ],
            RecordType::A
            | RecordType::Aaaa
            | RecordType::Cname
            | RecordType::Txt
            | RecordType::Spf
            | RecordType::Ns
            | RecordType::Alias
            | RecordType::Ptr
            | RecordType::Openpgpkey => &[],
        }
    }

    /// Fields that must be present and have no safe default
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            RecordType::Mx => &["priority"],
            _ => &[],
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| Error::validation(format!("Unsupported record type: {:?}", s)))
    }
}

/// Web redirect (WR) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebRedirect {
    /// "0" or "1" to disable or enable frame
    pub frame: String,
    pub frame_title: String,
    pub frame_keywords: String,
    pub frame_description: String,
    /// Mobile responsive meta tags when framed
    pub mobile_meta: i64,
    /// 0 or 1
    pub save_path: i64,
    /// 301 or 302 when not framed
    pub redirect_type: i64,
}

impl Default for WebRedirect {
    fn default() -> Self {
        Self {
            frame: String::new(),
            frame_title: String::new(),
            frame_keywords: String::new(),
            frame_description: String::new(),
            mobile_meta: 0,
            save_path: 0,
            redirect_type: DEFAULT_REDIRECT_TYPE,
        }
    }
}

/// Default HTTP status for web redirects
pub const DEFAULT_REDIRECT_TYPE: i64 = 301;

/// Certificate association shared by TLSA and SMIMEA
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertAssociation {
    pub usage: String,
    pub selector: String,
    pub matching_type: String,
}

/// LOC record geography
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat_deg: f64,
    pub lat_min: f64,
    pub lat_sec: f64,
    /// N or S
    pub lat_dir: String,
    pub long_deg: f64,
    pub long_min: f64,
    pub long_sec: f64,
    /// W or E
    pub long_dir: String,
    pub altitude: String,
    pub size: String,
    pub h_precision: String,
    pub v_precision: String,
}

/// Type-specific record payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecordData {
    /// Types carrying nothing beyond value and TTL
    Simple { rtype: RecordType },
    Mx { priority: u16 },
    Srv { priority: u16, weight: u16, port: u16 },
    Wr(WebRedirect),
    Rp { mail: String, txt: String },
    Sshfp { algorithm: i64, fptype: i64 },
    Naptr {
        flag: String,
        order: String,
        pref: String,
        params: String,
        regexp: String,
        replace: String,
    },
    Caa { flag: String, tag: String, value: String },
    Tlsa(CertAssociation),
    Smimea(CertAssociation),
    Ds { keytag: i64, algorithm: i64, digest_type: i64 },
    Cert { cert_type: i64, key_tag: i64, algorithm: i64 },
    Hinfo { cpu: String, os: String },
    Loc(Location),
}

impl RecordData {
    /// The discriminator this payload belongs to
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::Simple { rtype } => *rtype,
            RecordData::Mx { .. } => RecordType::Mx,
            RecordData::Srv { .. } => RecordType::Srv,
            RecordData::Wr(_) => RecordType::Wr,
            RecordData::Rp { .. } => RecordType::Rp,
            RecordData::Sshfp { .. } => RecordType::Sshfp,
            RecordData::Naptr { .. } => RecordType::Naptr,
            RecordData::Caa { .. } => RecordType::Caa,
            RecordData::Tlsa(_) => RecordType::Tlsa,
            RecordData::Smimea(_) => RecordType::Smimea,
            RecordData::Ds { .. } => RecordType::Ds,
            RecordData::Cert { .. } => RecordType::Cert,
            RecordData::Hinfo { .. } => RecordType::Hinfo,
            RecordData::Loc(_) => RecordType::Loc,
        }
    }
}

/// Optional GeoDNS placement. `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoDns {
    pub location: Option<String>,
    pub code: Option<String>,
}

impl GeoDns {
    /// Whether either GeoDNS field was supplied
    pub fn is_set(&self) -> bool {
        self.location.is_some() || self.code.is_some()
    }
}

/// A DNS record as sent to or returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Provider-assigned identity
    pub id: Option<String>,
    /// Host part of the record (empty for the zone apex)
    pub host: String,
    /// Zone the record lives in
    pub zone: String,
    pub ttl: u32,
    pub value: String,
    pub geodns: GeoDns,
    pub data: RecordData,
}

impl Record {
    /// The record's type
    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Fully-qualified name, used in log lines
    pub fn fqdn(&self) -> String {
        if self.host.is_empty() {
            self.zone.clone()
        } else {
            format!("{}.{}", self.host, self.zone)
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} in {} {}",
            self.fqdn(),
            self.ttl,
            self.record_type(),
            self.value
        )
    }
}
