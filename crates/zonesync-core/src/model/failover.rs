// # Failover Bindings
//
// A failover monitor attached to an existing record. The `checktype` code
// selects which check settings apply; health fields are owned by the
// provider and only ever observed.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default event handler setting ("0" = disabled)
pub const DEFAULT_EVENT_HANDLER: &str = "0";

/// Default check region when none is configured or reported
pub const DEFAULT_CHECK_REGION: &str = "global";

/// Default ping timeout in seconds
pub const DEFAULT_PING_TIMEOUT: &str = "2";

/// Default HTTP request method for HTTP-style checks
pub const DEFAULT_HTTP_REQUEST_TYPE: &str = "GET";

/// Status reported before the provider has evaluated the monitor
pub const DEFAULT_STATUS: &str = "-1";

/// Maximum number of backup IPs
pub const MAX_BACKUP_IPS: usize = 5;

/// HTTP-style check parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpCheck {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub http_request_type: String,
}

/// Monitoring check, by check type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckSettings {
    /// checktype 1
    Ping { latency_limit: String, timeout: String },
    /// checktype 2
    Dns {
        host: String,
        query_type: String,
        query_response: String,
    },
    /// checktype 3
    Tcp { host: String, port: u16 },
    /// checktype 4
    Http(HttpCheck),
    /// checktype 5
    Https(HttpCheck),
    /// checktype 6
    CustomHttp { http: HttpCheck, content: String },
    /// checktype 7
    CustomHttps { http: HttpCheck, content: String },
    /// checktype 8
    Heartbeat,
}

impl CheckSettings {
    /// Provider check type code
    pub fn code(&self) -> u8 {
        match self {
            CheckSettings::Ping { .. } => 1,
            CheckSettings::Dns { .. } => 2,
            CheckSettings::Tcp { .. } => 3,
            CheckSettings::Http(_) => 4,
            CheckSettings::Https(_) => 5,
            CheckSettings::CustomHttp { .. } => 6,
            CheckSettings::CustomHttps { .. } => 7,
            CheckSettings::Heartbeat => 8,
        }
    }

    /// Attribute names meaningful for a check type code
    pub fn fields_for(code: u8) -> Result<&'static [&'static str], Error> {
        match code {
            1 => Ok(&["latencylimit", "timeout"]),
            2 => Ok(&["host", "querytype", "queryresponse"]),
            3 => Ok(&["host", "port"]),
            4 | 5 => Ok(&["host", "port", "path", "httprequesttype"]),
            6 | 7 => Ok(&["host", "port", "path", "content", "httprequesttype"]),
            8 => Ok(&[]),
            other => Err(Error::validation(format!(
                "Unsupported failover check type: {}",
                other
            ))),
        }
    }

    /// Port used when an HTTP-style check has none configured
    pub fn default_port(code: u8) -> Option<u16> {
        match code {
            4 | 6 => Some(80),
            5 | 7 => Some(443),
            _ => None,
        }
    }

    /// HTTP parameters, for the check types that have them
    pub fn http(&self) -> Option<&HttpCheck> {
        match self {
            CheckSettings::Http(http) | CheckSettings::Https(http) => Some(http),
            CheckSettings::CustomHttp { http, .. } | CheckSettings::CustomHttps { http, .. } => {
                Some(http)
            }
            _ => None,
        }
    }
}

/// Provider-owned health of a monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailoverHealth {
    pub state: String,
    pub status: String,
}

impl Default for FailoverHealth {
    fn default() -> Self {
        Self {
            state: String::new(),
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

/// A failover monitor bound to a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailoverBinding {
    pub domain: String,
    /// Identity: the monitored record's ID
    pub record_id: String,
    pub check: CheckSettings,
    pub main_ip: String,
    /// Backup IPs by position; empty string means unset
    pub backup_ips: [String; MAX_BACKUP_IPS],
    pub monitoring_region: String,
    pub check_period: String,
    pub notification_mail: String,
    pub down_event_handler: String,
    pub up_event_handler: String,
    pub check_region: String,
    /// Observed only; never sent on create or update
    pub health: Option<FailoverHealth>,
}

impl FailoverBinding {
    /// Log-friendly identity
    pub fn locator(&self) -> String {
        format!("{}@{}", self.record_id, self.domain)
    }
}
