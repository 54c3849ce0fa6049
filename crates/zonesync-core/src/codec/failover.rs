// # Failover Codec
//
// `checktype` selects the `CheckSettings` variant. Health (`state`,
// `status`) is provider-owned: it is decoded from observations and never
// read from desired state.

use super::{non_empty_or, required_str};
use crate::error::{Error, Result};
use crate::model::failover::{
    DEFAULT_CHECK_REGION, DEFAULT_EVENT_HANDLER, DEFAULT_HTTP_REQUEST_TYPE, DEFAULT_PING_TIMEOUT,
    DEFAULT_STATUS, MAX_BACKUP_IPS,
};
use crate::model::{CheckSettings, FailoverBinding, HttpCheck, ResourceData};

/// Attribute names of the backup IP slots, by position
pub const BACKUP_IP_KEYS: [&str; MAX_BACKUP_IPS] =
    ["backupip1", "backupip2", "backupip3", "backupip4", "backupip5"];

/// Resolve the `checktype` discriminator
pub fn check_type(data: &ResourceData) -> Result<u8> {
    let raw = required_str(data, "checktype")?;
    let code: u8 = raw
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("Unsupported failover check type: {}", raw)))?;
    CheckSettings::fields_for(code)?;
    Ok(code)
}

/// Pre-flight check of a failover's desired state
pub fn validate(data: &ResourceData) -> Result<()> {
    required_str(data, "domain")?;
    required_str(data, "recordid")?;
    required_str(data, "mainip")?;
    let code = check_type(data)?;
    encode_check(code, data)?;
    Ok(())
}

fn port(data: &ResourceData, code: u8) -> Result<u16> {
    let fallback = CheckSettings::default_port(code).unwrap_or(0);
    match data.get_str("port") {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| Error::validation(format!("Attribute \"port\" is not a valid port: {}", raw))),
        _ => Ok(fallback),
    }
}

fn http_check(code: u8, data: &ResourceData) -> Result<HttpCheck> {
    Ok(HttpCheck {
        host: data.get_str_or_default("host"),
        port: port(data, code)?,
        path: data.get_str_or_default("path"),
        http_request_type: non_empty_or(data, "httprequesttype", DEFAULT_HTTP_REQUEST_TYPE),
    })
}

fn encode_check(code: u8, data: &ResourceData) -> Result<CheckSettings> {
    let check = match code {
        1 => CheckSettings::Ping {
            latency_limit: data.get_str_or_default("latencylimit"),
            timeout: non_empty_or(data, "timeout", DEFAULT_PING_TIMEOUT),
        },
        2 => CheckSettings::Dns {
            host: data.get_str_or_default("host"),
            query_type: data.get_str_or_default("querytype"),
            query_response: data.get_str_or_default("queryresponse"),
        },
        3 => CheckSettings::Tcp {
            host: data.get_str_or_default("host"),
            port: port(data, code)?,
        },
        4 => CheckSettings::Http(http_check(code, data)?),
        5 => CheckSettings::Https(http_check(code, data)?),
        6 => CheckSettings::CustomHttp {
            http: http_check(code, data)?,
            content: data.get_str_or_default("content"),
        },
        7 => CheckSettings::CustomHttps {
            http: http_check(code, data)?,
            content: data.get_str_or_default("content"),
        },
        8 => CheckSettings::Heartbeat,
        other => {
            return Err(Error::validation(format!(
                "Unsupported failover check type: {}",
                other
            )));
        }
    };
    Ok(check)
}

/// Build a `FailoverBinding` from desired state
pub fn encode(data: &ResourceData) -> Result<FailoverBinding> {
    let code = check_type(data)?;

    let mut backup_ips: [String; MAX_BACKUP_IPS] = Default::default();
    for (slot, key) in backup_ips.iter_mut().zip(BACKUP_IP_KEYS) {
        *slot = data.get_str_or_default(key);
    }

    Ok(FailoverBinding {
        domain: required_str(data, "domain")?,
        record_id: required_str(data, "recordid")?,
        check: encode_check(code, data)?,
        main_ip: required_str(data, "mainip")?,
        backup_ips,
        monitoring_region: data.get_str_or_default("monitoringregion"),
        check_period: data.get_str_or_default("checkperiod"),
        notification_mail: data.get_str_or_default("notificationmail"),
        down_event_handler: non_empty_or(data, "downeventhandler", DEFAULT_EVENT_HANDLER),
        up_event_handler: non_empty_or(data, "upeventhandler", DEFAULT_EVENT_HANDLER),
        check_region: non_empty_or(data, "checkregion", DEFAULT_CHECK_REGION),
        health: None,
    })
}

/// Identity-bearing subset: `(domain, record id)`
pub fn encode_identity(data: &ResourceData) -> Result<(String, String)> {
    let domain = required_str(data, "domain")?;
    let record_id = match data.id() {
        Some(id) => id.to_string(),
        None => required_str(data, "recordid")?,
    };
    Ok((domain, record_id))
}

/// Write a failover's observed state into the host's attribute bag
///
/// Only the check fields of the observed check type are written.
pub fn decode(binding: &FailoverBinding, data: &mut ResourceData) {
    data.set("domain", binding.domain.as_str());
    data.set("recordid", binding.record_id.as_str());
    data.set("checktype", binding.check.code().to_string());
    data.set("mainip", binding.main_ip.as_str());
    for (ip, key) in binding.backup_ips.iter().zip(BACKUP_IP_KEYS) {
        data.set(key, ip.as_str());
    }
    data.set("monitoringregion", binding.monitoring_region.as_str());
    data.set("checkperiod", binding.check_period.as_str());
    data.set("notificationmail", binding.notification_mail.as_str());
    data.set("downeventhandler", binding.down_event_handler.as_str());
    data.set("upeventhandler", binding.up_event_handler.as_str());
    data.set(
        "checkregion",
        if binding.check_region.is_empty() {
            DEFAULT_CHECK_REGION
        } else {
            binding.check_region.as_str()
        },
    );

    match &binding.check {
        CheckSettings::Ping {
            latency_limit,
            timeout,
        } => {
            data.set("latencylimit", latency_limit.as_str());
            data.set("timeout", timeout.as_str());
        }
        CheckSettings::Dns {
            host,
            query_type,
            query_response,
        } => {
            data.set("host", host.as_str());
            data.set("querytype", query_type.as_str());
            data.set("queryresponse", query_response.as_str());
        }
        CheckSettings::Tcp { host, port } => {
            data.set("host", host.as_str());
            data.set("port", port.to_string());
        }
        CheckSettings::Http(http) | CheckSettings::Https(http) => decode_http(http, data),
        CheckSettings::CustomHttp { http, content } | CheckSettings::CustomHttps { http, content } => {
            decode_http(http, data);
            data.set("content", content.as_str());
        }
        CheckSettings::Heartbeat => {}
    }

    let health = binding.health.clone().unwrap_or_default();
    data.set("state", health.state);
    data.set(
        "status",
        if health.status.is_empty() {
            DEFAULT_STATUS.to_string()
        } else {
            health.status
        },
    );
}

fn decode_http(http: &HttpCheck, data: &mut ResourceData) {
    data.set("host", http.host.as_str());
    data.set("port", http.port.to_string());
    data.set("path", http.path.as_str());
    data.set("httprequesttype", http.http_request_type.as_str());
}

/// Attribute names owned by the provider, ignored when diffing
pub fn observed_only_fields() -> &'static [&'static str] {
    &["state", "status"]
}
