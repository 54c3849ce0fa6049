// # ClouDNS Wire Format
//
// Request parameters and response parsing for the ClouDNS JSON API. Every
// request is a flat form; every failure is
// `{"status": "Failed", "statusDescription": "..."}`.
//
// Responses mix strings and numbers for the same field depending on the
// endpoint, so every scalar is read through `text()`.

use serde::Deserialize;
use serde_json::Value;

use zonesync_core::model::failover::{DEFAULT_STATUS, MAX_BACKUP_IPS};
use zonesync_core::model::{
    CertAssociation, CheckSettings, DynamicUrlBinding, FailoverBinding, FailoverHealth, GeoDns,
    HttpCheck, Location, Nameserver, Record, RecordData, RecordType, WebRedirect, Zone, ZoneKind,
};
use zonesync_core::{Error, Result};

use crate::PROVIDER;

/// Form parameters of one request
pub(crate) type Params = Vec<(&'static str, String)>;

fn invalid(what: &str) -> Error {
    Error::remote(PROVIDER, format!("Invalid response format: {}", what))
}

#[derive(Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    status: Value,
    #[serde(rename = "statusDescription", default)]
    status_description: Option<String>,
}

/// Turn a `"Failed"` envelope into an error carrying the provider's text
pub(crate) fn check_status(json: &Value) -> Result<()> {
    // bare lists and maps carry no envelope
    let Ok(envelope) = StatusEnvelope::deserialize(json) else {
        return Ok(());
    };
    if envelope.status.as_str() == Some("Failed") {
        let description = envelope
            .status_description
            .unwrap_or_else(|| "request failed without a description".to_string());
        return Err(Error::remote(PROVIDER, description));
    }
    Ok(())
}

/// Scalar field as text; hyphenated keys fall back to their underscore form
fn text(value: &Value, key: &str) -> String {
    let field = value
        .get(key)
        .or_else(|| value.get(key.replace('-', "_").as_str()));
    match field {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => (if *b { "1" } else { "0" }).to_string(),
        _ => String::new(),
    }
}

fn int(value: &Value, key: &str) -> i64 {
    text(value, key).trim().parse().unwrap_or(0)
}

/// Integer field that must fit the target type
fn int_as<T: TryFrom<i64>>(value: &Value, key: &str) -> Result<T> {
    let raw = int(value, key);
    T::try_from(raw).map_err(|_| invalid(&format!("{} out of range: {}", key, raw)))
}

fn float(value: &Value, key: &str) -> f64 {
    text(value, key).trim().parse().unwrap_or(0.0)
}

fn optional(value: &Value, key: &str) -> Option<String> {
    Some(text(value, key)).filter(|s| !s.is_empty())
}

// ---- records ----

/// Parameters for `add-record` / `mod-record`
///
/// Only the record's own variant contributes type-specific parameters.
pub(crate) fn record_params(record: &Record) -> Params {
    let mut params: Params = vec![
        ("domain-name", record.zone.clone()),
        ("record-type", record.record_type().as_str().to_string()),
        ("host", record.host.clone()),
        ("record", record.value.clone()),
        ("ttl", record.ttl.to_string()),
    ];
    if let Some(id) = &record.id {
        params.push(("record-id", id.clone()));
    }
    if let Some(location) = &record.geodns.location {
        params.push(("geodns-location", location.clone()));
    }
    if let Some(code) = &record.geodns.code {
        params.push(("geodns-code", code.clone()));
    }

    match &record.data {
        RecordData::Simple { .. } => {}
        RecordData::Mx { priority } => params.push(("priority", priority.to_string())),
        RecordData::Srv {
            priority,
            weight,
            port,
        } => {
            params.push(("priority", priority.to_string()));
            params.push(("weight", weight.to_string()));
            params.push(("port", port.to_string()));
        }
        RecordData::Wr(wr) => {
            params.push(("frame", wr.frame.clone()));
            params.push(("frame-title", wr.frame_title.clone()));
            params.push(("frame-keywords", wr.frame_keywords.clone()));
            params.push(("frame-description", wr.frame_description.clone()));
            params.push(("mobile-meta", wr.mobile_meta.to_string()));
            params.push(("save-path", wr.save_path.to_string()));
            params.push(("redirect-type", wr.redirect_type.to_string()));
        }
        RecordData::Rp { mail, txt } => {
            params.push(("mail", mail.clone()));
            params.push(("txt", txt.clone()));
        }
        RecordData::Sshfp { algorithm, fptype } => {
            params.push(("algorithm", algorithm.to_string()));
            params.push(("fptype", fptype.to_string()));
        }
        RecordData::Naptr {
            flag,
            order,
            pref,
            params: naptr_params,
            regexp,
            replace,
        } => {
            params.push(("flag", flag.clone()));
            params.push(("order", order.clone()));
            params.push(("pref", pref.clone()));
            params.push(("params", naptr_params.clone()));
            params.push(("regexp", regexp.clone()));
            params.push(("replace", replace.clone()));
        }
        RecordData::Caa { flag, tag, value } => {
            params.push(("caa_flag", flag.clone()));
            params.push(("caa_type", tag.clone()));
            params.push(("caa_value", value.clone()));
        }
        RecordData::Tlsa(assoc) => {
            params.push(("tlsa_usage", assoc.usage.clone()));
            params.push(("tlsa_selector", assoc.selector.clone()));
            params.push(("tlsa_matching_type", assoc.matching_type.clone()));
        }
        RecordData::Smimea(assoc) => {
            params.push(("smimea_usage", assoc.usage.clone()));
            params.push(("smimea_selector", assoc.selector.clone()));
            params.push(("smimea_matching_type", assoc.matching_type.clone()));
        }
        RecordData::Ds {
            keytag,
            algorithm,
            digest_type,
        } => {
            params.push(("key-tag", keytag.to_string()));
            params.push(("algorithm", algorithm.to_string()));
            params.push(("digest-type", digest_type.to_string()));
        }
        RecordData::Cert {
            cert_type,
            key_tag,
            algorithm,
        } => {
            params.push(("cert-type", cert_type.to_string()));
            params.push(("cert-key-tag", key_tag.to_string()));
            params.push(("cert-algorithm", algorithm.to_string()));
        }
        RecordData::Hinfo { cpu, os } => {
            params.push(("cpu", cpu.clone()));
            params.push(("os", os.clone()));
        }
        RecordData::Loc(loc) => {
            params.push(("lat-deg", loc.lat_deg.to_string()));
            params.push(("lat-min", loc.lat_min.to_string()));
            params.push(("lat-sec", loc.lat_sec.to_string()));
            params.push(("lat-dir", loc.lat_dir.clone()));
            params.push(("long-deg", loc.long_deg.to_string()));
            params.push(("long-min", loc.long_min.to_string()));
            params.push(("long-sec", loc.long_sec.to_string()));
            params.push(("long-dir", loc.long_dir.clone()));
            params.push(("altitude", loc.altitude.clone()));
            params.push(("size", loc.size.clone()));
            params.push(("h-precision", loc.h_precision.clone()));
            params.push(("v-precision", loc.v_precision.clone()));
        }
    }

    params
}

/// ID of a newly created record
pub(crate) fn parse_created_id(json: &Value) -> Result<String> {
    let id = json
        .get("data")
        .map(|data| text(data, "id"))
        .unwrap_or_default();
    if id.is_empty() {
        return Err(invalid("data.id missing from add-record response"));
    }
    Ok(id)
}

/// Records of a `records.json` response
///
/// The provider answers with an object keyed by record ID, or an empty
/// array for an empty zone. Types this crate does not model are skipped.
pub(crate) fn parse_records(zone: &str, json: &Value) -> Result<Vec<Record>> {
    let entries: Vec<&Value> = match json {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => return Err(invalid("records is neither an object nor an array")),
    };

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(record) = parse_record(zone, entry)? {
            records.push(record);
        }
    }
    Ok(records)
}

fn parse_record(zone: &str, entry: &Value) -> Result<Option<Record>> {
    let rtype: RecordType = match text(entry, "type").parse() {
        Ok(rtype) => rtype,
        Err(_) => {
            tracing::debug!("Skipping record of unmodelled type {:?}", text(entry, "type"));
            return Ok(None);
        }
    };

    let data = match rtype {
        RecordType::Mx => RecordData::Mx {
            priority: int_as(entry, "priority")?,
        },
        RecordType::Srv => RecordData::Srv {
            priority: int_as(entry, "priority")?,
            weight: int_as(entry, "weight")?,
            port: int_as(entry, "port")?,
        },
        RecordType::Wr => RecordData::Wr(WebRedirect {
            frame: text(entry, "frame"),
            frame_title: text(entry, "frame-title"),
            frame_keywords: text(entry, "frame-keywords"),
            frame_description: text(entry, "frame-description"),
            mobile_meta: int(entry, "mobile-meta"),
            save_path: int(entry, "save-path"),
            redirect_type: int(entry, "redirect-type"),
        }),
        RecordType::Rp => RecordData::Rp {
            mail: text(entry, "mail"),
            txt: text(entry, "txt"),
        },
        RecordType::Sshfp => RecordData::Sshfp {
            algorithm: int(entry, "algorithm"),
            fptype: int(entry, "fp-type"),
        },
        RecordType::Naptr => RecordData::Naptr {
            flag: text(entry, "flag"),
            order: text(entry, "order"),
            pref: text(entry, "pref"),
            params: text(entry, "params"),
            regexp: text(entry, "regexp"),
            replace: text(entry, "replace"),
        },
        RecordType::Caa => RecordData::Caa {
            flag: text(entry, "caa_flag"),
            tag: text(entry, "caa_type"),
            value: text(entry, "caa_value"),
        },
        RecordType::Tlsa => RecordData::Tlsa(CertAssociation {
            usage: text(entry, "tlsa_usage"),
            selector: text(entry, "tlsa_selector"),
            matching_type: text(entry, "tlsa_matching_type"),
        }),
        RecordType::Smimea => RecordData::Smimea(CertAssociation {
            usage: text(entry, "smimea_usage"),
            selector: text(entry, "smimea_selector"),
            matching_type: text(entry, "smimea_matching_type"),
        }),
        RecordType::Ds => RecordData::Ds {
            keytag: int(entry, "key-tag"),
            algorithm: int(entry, "algorithm"),
            digest_type: int(entry, "digest-type"),
        },
        RecordType::Cert => RecordData::Cert {
            cert_type: int(entry, "cert-type"),
            key_tag: int(entry, "cert-key-tag"),
            algorithm: int(entry, "cert-algorithm"),
        },
        RecordType::Hinfo => RecordData::Hinfo {
            cpu: text(entry, "cpu"),
            os: text(entry, "os"),
        },
        RecordType::Loc => RecordData::Loc(Location {
            lat_deg: float(entry, "lat-deg"),
            lat_min: float(entry, "lat-min"),
            lat_sec: float(entry, "lat-sec"),
            lat_dir: text(entry, "lat-dir"),
            long_deg: float(entry, "long-deg"),
            long_min: float(entry, "long-min"),
            long_sec: float(entry, "long-sec"),
            long_dir: text(entry, "long-dir"),
            altitude: text(entry, "altitude"),
            size: text(entry, "size"),
            h_precision: text(entry, "h-precision"),
            v_precision: text(entry, "v-precision"),
        }),
        _ => RecordData::Simple { rtype },
    };

    Ok(Some(Record {
        id: optional(entry, "id"),
        host: text(entry, "host"),
        zone: zone.to_string(),
        ttl: int_as(entry, "ttl")?,
        value: text(entry, "record"),
        geodns: GeoDns {
            location: optional(entry, "geodns-location"),
            code: optional(entry, "geodns-code"),
        },
        data,
    }))
}

// ---- zones ----

/// Parameters for `register.json`
pub(crate) fn zone_params(zone: &Zone) -> Params {
    let mut params: Params = vec![
        ("domain-name", zone.domain.clone()),
        ("zone-type", zone.kind.as_str().to_string()),
    ];
    if let ZoneKind::Slave { master } = &zone.kind {
        params.push(("master-ip", master.clone()));
    }
    for ns in zone.nameservers.iter().flatten() {
        params.push(("ns[]", ns.clone()));
    }
    params
}

/// Zone from `get-zone-info.json`
///
/// A slave zone comes back with an empty master; `master-servers.json`
/// supplies it.
pub(crate) fn parse_zone(json: &Value) -> Result<Zone> {
    let domain = text(json, "name");
    let kind = ZoneKind::from_parts(&text(json, "type"), None)
        .map_err(|e| Error::remote(PROVIDER, e.to_string()))?;
    Ok(Zone {
        domain,
        kind,
        nameservers: None,
    })
}

/// First master IP of a slave zone's `master-servers.json`
pub(crate) fn parse_master(json: &Value) -> Option<String> {
    let entries: Vec<&Value> = match json {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => return None,
    };
    entries
        .into_iter()
        .map(|entry| text(entry, "master_ip"))
        .find(|ip| !ip.is_empty())
}

/// Catalog from `available-name-servers.json`
pub(crate) fn parse_nameservers(json: &Value) -> Result<Vec<Nameserver>> {
    let items = json
        .as_array()
        .ok_or_else(|| invalid("name server list is not an array"))?;
    Ok(items
        .iter()
        .map(|item| Nameserver {
            name: text(item, "name"),
            kind: text(item, "type"),
            ipv4: optional(item, "ip4"),
            ipv6: optional(item, "ip6"),
            location: optional(item, "location"),
        })
        .filter(|ns| !ns.name.is_empty())
        .collect())
}

// ---- dynamic URLs ----

pub(crate) fn parse_dynamic_url(domain: &str, record_id: &str, json: &Value) -> Result<DynamicUrlBinding> {
    let url = optional(json, "url").ok_or_else(|| invalid("url missing from dynamic URL response"))?;
    let mut binding = DynamicUrlBinding::new(domain, record_id);
    binding.url = Some(url);
    Ok(binding)
}

// ---- failover ----

/// Parameters for `create-failover` / `failover-modify`
///
/// Health is never sent; check settings contribute only their own fields.
pub(crate) fn failover_params(binding: &FailoverBinding) -> Params {
    let mut params: Params = vec![
        ("domain-name", binding.domain.clone()),
        ("record-id", binding.record_id.clone()),
        ("check_type", binding.check.code().to_string()),
        ("main_ip", binding.main_ip.clone()),
        ("down_event_handler", binding.down_event_handler.clone()),
        ("up_event_handler", binding.up_event_handler.clone()),
        ("monitoring_region", binding.monitoring_region.clone()),
        ("check_period", binding.check_period.clone()),
        ("notification_mail", binding.notification_mail.clone()),
        ("check_region", binding.check_region.clone()),
    ];
    for (ip, key) in binding.backup_ips.iter().zip(BACKUP_IP_PARAMS) {
        if !ip.is_empty() {
            params.push((key, ip.clone()));
        }
    }

    match &binding.check {
        CheckSettings::Ping {
            latency_limit,
            timeout,
        } => {
            params.push(("latency_limit", latency_limit.clone()));
            params.push(("timeout", timeout.clone()));
        }
        CheckSettings::Dns {
            host,
            query_type,
            query_response,
        } => {
            params.push(("host", host.clone()));
            params.push(("query_type", query_type.clone()));
            params.push(("query_response", query_response.clone()));
        }
        CheckSettings::Tcp { host, port } => {
            params.push(("host", host.clone()));
            params.push(("port", port.to_string()));
        }
        CheckSettings::Http(http) | CheckSettings::Https(http) => push_http(&mut params, http),
        CheckSettings::CustomHttp { http, content } | CheckSettings::CustomHttps { http, content } => {
            push_http(&mut params, http);
            params.push(("content", content.clone()));
        }
        CheckSettings::Heartbeat => {}
    }

    params
}

const BACKUP_IP_PARAMS: [&str; MAX_BACKUP_IPS] = [
    "backup_ip_1",
    "backup_ip_2",
    "backup_ip_3",
    "backup_ip_4",
    "backup_ip_5",
];

fn push_http(params: &mut Params, http: &HttpCheck) {
    params.push(("host", http.host.clone()));
    params.push(("port", http.port.to_string()));
    params.push(("path", http.path.clone()));
    params.push(("http_request_type", http.http_request_type.clone()));
}

fn parse_http(json: &Value) -> Result<HttpCheck> {
    Ok(HttpCheck {
        host: text(json, "host"),
        port: int_as(json, "port")?,
        path: text(json, "path"),
        http_request_type: text(json, "http_request_type"),
    })
}

/// Settings and health from `failover-settings.json`
pub(crate) fn parse_failover(domain: &str, record_id: &str, json: &Value) -> Result<FailoverBinding> {
    let code: u8 = text(json, "check_type")
        .trim()
        .parse()
        .map_err(|_| invalid("check_type missing from failover settings"))?;

    let check = match code {
        1 => CheckSettings::Ping {
            latency_limit: text(json, "latency_limit"),
            timeout: text(json, "timeout"),
        },
        2 => CheckSettings::Dns {
            host: text(json, "host"),
            query_type: text(json, "query_type"),
            query_response: text(json, "query_response"),
        },
        3 => CheckSettings::Tcp {
            host: text(json, "host"),
            port: int_as(json, "port")?,
        },
        4 => CheckSettings::Http(parse_http(json)?),
        5 => CheckSettings::Https(parse_http(json)?),
        6 => CheckSettings::CustomHttp {
            http: parse_http(json)?,
            content: text(json, "content"),
        },
        7 => CheckSettings::CustomHttps {
            http: parse_http(json)?,
            content: text(json, "content"),
        },
        8 => CheckSettings::Heartbeat,
        other => {
            return Err(invalid(&format!("unknown failover check_type {}", other)));
        }
    };

    let mut backup_ips: [String; MAX_BACKUP_IPS] = Default::default();
    for (slot, key) in backup_ips.iter_mut().zip(BACKUP_IP_PARAMS) {
        *slot = text(json, key);
    }

    let status = Some(text(json, "status"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    Ok(FailoverBinding {
        domain: domain.to_string(),
        record_id: record_id.to_string(),
        check,
        main_ip: text(json, "main_ip"),
        backup_ips,
        monitoring_region: text(json, "monitoring_region"),
        check_period: text(json, "check_period"),
        notification_mail: text(json, "notification_mail"),
        down_event_handler: text(json, "down_event_handler"),
        up_event_handler: text(json, "up_event_handler"),
        check_region: text(json, "check_region"),
        health: Some(FailoverHealth {
            state: text(json, "state"),
            status,
        }),
    })
}
