// # Record Codec
//
// Maps between a record's attribute bag and `Record`. The `type` attribute
// picks the `RecordData` constructor; each constructor reads only its own
// fields, so a field set for one type can never leak into another.

use super::{float_or_zero, int_as, required_int_as, required_str, str_or};
use crate::error::{Error, Result};
use crate::model::record::DEFAULT_REDIRECT_TYPE;
use crate::model::{
    CertAssociation, GeoDns, Location, Record, RecordData, RecordType, ResourceData, WebRedirect,
};

/// Resolve the record type discriminator
pub fn record_type(data: &ResourceData) -> Result<RecordType> {
    required_str(data, "type")?.parse()
}

/// Pre-flight check: every field the type requires is present
///
/// Runs before any remote call so a missing field is reported as a
/// validation error, not a remote one.
pub fn validate(data: &ResourceData) -> Result<()> {
    let rtype = record_type(data)?;
    for field in rtype.required_fields() {
        if !data.contains(field) {
            return Err(Error::validation(format!(
                "{} is required for {} record",
                capitalize(field),
                rtype
            )));
        }
    }
    Ok(())
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build a `Record` from desired state
pub fn encode(data: &ResourceData) -> Result<Record> {
    validate(data)?;
    let rtype = record_type(data)?;

    let record = Record {
        id: data.id().map(str::to_string),
        host: data.get_str_or_default("name"),
        zone: required_str(data, "zone")?,
        ttl: required_int_as(data, "ttl")?,
        value: data.get_str_or_default("value"),
        geodns: GeoDns {
            location: data.get_str("geodnslocation"),
            code: data.get_str("geodnscode"),
        },
        data: encode_data(rtype, data)?,
    };

    Ok(record)
}

/// Identity-bearing subset used by read and delete: `(zone, id)`
pub fn encode_identity(data: &ResourceData) -> Result<(String, String)> {
    let zone = required_str(data, "zone")?;
    let id = data
        .id()
        .ok_or_else(|| Error::validation("Record has no identity"))?
        .to_string();
    Ok((zone, id))
}

fn encode_data(rtype: RecordType, data: &ResourceData) -> Result<RecordData> {
    let payload = match rtype {
        RecordType::Mx => RecordData::Mx {
            priority: required_int_as(data, "priority")?,
        },
        RecordType::Srv => RecordData::Srv {
            priority: int_as(data, "priority", 0)?,
            weight: int_as(data, "weight", 0)?,
            port: int_as(data, "port", 0)?,
        },
        RecordType::Wr => RecordData::Wr(WebRedirect {
            frame: data.get_str_or_default("frame"),
            frame_title: data.get_str_or_default("frametitle"),
            frame_keywords: data.get_str_or_default("framekeywords"),
            frame_description: data.get_str_or_default("framedescription"),
            mobile_meta: int_as(data, "mobilemeta", 0)?,
            save_path: int_as(data, "savepath", 0)?,
            redirect_type: int_as(data, "redirecttype", DEFAULT_REDIRECT_TYPE)?,
        }),
        RecordType::Rp => RecordData::Rp {
            mail: data.get_str_or_default("mail"),
            txt: data.get_str_or_default("txt"),
        },
        RecordType::Sshfp => RecordData::Sshfp {
            algorithm: int_as(data, "algorithm", 0)?,
            fptype: int_as(data, "fptype", 0)?,
        },
        RecordType::Naptr => RecordData::Naptr {
            flag: data.get_str_or_default("flag"),
            order: data.get_str_or_default("order"),
            pref: data.get_str_or_default("pref"),
            params: data.get_str_or_default("params"),
            regexp: data.get_str_or_default("regexp"),
            replace: data.get_str_or_default("replace"),
        },
        RecordType::Caa => RecordData::Caa {
            flag: data.get_str_or_default("caaflag"),
            tag: data.get_str_or_default("caatype"),
            value: data.get_str_or_default("caavalue"),
        },
        RecordType::Tlsa => RecordData::Tlsa(CertAssociation {
            usage: data.get_str_or_default("tlsausage"),
            selector: data.get_str_or_default("tlsaselector"),
            matching_type: data.get_str_or_default("tlsamatchingtype"),
        }),
        RecordType::Smimea => RecordData::Smimea(CertAssociation {
            usage: data.get_str_or_default("smimeausage"),
            selector: data.get_str_or_default("smimeaselector"),
            matching_type: data.get_str_or_default("smimeamatchingtype"),
        }),
        RecordType::Ds => RecordData::Ds {
            keytag: int_as(data, "keytag", 0)?,
            algorithm: int_as(data, "algorithm", 0)?,
            digest_type: int_as(data, "digesttype", 0)?,
        },
        RecordType::Cert => RecordData::Cert {
            cert_type: int_as(data, "certtype", 0)?,
            key_tag: int_as(data, "certkeytag", 0)?,
            algorithm: int_as(data, "certalgorithm", 0)?,
        },
        RecordType::Hinfo => RecordData::Hinfo {
            cpu: data.get_str_or_default("cpu"),
            os: data.get_str_or_default("os"),
        },
        RecordType::Loc => RecordData::Loc(Location {
            lat_deg: float_or_zero(data, "latdeg")?,
            lat_min: float_or_zero(data, "latmin")?,
            lat_sec: float_or_zero(data, "latsec")?,
            lat_dir: data.get_str_or_default("latdir"),
            long_deg: float_or_zero(data, "longdeg")?,
            long_min: float_or_zero(data, "longmin")?,
            long_sec: float_or_zero(data, "longsec")?,
            long_dir: data.get_str_or_default("longdir"),
            altitude: str_or(data, "altitude", ""),
            size: str_or(data, "size", ""),
            h_precision: str_or(data, "hprecision", ""),
            v_precision: str_or(data, "vprecision", ""),
        }),
        RecordType::A
        | RecordType::Aaaa
        | RecordType::Cname
        | RecordType::Txt
        | RecordType::Spf
        | RecordType::Ns
        | RecordType::Alias
        | RecordType::Ptr
        | RecordType::Openpgpkey => RecordData::Simple { rtype },
    };

    Ok(payload)
}

/// Write a record's observed state into the host's attribute bag
///
/// Only the common fields and the fields of the record's own type are
/// written. Keys belonging to other types are left as they are.
pub fn decode(record: &Record, data: &mut ResourceData) {
    data.set("name", record.host.as_str());
    data.set("zone", record.zone.as_str());
    data.set("type", record.record_type().as_str());
    data.set("value", record.value.as_str());
    data.set("ttl", record.ttl);

    if let Some(location) = &record.geodns.location {
        data.set("geodnslocation", location.as_str());
    }
    if let Some(code) = &record.geodns.code {
        data.set("geodnscode", code.as_str());
    }

    match &record.data {
        RecordData::Simple { .. } => {}
        RecordData::Mx { priority } => {
            data.set("priority", *priority);
        }
        RecordData::Srv {
            priority,
            weight,
            port,
        } => {
            data.set("priority", *priority);
            data.set("weight", *weight);
            data.set("port", *port);
        }
        RecordData::Wr(wr) => {
            data.set("frame", wr.frame.as_str());
            data.set("frametitle", wr.frame_title.as_str());
            data.set("framekeywords", wr.frame_keywords.as_str());
            data.set("framedescription", wr.frame_description.as_str());
            data.set("mobilemeta", wr.mobile_meta);
            data.set("savepath", wr.save_path);
            data.set("redirecttype", wr.redirect_type);
        }
        RecordData::Rp { mail, txt } => {
            data.set("mail", mail.as_str());
            data.set("txt", txt.as_str());
        }
        RecordData::Sshfp { algorithm, fptype } => {
            data.set("algorithm", *algorithm);
            data.set("fptype", *fptype);
        }
        RecordData::Naptr {
            flag,
            order,
            pref,
            params,
            regexp,
            replace,
        } => {
            data.set("flag", flag.as_str());
            data.set("order", order.as_str());
            data.set("pref", pref.as_str());
            data.set("params", params.as_str());
            data.set("regexp", regexp.as_str());
            data.set("replace", replace.as_str());
        }
        RecordData::Caa { flag, tag, value } => {
            data.set("caaflag", flag.as_str());
            data.set("caatype", tag.as_str());
            data.set("caavalue", value.as_str());
        }
        RecordData::Tlsa(assoc) => {
            data.set("tlsausage", assoc.usage.as_str());
            data.set("tlsaselector", assoc.selector.as_str());
            data.set("tlsamatchingtype", assoc.matching_type.as_str());
        }
        RecordData::Smimea(assoc) => {
            data.set("smimeausage", assoc.usage.as_str());
            data.set("smimeaselector", assoc.selector.as_str());
            data.set("smimeamatchingtype", assoc.matching_type.as_str());
        }
        RecordData::Ds {
            keytag,
            algorithm,
            digest_type,
        } => {
            data.set("keytag", *keytag);
            data.set("algorithm", *algorithm);
            data.set("digesttype", *digest_type);
        }
        RecordData::Cert {
            cert_type,
            key_tag,
            algorithm,
        } => {
            data.set("certtype", *cert_type);
            data.set("certkeytag", *key_tag);
            data.set("certalgorithm", *algorithm);
        }
        RecordData::Hinfo { cpu, os } => {
            data.set("cpu", cpu.as_str());
            data.set("os", os.as_str());
        }
        RecordData::Loc(loc) => {
            data.set("latdeg", loc.lat_deg);
            data.set("latmin", loc.lat_min);
            data.set("latsec", loc.lat_sec);
            data.set("latdir", loc.lat_dir.as_str());
            data.set("longdeg", loc.long_deg);
            data.set("longmin", loc.long_min);
            data.set("longsec", loc.long_sec);
            data.set("longdir", loc.long_dir.as_str());
            data.set("altitude", loc.altitude.as_str());
            data.set("size", loc.size.as_str());
            data.set("hprecision", loc.h_precision.as_str());
            data.set("vprecision", loc.v_precision.as_str());
        }
    }
}
