//! Variant codec
//!
//! Bidirectional mapping between the host's loosely-typed [`ResourceData`]
//! and the typed objects exchanged with the remote API.
//!
//! `encode` reads the discriminator first and only then the fields that
//! belong to the resolved variant; anything else in the bag is never read.
//! `decode` writes back only the fields meaningful for the object's actual
//! (remote-reported) type and leaves every other key untouched.

pub mod dynamic_url;
pub mod failover;
pub mod record;
pub mod zone;

use crate::error::{Error, Result};
use crate::model::ResourceData;

/// Read a string attribute that must be present and non-empty
pub(crate) fn required_str(data: &ResourceData, key: &str) -> Result<String> {
    match data.get_str(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::validation(format!("Attribute {:?} is required", key))),
    }
}

/// Read a string attribute, falling back to `default` when absent
pub(crate) fn str_or(data: &ResourceData, key: &str, default: &str) -> String {
    data.get_str(key).unwrap_or_else(|| default.to_string())
}

/// Read a string attribute, falling back to `default` when absent or empty
pub(crate) fn non_empty_or(data: &ResourceData, key: &str, default: &str) -> String {
    match data.get_str(key) {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Read an integer attribute and range-check it into `T`
pub(crate) fn int_as<T>(data: &ResourceData, key: &str, default: T) -> Result<T>
where
    T: TryFrom<i64>,
{
    if !data.contains(key) {
        return Ok(default);
    }
    let raw = data
        .get_int(key)
        .ok_or_else(|| Error::validation(format!("Attribute {:?} must be an integer", key)))?;
    T::try_from(raw)
        .map_err(|_| Error::validation(format!("Attribute {:?} is out of range: {}", key, raw)))
}

/// Read an integer attribute that must be present
pub(crate) fn required_int_as<T>(data: &ResourceData, key: &str) -> Result<T>
where
    T: TryFrom<i64>,
{
    if !data.contains(key) {
        return Err(Error::validation(format!("Attribute {:?} is required", key)));
    }
    let raw = data
        .get_int(key)
        .ok_or_else(|| Error::validation(format!("Attribute {:?} must be an integer", key)))?;
    T::try_from(raw)
        .map_err(|_| Error::validation(format!("Attribute {:?} is out of range: {}", key, raw)))
}

/// Read a float attribute, zero when absent
pub(crate) fn float_or_zero(data: &ResourceData, key: &str) -> Result<f64> {
    if !data.contains(key) {
        return Ok(0.0);
    }
    data.get_float(key)
        .ok_or_else(|| Error::validation(format!("Attribute {:?} must be a number", key)))
}

/// Split an import locator of the form `zone/identity`
pub fn parse_locator(locator: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = locator.split('/').collect();
    match parts.as_slice() {
        [zone, id] if !zone.is_empty() && !id.is_empty() => {
            Ok((zone.to_string(), id.to_string()))
        }
        _ => Err(Error::invalid_locator(format!(
            "{:?}. Expected: \"zone/id\"",
            locator
        ))),
    }
}
