// # Resource Data
//
// The host's view of one managed object: an optional provider-assigned
// identity plus a loosely-typed attribute bag. Desired state arrives in this
// shape and observed state is written back into it.
//
// Presence matters: a key that is absent means "not configured", which is
// different from a key holding an empty string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Ordered list of strings
    List(Vec<String>),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for AttributeValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u8> for AttributeValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Attribute bag keyed by field name
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// One managed object as tracked by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Provider-assigned identity; `None` until created (or after deletion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    /// Attribute bag
    #[serde(default)]
    attributes: AttributeMap,
}

impl ResourceData {
    /// Create an empty resource with no identity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resource from a desired attribute bag
    pub fn from_attributes(attributes: AttributeMap) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style identity setter
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    /// Current identity, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Assign an identity. An empty string clears it.
    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
    }

    /// Drop the identity, marking the object as absent
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Whether the object currently has an identity
    pub fn is_tracked(&self) -> bool {
        self.id.is_some()
    }

    /// Whether the attribute is present at all
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Raw attribute value
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Attribute as a string. Integers and floats are rendered, lists are not.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.attributes.get(key)? {
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::Int(i) => Some(i.to_string()),
            AttributeValue::Float(f) => Some(f.to_string()),
            AttributeValue::List(_) => None,
        }
    }

    /// Attribute as a string, empty when absent
    pub fn get_str_or_default(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default()
    }

    /// Attribute as an integer. Numeric strings are accepted.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.attributes.get(key)? {
            AttributeValue::Int(i) => Some(*i),
            AttributeValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Attribute as a float. Integers and numeric strings are accepted.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key)? {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::String(s) => s.trim().parse().ok(),
            AttributeValue::List(_) => None,
        }
    }

    /// Attribute as a list of strings
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        match self.attributes.get(key)? {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Set an attribute
    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    /// Remove an attribute
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.attributes.remove(key)
    }

    /// Borrow the attribute bag
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Iterate attribute names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_distinct_from_empty() {
        let data = ResourceData::new().with("geodnscode", "");
        assert!(data.contains("geodnscode"));
        assert_eq!(data.get_str("geodnscode"), Some(String::new()));
        assert!(!data.contains("geodnslocation"));
        assert_eq!(data.get_str("geodnslocation"), None);
    }

    #[test]
    fn test_numeric_coercion() {
        let data = ResourceData::new()
            .with("ttl", 3600i64)
            .with("port", "8080")
            .with("latdeg", 51.5);

        assert_eq!(data.get_int("ttl"), Some(3600));
        assert_eq!(data.get_int("port"), Some(8080));
        assert_eq!(data.get_float("ttl"), Some(3600.0));
        assert_eq!(data.get_float("latdeg"), Some(51.5));
        assert_eq!(data.get_str("ttl"), Some("3600".to_string()));
    }

    #[test]
    fn test_identity_lifecycle() {
        let mut data = ResourceData::new();
        assert!(!data.is_tracked());

        data.set_id("123");
        assert_eq!(data.id(), Some("123"));

        data.set_id("");
        assert!(!data.is_tracked());

        data.set_id("456");
        data.clear_id();
        assert_eq!(data.id(), None);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"attributes":{"type":"MX","ttl":3600,"nameservers":["a","b"]}}"#;
        let data: ResourceData = serde_json::from_str(json).unwrap();
        assert_eq!(data.get_str("type"), Some("MX".to_string()));
        assert_eq!(data.get_int("ttl"), Some(3600));
        assert_eq!(data.get_list("nameservers").map(|l| l.len()), Some(2));
        assert_eq!(data.id(), None);
    }
}
