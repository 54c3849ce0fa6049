// # Dynamic URL Codec
//
// The URL is issued by the provider. Desired state only names the record
// it binds to; a `url` key in desired state is never read.

use super::required_str;
use crate::error::Result;
use crate::model::{DynamicUrlBinding, ResourceData};

/// Pre-flight check of a dynamic URL's desired state
pub fn validate(data: &ResourceData) -> Result<()> {
    encode(data).map(|_| ())
}

/// Build a `DynamicUrlBinding` from desired state
pub fn encode(data: &ResourceData) -> Result<DynamicUrlBinding> {
    let domain = required_str(data, "domain")?;
    let record_id = match data.id() {
        Some(id) => id.to_string(),
        None => required_str(data, "recordid")?,
    };
    Ok(DynamicUrlBinding::new(domain, record_id))
}

/// Write a dynamic URL's observed state into the host's attribute bag
pub fn decode(binding: &DynamicUrlBinding, data: &mut ResourceData) {
    data.set("domain", binding.domain.as_str());
    data.set("recordid", binding.record_id.as_str());
    if let Some(url) = &binding.url {
        data.set("url", url.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_never_read_from_desired_state() {
        let data = ResourceData::new()
            .with("domain", "example.com")
            .with("recordid", "77")
            .with("url", "https://attacker.example/update");
        let binding = encode(&data).unwrap();
        assert_eq!(binding.url, None);
        assert_eq!(binding.record_id, "77");
    }

    #[test]
    fn test_requires_record() {
        assert!(validate(&ResourceData::new().with("domain", "example.com")).is_err());
    }

    #[test]
    fn test_decode_sets_url() {
        let mut binding = DynamicUrlBinding::new("example.com", "77");
        binding.url = Some("https://ipv4.cloudns.net/api/dynamicURL/?q=abc".to_string());
        let mut observed = ResourceData::new();
        decode(&binding, &mut observed);
        assert_eq!(
            observed.get_str("url").as_deref(),
            Some("https://ipv4.cloudns.net/api/dynamicURL/?q=abc")
        );
    }
}
