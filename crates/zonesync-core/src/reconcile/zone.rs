// # DNS Zone Entry Points
//
// Zones cannot be modified in place; any change replaces the zone.

use async_trait::async_trait;

use super::{Diagnostic, Outcome, Resource, confirm_deleted};
use crate::codec::zone::{self as codec_zone, NameserverSelection};
use crate::driver::SyncDriver;
use crate::error::Error;
use crate::model::{NameserverFilter, ResourceData};
use crate::normalize::resolve_filter;

/// `cloudns_dns_zone`
#[derive(Debug, Default, Clone, Copy)]
pub struct ZoneResource;

impl ZoneResource {
    pub const KIND: &'static str = "cloudns_dns_zone";
}

#[async_trait]
impl Resource for ZoneResource {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn force_new_fields(&self) -> &'static [&'static str] {
        &["domain", "type", "master", "nameservers", "nameserver_type"]
    }

    fn diff_ignored_fields(&self) -> &'static [&'static str] {
        &["nameserver_type"]
    }

    fn supports_update(&self) -> bool {
        false
    }

    fn validate(&self, desired: &ResourceData) -> Outcome {
        codec_zone::validate(desired)?;
        Ok(())
    }

    async fn create(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        let mut zone = codec_zone::encode(data)?;

        if let NameserverSelection::Filter(filter) = codec_zone::nameserver_selection(data)? {
            // "all" leaves the choice to the provider; no catalog lookup needed
            if filter != NameserverFilter::All {
                let catalog = driver.nameserver_catalog().await?;
                zone.nameservers = resolve_filter(filter, &catalog).filter(|ns| !ns.is_empty());
            }
        }
        if let Some(ns) = &zone.nameservers {
            data.set("nameservers", ns.clone());
        }

        driver.create_zone(&zone).await?;
        data.set_id(zone.domain.as_str());
        self.read(driver, data).await
    }

    async fn read(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        if !data.is_tracked() {
            return Ok(());
        }

        let domain = codec_zone::encode_identity(data)?;
        match driver.find_zone(&domain).await? {
            Some(zone) => {
                codec_zone::decode(&zone, data);
                Ok(())
            }
            None => {
                tracing::warn!("DNS zone not found: {}, removing from state", domain);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn update(&self, _driver: &SyncDriver, _data: &mut ResourceData) -> Outcome {
        Err(Diagnostic::fatal(&Error::unsupported(
            "Updating DNS zones is not supported",
        )))
    }

    async fn delete(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        if !data.is_tracked() {
            return Ok(());
        }

        let domain = codec_zone::encode_identity(data)?;
        driver.delete_zone(&domain).await?;
        confirm_deleted(self, driver, data).await
    }

    async fn import(&self, driver: &SyncDriver, locator: &str) -> Outcome<ResourceData> {
        let domain = locator.trim();
        if domain.is_empty() || domain.contains('/') {
            return Err(Diagnostic::fatal(&Error::invalid_locator(format!(
                "{:?}. Expected: \"domain\"",
                locator
            ))));
        }

        let zone = driver.find_zone(domain).await?.ok_or_else(|| {
            Diagnostic::fatal(&Error::not_found(format!("Zone not found: {:?}", domain)))
        })?;

        let mut data = ResourceData::new().with_id(domain);
        codec_zone::decode(&zone, &mut data);
        tracing::debug!("IMPORT Zone {}", domain);
        Ok(data)
    }
}
