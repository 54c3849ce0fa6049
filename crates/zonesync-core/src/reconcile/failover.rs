// # Failover Entry Points
//
// A failover binding's identity is the monitored record's ID, so the user
// never chooses it. Create is get-or-create: an existing binding on the
// record is adopted and brought to the desired settings.

use async_trait::async_trait;

use super::{Diagnostic, Outcome, Resource, confirm_deleted};
use crate::codec::{self, failover as codec_failover};
use crate::driver::SyncDriver;
use crate::error::Error;
use crate::model::ResourceData;

/// `cloudns_failover`
#[derive(Debug, Default, Clone, Copy)]
pub struct FailoverResource;

impl FailoverResource {
    pub const KIND: &'static str = "cloudns_failover";
}

#[async_trait]
impl Resource for FailoverResource {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn force_new_fields(&self) -> &'static [&'static str] {
        &["domain", "recordid"]
    }

    fn diff_ignored_fields(&self) -> &'static [&'static str] {
        codec_failover::observed_only_fields()
    }

    fn validate(&self, desired: &ResourceData) -> Outcome {
        codec_failover::validate(desired)?;
        Ok(())
    }

    async fn create(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        let binding = codec_failover::encode(data)?;

        match driver
            .find_failover(&binding.domain, &binding.record_id)
            .await?
        {
            Some(_) => {
                tracing::info!("Failover already active on {}, adopting", binding.locator());
                driver.update_failover(&binding).await?;
            }
            None => driver.create_failover(&binding).await?,
        }

        data.set_id(binding.record_id.as_str());
        self.read(driver, data).await
    }

    async fn read(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        if !data.is_tracked() {
            return Ok(());
        }

        let (domain, record_id) = codec_failover::encode_identity(data)?;
        match driver.find_failover(&domain, &record_id).await? {
            Some(binding) => {
                data.set_id(binding.record_id.as_str());
                codec_failover::decode(&binding, data);
                Ok(())
            }
            None => {
                tracing::warn!(
                    "Failover {}@{} not found, removing from state",
                    record_id,
                    domain
                );
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn update(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        let binding = codec_failover::encode(data)?;
        driver.update_failover(&binding).await?;
        self.read(driver, data).await
    }

    async fn delete(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        if !data.is_tracked() {
            return Ok(());
        }

        let (domain, record_id) = codec_failover::encode_identity(data)?;
        driver.delete_failover(&domain, &record_id).await?;
        confirm_deleted(self, driver, data).await
    }

    async fn import(&self, driver: &SyncDriver, locator: &str) -> Outcome<ResourceData> {
        let (domain, record_id) = codec::parse_locator(locator)?;

        let binding = driver
            .find_failover(&domain, &record_id)
            .await?
            .ok_or_else(|| {
                Diagnostic::fatal(&Error::not_found(format!(
                    "Failover not found: {:?}",
                    record_id
                )))
            })?;

        let mut data = ResourceData::new().with_id(binding.record_id.as_str());
        codec_failover::decode(&binding, &mut data);
        tracing::debug!("IMPORT failover {}", binding.locator());
        Ok(data)
    }
}
