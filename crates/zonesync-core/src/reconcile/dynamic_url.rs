// # Dynamic URL Entry Points
//
// The provider only offers get-or-create for dynamic URLs, so create, read
// and import all go through it. Both attributes force replacement, which
// leaves nothing to update in place.

use async_trait::async_trait;

use super::{Diagnostic, Outcome, Resource};
use crate::codec::{self, dynamic_url as codec_dynamic_url};
use crate::driver::SyncDriver;
use crate::error::Error;
use crate::model::ResourceData;

/// `cloudns_dynamic_url`
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicUrlResource;

impl DynamicUrlResource {
    pub const KIND: &'static str = "cloudns_dynamic_url";

    async fn get_or_create(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        let binding = codec_dynamic_url::encode(data)?;
        match driver.dynamic_url(&binding.domain, &binding.record_id).await? {
            Some(observed) => {
                data.set_id(observed.record_id.as_str());
                codec_dynamic_url::decode(&observed, data);
            }
            None => {
                tracing::warn!(
                    "Dynamic URL {} not found, removing from state",
                    binding.locator()
                );
                data.clear_id();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for DynamicUrlResource {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn force_new_fields(&self) -> &'static [&'static str] {
        &["domain", "recordid"]
    }

    fn supports_update(&self) -> bool {
        false
    }

    fn validate(&self, desired: &ResourceData) -> Outcome {
        codec_dynamic_url::validate(desired)?;
        Ok(())
    }

    async fn create(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        self.get_or_create(driver, data).await
    }

    async fn read(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        if !data.is_tracked() {
            return Ok(());
        }
        self.get_or_create(driver, data).await
    }

    async fn update(&self, _driver: &SyncDriver, _data: &mut ResourceData) -> Outcome {
        Err(Diagnostic::fatal(&Error::unsupported(
            "Dynamic URLs cannot be modified; replace the resource instead",
        )))
    }

    async fn delete(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        if !data.is_tracked() {
            return Ok(());
        }

        let binding = codec_dynamic_url::encode(data)?;
        driver
            .delete_dynamic_url(&binding.domain, &binding.record_id)
            .await?;
        // a confirmatory read would issue a new URL
        data.clear_id();
        Ok(())
    }

    async fn import(&self, driver: &SyncDriver, locator: &str) -> Outcome<ResourceData> {
        let (domain, record_id) = codec::parse_locator(locator)?;

        let binding = driver
            .dynamic_url(&domain, &record_id)
            .await?
            .ok_or_else(|| {
                Diagnostic::fatal(&Error::not_found(format!(
                    "Record not found: {:?}",
                    record_id
                )))
            })?;

        let mut data = ResourceData::new().with_id(binding.record_id.as_str());
        codec_dynamic_url::decode(&binding, &mut data);
        tracing::debug!("IMPORT dynamic URL {}", binding.locator());
        Ok(data)
    }
}
