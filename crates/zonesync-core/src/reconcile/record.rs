// # DNS Record Entry Points

use async_trait::async_trait;

use super::{Diagnostic, Outcome, Resource, confirm_deleted};
use crate::codec::{self, record as codec_record};
use crate::driver::SyncDriver;
use crate::error::Error;
use crate::model::ResourceData;

/// `cloudns_dns_record`
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordResource;

impl RecordResource {
    pub const KIND: &'static str = "cloudns_dns_record";
}

#[async_trait]
impl Resource for RecordResource {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn force_new_fields(&self) -> &'static [&'static str] {
        &["zone"]
    }

    fn validate(&self, desired: &ResourceData) -> Outcome {
        codec_record::validate(desired)?;
        Ok(())
    }

    async fn create(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        let record = codec_record::encode(data)?;
        let id = driver.create_record(&record).await?;
        data.set_id(id);
        self.read(driver, data).await
    }

    async fn read(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        if !data.is_tracked() {
            return Ok(());
        }

        let (zone, id) = codec_record::encode_identity(data)?;
        match driver.find_record(&zone, &id).await? {
            Some(record) => {
                codec_record::decode(&record, data);
                Ok(())
            }
            None => {
                tracing::warn!("Record {} not found in {}, removing from state", id, zone);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn update(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        let record = codec_record::encode(data)?;
        if record.id.is_none() {
            return Err(Diagnostic::fatal(&Error::validation(
                "Cannot update a record that has no identity",
            )));
        }
        driver.update_record(&record).await?;
        self.read(driver, data).await
    }

    async fn delete(&self, driver: &SyncDriver, data: &mut ResourceData) -> Outcome {
        if !data.is_tracked() {
            return Ok(());
        }

        let (zone, id) = codec_record::encode_identity(data)?;
        driver.delete_record(&zone, &id).await?;
        confirm_deleted(self, driver, data).await
    }

    async fn import(&self, driver: &SyncDriver, locator: &str) -> Outcome<ResourceData> {
        let (zone, id) = codec::parse_locator(locator)?;

        let record = driver
            .find_record(&zone, &id)
            .await?
            .ok_or_else(|| Diagnostic::fatal(&Error::not_found(format!("Record not found: {:?}", id))))?;

        let mut data = ResourceData::new().with_id(id);
        codec_record::decode(&record, &mut data);
        tracing::debug!("IMPORT {}", record);
        Ok(data)
    }
}
