use std::{marker::PhantomData, sync::Arc};

use tracing::{info, warn};

use super::Record;
use crate::errors::ServiceError;
use crate::storage::{driver::normalize_name, Driver};

/// Collection-level use cases for one record type.
pub struct RecordService<R> {
    driver: Arc<Driver>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RecordService<R> {
    fn clone(&self) -> Self {
        Self { driver: Arc::clone(&self.driver), _record: PhantomData }
    }
}

impl<R: Record> RecordService<R> {
    pub fn new(driver: Arc<Driver>) -> Self {
        Self { driver, _record: PhantomData }
    }

    pub fn driver(&self) -> &Arc<Driver> {
        &self.driver
    }

    /// All decodable records in a collection; undecodable ones are logged and skipped.
    pub async fn list(&self, collection: &str) -> Result<Vec<R>, ServiceError> {
        let raw = self.driver.read_all(collection).await?;
        let mut records = Vec::with_capacity(raw.len());
        for text in raw {
            match serde_json::from_str::<R>(&text) {
                Ok(rec) => records.push(rec),
                Err(e) => warn!(collection, error = %e, "skipping undecodable record"),
            }
        }
        Ok(records)
    }

    pub async fn get(&self, collection: &str, resource: &str) -> Result<R, ServiceError> {
        self.driver.read(collection, resource).await
    }

    /// Store a new record under its own name; returns that name.
    pub async fn create(&self, collection: &str, record: R) -> Result<String, ServiceError> {
        let name = record.resource_name().to_owned();
        self.driver.write(collection, &name, &record).await?;
        info!(collection, resource = %name, "record created");
        Ok(name)
    }

    /// Merge the non-empty fields of `patch` over the stored record.
    ///
    /// The result is written under the merged record's name. When that name
    /// differs from the stored one, the old file is removed afterwards.
    pub async fn update(&self, collection: &str, resource: &str, patch: R) -> Result<String, ServiceError> {
        let mut record: R = self.driver.read(collection, resource).await?;
        let old_name = record.resource_name().to_owned();

        record.merge_non_empty(patch);
        let new_name = record.resource_name().to_owned();
        self.driver.write(collection, &new_name, &record).await?;

        if normalize_name(&new_name) != normalize_name(&old_name) {
            self.driver.delete(collection, &old_name).await?;
            info!(collection, from = %old_name, to = %new_name, "record renamed");
        }
        Ok(new_name)
    }

    pub async fn delete(&self, collection: &str, resource: &str) -> Result<(), ServiceError> {
        if resource.is_empty() {
            return Err(ServiceError::Validation("missing resource name".into()));
        }
        self.driver.delete(collection, resource).await
    }

    pub async fn delete_all(&self, collection: &str) -> Result<(), ServiceError> {
        self.driver.delete(collection, "").await
    }
}
