//! Record types stored in collections, and the use cases built on the driver.

pub mod merge;
pub mod service;
pub mod user;

use serde::{de::DeserializeOwned, Serialize};

pub use merge::MergeNonEmpty;
pub use service::RecordService;
pub use user::{Address, User};

/// A document that can be stored under its own name and patched field by field.
pub trait Record: MergeNonEmpty + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Resource name the record is stored under.
    fn resource_name(&self) -> &str;
}
