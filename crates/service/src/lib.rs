//! Storage and record services for the JSON document vault.
//! - `storage` maps (collection, resource) pairs onto files under a base directory.
//! - `records` holds the record types and the use cases exposed over HTTP.

pub mod errors;
pub mod records;
pub mod storage;
