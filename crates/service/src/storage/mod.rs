//! File-backed document storage
//!
//! Each collection is a directory under the base directory and each resource
//! is one `<resource>.json` file inside it.

pub mod driver;
pub mod locks;

pub use driver::Driver;
pub use locks::LockTable;
