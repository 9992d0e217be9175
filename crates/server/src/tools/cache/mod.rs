//! Cache inspection tools.
//!
//! Read-only views over the partitions the cache manager writes to.

pub mod get;
pub mod list;

pub use get::{CacheGetParams, get_impl};
pub use list::{CacheListParams, list_impl};
