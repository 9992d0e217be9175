//! Partitioned response cache.
//!
//! Responses are stored in named partitions behind the [`BlobStore`] trait.
//! Two implementations are provided:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, versioned migrations
//! - [`MemoryStore`]: process-local, for tests and ephemeral hosts

pub mod connection;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod partitions;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStore;
pub use store::{BlobStore, EntryMeta};
