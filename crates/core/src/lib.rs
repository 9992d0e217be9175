//! Core types and shared functionality for hedgerow.
//!
//! This crate provides:
//! - The request/response model the cache manager works with
//! - Partition storage behind the `BlobStore` trait (SQLite and in-memory)
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{BlobStore, CacheDb, EntryMeta, MemoryStore};
pub use config::{AppConfig, CacheNames, ConfigError};
pub use error::Error;
pub use request::{Destination, Request, Response};
