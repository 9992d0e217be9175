//! Client code for hedgerow.
//!
//! This crate provides the network fetch capability and the offline cache
//! manager that sits between the visitor guide's pages and the network.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Fetcher};
pub use worker::{
    ActivateReport, CacheManager, InstallReport, LifecycleState, MessageOutcome, Notification, Route, WorkerConfig,
    WorkerHost,
};
