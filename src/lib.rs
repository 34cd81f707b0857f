//! jobwatch — tracks externally submitted job ids until the remote status
//! service reports a terminal outcome, persisting in-flight state across
//! restarts.

pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod queue;
pub mod service;
pub mod store;
pub mod tracker;
pub mod worker;
