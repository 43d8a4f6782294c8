//! Configuration management for the batch client
//!
//! Settings come from an optional YAML file, then `STORAGE_BATCH_*`
//! environment variables override individual fields.

mod connection_string;
mod loader;
mod models;
mod validation;

pub use connection_string::ConnectionString;
pub use loader::ENV_PREFIX;
pub use models::{BatchConfig, RetrySettings};
