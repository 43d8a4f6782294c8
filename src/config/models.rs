//! Configuration data models

use crate::core::blob::API_VERSION;
use crate::core::pipeline::policies::RetryOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

fn default_api_version() -> String {
    API_VERSION.to_string()
}

/// Default HTTP timeout in seconds
fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    4_000
}

fn default_max_retry_delay_ms() -> u64 {
    120_000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Batch client configuration
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchConfig {
    /// Blob service endpoint, optionally with a SAS query
    #[serde(default)]
    pub service_url: Option<String>,
    /// Storage account name
    #[serde(default)]
    pub account_name: Option<String>,
    /// Base64 account key; enables Shared Key authorization
    #[serde(default, skip_serializing)]
    pub account_key: Option<String>,
    /// Full connection string; takes precedence over the fields above
    #[serde(default, skip_serializing)]
    pub connection_string: Option<String>,
    /// Service version sent on the batch request
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry settings
    #[serde(default)]
    pub retry: RetrySettings,
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            account_name: None,
            account_key: None,
            connection_string: None,
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            retry: RetrySettings::default(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("service_url", &self.service_url)
            .field("account_name", &self.account_name)
            .field("account_key", &self.account_key.as_ref().map(|_| "<redacted>"))
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
        }
    }
}

impl RetrySettings {
    pub fn to_options(&self) -> RetryOptions {
        RetryOptions {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_retry_delay: Duration::from_millis(self.max_retry_delay_ms),
        }
    }
}
