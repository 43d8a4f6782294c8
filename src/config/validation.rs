//! Configuration validation

use super::ConnectionString;
use super::models::BatchConfig;
use crate::utils::error::{BatchError, Result};
use tracing::debug;
use url::Url;

impl BatchConfig {
    /// Reject configurations that cannot produce a working client
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        if let Some(connection_string) = &self.connection_string {
            ConnectionString::parse(connection_string)?;
        } else {
            let service_url = self.resolved_service_url()?;
            let url = Url::parse(&service_url)
                .map_err(|e| BatchError::Config(format!("Invalid service_url: {}", e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(BatchError::Config(format!(
                    "service_url must use http:// or https:// scheme, got: {}",
                    url.scheme()
                )));
            }
            if self.account_key.is_some() && self.account_name.is_none() {
                return Err(BatchError::Config(
                    "account_key requires account_name".to_string(),
                ));
            }
        }

        if self.api_version.trim().is_empty() {
            return Err(BatchError::Config("api_version must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(BatchError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.retry.retry_delay_ms > self.retry.max_retry_delay_ms {
            return Err(BatchError::Config(format!(
                "retry_delay_ms ({}) must not exceed max_retry_delay_ms ({})",
                self.retry.retry_delay_ms, self.retry.max_retry_delay_ms
            )));
        }

        Ok(())
    }
}
