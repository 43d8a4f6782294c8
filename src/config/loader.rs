//! Configuration loading

use super::models::BatchConfig;
use crate::core::batch::{BatchClientOptions, BlobBatchClient};
use crate::core::pipeline::policies::StorageSharedKeyCredential;
use crate::utils::error::{BatchError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "STORAGE_BATCH_";

impl BatchConfig {
    /// Parse a YAML configuration file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BatchError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| BatchError::Config(format!("Failed to parse config: {}", e)))?;

        debug!("Configuration file parsed successfully");
        Ok(config)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_vars(std::env::vars())
    }

    /// Defaults overridden by the given `(name, value)` pairs
    pub fn from_env_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();
        config.apply_env(vars)?;
        Ok(config)
    }

    /// Optional file, then process environment overrides, then validation
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STORAGE_BATCH_*` overrides; unrelated variables are ignored
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "SERVICE_URL" => self.service_url = Some(value),
                "ACCOUNT_NAME" => self.account_name = Some(value),
                "ACCOUNT_KEY" => self.account_key = Some(value),
                "CONNECTION_STRING" => self.connection_string = Some(value),
                "API_VERSION" => self.api_version = value,
                "TIMEOUT_SECS" => self.timeout_secs = parse(&name, &value)?,
                "MAX_RETRIES" => self.retry.max_retries = parse(&name, &value)?,
                "RETRY_DELAY_MS" => self.retry.retry_delay_ms = parse(&name, &value)?,
                "MAX_RETRY_DELAY_MS" => self.retry.max_retry_delay_ms = parse(&name, &value)?,
                "LOG_LEVEL" => self.log_level = value,
                "LOG_JSON" => self.log_json = parse(&name, &value)?,
                _ => {
                    debug!("Ignoring unknown environment variable {}", name);
                    continue;
                }
            }
            debug!("Applied environment override {}", name);
        }
        Ok(())
    }

    /// Options for the client's pipelines
    pub fn client_options(&self) -> BatchClientOptions {
        BatchClientOptions {
            retry: self.retry.to_options(),
            timeout: Duration::from_secs(self.timeout_secs),
            api_version: self.api_version.clone(),
            ..Default::default()
        }
    }

    /// Build a client using the most specific credential configured
    pub fn build_client(&self) -> Result<BlobBatchClient> {
        self.build_client_with(self.client_options())
    }

    /// Like [`build_client`](Self::build_client) with caller-supplied options
    pub fn build_client_with(&self, options: BatchClientOptions) -> Result<BlobBatchClient> {
        if let Some(connection_string) = &self.connection_string {
            return BlobBatchClient::from_connection_string(connection_string, options);
        }

        let service_url = self.resolved_service_url()?;
        match (&self.account_name, &self.account_key) {
            (Some(name), Some(key)) => BlobBatchClient::with_shared_key(
                &service_url,
                Arc::new(StorageSharedKeyCredential::new(name, key)),
                options,
            ),
            _ => BlobBatchClient::new(&service_url, options),
        }
    }

    /// Explicit service URL, or the public endpoint of the named account
    pub fn resolved_service_url(&self) -> Result<String> {
        match (&self.service_url, &self.account_name) {
            (Some(url), _) => Ok(url.clone()),
            (None, Some(account)) => Ok(format!("https://{}.blob.core.windows.net", account)),
            (None, None) => Err(BatchError::Config(
                "No service_url, account_name or connection_string configured".to_string(),
            )),
        }
    }
}

fn parse<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| BatchError::Config(format!("Invalid value for {}: {}", name, e)))
}
