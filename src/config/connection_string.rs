//! Storage connection strings

use crate::core::pipeline::policies::StorageSharedKeyCredential;
use crate::utils::error::{BatchError, Result};
use std::collections::HashMap;
use url::Url;

const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Parsed `Key=Value;...` connection string
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionString {
    pub protocol: Option<String>,
    pub account_name: Option<String>,
    pub account_key: Option<String>,
    pub endpoint_suffix: Option<String>,
    pub blob_endpoint: Option<String>,
    pub shared_access_signature: Option<String>,
}

impl ConnectionString {
    pub fn parse(connection_string: &str) -> Result<Self> {
        let mut values: HashMap<String, String> = HashMap::new();
        for pair in connection_string.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                BatchError::Config("Connection string segment without '='".to_string())
            })?;
            values.insert(key.trim().to_string(), value.trim().to_string());
        }

        if values
            .get("UseDevelopmentStorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Ok(Self {
                protocol: Some("http".to_string()),
                account_name: Some(DEV_ACCOUNT_NAME.to_string()),
                account_key: Some(DEV_ACCOUNT_KEY.to_string()),
                blob_endpoint: Some(DEV_BLOB_ENDPOINT.to_string()),
                ..Default::default()
            });
        }

        let parsed = Self {
            protocol: values.remove("DefaultEndpointsProtocol"),
            account_name: values.remove("AccountName"),
            account_key: values.remove("AccountKey"),
            endpoint_suffix: values.remove("EndpointSuffix"),
            blob_endpoint: values.remove("BlobEndpoint"),
            shared_access_signature: values.remove("SharedAccessSignature"),
        };
        if parsed.account_name.is_none() && parsed.blob_endpoint.is_none() {
            return Err(BatchError::Config(
                "Connection string needs AccountName or BlobEndpoint".to_string(),
            ));
        }
        Ok(parsed)
    }

    /// Blob service endpoint with the SAS token, if any, as its query
    pub fn blob_service_url(&self) -> Result<Url> {
        let mut url = match (&self.blob_endpoint, &self.account_name) {
            (Some(endpoint), _) => Url::parse(endpoint)?,
            (None, Some(account)) => Url::parse(&format!(
                "{}://{}.blob.{}",
                self.protocol.as_deref().unwrap_or("https"),
                account,
                self.endpoint_suffix.as_deref().unwrap_or("core.windows.net")
            ))?,
            (None, None) => {
                return Err(BatchError::Config(
                    "Connection string has no blob endpoint".to_string(),
                ));
            }
        };

        if let Some(sas) = &self.shared_access_signature {
            url.set_query(Some(sas.trim_start_matches('?')));
        }
        Ok(url)
    }

    /// Shared Key credential when both account name and key are present
    pub fn shared_key_credential(&self) -> Option<StorageSharedKeyCredential> {
        match (&self.account_name, &self.account_key) {
            (Some(name), Some(key)) => Some(StorageSharedKeyCredential::new(name, key)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("protocol", &self.protocol)
            .field("account_name", &self.account_name)
            .field("endpoint_suffix", &self.endpoint_suffix)
            .field("blob_endpoint", &self.blob_endpoint)
            .finish_non_exhaustive()
    }
}
