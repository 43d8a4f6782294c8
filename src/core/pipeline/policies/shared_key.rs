//! Shared Key authorization
//!
//! Signs each request with HMAC-SHA256 over a canonical string built from the
//! verb, the standard headers, the sorted `x-ms-*` headers and the resource
//! path with its query parameters.

use crate::core::http::{RawResponse, Request};
use crate::core::pipeline::{Context, Next, Stage};
use crate::utils::error::{BatchError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Headers that enter the string to sign by position
const SIGNED_STANDARD_HEADERS: [&str; 11] = [
    "content-encoding",
    "content-language",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
    "range",
];

/// Storage account name plus base64-encoded account key
#[derive(Clone)]
pub struct StorageSharedKeyCredential {
    account_name: String,
    account_key: String,
}

impl StorageSharedKeyCredential {
    pub fn new(account_name: impl Into<String>, account_key: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
        }
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Base64 HMAC-SHA256 of `string_to_sign` keyed with the decoded account key
    pub fn sign(&self, string_to_sign: &str) -> Result<String> {
        let key = STANDARD
            .decode(self.account_key.as_bytes())
            .map_err(|e| BatchError::Credential(format!("Account key is not valid base64: {}", e)))?;
        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| BatchError::Credential(format!("HMAC key error: {}", e)))?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for StorageSharedKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSharedKeyCredential")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .finish()
    }
}

/// Sets `Authorization: SharedKey <account>:<signature>`
#[derive(Debug, Clone)]
pub struct SharedKeyPolicy {
    credential: Arc<StorageSharedKeyCredential>,
}

impl SharedKeyPolicy {
    pub fn new(credential: Arc<StorageSharedKeyCredential>) -> Self {
        Self { credential }
    }

    pub(crate) fn string_to_sign(&self, request: &Request) -> String {
        let mut string_to_sign = String::new();
        string_to_sign.push_str(request.method().as_str());
        string_to_sign.push('\n');

        for name in SIGNED_STANDARD_HEADERS {
            let value = request.header(name).unwrap_or_default();
            // zero length is signed as empty
            if !(name == "content-length" && value == "0") {
                string_to_sign.push_str(value);
            }
            string_to_sign.push('\n');
        }

        let mut ms_headers: Vec<(&str, String)> = request
            .headers()
            .iter()
            .filter(|(name, _)| name.as_str().starts_with("x-ms-"))
            .map(|(name, value)| {
                (
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).trim().to_string(),
                )
            })
            .collect();
        ms_headers.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in ms_headers {
            string_to_sign.push_str(name);
            string_to_sign.push(':');
            string_to_sign.push_str(&value);
            string_to_sign.push('\n');
        }

        string_to_sign.push('/');
        string_to_sign.push_str(&self.credential.account_name);
        string_to_sign.push_str(request.url().path());

        let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in request.url().query_pairs() {
            query
                .entry(name.to_lowercase())
                .or_default()
                .push(value.into_owned());
        }
        for (name, mut values) in query {
            values.sort();
            string_to_sign.push('\n');
            string_to_sign.push_str(&name);
            string_to_sign.push(':');
            string_to_sign.push_str(&values.join(","));
        }

        string_to_sign
    }
}

#[async_trait]
impl Stage for SharedKeyPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Option<RawResponse>> {
        let signature = self.credential.sign(&self.string_to_sign(request))?;
        request.set_header(
            "authorization",
            format!("SharedKey {}:{}", self.credential.account_name, signature),
        )?;
        next.send(ctx, request).await
    }
}
