//! OAuth bearer token authorization

use crate::core::http::{RawResponse, Request};
use crate::core::pipeline::{Context, Next, Stage};
use crate::utils::error::{BatchError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Default scope for Azure Storage data plane tokens
pub const STORAGE_SCOPE: &str = "https://storage.azure.com/.default";

/// Tokens this close to expiry are refreshed before use
const REFRESH_MARGIN_SECS: i64 = 120;

/// Bearer token plus its expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_on - now > Duration::seconds(REFRESH_MARGIN_SECS)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, ctx: &Context, scopes: &[String]) -> Result<AccessToken>;
}

/// Credential that always hands out the same token
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token, DateTime::<Utc>::MAX_UTC),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _ctx: &Context, _scopes: &[String]) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}

/// Sets `Authorization: Bearer <token>`, caching the token until near expiry
pub struct BearerTokenPolicy {
    credential: Arc<dyn TokenCredential>,
    scopes: Vec<String>,
    cache: Mutex<Option<AccessToken>>,
}

impl BearerTokenPolicy {
    pub fn new(credential: Arc<dyn TokenCredential>, scopes: Vec<String>) -> Self {
        Self {
            credential,
            scopes,
            cache: Mutex::new(None),
        }
    }

    async fn token(&self, ctx: &Context) -> Result<String> {
        let now = Utc::now();
        let cached = self
            .cache
            .lock()
            .as_ref()
            .filter(|token| token.is_fresh(now))
            .map(|token| token.token.clone());
        if let Some(token) = cached {
            return Ok(token);
        }

        debug!("Acquiring bearer token for scopes {:?}", self.scopes);
        let token = self.credential.get_token(ctx, &self.scopes).await?;
        let value = token.token.clone();
        *self.cache.lock() = Some(token);
        Ok(value)
    }
}

impl fmt::Debug for BearerTokenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenPolicy")
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for BearerTokenPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Option<RawResponse>> {
        if request.url().scheme() != "https" {
            return Err(BatchError::Credential(
                "Bearer token authorization requires an https URL".to_string(),
            ));
        }

        let token = self.token(ctx).await?;
        request.set_header("authorization", format!("Bearer {}", token))?;
        next.send(ctx, request).await
    }
}
