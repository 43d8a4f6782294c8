//! User-Agent tagging

use crate::core::http::{RawResponse, Request};
use crate::core::pipeline::{Context, Next, Stage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Prefixes the request's `User-Agent` with the package name and version
#[derive(Debug, Clone)]
pub struct TelemetryPolicy {
    user_agent: String,
}

impl TelemetryPolicy {
    pub fn new(package_name: &str, package_version: &str) -> Self {
        Self {
            user_agent: format!(
                "{}/{} (rust; {})",
                package_name,
                package_version,
                std::env::consts::OS
            ),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for TelemetryPolicy {
    fn default() -> Self {
        Self::new(crate::NAME, crate::VERSION)
    }
}

#[async_trait]
impl Stage for TelemetryPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Option<RawResponse>> {
        let value = match request.header("user-agent") {
            Some(existing) => format!("{} {}", self.user_agent, existing),
            None => self.user_agent.clone(),
        };
        request.set_header("user-agent", value)?;
        next.send(ctx, request).await
    }
}
