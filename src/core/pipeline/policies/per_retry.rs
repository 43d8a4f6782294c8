//! Per-attempt date stamping

use crate::core::http::{RawResponse, Request, format_http_date};
use crate::core::pipeline::{Context, Next, Stage};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;

/// Sets `x-ms-date` to the current time on every attempt, so each retry is
/// signed with a fresh timestamp
#[derive(Debug, Clone, Copy, Default)]
pub struct StoragePerRetryPolicy;

#[async_trait]
impl Stage for StoragePerRetryPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Option<RawResponse>> {
        request.set_header("x-ms-date", format_http_date(&Utc::now()))?;
        next.send(ctx, request).await
    }
}
