//! Client request ID injection

use crate::core::http::{RawResponse, Request};
use crate::core::pipeline::{Context, Next, Stage};
use crate::utils::error::Result;
use crate::utils::generate_request_id;
use async_trait::async_trait;
use tracing::debug;

/// Header the service echoes back to correlate requests
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Adds a fresh UUID as the client request ID unless the caller set one
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdPolicy;

#[async_trait]
impl Stage for RequestIdPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Option<RawResponse>> {
        if request.header(CLIENT_REQUEST_ID_HEADER).is_none() {
            let request_id = generate_request_id();
            debug!("Processing request: {}", request_id);
            request.set_header(CLIENT_REQUEST_ID_HEADER, &request_id)?;
        }
        next.send(ctx, request).await
    }
}
