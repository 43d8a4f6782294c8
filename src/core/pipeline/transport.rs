//! Terminal pipeline stages

use super::Context;
use crate::core::http::{RawResponse, Request};
use crate::utils::error::{BatchError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Capability at the end of every pipeline: forward the request and receive
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, ctx: &Context, request: &Request) -> Result<Option<RawResponse>>;
}

/// Real network exchange through `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with its own connection pool and request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| BatchError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Reuse an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, ctx: &Context, request: &Request) -> Result<Option<RawResponse>> {
        debug!(method = %request.method(), url = %request.url(), "Sending HTTP request");

        let exchange = async {
            let response = self
                .client
                .request(request.method().clone(), request.url().clone())
                .headers(request.headers().clone())
                .body(request.body().clone())
                .send()
                .await?;
            RawResponse::from_reqwest(response).await
        };

        tokio::select! {
            _ = ctx.cancelled() => Err(BatchError::Cancelled),
            response = exchange => {
                let response = response?;
                debug!(status = response.status.as_u16(), "Received HTTP response");
                Ok(Some(response))
            }
        }
    }
}

/// Terminal stage that performs no I/O and yields no response
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransport;

#[async_trait]
impl Transport for NoopTransport {
    async fn send(&self, _ctx: &Context, _request: &Request) -> Result<Option<RawResponse>> {
        Ok(None)
    }
}
