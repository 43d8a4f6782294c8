//! Interceptor pipeline
//!
//! A pipeline is an ordered list of [`Stage`]s that ends in one [`Transport`].
//! Each stage may mutate the outgoing request, forward it through [`Next`],
//! and inspect or replace whatever comes back.
//!
//! The batch client builds two pipelines from the same stages: one that ends
//! in a real HTTP transport, and one that ends in [`NoopTransport`] so that
//! signing and header stamping run on sub-requests that are only rendered,
//! never sent on their own.

mod context;
pub mod policies;
mod transport;


pub use context::Context;
pub use transport::{HttpTransport, NoopTransport, Transport};

use crate::core::http::{RawResponse, Request};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// One interceptor in a pipeline
#[async_trait]
pub trait Stage: Send + Sync + fmt::Debug {
    /// Process the request, normally by forwarding it through `next`
    ///
    /// `Ok(None)` means the terminal transport produced no response, which is
    /// the normal result of the no-op transport.
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Option<RawResponse>>;
}

/// Remainder of the pipeline after the current stage
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    /// Forward the request to the following stage, or to the transport
    ///
    /// Cancellation is checked before every hop.
    pub async fn send(self, ctx: &Context, request: &mut Request) -> Result<Option<RawResponse>> {
        ctx.check()?;
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    transport: self.transport,
                };
                stage.send(ctx, request, next).await
            }
            None => self.transport.send(ctx, request).await,
        }
    }

    /// Number of stages still ahead, not counting the transport
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }
}

/// Ordered stages plus a terminal transport. Immutable once built.
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Stage>>, transport: Arc<dyn Transport>) -> Self {
        Self { stages, transport }
    }

    /// Run the request through every stage and the transport
    pub async fn send(&self, ctx: &Context, request: &mut Request) -> Result<Option<RawResponse>> {
        let next = Next {
            stages: &self.stages,
            transport: self.transport.as_ref(),
        };
        next.send(ctx, request).await
    }

    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .field("transport", &self.transport)
            .finish()
    }
}
