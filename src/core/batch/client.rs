//! Blob batch client

use super::{
    BlobBatch, RenderedBatch, SubmitBatchResult, aggregate, boundary_from_content_type,
    parse_batch_response, render_batch,
};
use crate::config::ConnectionString;
use crate::core::blob::{API_VERSION, HEADER_VERSION, StorageError};
use crate::core::http::Request;
use crate::core::pipeline::policies::{
    BearerTokenPolicy, RequestIdPolicy, RetryOptions, RetryPolicy, STORAGE_SCOPE, SharedKeyPolicy,
    StorageSharedKeyCredential, StoragePerRetryPolicy, TelemetryPolicy, TokenCredential,
};
use crate::core::pipeline::{Context, HttpTransport, NoopTransport, Pipeline, Stage, Transport};
use crate::utils::error::{BatchError, Result};
use crate::utils::truncate_string;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

/// Options shared by both pipelines of a [`BlobBatchClient`]
#[derive(Debug, Clone)]
pub struct BatchClientOptions {
    pub retry: RetryOptions,
    /// Per-request timeout of the HTTP transport
    pub timeout: Duration,
    /// Value of `x-ms-version` on the aggregate request
    pub api_version: String,
    /// Custom stages that run once per operation, before retry
    pub per_operation_stages: Vec<Arc<dyn Stage>>,
    /// Custom stages that run on every attempt
    pub per_retry_stages: Vec<Arc<dyn Stage>>,
    /// Replaces the default `reqwest` transport
    pub transport: Option<Arc<dyn Transport>>,
}

impl Default for BatchClientOptions {
    fn default() -> Self {
        Self {
            retry: RetryOptions::default(),
            timeout: Duration::from_secs(60),
            api_version: API_VERSION.to_string(),
            per_operation_stages: Vec::new(),
            per_retry_stages: Vec::new(),
            transport: None,
        }
    }
}

/// Submits [`BlobBatch`]es against one storage account
///
/// Holds two pipelines built from the same stages: the submission pipeline
/// ends in the HTTP transport, the sub-request pipeline in a no-op transport
/// and only formats and signs sub-requests for rendering.
#[derive(Debug, Clone)]
pub struct BlobBatchClient {
    service_url: Url,
    pipeline: Arc<Pipeline>,
    sub_request_pipeline: Arc<Pipeline>,
    api_version: String,
}

impl BlobBatchClient {
    /// Client without credentials; the URL may carry a SAS token
    pub fn new(service_url: &str, options: BatchClientOptions) -> Result<Self> {
        Self::build(service_url, None, options)
    }

    /// Client that signs requests with the account key
    pub fn with_shared_key(
        service_url: &str,
        credential: Arc<StorageSharedKeyCredential>,
        options: BatchClientOptions,
    ) -> Result<Self> {
        let auth: Arc<dyn Stage> = Arc::new(SharedKeyPolicy::new(credential));
        Self::build(service_url, Some(auth), options)
    }

    /// Client that authorizes requests with OAuth bearer tokens
    pub fn with_token_credential(
        service_url: &str,
        credential: Arc<dyn TokenCredential>,
        options: BatchClientOptions,
    ) -> Result<Self> {
        let auth: Arc<dyn Stage> = Arc::new(BearerTokenPolicy::new(
            credential,
            vec![STORAGE_SCOPE.to_string()],
        ));
        Self::build(service_url, Some(auth), options)
    }

    /// Client from a storage connection string
    ///
    /// Uses Shared Key authorization when the string has an account key,
    /// anonymous access (with any SAS token appended) otherwise.
    pub fn from_connection_string(
        connection_string: &str,
        options: BatchClientOptions,
    ) -> Result<Self> {
        let parsed = ConnectionString::parse(connection_string)?;
        let service_url = parsed.blob_service_url()?;
        match parsed.shared_key_credential() {
            Some(credential) => {
                Self::with_shared_key(service_url.as_str(), Arc::new(credential), options)
            }
            None => Self::new(service_url.as_str(), options),
        }
    }

    fn build(
        service_url: &str,
        auth: Option<Arc<dyn Stage>>,
        options: BatchClientOptions,
    ) -> Result<Self> {
        let service_url = Url::parse(service_url)?;

        let mut shared: Vec<Arc<dyn Stage>> = Vec::new();
        shared.extend(options.per_operation_stages.iter().cloned());
        shared.push(Arc::new(RetryPolicy::new(options.retry.clone())));
        shared.extend(options.per_retry_stages.iter().cloned());
        shared.push(Arc::new(StoragePerRetryPolicy));
        shared.extend(auth);

        let telemetry: Arc<dyn Stage> = Arc::new(TelemetryPolicy::default());

        let mut stages: Vec<Arc<dyn Stage>> = vec![telemetry.clone(), Arc::new(RequestIdPolicy)];
        stages.extend(shared.iter().cloned());
        let transport: Arc<dyn Transport> = match options.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(options.timeout)?),
        };

        let mut sub_request_stages: Vec<Arc<dyn Stage>> = vec![telemetry];
        sub_request_stages.extend(shared);

        Ok(Self {
            service_url,
            pipeline: Arc::new(Pipeline::new(stages, transport)),
            sub_request_pipeline: Arc::new(Pipeline::new(
                sub_request_stages,
                Arc::new(NoopTransport),
            )),
            api_version: options.api_version,
        })
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Pipeline that sends the aggregate request
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Pipeline that formats and signs sub-requests without sending them
    pub fn sub_request_pipeline(&self) -> &Pipeline {
        &self.sub_request_pipeline
    }

    /// Render the multipart body for `batch` without submitting it
    pub async fn render_batch(&self, ctx: &Context, batch: &BlobBatch) -> Result<RenderedBatch> {
        render_batch(ctx, &self.sub_request_pipeline, &self.service_url, batch).await
    }

    /// Submit every sub-operation of `batch` in one request
    ///
    /// Returns one outcome per sub-operation, in order. Errors are reserved
    /// for failures of the batch as a whole: cancellation, transport errors,
    /// a rejected aggregate request, or a malformed multipart response.
    pub async fn submit_batch(&self, ctx: &Context, batch: &BlobBatch) -> Result<SubmitBatchResult> {
        if batch.is_empty() {
            return Err(BatchError::InvalidRequest(
                "Batch must contain at least one sub-operation".to_string(),
            ));
        }
        ctx.check()?;

        let rendered = self.render_batch(ctx, batch).await?;
        info!(
            operations = rendered.len(),
            boundary = %rendered.boundary,
            bytes = rendered.body.len(),
            "Submitting blob batch"
        );

        let mut url = self.service_url.clone();
        url.query_pairs_mut().append_pair("comp", "batch");
        let mut request = Request::new(Method::POST, url);
        request.set_header("content-type", rendered.content_type())?;
        request.set_header(HEADER_VERSION, &self.api_version)?;
        request.set_header("content-length", rendered.body.len().to_string())?;
        request.set_body(rendered.body.clone());

        let response = self
            .pipeline
            .send(ctx, &mut request)
            .await?
            .ok_or(BatchError::MissingResponse)?;

        if response.status != StatusCode::ACCEPTED {
            let error = StorageError::from_response(response);
            error!("Blob batch rejected: {}", error);
            return Err(BatchError::Service(Box::new(error)));
        }

        let boundary = boundary_from_content_type(response.header("content-type"))?;
        let parts = parse_batch_response(&response.body, &boundary).inspect_err(|e| {
            error!(
                body = %truncate_string(&String::from_utf8_lossy(&response.body), 256),
                "Failed to parse blob batch response: {}",
                e
            );
        })?;
        let outcomes = aggregate(batch, parts)?;

        let result = SubmitBatchResult {
            outcomes,
            status: response.status,
            headers: response.headers,
        };
        info!(
            succeeded = result.succeeded(),
            failed = result.failed(),
            request_id = result.request_id().unwrap_or_default(),
            "Blob batch completed"
        );
        Ok(result)
    }
}
