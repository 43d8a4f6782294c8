//! Multipart request rendering

use super::{BlobBatch, OperationKind, PendingSubOperation};
use crate::core::blob::{HEADER_VERSION, SubRequestCodec};
use crate::core::http::{LINE_ENDING, Request};
use crate::core::pipeline::{Context, Pipeline};
use crate::utils::error::Result;
use bytes::Bytes;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// Media type prefix of a batch body; the boundary follows it
pub const MULTIPART_MIXED_PREFIX: &str = "multipart/mixed; boundary=";

/// Multipart body ready for submission
#[derive(Debug, Clone)]
pub struct RenderedBatch {
    pub boundary: String,
    pub body: Bytes,
    /// Kind of each part, in correlation order
    pub kinds: Vec<OperationKind>,
}

impl RenderedBatch {
    /// `Content-Type` header value for the aggregate request
    pub fn content_type(&self) -> String {
        format!("{}{}", MULTIPART_MIXED_PREFIX, self.boundary)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Fresh boundary token, `batch_<uuid>`
pub fn new_boundary() -> String {
    format!("batch_{}", Uuid::new_v4())
}

/// Envelope that opens part `content_id`
pub fn part_envelope(boundary: &str, content_id: usize) -> String {
    format!(
        "--{boundary}{nl}Content-Type: application/http{nl}Content-Transfer-Encoding: binary{nl}Content-ID: {content_id}{nl}{nl}",
        boundary = boundary,
        content_id = content_id,
        nl = LINE_ENDING,
    )
}

/// Render `batch` with a freshly generated boundary
pub async fn render_batch(
    ctx: &Context,
    pipeline: &Pipeline,
    service_url: &Url,
    batch: &BlobBatch,
) -> Result<RenderedBatch> {
    render_batch_with_boundary(ctx, pipeline, service_url, batch, new_boundary()).await
}

/// Render `batch` into a multipart body delimited by `boundary`
///
/// Every sub-request is encoded, stripped of its version header and passed
/// through `pipeline`, which is expected to end in a no-op transport. The
/// headers the stages leave on the request are what gets rendered.
pub async fn render_batch_with_boundary(
    ctx: &Context,
    pipeline: &Pipeline,
    service_url: &Url,
    batch: &BlobBatch,
    boundary: String,
) -> Result<RenderedBatch> {
    let mut body = String::new();
    let mut kinds = Vec::with_capacity(batch.len());

    for (index, operation) in batch.iter().enumerate() {
        let mut request = encode(operation, service_url)?;
        request.remove_header(HEADER_VERSION);

        if pipeline.send(ctx, &mut request).await?.is_some() {
            debug!(index, "Encoding pipeline returned a response; ignoring it");
        }

        body.push_str(&part_envelope(&boundary, index));
        body.push_str(&request.pre_body());
        kinds.push(operation.kind());
        debug!(index, kind = %operation.kind(), url = %request.url(), "Rendered batch part");
    }

    body.push_str("--");
    body.push_str(&boundary);
    body.push_str("--");
    body.push_str(LINE_ENDING);

    Ok(RenderedBatch {
        boundary,
        body: Bytes::from(body),
        kinds,
    })
}

fn encode(operation: &PendingSubOperation, service_url: &Url) -> Result<Request> {
    match operation {
        PendingSubOperation::DeleteBlob(op) => op.encode(service_url),
        PendingSubOperation::SetBlobAccessTier(op) => op.encode(service_url),
    }
}
