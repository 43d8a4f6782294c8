//! Encoder/decoder seam shared by every sub-operation kind

use super::StorageError;
use crate::core::http::{RawResponse, Request};
use crate::utils::error::{BatchError, Result};
use url::Url;

/// Service version sent on the aggregate batch request
pub const API_VERSION: &str = "2020-02-10";

/// Header carrying the service version
pub const HEADER_VERSION: &str = "x-ms-version";

/// Encoder/decoder pair for one sub-operation kind
pub trait SubRequestCodec {
    type Output;

    /// Build the standalone request for this operation
    fn encode(&self, service_url: &Url) -> Result<Request>;

    /// Interpret the sub-response the service returned for this operation
    fn decode(&self, response: RawResponse) -> std::result::Result<Self::Output, StorageError>;
}

/// Address `<service>/<container>/<blob>`, keeping `/` inside the blob name
/// as a path separator and percent-encoding everything else
pub fn blob_url(service_url: &Url, container: &str, blob: &str) -> Result<Url> {
    if container.is_empty() {
        return Err(BatchError::InvalidRequest(
            "Container name must not be empty".to_string(),
        ));
    }
    if blob.is_empty() {
        return Err(BatchError::InvalidRequest(
            "Blob name must not be empty".to_string(),
        ));
    }

    let mut url = service_url.clone();
    url.set_fragment(None);
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            BatchError::InvalidRequest(format!("Service URL cannot be a base: {}", service_url))
        })?;
        segments.pop_if_empty();
        segments.push(container);
        segments.extend(blob.split('/'));
    }
    Ok(url)
}
