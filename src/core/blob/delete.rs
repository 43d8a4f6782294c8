//! Delete Blob

use super::codec::{API_VERSION, HEADER_VERSION, SubRequestCodec, blob_url};
use super::{DeleteBlobOptions, DeleteBlobResult, StorageError};
use crate::core::http::{RawResponse, Request};
use crate::utils::error::Result;
use reqwest::{Method, StatusCode};
use url::Url;

/// `DELETE /<container>/<blob>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteBlobSubRequest {
    pub container: String,
    pub blob: String,
    pub options: DeleteBlobOptions,
}

impl DeleteBlobSubRequest {
    pub fn new(
        container: impl Into<String>,
        blob: impl Into<String>,
        options: DeleteBlobOptions,
    ) -> Self {
        Self {
            container: container.into(),
            blob: blob.into(),
            options,
        }
    }
}

impl SubRequestCodec for DeleteBlobSubRequest {
    type Output = DeleteBlobResult;

    fn encode(&self, service_url: &Url) -> Result<Request> {
        let url = blob_url(service_url, &self.container, &self.blob)?;
        let mut request = Request::new(Method::DELETE, url);
        request.set_header(HEADER_VERSION, API_VERSION)?;
        if let Some(option) = self.options.delete_snapshots {
            request.set_header("x-ms-delete-snapshots", option.as_str())?;
        }
        self.options.access_conditions.apply(&mut request)?;
        Ok(request)
    }

    fn decode(&self, response: RawResponse) -> std::result::Result<DeleteBlobResult, StorageError> {
        if response.status == StatusCode::ACCEPTED {
            Ok(DeleteBlobResult::from_response(&response))
        } else {
            Err(StorageError::from_response(response))
        }
    }
}
