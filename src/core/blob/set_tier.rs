//! Set Blob Tier

use super::codec::{API_VERSION, HEADER_VERSION, SubRequestCodec, blob_url};
use super::{AccessTier, SetBlobAccessTierOptions, SetBlobAccessTierResult, StorageError};
use crate::core::http::{RawResponse, Request};
use crate::utils::error::Result;
use reqwest::{Method, StatusCode};
use url::Url;

/// `PUT /<container>/<blob>?comp=tier`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetBlobAccessTierSubRequest {
    pub container: String,
    pub blob: String,
    pub tier: AccessTier,
    pub options: SetBlobAccessTierOptions,
}

impl SetBlobAccessTierSubRequest {
    pub fn new(
        container: impl Into<String>,
        blob: impl Into<String>,
        tier: AccessTier,
        options: SetBlobAccessTierOptions,
    ) -> Self {
        Self {
            container: container.into(),
            blob: blob.into(),
            tier,
            options,
        }
    }
}

impl SubRequestCodec for SetBlobAccessTierSubRequest {
    type Output = SetBlobAccessTierResult;

    fn encode(&self, service_url: &Url) -> Result<Request> {
        let mut url = blob_url(service_url, &self.container, &self.blob)?;
        url.query_pairs_mut().append_pair("comp", "tier");

        let mut request = Request::new(Method::PUT, url);
        request.set_header("content-length", "0")?;
        request.set_header(HEADER_VERSION, API_VERSION)?;
        request.set_header("x-ms-access-tier", self.tier.as_str())?;
        if let Some(priority) = self.options.rehydrate_priority {
            request.set_header("x-ms-rehydrate-priority", priority.as_str())?;
        }
        Ok(request)
    }

    fn decode(
        &self,
        response: RawResponse,
    ) -> std::result::Result<SetBlobAccessTierResult, StorageError> {
        if response.status == StatusCode::OK || response.status == StatusCode::ACCEPTED {
            Ok(SetBlobAccessTierResult::from_response(&response))
        } else {
            Err(StorageError::from_response(response))
        }
    }
}
