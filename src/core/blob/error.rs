//! Per-sub-operation service error

use crate::core::http::RawResponse;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Failure reported by the service for a single storage request
///
/// Carries the full raw response so callers can inspect anything the typed
/// fields do not cover.
#[derive(Error, Debug, Clone)]
#[error(
    "Storage request failed with status {status}: {}",
    .error_code.as_deref().unwrap_or("UnknownError")
)]
pub struct StorageError {
    pub status: StatusCode,
    pub reason: String,
    pub error_code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
    pub raw: RawResponse,
}

impl StorageError {
    /// Capture a non-success response
    ///
    /// The error code comes from `x-ms-error-code`, falling back to the
    /// `<Code>` element of an XML error body.
    pub fn from_response(response: RawResponse) -> Self {
        let body = String::from_utf8_lossy(&response.body);
        let error_code = response
            .header("x-ms-error-code")
            .map(str::to_string)
            .or_else(|| xml_element(&body, "Code"));
        let message = xml_element(&body, "Message");

        Self {
            status: response.status,
            reason: response.reason.clone(),
            error_code,
            message,
            request_id: response.header("x-ms-request-id").map(str::to_string),
            raw: response,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.raw.headers
    }
}

fn xml_element(body: &str, name: &str) -> Option<String> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    let text = body[start..end].trim();
    (!text.is_empty()).then(|| text.to_string())
}
