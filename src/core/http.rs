//! HTTP message model
//!
//! `Request` is what stages mutate and what the renderer serializes into a
//! batch part; `RawResponse` is what transports return and what the batch
//! parser reconstructs for every sub-response.

use crate::utils::error::{BatchError, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};

/// Line terminator used by HTTP/1.1 and by multipart bodies
pub const LINE_ENDING: &str = "\r\n";

/// Format a timestamp the way HTTP date headers expect it
pub fn format_http_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Outgoing HTTP request
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Create a request with no headers and an empty body
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set (replace) a header. Names are stored lower-case.
    pub fn set_header(&mut self, name: &str, value: impl AsRef<str>) -> Result<()> {
        let value = value.as_ref();
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| BatchError::InvalidRequest(format!("Invalid header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            BatchError::InvalidRequest(format!("Invalid header value for '{}': {}", name, e))
        })?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    pub fn remove_header(&mut self, name: &str) -> Option<HeaderValue> {
        self.headers.remove(name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Path plus query, as written on the request line
    pub fn relative_url(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    /// Request line, headers sorted by name, and the blank line. No body.
    pub fn pre_body(&self) -> String {
        let mut message = format!(
            "{} {} HTTP/1.1{}",
            self.method.as_str(),
            self.relative_url(),
            LINE_ENDING
        );

        let mut headers: Vec<(&HeaderName, &HeaderValue)> = self.headers.iter().collect();
        headers.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        for (name, value) in headers {
            message.push_str(name.as_str());
            message.push_str(": ");
            message.push_str(&String::from_utf8_lossy(value.as_bytes()));
            message.push_str(LINE_ENDING);
        }

        message.push_str(LINE_ENDING);
        message
    }
}

/// HTTP response as received, or as reconstructed from a batch part
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub major_version: u16,
    pub minor_version: u16,
    pub status: StatusCode,
    pub reason: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// HTTP/1.1 response with the canonical reason phrase and no headers
    pub fn new(status: StatusCode) -> Self {
        Self {
            major_version: 1,
            minor_version: 1,
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Builder-style header insertion. Invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Header value as text, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Drain a `reqwest` response into a raw response
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let (major_version, minor_version) = match response.version() {
            reqwest::Version::HTTP_09 => (0, 9),
            reqwest::Version::HTTP_10 => (1, 0),
            reqwest::Version::HTTP_2 => (2, 0),
            reqwest::Version::HTTP_3 => (3, 0),
            _ => (1, 1),
        };
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self {
            major_version,
            minor_version,
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
