//! Options and results for blob sub-operations

use crate::core::http::{RawResponse, Request, format_http_date};
use crate::utils::error::{BatchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Blob access tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessTier {
    P4,
    P6,
    P10,
    P15,
    P20,
    P30,
    P40,
    P50,
    P60,
    P70,
    P80,
    Hot,
    Cool,
    Archive,
}

impl AccessTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTier::P4 => "P4",
            AccessTier::P6 => "P6",
            AccessTier::P10 => "P10",
            AccessTier::P15 => "P15",
            AccessTier::P20 => "P20",
            AccessTier::P30 => "P30",
            AccessTier::P40 => "P40",
            AccessTier::P50 => "P50",
            AccessTier::P60 => "P60",
            AccessTier::P70 => "P70",
            AccessTier::P80 => "P80",
            AccessTier::Hot => "Hot",
            AccessTier::Cool => "Cool",
            AccessTier::Archive => "Archive",
        }
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessTier {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p4" => Ok(AccessTier::P4),
            "p6" => Ok(AccessTier::P6),
            "p10" => Ok(AccessTier::P10),
            "p15" => Ok(AccessTier::P15),
            "p20" => Ok(AccessTier::P20),
            "p30" => Ok(AccessTier::P30),
            "p40" => Ok(AccessTier::P40),
            "p50" => Ok(AccessTier::P50),
            "p60" => Ok(AccessTier::P60),
            "p70" => Ok(AccessTier::P70),
            "p80" => Ok(AccessTier::P80),
            "hot" => Ok(AccessTier::Hot),
            "cool" => Ok(AccessTier::Cool),
            "archive" => Ok(AccessTier::Archive),
            _ => Err(BatchError::InvalidRequest(format!(
                "Unknown access tier: {}",
                s
            ))),
        }
    }
}

/// Priority for rehydrating a blob out of the archive tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RehydratePriority {
    High,
    Standard,
}

impl RehydratePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RehydratePriority::High => "High",
            RehydratePriority::Standard => "Standard",
        }
    }
}

/// What happens to a blob's snapshots when the blob is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteSnapshotsOption {
    /// Delete the blob and all of its snapshots
    IncludeSnapshots,
    /// Delete only the snapshots
    OnlySnapshots,
}

impl DeleteSnapshotsOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteSnapshotsOption::IncludeSnapshots => "include",
            DeleteSnapshotsOption::OnlySnapshots => "only",
        }
    }
}

/// Conditional headers and lease for a blob request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobAccessConditions {
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub lease_id: Option<String>,
}

impl BlobAccessConditions {
    pub(crate) fn apply(&self, request: &mut Request) -> Result<()> {
        if let Some(ts) = &self.if_modified_since {
            request.set_header("if-modified-since", format_http_date(ts))?;
        }
        if let Some(ts) = &self.if_unmodified_since {
            request.set_header("if-unmodified-since", format_http_date(ts))?;
        }
        if let Some(etag) = &self.if_match {
            request.set_header("if-match", etag)?;
        }
        if let Some(etag) = &self.if_none_match {
            request.set_header("if-none-match", etag)?;
        }
        if let Some(lease_id) = &self.lease_id {
            request.set_header("x-ms-lease-id", lease_id)?;
        }
        Ok(())
    }
}

/// Options for deleting a blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteBlobOptions {
    pub delete_snapshots: Option<DeleteSnapshotsOption>,
    pub access_conditions: BlobAccessConditions,
}

/// Options for changing a blob's access tier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetBlobAccessTierOptions {
    pub rehydrate_priority: Option<RehydratePriority>,
}

/// Successful blob deletion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteBlobResult {
    pub request_id: Option<String>,
    pub client_request_id: Option<String>,
    pub version: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl DeleteBlobResult {
    pub(crate) fn from_response(response: &RawResponse) -> Self {
        Self {
            request_id: header(response, "x-ms-request-id"),
            client_request_id: header(response, "x-ms-client-request-id"),
            version: header(response, "x-ms-version"),
            date: date(response),
        }
    }
}

/// Successful access tier change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetBlobAccessTierResult {
    pub request_id: Option<String>,
    pub client_request_id: Option<String>,
    pub version: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// `true` when the service accepted the change asynchronously (202)
    pub rehydrate_pending: bool,
}

impl SetBlobAccessTierResult {
    pub(crate) fn from_response(response: &RawResponse) -> Self {
        Self {
            request_id: header(response, "x-ms-request-id"),
            client_request_id: header(response, "x-ms-client-request-id"),
            version: header(response, "x-ms-version"),
            date: date(response),
            rehydrate_pending: response.status == reqwest::StatusCode::ACCEPTED,
        }
    }
}

fn header(response: &RawResponse, name: &str) -> Option<String> {
    response.header(name).map(str::to_string)
}

fn date(response: &RawResponse) -> Option<DateTime<Utc>> {
    response
        .header("date")
        .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
        .map(|d| d.with_timezone(&Utc))
}
