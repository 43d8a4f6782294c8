//! Batch outcome types

use super::OperationKind;
use crate::core::blob::{DeleteBlobResult, SetBlobAccessTierResult, StorageError};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Serialize;

/// Decoded success of one sub-operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubOperationResult {
    DeleteBlob(DeleteBlobResult),
    SetBlobAccessTier(SetBlobAccessTierResult),
}

/// Outcome of the sub-operation at `index`
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Correlation index of the sub-operation
    pub index: usize,
    /// Operation kind
    pub kind: OperationKind,
    /// Decoded result, or the service's rejection of this item
    pub result: Result<SubOperationResult, StorageError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of submitting a batch
///
/// `outcomes` has one entry per sub-operation, in correlation order.
#[derive(Debug, Clone)]
pub struct SubmitBatchResult {
    pub outcomes: Vec<BatchOutcome>,
    /// Status of the aggregate response
    pub status: StatusCode,
    /// Headers of the aggregate response
    pub headers: HeaderMap,
}

impl SubmitBatchResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Service request id of the aggregate response
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-ms-request-id")
            .and_then(|v| v.to_str().ok())
    }

    /// Delete outcomes as `(correlation index, result)`, in order
    pub fn delete_blob_results(
        &self,
    ) -> impl Iterator<Item = (usize, Result<&DeleteBlobResult, &StorageError>)> {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OperationKind::DeleteBlob)
            .filter_map(|o| match &o.result {
                Ok(SubOperationResult::DeleteBlob(r)) => Some((o.index, Ok(r))),
                Err(e) => Some((o.index, Err(e))),
                Ok(_) => None,
            })
    }

    /// Set-tier outcomes as `(correlation index, result)`, in order
    pub fn set_blob_access_tier_results(
        &self,
    ) -> impl Iterator<Item = (usize, Result<&SetBlobAccessTierResult, &StorageError>)> {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OperationKind::SetBlobAccessTier)
            .filter_map(|o| match &o.result {
                Ok(SubOperationResult::SetBlobAccessTier(r)) => Some((o.index, Ok(r))),
                Err(e) => Some((o.index, Err(e))),
                Ok(_) => None,
            })
    }
}
