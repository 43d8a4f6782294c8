//! Ordered collection of pending sub-operations

use crate::core::blob::{
    AccessTier, DeleteBlobOptions, DeleteBlobSubRequest, SetBlobAccessTierOptions,
    SetBlobAccessTierSubRequest,
};
use serde::Serialize;
use std::fmt;

/// Kind of a sub-operation, used to pick the decoder for its response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    DeleteBlob,
    SetBlobAccessTier,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::DeleteBlob => f.write_str("delete_blob"),
            OperationKind::SetBlobAccessTier => f.write_str("set_blob_access_tier"),
        }
    }
}

/// One sub-operation waiting to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingSubOperation {
    DeleteBlob(DeleteBlobSubRequest),
    SetBlobAccessTier(SetBlobAccessTierSubRequest),
}

impl PendingSubOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            PendingSubOperation::DeleteBlob(_) => OperationKind::DeleteBlob,
            PendingSubOperation::SetBlobAccessTier(_) => OperationKind::SetBlobAccessTier,
        }
    }

    pub fn container(&self) -> &str {
        match self {
            PendingSubOperation::DeleteBlob(op) => &op.container,
            PendingSubOperation::SetBlobAccessTier(op) => &op.container,
        }
    }

    pub fn blob(&self) -> &str {
        match self {
            PendingSubOperation::DeleteBlob(op) => &op.blob,
            PendingSubOperation::SetBlobAccessTier(op) => &op.blob,
        }
    }
}

impl From<DeleteBlobSubRequest> for PendingSubOperation {
    fn from(op: DeleteBlobSubRequest) -> Self {
        PendingSubOperation::DeleteBlob(op)
    }
}

impl From<SetBlobAccessTierSubRequest> for PendingSubOperation {
    fn from(op: SetBlobAccessTierSubRequest) -> Self {
        PendingSubOperation::SetBlobAccessTier(op)
    }
}

/// Append-only list of sub-operations
///
/// The position an operation is appended at is its correlation index: the
/// rendered `Content-ID`, the response part it is paired with, and the
/// `index` of its outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobBatch {
    operations: Vec<PendingSubOperation>,
}

impl BlobBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a blob deletion, returning its correlation index
    pub fn delete_blob(
        &mut self,
        container: impl Into<String>,
        blob: impl Into<String>,
        options: DeleteBlobOptions,
    ) -> usize {
        self.append(DeleteBlobSubRequest::new(container, blob, options))
    }

    /// Queue an access tier change, returning its correlation index
    pub fn set_blob_access_tier(
        &mut self,
        container: impl Into<String>,
        blob: impl Into<String>,
        tier: AccessTier,
        options: SetBlobAccessTierOptions,
    ) -> usize {
        self.append(SetBlobAccessTierSubRequest::new(
            container, blob, tier, options,
        ))
    }

    pub fn append(&mut self, operation: impl Into<PendingSubOperation>) -> usize {
        self.operations.push(operation.into());
        self.operations.len() - 1
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PendingSubOperation> {
        self.operations.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PendingSubOperation> {
        self.operations.iter()
    }
}

impl<'a> IntoIterator for &'a BlobBatch {
    type Item = &'a PendingSubOperation;
    type IntoIter = std::slice::Iter<'a, PendingSubOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
