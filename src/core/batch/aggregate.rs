//! Pairing parsed sub-responses with their sub-operations

use super::{BatchOutcome, BlobBatch, PendingSubOperation, SubOperationResult};
use crate::core::blob::{StorageError, SubRequestCodec};
use crate::core::http::RawResponse;
use crate::utils::error::{BatchError, Result};
use tracing::{debug, warn};

/// Decode each response with the decoder of the operation at the same position
///
/// A count mismatch is the only error; a sub-operation the service rejected is
/// recorded in its outcome and never affects its siblings.
pub fn aggregate(batch: &BlobBatch, responses: Vec<RawResponse>) -> Result<Vec<BatchOutcome>> {
    if responses.len() != batch.len() {
        return Err(BatchError::PartCountMismatch {
            expected: batch.len(),
            actual: responses.len(),
        });
    }

    let outcomes = batch
        .iter()
        .zip(responses)
        .enumerate()
        .map(|(index, (operation, response))| {
            let result = decode(operation, response);
            match &result {
                Ok(_) => debug!(index, kind = %operation.kind(), "Sub-operation succeeded"),
                Err(e) => warn!(
                    index,
                    kind = %operation.kind(),
                    container = operation.container(),
                    blob = operation.blob(),
                    "Sub-operation failed: {}",
                    e
                ),
            }
            BatchOutcome {
                index,
                kind: operation.kind(),
                result,
            }
        })
        .collect();

    Ok(outcomes)
}

fn decode(
    operation: &PendingSubOperation,
    response: RawResponse,
) -> std::result::Result<SubOperationResult, StorageError> {
    match operation {
        PendingSubOperation::DeleteBlob(op) => {
            op.decode(response).map(SubOperationResult::DeleteBlob)
        }
        PendingSubOperation::SetBlobAccessTier(op) => op
            .decode(response)
            .map(SubOperationResult::SetBlobAccessTier),
    }
}
