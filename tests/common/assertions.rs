//! Custom test assertions

use reqwest::StatusCode;
use storage_batch::{OperationKind, SubmitBatchResult};

/// Assertions for SubmitBatchResult
pub trait SubmitBatchResultAssertions {
    /// Assert outcomes are indexed 0..n in order
    fn assert_in_order(&self);

    /// Assert the outcome at `index` succeeded with the given kind
    fn assert_succeeded(&self, index: usize, kind: OperationKind);

    /// Assert the outcome at `index` failed with `status`
    fn assert_failed(&self, index: usize, status: StatusCode);
}

impl SubmitBatchResultAssertions for SubmitBatchResult {
    fn assert_in_order(&self) {
        for (position, outcome) in self.outcomes.iter().enumerate() {
            assert_eq!(
                outcome.index, position,
                "outcome at position {} carries index {}",
                position, outcome.index
            );
        }
    }

    fn assert_succeeded(&self, index: usize, kind: OperationKind) {
        let outcome = &self.outcomes[index];
        assert_eq!(outcome.kind, kind, "unexpected kind at index {}", index);
        assert!(
            outcome.result.is_ok(),
            "expected success at index {}, got {:?}",
            index,
            outcome.result
        );
    }

    fn assert_failed(&self, index: usize, status: StatusCode) {
        match &self.outcomes[index].result {
            Err(e) => assert_eq!(e.status, status, "unexpected status at index {}", index),
            Ok(result) => panic!("expected failure at index {}, got {:?}", index, result),
        }
    }
}
