//! Blob batch protocol engine
//!
//! Sub-operations are accumulated in a [`BlobBatch`], rendered into one
//! `multipart/mixed` request, submitted once, and the multipart response is
//! split back into per-operation outcomes.
//!
//! - **accumulator**: ordered, append-only list of pending sub-operations
//! - **render**: multipart request body built through the encoding pipeline
//! - **parser**: forward-only multipart response parser
//! - **aggregate**: pairing of sub-responses with their decoders
//! - **client**: pipeline construction and submission

mod accumulator;
mod aggregate;
mod client;
mod parser;
mod render;
mod types;


pub use accumulator::{BlobBatch, OperationKind, PendingSubOperation};
pub use aggregate::aggregate;
pub use client::{BatchClientOptions, BlobBatchClient};
pub use parser::{boundary_from_content_type, parse_batch_response};
pub use render::{
    MULTIPART_MIXED_PREFIX, RenderedBatch, new_boundary, part_envelope, render_batch,
    render_batch_with_boundary,
};
pub use types::{BatchOutcome, SubOperationResult, SubmitBatchResult};
