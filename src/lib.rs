//! # storage-batch
//!
//! Client-side Azure Blob batch protocol engine: bundle many blob operations
//! into one `multipart/mixed` request and get one outcome per operation back.
//!
//! ## Features
//!
//! - **Interceptor pipelines**: the same stages sign and stamp sub-requests
//!   (ending in a no-op transport) and the aggregate request (ending in HTTP)
//! - **Failure isolation**: a rejected sub-operation is an outcome, not an error
//! - **Strict parsing**: malformed multipart responses fail the whole call
//! - **Credentials**: Shared Key, OAuth bearer tokens, SAS, connection strings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storage_batch::{
//!     AccessTier, BatchClientOptions, BlobBatch, BlobBatchClient, Context,
//!     DeleteBlobOptions, SetBlobAccessTierOptions, StorageSharedKeyCredential,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credential = Arc::new(StorageSharedKeyCredential::new("myaccount", "<base64 key>"));
//!     let client = BlobBatchClient::with_shared_key(
//!         "https://myaccount.blob.core.windows.net",
//!         credential,
//!         BatchClientOptions::default(),
//!     )?;
//!
//!     let mut batch = BlobBatch::new();
//!     batch.delete_blob("logs", "2020/12/15.log", DeleteBlobOptions::default());
//!     batch.set_blob_access_tier("images", "cat.png", AccessTier::Cool, SetBlobAccessTierOptions::default());
//!
//!     let result = client.submit_batch(&Context::new(), &batch).await?;
//!     for outcome in &result.outcomes {
//!         println!("#{} {}: {}", outcome.index, outcome.kind, outcome.is_success());
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::{BatchConfig, ConnectionString};
pub use utils::error::{BatchError, Result};

pub use crate::core::batch::{
    BatchClientOptions, BatchOutcome, BlobBatch, BlobBatchClient, OperationKind,
    PendingSubOperation, RenderedBatch, SubOperationResult, SubmitBatchResult,
};
pub use crate::core::blob::{
    AccessTier, BlobAccessConditions, DeleteBlobOptions, DeleteBlobResult, DeleteSnapshotsOption,
    RehydratePriority, SetBlobAccessTierOptions, SetBlobAccessTierResult, StorageError,
};
pub use crate::core::http::{RawResponse, Request};
pub use crate::core::pipeline::policies::{
    AccessToken, RetryOptions, StaticTokenCredential, StorageSharedKeyCredential, TokenCredential,
};
pub use crate::core::pipeline::{Context, HttpTransport, NoopTransport, Pipeline, Stage, Transport};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
