//! Blob sub-operations
//!
//! Each supported operation is a request/response codec: it encodes itself
//! into a [`Request`](crate::core::http::Request) addressed at the blob and
//! decodes the raw sub-response into a typed result or a [`StorageError`].

mod codec;
mod delete;
mod error;
mod models;
mod set_tier;

pub use codec::{API_VERSION, HEADER_VERSION, SubRequestCodec, blob_url};
pub use delete::DeleteBlobSubRequest;
pub use error::StorageError;
pub use models::{
    AccessTier, BlobAccessConditions, DeleteBlobOptions, DeleteBlobResult, DeleteSnapshotsOption,
    RehydratePriority, SetBlobAccessTierOptions, SetBlobAccessTierResult,
};
pub use set_tier::SetBlobAccessTierSubRequest;
