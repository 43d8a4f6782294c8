//! Built-in pipeline stages
//!
//! - **telemetry**: `User-Agent` tagging
//! - **request_id**: `x-ms-client-request-id` correlation header
//! - **retry**: exponential backoff on transient failures
//! - **per_retry**: `x-ms-date` stamping on every attempt
//! - **shared_key**: Shared Key request signing
//! - **bearer**: OAuth bearer token authorization

mod bearer;
mod per_retry;
mod request_id;
mod retry;
mod shared_key;
mod telemetry;

pub use bearer::{AccessToken, BearerTokenPolicy, STORAGE_SCOPE, StaticTokenCredential, TokenCredential};
pub use per_retry::StoragePerRetryPolicy;
pub use request_id::{CLIENT_REQUEST_ID_HEADER, RequestIdPolicy};
pub use retry::{RetryOptions, RetryPolicy};
pub use shared_key::{SharedKeyPolicy, StorageSharedKeyCredential};
pub use telemetry::TelemetryPolicy;
