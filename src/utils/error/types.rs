//! Error types for the batch client

use crate::core::blob::StorageError;
use thiserror::Error;

/// Result type alias for the batch client
pub type Result<T> = std::result::Result<T, BatchError>;

/// Main error type for the batch client
#[derive(Error, Debug)]
pub enum BatchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request errors (bad names, headers, empty batches)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// URL parsing errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Credential errors (bad account key, token acquisition failure)
    #[error("Credential error: {0}")]
    Credential(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The caller's context was cancelled or its deadline elapsed
    #[error("Operation cancelled")]
    Cancelled,

    /// Structural error in the multipart batch response
    #[error("Failed to parse batch response at byte {offset}: {message}")]
    Protocol { offset: usize, message: String },

    /// The batch response content type carries no usable boundary
    #[error("Invalid batch response content type: {0}")]
    ContentType(String),

    /// The batch response does not have one part per sub-request
    #[error("Batch response has {actual} parts but {expected} sub-requests were sent")]
    PartCountMismatch { expected: usize, actual: usize },

    /// The submission pipeline completed without a response
    #[error("Transport produced no response")]
    MissingResponse,

    /// The service rejected the batch request as a whole
    #[error("Batch request rejected: {0}")]
    Service(Box<StorageError>),

    /// YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// Build a protocol error at the given byte offset of the response body
    pub fn protocol(offset: usize, message: impl Into<String>) -> Self {
        BatchError::Protocol {
            offset,
            message: message.into(),
        }
    }

    /// Whether the aggregate exchange is unusable and no partial result exists
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BatchError::Protocol { .. }
                | BatchError::ContentType(_)
                | BatchError::PartCountMismatch { .. }
                | BatchError::MissingResponse
        )
    }

    /// Whether the error was raised by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BatchError::Cancelled)
    }

    /// Whether re-issuing the whole batch may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            BatchError::Cancelled | BatchError::Http(_) => true,
            BatchError::Service(e) => e.status.is_server_error(),
            _ => false,
        }
    }
}
