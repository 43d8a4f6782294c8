//! Utility modules for the batch client
//!
//! ## Module Organization
//!
//! - **error**: Error types shared by every layer of the client
//! - **logging**: Tracing subscriber bootstrap

pub mod error;
pub mod logging;

pub use error::{BatchError, Result};
pub use logging::init_logging;

use uuid::Uuid;

/// Generate a unique client request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Truncate string to specified length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len.saturating_sub(3);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
