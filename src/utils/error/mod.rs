//! Error handling for the batch client
//!
//! This module defines the error type returned by every fallible operation in
//! the crate. Per-sub-operation failures are not errors at this level: they are
//! reported as data inside a batch outcome.

mod types;


pub use types::{BatchError, Result};
