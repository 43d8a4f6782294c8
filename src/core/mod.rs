//! Core functionality for the batch client
//!
//! - **http**: request and raw response model
//! - **pipeline**: interceptor pipeline, stages and transports
//! - **blob**: blob sub-operation codecs
//! - **batch**: multipart batch rendering, parsing and submission

pub mod batch;
pub mod blob;
pub mod http;
pub mod pipeline;
