//! HTTP client for the validation results service.
//!
//! Used by the `validation` binary; exposed as a library so the requests
//! it issues can be exercised against an in-process server.

pub mod client;

pub use client::{ApiClient, ClientError, Deleted};
