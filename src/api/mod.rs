//! API module
//!
//! HTTP client for the code-validation, sentiment-analysis and feedback endpoints.

mod client;

pub(crate) use client::{ApiClient, ApiError, ApiSettings};
