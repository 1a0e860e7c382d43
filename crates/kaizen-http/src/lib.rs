//! Kaizen HTTP plumbing
//!
//! Shared pieces of the search, completion and issue clients:
//!
//! - [`ApiError`], the error type every client returns
//! - [`RetryPolicy`], bounded retry with linear backoff
//! - response status checks and JSON decoding
//! - credential validation and client construction
//! - with the `test-util` feature, a loopback server for client tests

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod error;
pub mod response;
pub mod retry;
#[cfg(feature = "test-util")]
pub mod testing;

use std::time::Duration;

pub use error::{ApiError, Result};
pub use response::{check_response, read_json};
pub use retry::RetryPolicy;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("kaizen/", env!("CARGO_PKG_VERSION"));

/// Validate a credential handed to a client constructor.
///
/// `name` is the environment variable that conventionally carries the
/// value and is only used in the error message.
///
/// # Errors
///
/// Returns [`ApiError::Config`] if the value is missing or blank.
pub fn require_credential(name: &str, value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::Config(format!("{name} is not set"))),
    }
}

/// Build a `reqwest::Client` with the shared user agent and a per-call timeout.
///
/// # Errors
///
/// Returns [`ApiError::Http`] if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{ApiError, Result, RetryPolicy, build_client, read_json, require_credential};
}
