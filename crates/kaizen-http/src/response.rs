//! Shared HTTP response helpers.
//!
//! Centralizes the status check so each client only deals with request
//! construction and response mapping.

use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};

/// Return the response unchanged on success, or [`ApiError::Status`] with
/// the status code and body otherwise.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for any non-2xx status.
pub async fn check_response(service: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(ApiError::Status {
        service: service.to_string(),
        status: status.as_u16(),
        body: resp.text().await.unwrap_or_default(),
    })
}

/// Check the status, then decode the body as JSON.
///
/// The body is read as text and parsed separately so that a malformed body
/// surfaces as [`ApiError::Json`] rather than a transport error.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for non-2xx responses, [`ApiError::Http`] if
/// the body cannot be read and [`ApiError::Json`] if it does not decode.
pub async fn read_json<T: DeserializeOwned>(service: &str, resp: reqwest::Response) -> Result<T> {
    let resp = check_response(service, resp).await?;
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}
