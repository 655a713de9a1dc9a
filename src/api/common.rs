//! Common API utilities and shared types

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use super::middleware::ApiError;

/// Parse a JSON request body.
///
/// An empty body is read as `{}` so that validation, not deserialization,
/// decides what is missing. Unknown fields are ignored.
pub fn parse_json_body<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation_error(format!("Invalid JSON body: {}", e)))
}
