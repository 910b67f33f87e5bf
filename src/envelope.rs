//! Envelope normalization: the single point translating raw API responses
//! into typed values or typed errors.
//!
//! Every response body on this API is wrapped in a uniform envelope:
//!
//! ```json
//! {"api_status_code": 200, "api_response": { ... }}
//! ```
//!
//! on success, or
//!
//! ```json
//! {"api_status_code": 404, "api_error_message": "not found"}
//! ```
//!
//! on failure (optionally with a `stack` diagnostic). The functions here
//! accept a [`RawResponse`] — whatever its status — and produce either the
//! deserialized payload or an [`ApiError`] classified by status-code class.
//! Nothing upstream interprets bodies: the transport returns error statuses
//! as data, the retry layer only counts them, and this module decides what
//! they mean.
//!
//! Statuses 2xx and 304 are the success range. A 304 reaching this module
//! has already been resolved to a cached envelope by the transport, so its
//! body is handled exactly like a fresh one.

use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::transport::RawResponse;

/// The uniform wrapper around every response body.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    api_response: serde_json::Value,
    #[serde(default)]
    api_error_message: Option<String>,
    #[serde(default)]
    stack: Option<String>,
}

/// A deserialized payload paired with the `ETag` validator it arrived with.
///
/// Operations that return one versioned resource (a GET by id) produce this
/// wrapper so callers can hand the validator back later — as `If-Match` on a
/// conditional refresh, or as the precondition of an optimistic-concurrency
/// update. Access the payload through `Deref` or take it with
/// [`Versioned::into_inner`].
///
/// # Example
///
/// ```rust
/// use howler_api::Versioned;
///
/// let hit = Versioned::new(String::from("payload"), Some("\"v1\"".to_string()));
/// assert_eq!(hit.len(), 7); // Deref to the payload
/// assert_eq!(hit.etag(), Some("\"v1\""));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned<T> {
    data: T,
    etag: Option<String>,
}

impl<T> Versioned<T> {
    /// Wraps a payload with its validator.
    #[must_use]
    pub const fn new(data: T, etag: Option<String>) -> Self {
        Self { data, etag }
    }

    /// Returns the validator the payload arrived with, if the server sent
    /// one.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Consumes the wrapper, returning the payload.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Maps the payload while keeping the validator.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Versioned<U> {
        Versioned {
            data: f(self.data),
            etag: self.etag,
        }
    }
}

impl<T> Deref for Versioned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for Versioned<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

/// Unwraps a response into the typed payload of its success envelope.
///
/// # Errors
///
/// Returns the classified [`ApiError`] for non-success statuses, or
/// [`ApiError::Decode`] when a success body is not the envelope or its
/// payload does not deserialize as `T`.
pub fn unwrap_response<T: DeserializeOwned>(raw: RawResponse) -> Result<T, ApiError> {
    let payload = success_payload(raw)?;
    serde_json::from_value(payload).map_err(ApiError::from)
}

/// Unwraps a response into its typed payload plus the `ETag` it arrived
/// with.
///
/// # Errors
///
/// Same conditions as [`unwrap_response`].
pub fn unwrap_versioned<T: DeserializeOwned>(raw: RawResponse) -> Result<Versioned<T>, ApiError> {
    let etag = raw.etag().map(str::to_string);
    let data = unwrap_response(raw)?;
    Ok(Versioned::new(data, etag))
}

/// Checks a response for success, discarding any payload.
///
/// Used by operations whose success carries no interesting body (deletes,
/// label and favourite mutations).
///
/// # Errors
///
/// Returns the classified [`ApiError`] for non-success statuses.
pub fn unwrap_empty(raw: RawResponse) -> Result<(), ApiError> {
    if raw.is_success() || raw.is_not_modified() {
        return Ok(());
    }
    Err(classify_failure(&raw))
}

/// Extracts the success payload, or classifies the failure.
fn success_payload(raw: RawResponse) -> Result<serde_json::Value, ApiError> {
    if !(raw.is_success() || raw.is_not_modified()) {
        return Err(classify_failure(&raw));
    }
    let envelope: Envelope = serde_json::from_value(raw.body).map_err(|e| ApiError::Decode {
        message: format!("success body was not the API envelope: {e}"),
        source: Some(e),
    })?;
    Ok(envelope.api_response)
}

/// Builds the typed error for a non-success response.
///
/// The error envelope is preferred for the message; bodies that are not the
/// envelope (proxy HTML captured as a JSON string, empty bodies) fall back
/// to the body text or the bare status.
fn classify_failure(raw: &RawResponse) -> ApiError {
    if let Ok(envelope) = serde_json::from_value::<Envelope>(raw.body.clone()) {
        if let Some(message) = envelope.api_error_message {
            return ApiError::for_status(raw.status, message, envelope.stack);
        }
    }
    let message = match &raw.body {
        serde_json::Value::Null => format!("HTTP {}", raw.status),
        serde_json::Value::String(text) if !text.is_empty() => text.clone(),
        other => other.to_string(),
    };
    ApiError::for_status(raw.status, message, None)
}
