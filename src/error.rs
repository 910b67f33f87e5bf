//! Error types for the Howler API client.
//!
//! This module contains the crate-wide error taxonomy. Every failure path in
//! the client yields either a typed success value or one of these errors —
//! never an ambiguous empty payload.
//!
//! # Error Handling
//!
//! [`ApiError`] is the single error type returned by transport and resource
//! operations. Callers branch on its variants (or on
//! [`ApiError::status`]) to distinguish validation failures, not-found,
//! auth failures, and server-side faults:
//!
//! - [`ApiError::Network`]: no response was received (DNS, refused, timeout)
//! - [`ApiError::Server`]: a 5xx response other than 502
//! - [`ApiError::Gateway`]: a 502 response, surfaced without client retry
//! - [`ApiError::Client`]: any 4xx response
//! - [`ApiError::CacheMiss`]: a 304 that no stored body could resolve
//! - [`ApiError::Decode`]: a success response whose body was not the
//!   expected envelope or payload
//! - [`ApiError::InvalidRequest`]: a request that failed validation before
//!   it was sent
//!
//! [`ConfigError`] covers construction-time validation and is returned only
//! by configuration builders.
//!
//! # Example
//!
//! ```rust,ignore
//! use howler_api::ApiError;
//!
//! match client.hits().get("missing-id").await {
//!     Ok(hit) => println!("found {}", hit.howler.id),
//!     Err(e) if e.is_not_found() => println!("no such hit"),
//!     Err(ApiError::Network(e)) => println!("network failure: {e}"),
//!     Err(e) => println!("API failure: {e}"),
//! }
//! ```

use thiserror::Error;

/// Unified error type for all client operations.
///
/// Transport-class failures (network, cache integrity) are produced by the
/// transport layer; envelope-class failures (client/gateway/server) are
/// produced by the envelope normalizer, which is the single point translating
/// raw error envelopes into typed errors. The retry layer never rewrites an
/// error — after its attempts are exhausted, the final outcome is surfaced
/// unchanged so callers can still key off the status-code class.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received: DNS failure, connection refused, or an
    /// exceeded request timeout. Always retriable up to the policy limit.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 5xx response other than 502. Retried up to the policy limit, then
    /// surfaced with the server's own message.
    #[error("server error (HTTP {status}): {message}")]
    Server {
        /// The HTTP status code of the response.
        status: u16,
        /// The `api_error_message` from the error envelope.
        message: String,
        /// Optional server-side diagnostic trace from the envelope.
        stack: Option<String>,
    },

    /// A 502 Bad Gateway response. Not retried client-side by default: an
    /// upstream proxy layer is assumed to have retried already, and retrying
    /// again here would amplify load.
    #[error("bad gateway: {message}")]
    Gateway {
        /// The `api_error_message` from the error envelope.
        message: String,
    },

    /// A 4xx response: validation failures, not-found, auth failures.
    /// Surfaced immediately, never retried.
    #[error("client error (HTTP {status}): {message}")]
    Client {
        /// The HTTP status code of the response.
        status: u16,
        /// The `api_error_message` from the error envelope.
        message: String,
        /// Optional server-side diagnostic trace from the envelope.
        stack: Option<String>,
    },

    /// A 304 Not Modified arrived but no stored body could resolve it,
    /// either because the referenced validator was evicted or because the
    /// request carried no `If-Match` at all. Surfacing this as an error
    /// keeps an empty body from masquerading as fresh data.
    #[error("received 304 but no cached body for validator {etag:?}")]
    CacheMiss {
        /// The `If-Match` value of the request, when one was sent.
        etag: Option<String>,
    },

    /// A success response whose body was not the uniform envelope, or whose
    /// payload did not deserialize as the expected type.
    #[error("failed to decode response: {message}")]
    Decode {
        /// What failed to decode.
        message: String,
        /// The underlying deserialization error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The request failed validation before it was sent.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),
}

impl ApiError {
    /// Builds a decode error with a plain message and no source.
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Classifies a non-success HTTP status into the taxonomy.
    ///
    /// 502 becomes [`ApiError::Gateway`], other 5xx become
    /// [`ApiError::Server`], 4xx become [`ApiError::Client`]. Any other
    /// status reaching this point is a protocol violation and is reported
    /// as a decode failure.
    pub(crate) fn for_status(status: u16, message: String, stack: Option<String>) -> Self {
        match status {
            502 => Self::Gateway { message },
            s if s >= 500 => Self::Server {
                status: s,
                message,
                stack,
            },
            s if s >= 400 => Self::Client {
                status: s,
                message,
                stack,
            },
            s => Self::decode(format!("unexpected HTTP status {s}: {message}")),
        }
    }

    /// Returns the HTTP status code carried by this error, if any.
    ///
    /// [`ApiError::Gateway`] reports 502. Network, cache, decode, and
    /// request-validation failures have no status.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            Self::Gateway { .. } => Some(502),
            _ => None,
        }
    }

    /// Returns `true` when no response was received.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns `true` for failures that may succeed if the whole call is
    /// replayed: network failures and retriable server errors.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { .. })
    }

    /// Returns `true` for a 404 response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Client { status: 404, .. })
    }

    /// Returns `true` for a 401 or 403 response, typically an expired or
    /// missing session cookie.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Client {
                status: 401 | 403,
                ..
            }
        )
    }

    /// Returns `true` for a 409 or 412 response — an optimistic-concurrency
    /// conflict, usually a stale `If-Match` validator.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Client {
                status: 409 | 412,
                ..
            }
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Error returned when a request fails validation before dispatch.
///
/// These are programming errors in request construction, caught before any
/// bytes hit the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidRequestError {
    /// A POST or PUT request was built without a body.
    #[error("cannot send {method} without a body")]
    MissingBody {
        /// The verb that requires a body.
        method: &'static str,
    },

    /// A body was attached to a verb that must not carry one.
    #[error("cannot attach a body to {method}")]
    BodyNotAllowed {
        /// The verb that rejects bodies.
        method: &'static str,
    },

    /// The request path is empty.
    #[error("request path cannot be empty")]
    EmptyPath,
}

/// Errors that can occur while building client configuration.
///
/// Each variant carries a clear, actionable message; configuration
/// constructors fail fast rather than deferring problems to the first
/// request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required builder field was never set.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The base URL failed validation.
    #[error("Invalid base URL '{url}': {reason}.")]
    InvalidBaseUrl {
        /// The URL that was provided.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The retry limit must allow at least one attempt.
    #[error("max_attempts must be at least 1.")]
    ZeroAttempts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_status_classifies_gateway() {
        let error = ApiError::for_status(502, "upstream unavailable".to_string(), None);
        assert!(matches!(error, ApiError::Gateway { .. }));
        assert_eq!(error.status(), Some(502));
    }

    #[test]
    fn test_for_status_classifies_server() {
        let error = ApiError::for_status(503, "overloaded".to_string(), None);
        assert!(matches!(error, ApiError::Server { status: 503, .. }));
        assert!(error.is_transient());
    }

    #[test]
    fn test_for_status_classifies_client() {
        let error = ApiError::for_status(404, "not found".to_string(), None);
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_conflict_covers_precondition_failed() {
        let error = ApiError::for_status(412, "etag mismatch".to_string(), None);
        assert!(error.is_conflict());
    }

    #[test]
    fn test_auth_covers_unauthorized_and_forbidden() {
        assert!(ApiError::for_status(401, String::new(), None).is_auth());
        assert!(ApiError::for_status(403, String::new(), None).is_auth());
        assert!(!ApiError::for_status(404, String::new(), None).is_auth());
    }

    #[test]
    fn test_cache_miss_has_no_status() {
        let error = ApiError::CacheMiss {
            etag: Some("\"v1\"".to_string()),
        };
        assert_eq!(error.status(), None);
        assert!(error.to_string().contains("v1"));
    }

    #[test]
    fn test_error_message_carries_server_detail() {
        let error = ApiError::for_status(500, "index corrupt".to_string(), None);
        let message = error.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("index corrupt"));
    }

    #[test]
    fn test_invalid_request_messages() {
        let error = InvalidRequestError::MissingBody { method: "POST" };
        assert_eq!(error.to_string(), "cannot send POST without a body");

        let error = InvalidRequestError::BodyNotAllowed { method: "GET" };
        assert_eq!(error.to_string(), "cannot attach a body to GET");
    }

    #[test]
    fn test_config_error_messages() {
        let error = ConfigError::MissingRequiredField { field: "base_url" };
        assert!(error.to_string().contains("base_url"));

        let error = ConfigError::InvalidBaseUrl {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(error.to_string().contains("not a url"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &ApiError::CacheMiss { etag: None };
        let _: &dyn std::error::Error = &ConfigError::ZeroAttempts;
        let _: &dyn std::error::Error = &InvalidRequestError::EmptyPath;
    }
}
