//! Request types for the transport layer.
//!
//! This module provides [`ApiRequest`] and its builder, the per-call
//! envelope handed to a [`Transport`](crate::transport::Transport). A
//! request is constructed, dispatched once (possibly re-sent by the retry
//! layer), and dropped — it carries no state between calls.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::InvalidRequestError;

/// HTTP verbs used by the API.
///
/// The API surface is plain REST over four verbs; dispatch is always an
/// explicit match on this enum, never reflection over strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Retrieve a resource.
    Get,
    /// Create a resource or invoke an action.
    Post,
    /// Update (or set a sub-resource on) a resource.
    Put,
    /// Remove a resource or sub-resource values.
    Delete,
}

impl Method {
    /// Returns the verb as its wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HTTP request to the API.
///
/// Use [`ApiRequest::builder`] to construct requests with the builder
/// pattern. The `path` is absolute from the host root (resource modules
/// produce it through [`uri`](crate::uri)); query values are sent as-is.
///
/// # Example
///
/// ```rust
/// use howler_api::transport::{ApiRequest, Method};
/// use serde_json::json;
///
/// let get = ApiRequest::builder(Method::Get, "/api/v1/hits/abc123")
///     .if_match("\"v1\"")
///     .build()
///     .unwrap();
/// assert_eq!(get.if_match(), Some("\"v1\""));
///
/// let post = ApiRequest::builder(Method::Post, "/api/v1/search/hits/")
///     .body(json!({"query": "howler.id:*"}))
///     .build()
///     .unwrap();
/// assert!(post.body.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// The HTTP verb for this request.
    pub method: Method,
    /// The absolute path (from the host root) for this request.
    pub path: String,
    /// The JSON request body, if any.
    pub body: Option<serde_json::Value>,
    /// Query parameters to append to the URL.
    pub query: Option<HashMap<String, String>>,
    /// Additional headers to include in the request.
    pub headers: Option<HashMap<String, String>>,
    /// Advisory per-request timeout overriding the engine default.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Creates a new builder for constructing an `ApiRequest`.
    #[must_use]
    pub fn builder(method: Method, path: impl Into<String>) -> ApiRequestBuilder {
        ApiRequestBuilder::new(method, path)
    }

    /// Validates the request before dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] if:
    /// - the path is empty
    /// - `method` is `Post` or `Put` but no body is set
    /// - `method` is `Get` but a body is set
    pub fn verify(&self) -> Result<(), InvalidRequestError> {
        if self.path.is_empty() {
            return Err(InvalidRequestError::EmptyPath);
        }
        match self.method {
            Method::Post | Method::Put if self.body.is_none() => {
                Err(InvalidRequestError::MissingBody {
                    method: self.method.as_str(),
                })
            }
            Method::Get if self.body.is_some() => Err(InvalidRequestError::BodyNotAllowed {
                method: self.method.as_str(),
            }),
            _ => Ok(()),
        }
    }

    /// Returns the request's `If-Match` validator, if one was attached.
    ///
    /// Header names are matched case-insensitively; this is the value the
    /// caching layer keys 304 resolution on.
    #[must_use]
    pub fn if_match(&self) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("if-match"))
                .map(|(_, value)| value.as_str())
        })
    }
}

/// Builder for constructing [`ApiRequest`] instances.
#[derive(Debug)]
pub struct ApiRequestBuilder {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    query: Option<HashMap<String, String>>,
    headers: Option<HashMap<String, String>>,
    timeout: Option<Duration>,
}

impl ApiRequestBuilder {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: None,
            headers: None,
            timeout: None,
        }
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn query(mut self, query: HashMap<String, String>) -> Self {
        self.query = Some(query);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attaches an `If-Match` validator for a conditional request.
    ///
    /// A 304 answer will be resolved against the validator cache using this
    /// value as the key.
    #[must_use]
    pub fn if_match(self, etag: impl Into<String>) -> Self {
        self.header("If-Match", etag)
    }

    /// Sets an advisory timeout for this request only.
    ///
    /// Exceeding it surfaces as a network-class failure, eligible for retry
    /// like any other network error.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`ApiRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] if the request fails validation.
    pub fn build(self) -> Result<ApiRequest, InvalidRequestError> {
        let request = ApiRequest {
            method: self.method,
            path: self.path,
            body: self.body,
            query: self.query,
            headers: self.headers,
            timeout: self.timeout,
        };
        request.verify()?;
        Ok(request)
    }
}
