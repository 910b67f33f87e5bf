//! An in-memory transport for offline development and tests.
//!
//! [`FixtureTransport`] answers requests from an explicit routing table
//! instead of the network. Every route is registered up front as a
//! `(method, path pattern)` pair bound to a handler; there is no implicit
//! discovery. Path patterns may contain `{name}` placeholders that match
//! any single segment:
//!
//! ```
//! use howler_api::transport::{FixtureTransport, Method};
//! use howler_api::uri;
//! use serde_json::json;
//!
//! let transport = FixtureTransport::new()
//!     .respond(Method::Get, &uri::uri(&["hits", "{id}"]), json!({"howler": {"id": "abc"}}));
//! ```
//!
//! Unmatched requests receive a `404` error envelope, mirroring what the
//! real service answers for unknown routes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::transport::{ApiRequest, Method, RawResponse, Transport};

/// A handler produces the canned response for one route.
type Handler = Box<dyn Fn(&ApiRequest, &HashMap<String, String>) -> RawResponse + Send + Sync>;

/// One registered route: a parsed path pattern plus its handler.
struct FixtureRoute {
    segments: Vec<RouteSegment>,
    handler: Handler,
}

enum RouteSegment {
    Static(String),
    Param(String),
}

/// A transport that serves registered fixtures instead of real traffic.
///
/// Routing rules:
/// - paths are compared segment by segment, ignoring trailing slashes
/// - `{name}` segments match any value and expose it to the handler
/// - a static match always beats a placeholder match; ties go to the
///   earliest registration
///
/// Register routes with the same absolute paths requests carry, i.e. the
/// output of [`uri::uri`](crate::uri::uri).
///
/// Every request received is recorded and can be inspected afterwards with
/// [`requests`](Self::requests), which makes assertions about issued
/// traffic straightforward in tests.
#[derive(Default)]
pub struct FixtureTransport {
    routes: HashMap<Method, Vec<FixtureRoute>>,
    requests: Mutex<Vec<ApiRequest>>,
}

// Verify FixtureTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FixtureTransport>();
};

impl FixtureTransport {
    /// Creates a transport with no routes; every request answers `404`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a method and path pattern.
    ///
    /// The handler receives the incoming request and the values captured
    /// by `{name}` placeholders, keyed by placeholder name.
    #[must_use]
    pub fn handle<F>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(&ApiRequest, &HashMap<String, String>) -> RawResponse + Send + Sync + 'static,
    {
        self.routes.entry(method).or_default().push(FixtureRoute {
            segments: parse_pattern(pattern),
            handler: Box::new(handler),
        });
        self
    }

    /// Registers a route answering `200` with `payload` wrapped in a
    /// success envelope.
    #[must_use]
    pub fn respond(self, method: Method, pattern: &str, payload: Value) -> Self {
        self.respond_with_status(method, pattern, 200, Self::success_body(200, payload))
    }

    /// Registers a route answering `status` with `body` verbatim.
    ///
    /// Unlike [`respond`](Self::respond), the body is not wrapped; use
    /// [`success_body`](Self::success_body) or
    /// [`error_body`](Self::error_body) to build envelopes, or pass a raw
    /// value to simulate malformed answers.
    #[must_use]
    pub fn respond_with_status(
        self,
        method: Method,
        pattern: &str,
        status: u16,
        body: Value,
    ) -> Self {
        self.handle(method, pattern, move |_, _| {
            RawResponse::new(status, HashMap::new(), body.clone())
        })
    }

    /// Builds a success envelope around `payload`.
    #[must_use]
    pub fn success_body(status: u16, payload: Value) -> Value {
        json!({
            "api_status_code": status,
            "api_response": payload,
        })
    }

    /// Builds an error envelope carrying `message`.
    #[must_use]
    pub fn error_body(status: u16, message: &str) -> Value {
        json!({
            "api_status_code": status,
            "api_error_message": message,
        })
    }

    /// Returns a copy of every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().clone()
    }

    /// Returns how many requests have been received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ApiRequest>> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Finds the best route for a request, preferring static matches.
    fn route(&self, method: Method, path: &str) -> Option<(&FixtureRoute, HashMap<String, String>)> {
        let segments: Vec<&str> = split_path(path);
        self.routes
            .get(&method)?
            .iter()
            .enumerate()
            .filter_map(|(index, route)| {
                route
                    .matches(&segments)
                    .map(|params| (route, params, route.param_count(), index))
            })
            .min_by_key(|&(_, _, param_count, index)| (param_count, index))
            .map(|(route, params, _, _)| (route, params))
    }
}

impl FixtureRoute {
    /// Matches `segments` against the pattern, returning captured params.
    fn matches(&self, segments: &[&str]) -> Option<HashMap<String, String>> {
        if segments.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (pattern, value) in self.segments.iter().zip(segments) {
            match pattern {
                RouteSegment::Static(expected) if expected == value => {}
                RouteSegment::Static(_) => return None,
                RouteSegment::Param(name) => {
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }
        Some(params)
    }

    fn param_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, RouteSegment::Param(_)))
            .count()
    }
}

/// Parses a path pattern into matchable segments.
fn parse_pattern(pattern: &str) -> Vec<RouteSegment> {
    split_path(pattern)
        .into_iter()
        .map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
                .map_or_else(
                    || RouteSegment::Static(segment.to_string()),
                    |name| RouteSegment::Param(name.to_string()),
                )
        })
        .collect()
}

/// Splits a path into non-empty segments, ignoring trailing slashes.
fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        request.verify()?;
        self.lock().push(request.clone());

        if let Some((route, params)) = self.route(request.method, &request.path) {
            debug!(method = %request.method, path = %request.path, "serving fixture");
            return Ok((route.handler)(&request, &params));
        }

        debug!(method = %request.method, path = %request.path, "no fixture registered");
        Ok(RawResponse::new(
            404,
            HashMap::new(),
            Self::error_body(
                404,
                &format!("no fixture for {} {}", request.method, request.path),
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri;

    fn get(path: &str) -> ApiRequest {
        ApiRequest::builder(Method::Get, path).build().unwrap()
    }

    #[tokio::test]
    async fn test_static_route_serves_envelope() {
        let transport = FixtureTransport::new().respond(
            Method::Get,
            &uri::uri(&["configs"]),
            json!({"lookups": {}}),
        );

        let response = transport.send(get("/api/v1/configs")).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["api_response"]["lookups"], json!({}));
    }

    #[tokio::test]
    async fn test_placeholder_matches_any_segment() {
        let transport = FixtureTransport::new().handle(
            Method::Get,
            &uri::uri(&["hits", "{id}"]),
            |_, params| {
                RawResponse::new(
                    200,
                    HashMap::new(),
                    FixtureTransport::success_body(200, json!({"howler": {"id": params["id"]}})),
                )
            },
        );

        let response = transport.send(get("/api/v1/hits/abc-123")).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["api_response"]["howler"]["id"], "abc-123");
    }

    #[tokio::test]
    async fn test_static_route_beats_placeholder() {
        let transport = FixtureTransport::new()
            .respond(Method::Get, "/api/v1/users/{id}", json!({"uname": "other"}))
            .respond(Method::Get, "/api/v1/users/whoami", json!({"uname": "me"}));

        let response = transport.send(get("/api/v1/users/whoami")).await.unwrap();

        assert_eq!(response.body["api_response"]["uname"], "me");
    }

    #[tokio::test]
    async fn test_trailing_slash_is_ignored() {
        let transport =
            FixtureTransport::new().respond(Method::Get, "/api/v1/views", json!([]));

        let response = transport.send(get("/api/v1/views/")).await.unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_unmatched_request_gets_404_envelope() {
        let transport = FixtureTransport::new();

        let response = transport.send(get("/api/v1/unknown")).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body["api_status_code"], 404);
        assert_eq!(
            response.body["api_error_message"],
            "no fixture for GET /api/v1/unknown"
        );
    }

    #[tokio::test]
    async fn test_method_must_match() {
        let transport =
            FixtureTransport::new().respond(Method::Get, "/api/v1/hits/abc", json!({}));

        let request = ApiRequest::builder(Method::Delete, "/api/v1/hits/abc")
            .build()
            .unwrap();
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let transport =
            FixtureTransport::new().respond(Method::Get, "/api/v1/hits/abc", json!({}));

        transport.send(get("/api/v1/hits/abc")).await.unwrap();
        transport.send(get("/api/v1/missing")).await.unwrap();

        assert_eq!(transport.request_count(), 2);
        let requests = transport.requests();
        assert_eq!(requests[0].path, "/api/v1/hits/abc");
        assert_eq!(requests[1].path, "/api/v1/missing");
    }

    #[tokio::test]
    async fn test_error_fixture_flows_through() {
        let transport = FixtureTransport::new().respond_with_status(
            Method::Get,
            "/api/v1/hits/gone",
            404,
            FixtureTransport::error_body(404, "hit does not exist"),
        );

        let response = transport.send(get("/api/v1/hits/gone")).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body["api_error_message"], "hit does not exist");
    }
}
