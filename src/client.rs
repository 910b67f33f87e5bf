//! The client root tying configuration, transport, and resources together.
//!
//! [`HowlerClient`] is an explicitly constructed handle: it owns the
//! transport, and every resource module borrows it through an accessor
//! (`client.hits()`, `client.search()`, ...). There is no implicit global
//! instance — tests and embedders inject any [`Transport`] they like via
//! [`HowlerClient::with_transport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use howler_api::{BaseUrl, HowlerClient, HowlerConfig};
//!
//! # async fn run() -> Result<(), howler_api::ApiError> {
//! let config = HowlerConfig::builder()
//!     .base_url(BaseUrl::new("https://howler.example.com").unwrap())
//!     .build()
//!     .unwrap();
//! let client = HowlerClient::new(&config);
//!
//! let hit = client.hits().get("example-hit-id").await?;
//! println!("status: {:?}, etag: {:?}", hit.howler.status, hit.etag());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::HowlerConfig;
use crate::error::ApiError;
use crate::resources::{
    Actions, Analytics, Dossiers, Hits, Search, Templates, Users, Views,
};
use crate::transport::{
    ApiRequest, EtagCache, HttpTransport, Method, RawResponse, RetryPolicy, RetryTransport,
    Transport,
};

/// A handle on the Howler API.
///
/// Cheap to clone: clones share the transport, and with it the validator
/// cache and the session cookie jar, so every handle derived from one client
/// behaves as one session.
#[derive(Clone)]
pub struct HowlerClient {
    transport: Arc<dyn Transport>,
}

// Verify HowlerClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HowlerClient>();
};

impl HowlerClient {
    /// Creates a client with the default production transport: a
    /// [`RetryTransport`] over an [`HttpTransport`], configured from
    /// `config`.
    #[must_use]
    pub fn new(config: &HowlerConfig) -> Self {
        let engine = HttpTransport::new(config);
        let policy = RetryPolicy::new(config.max_attempts(), config.retry_base_delay())
            .retry_bad_gateway(config.retry_bad_gateway());
        let cache = EtagCache::new(config.cache_capacity());
        Self::with_transport(Arc::new(RetryTransport::new(engine, policy, cache)))
    }

    /// Creates a client over any transport.
    ///
    /// The injected transport is used as-is: no retry or caching is layered
    /// on top. Wrap it in a [`RetryTransport`] first if those semantics are
    /// wanted.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Returns the hits resource.
    #[must_use]
    pub const fn hits(&self) -> Hits<'_> {
        Hits::new(self)
    }

    /// Returns the analytics resource.
    #[must_use]
    pub const fn analytics(&self) -> Analytics<'_> {
        Analytics::new(self)
    }

    /// Returns the dossiers resource.
    #[must_use]
    pub const fn dossiers(&self) -> Dossiers<'_> {
        Dossiers::new(self)
    }

    /// Returns the actions resource.
    #[must_use]
    pub const fn actions(&self) -> Actions<'_> {
        Actions::new(self)
    }

    /// Returns the search resource.
    #[must_use]
    pub const fn search(&self) -> Search<'_> {
        Search::new(self)
    }

    /// Returns the users resource.
    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    /// Returns the views resource.
    #[must_use]
    pub const fn views(&self) -> Views<'_> {
        Views::new(self)
    }

    /// Returns the templates resource.
    #[must_use]
    pub const fn templates(&self) -> Templates<'_> {
        Templates::new(self)
    }

    /// Dispatches a prepared request through the transport.
    pub(crate) async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        self.transport.send(request).await
    }

    /// Issues a GET.
    pub(crate) async fn get(&self, path: &str) -> Result<RawResponse, ApiError> {
        let request = ApiRequest::builder(Method::Get, path).build()?;
        self.send(request).await
    }

    /// Issues a conditional GET carrying an `If-Match` validator.
    ///
    /// A 304 answer is resolved from the validator cache by the transport.
    pub(crate) async fn get_if(&self, path: &str, etag: &str) -> Result<RawResponse, ApiError> {
        let request = ApiRequest::builder(Method::Get, path).if_match(etag).build()?;
        self.send(request).await
    }

    /// Issues a POST with a JSON body.
    pub(crate) async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<RawResponse, ApiError> {
        let request = ApiRequest::builder(Method::Post, path).body(body).build()?;
        self.send(request).await
    }

    /// Issues a PUT with a JSON body and an optional `If-Match`
    /// precondition.
    pub(crate) async fn put(
        &self,
        path: &str,
        body: serde_json::Value,
        if_match: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        let mut builder = ApiRequest::builder(Method::Put, path).body(body);
        if let Some(etag) = if_match {
            builder = builder.if_match(etag);
        }
        self.send(builder.build()?).await
    }

    /// Issues a DELETE, with an optional JSON body for bulk forms.
    pub(crate) async fn delete(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<RawResponse, ApiError> {
        let mut builder = ApiRequest::builder(Method::Delete, path);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        self.send(builder.build()?).await
    }
}

impl std::fmt::Debug for HowlerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HowlerClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaseUrl;
    use crate::transport::FixtureTransport;
    use serde_json::json;

    fn test_client() -> HowlerClient {
        let config = HowlerConfig::builder()
            .base_url(BaseUrl::new("https://howler.example.com").unwrap())
            .build()
            .unwrap();
        HowlerClient::new(&config)
    }

    #[test]
    fn test_client_is_cheap_to_clone() {
        let client = test_client();
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.transport, &clone.transport));
    }

    #[tokio::test]
    async fn test_injected_transport_is_used_verbatim() {
        let transport = FixtureTransport::new().respond(
            Method::Get,
            "/api/v1/ping",
            json!({"pong": true}),
        );
        let client = HowlerClient::with_transport(Arc::new(transport));

        let response = client.get("/api/v1/ping").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body["api_response"]["pong"], json!(true));
    }

    #[tokio::test]
    async fn test_verb_helpers_build_valid_requests() {
        let transport = Arc::new(
            FixtureTransport::new()
                .respond(Method::Post, "/api/v1/echo", json!({}))
                .respond(Method::Put, "/api/v1/echo/{id}", json!({}))
                .respond(Method::Delete, "/api/v1/echo/{id}", json!({})),
        );
        let client = HowlerClient::with_transport(Arc::clone(&transport) as Arc<dyn Transport>);

        client
            .post("/api/v1/echo", json!({"a": 1}))
            .await
            .unwrap();
        client
            .put("/api/v1/echo/x", json!({"b": 2}), Some("\"v1\""))
            .await
            .unwrap();
        client.delete("/api/v1/echo/x", None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[1].if_match(), Some("\"v1\""));
        assert!(requests[2].body.is_none());
    }
}
