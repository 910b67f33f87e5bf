//! Retry policy and the retrying, cache-aware transport decorator.
//!
//! [`RetryTransport`] wraps any inner [`Transport`] and re-sends failed
//! attempts with exponential backoff (`base_delay * 2^(attempt-1)`).
//!
//! # Behavior
//!
//! - **Retried** (up to the attempt limit): network errors with no response,
//!   and 5xx statuses other than 502.
//! - **Not retried**: 2xx and 304 outcomes, every 4xx, and 502 Bad Gateway —
//!   an upstream proxy is assumed to have retried a 502 already, and doing
//!   it again here amplifies load. The exclusion is a [`RetryPolicy`] knob
//!   for deployments with no such proxy.
//! - **Exhaustion**: the final attempt's outcome is surfaced unchanged, so
//!   callers still see the real status-code class.
//!
//! The decorator also owns the validator cache: success bodies arriving
//! with an `ETag` are stored, and 304 answers are resolved back to the body
//! their `If-Match` named — or fail with
//! [`CacheMiss`](crate::ApiError::CacheMiss) when no entry exists.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::transport::{ApiRequest, EtagCache, RawResponse, Transport};

/// Decides which failures are retriable and computes backoff delays.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use howler_api::transport::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(500));
/// assert!(policy.is_retriable_status(503));
/// assert!(!policy.is_retriable_status(502));
/// assert_eq!(policy.backoff(2), Duration::from_secs(1));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    retry_bad_gateway: bool,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` total attempts with the
    /// given backoff base delay.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            retry_bad_gateway: false,
        }
    }

    /// Enables or disables client-side retry of 502 responses.
    #[must_use]
    pub const fn retry_bad_gateway(mut self, retry: bool) -> Self {
        self.retry_bad_gateway = retry;
        self
    }

    /// Returns the total attempt limit.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns `true` when a response status should be re-attempted.
    #[must_use]
    pub const fn is_retriable_status(&self, status: u16) -> bool {
        match status {
            502 => self.retry_bad_gateway,
            s => s >= 500 && s < 600,
        }
    }

    /// Returns the delay to wait after the given completed attempt
    /// (1-based): `base_delay * 2^(attempt-1)`, strictly increasing.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    /// Three total attempts, 500ms backoff base, 502 excluded.
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// A [`Transport`] decorator adding retry and conditional-request caching
/// to any inner engine.
///
/// This is the default production transport:
/// [`HowlerClient::new`](crate::HowlerClient::new) assembles one over an
/// [`HttpTransport`](crate::transport::HttpTransport). The cache is shared
/// by clone, so every handle derived from one client resolves conditional
/// requests against the same entries.
#[derive(Clone, Debug)]
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
    cache: EtagCache,
}

impl<T> RetryTransport<T> {
    /// Wraps an inner transport with the given policy and cache.
    pub const fn new(inner: T, policy: RetryPolicy, cache: EtagCache) -> Self {
        Self {
            inner,
            policy,
            cache,
        }
    }

    /// Returns the retry policy in force.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns a handle on the shared validator cache.
    #[must_use]
    pub const fn cache(&self) -> &EtagCache {
        &self.cache
    }

    /// Substitutes the cached body a 304 refers to, keeping the response's
    /// own status and headers.
    fn resolve_not_modified(
        &self,
        request: &ApiRequest,
        response: RawResponse,
    ) -> Result<RawResponse, ApiError> {
        let Some(etag) = request.if_match() else {
            warn!(path = %request.path, "304 received on a request with no If-Match");
            return Err(ApiError::CacheMiss { etag: None });
        };
        self.cache.lookup(etag).map_or_else(
            || {
                warn!(path = %request.path, %etag, "304 referenced an unknown validator");
                Err(ApiError::CacheMiss {
                    etag: Some(etag.to_string()),
                })
            },
            |body| Ok(RawResponse { body, ..response }),
        )
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self.inner.send(request.clone()).await {
                Ok(response) if response.is_not_modified() => {
                    return self.resolve_not_modified(&request, response);
                }
                Ok(response) if response.is_success() => {
                    if let Some(etag) = response.etag() {
                        self.cache.store(etag, response.body.clone());
                    }
                    return Ok(response);
                }
                Ok(response) => {
                    if attempts < self.policy.max_attempts()
                        && self.policy.is_retriable_status(response.status)
                    {
                        let delay = self.policy.backoff(attempts);
                        warn!(
                            status = response.status,
                            attempt = attempts,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "retriable response; backing off"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        continue;
                    }
                    debug!(status = response.status, "surfacing response");
                    return Ok(response);
                }
                Err(error) if error.is_network() => {
                    if attempts < self.policy.max_attempts() {
                        let delay = self.policy.backoff(attempts);
                        warn!(
                            attempt = attempts,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            %error,
                            "network failure; backing off"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        continue;
                    }
                    return Err(error);
                }
                // Non-network errors (cache integrity, invalid request) are
                // never retriable.
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Serves a scripted sequence of outcomes, one per attempt.
    struct ScriptedTransport {
        results: Mutex<Vec<Result<RawResponse, ApiError>>>,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(results: Vec<Result<RawResponse, ApiError>>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for &ScriptedTransport {
        async fn send(&self, _request: ApiRequest) -> Result<RawResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results.lock().unwrap().remove(0)
        }
    }

    fn status_response(status: u16) -> RawResponse {
        RawResponse::new(status, HashMap::new(), json!(null))
    }

    fn ok_response_with_etag(etag: &str, body: serde_json::Value) -> RawResponse {
        let mut headers = HashMap::new();
        headers.insert("ETag".to_string(), vec![etag.to_string()]);
        RawResponse::new(200, headers, body)
    }

    fn network_error() -> ApiError {
        // A URL with no host fails inside the builder, yielding a real
        // reqwest::Error without touching the network.
        ApiError::Network(reqwest::Client::new().get("http://").build().unwrap_err())
    }

    fn instant_retry(inner: &ScriptedTransport, max_attempts: u32) -> RetryTransport<&ScriptedTransport> {
        RetryTransport::new(
            inner,
            RetryPolicy::new(max_attempts, Duration::ZERO),
            EtagCache::new(8),
        )
    }

    fn get_request(path: &str) -> ApiRequest {
        ApiRequest::builder(crate::transport::Method::Get, path)
            .build()
            .unwrap()
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
        assert!(policy.backoff(1) < policy.backoff(2));
        assert!(policy.backoff(2) < policy.backoff(3));
    }

    #[test]
    fn test_retriable_status_classification() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retriable_status(500));
        assert!(policy.is_retriable_status(503));
        assert!(!policy.is_retriable_status(502));
        assert!(!policy.is_retriable_status(404));
        assert!(!policy.is_retriable_status(200));

        let lenient = RetryPolicy::default().retry_bad_gateway(true);
        assert!(lenient.is_retriable_status(502));
    }

    #[tokio::test]
    async fn test_success_needs_one_attempt() {
        let inner = ScriptedTransport::new(vec![Ok(status_response(200))]);
        let transport = instant_retry(&inner, 3);

        let response = transport.send(get_request("/api/v1/hits/a")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_503_retries_until_success() {
        let inner = ScriptedTransport::new(vec![
            Ok(status_response(503)),
            Ok(status_response(503)),
            Ok(status_response(200)),
        ]);
        let transport = instant_retry(&inner, 3);

        let response = transport.send(get_request("/api/v1/hits/a")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_503_exhaustion_surfaces_last_response() {
        let inner = ScriptedTransport::new(vec![
            Ok(status_response(503)),
            Ok(status_response(503)),
            Ok(status_response(503)),
        ]);
        let transport = instant_retry(&inner, 3);

        let response = transport.send(get_request("/api/v1/hits/a")).await.unwrap();
        assert_eq!(response.status, 503);
        // Exactly the limit, never a fourth attempt.
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_502_is_not_retried() {
        let inner = ScriptedTransport::new(vec![Ok(status_response(502))]);
        let transport = instant_retry(&inner, 3);

        let response = transport.send(get_request("/api/v1/hits/a")).await.unwrap();
        assert_eq!(response.status, 502);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_502_retried_when_policy_allows() {
        let inner = ScriptedTransport::new(vec![
            Ok(status_response(502)),
            Ok(status_response(200)),
        ]);
        let transport = RetryTransport::new(
            &inner,
            RetryPolicy::new(3, Duration::ZERO).retry_bad_gateway(true),
            EtagCache::new(8),
        );

        let response = transport.send(get_request("/api/v1/hits/a")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_4xx_is_not_retried() {
        let inner = ScriptedTransport::new(vec![Ok(status_response(404))]);
        let transport = instant_retry(&inner, 3);

        let response = transport.send(get_request("/api/v1/hits/a")).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_network_errors_retry_then_succeed() {
        let inner = ScriptedTransport::new(vec![
            Err(network_error()),
            Err(network_error()),
            Ok(status_response(200)),
        ]);
        let transport = instant_retry(&inner, 3);

        let response = transport.send(get_request("/api/v1/hits/a")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_network_exhaustion_surfaces_last_error() {
        let inner = ScriptedTransport::new(vec![
            Err(network_error()),
            Err(network_error()),
            Err(network_error()),
        ]);
        let transport = instant_retry(&inner, 3);

        let error = transport
            .send(get_request("/api/v1/hits/a"))
            .await
            .unwrap_err();
        assert!(error.is_network());
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_success_with_etag_is_cached() {
        let body = json!({"api_status_code": 200, "api_response": {"x": 1}});
        let inner = ScriptedTransport::new(vec![Ok(ok_response_with_etag("\"v1\"", body.clone()))]);
        let transport = instant_retry(&inner, 3);

        transport.send(get_request("/api/v1/hits/a")).await.unwrap();
        assert_eq!(transport.cache().lookup("\"v1\""), Some(body));
    }

    #[tokio::test]
    async fn test_304_resolves_to_cached_body() {
        let body = json!({"api_status_code": 200, "api_response": {"x": 1}});
        let inner = ScriptedTransport::new(vec![
            Ok(ok_response_with_etag("\"v1\"", body.clone())),
            Ok(status_response(304)),
        ]);
        let transport = instant_retry(&inner, 3);

        transport.send(get_request("/api/v1/hits/a")).await.unwrap();

        let conditional = ApiRequest::builder(crate::transport::Method::Get, "/api/v1/hits/a")
            .if_match("\"v1\"")
            .build()
            .unwrap();
        let resolved = transport.send(conditional).await.unwrap();

        // Round-trip law: the stored body comes back unchanged, on the
        // 304's own status.
        assert_eq!(resolved.body, body);
        assert_eq!(resolved.status, 304);
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_304_with_unknown_validator_is_cache_miss() {
        let inner = ScriptedTransport::new(vec![Ok(status_response(304))]);
        let transport = instant_retry(&inner, 3);

        let conditional = ApiRequest::builder(crate::transport::Method::Get, "/api/v1/hits/a")
            .if_match("\"ghost\"")
            .build()
            .unwrap();
        let error = transport.send(conditional).await.unwrap_err();

        assert!(matches!(
            error,
            ApiError::CacheMiss { etag: Some(ref e) } if e == "\"ghost\""
        ));
        // Integrity errors are not retried.
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_304_without_if_match_is_cache_miss() {
        let inner = ScriptedTransport::new(vec![Ok(status_response(304))]);
        let transport = instant_retry(&inner, 3);

        let error = transport
            .send(get_request("/api/v1/hits/a"))
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::CacheMiss { etag: None }));
        assert_eq!(inner.calls(), 1);
    }
}
