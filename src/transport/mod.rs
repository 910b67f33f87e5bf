//! The pluggable HTTP transport layer.
//!
//! Everything below the resource modules lives here. The central abstraction
//! is the [`Transport`] trait — "perform one HTTP call" — with three
//! interchangeable implementations:
//!
//! - [`HttpTransport`]: the reqwest-backed engine, one attempt per call
//! - [`RetryTransport`]: a decorator adding retry with exponential backoff
//!   and conditional-request caching over any inner transport
//! - [`FixtureTransport`]: an in-memory backend serving canned fixtures for
//!   offline development and tests
//!
//! Callers hold transports as `Arc<dyn Transport>` and never depend on a
//! concrete engine. The production stack assembled by
//! [`HowlerClient::new`](crate::HowlerClient::new) is
//! `RetryTransport<HttpTransport>`.

use async_trait::async_trait;

use crate::error::ApiError;

mod cache;
mod fixture;
mod http;
mod request;
mod response;
mod retry;

pub use cache::EtagCache;
pub use fixture::FixtureTransport;
pub use http::{HttpTransport, CLIENT_VERSION};
pub use request::{ApiRequest, ApiRequestBuilder, Method};
pub use response::RawResponse;
pub use retry::{RetryPolicy, RetryTransport};

/// The single capability every HTTP backend provides.
///
/// Implementations must return `Ok(RawResponse)` for every *answered*
/// request, whatever its status — error statuses are data for the envelope
/// normalizer, not transport failures. `Err` is reserved for conditions with
/// no response at all (network failures) and for integrity failures raised
/// by decorators (an unresolvable 304).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one HTTP call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when no response was received,
    /// [`ApiError::CacheMiss`] when a 304 could not be resolved, or
    /// [`ApiError::InvalidRequest`] when the request fails validation.
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        (**self).send(request).await
    }
}
