//! Configuration types for the Howler API client.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HowlerConfig`]: the configuration struct holding all client settings
//! - [`HowlerConfigBuilder`]: a builder for constructing [`HowlerConfig`]
//! - [`BaseUrl`]: a validated API host URL newtype
//!
//! The only required setting is the base URL. Everything else — timeouts,
//! retry knobs, cache capacity, the session cookie jar — has a default that
//! matches a stock deployment.
//!
//! # Example
//!
//! ```rust
//! use howler_api::{BaseUrl, HowlerConfig};
//!
//! let config = HowlerConfig::builder()
//!     .base_url(BaseUrl::new("https://howler.example.com").unwrap())
//!     .retry_bad_gateway(true)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_attempts(), 3);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use url::Url;

use crate::error::ConfigError;

/// A validated base URL for the API host.
///
/// Accepts absolute `http`/`https` URLs, optionally with a path prefix for
/// deployments mounted behind one. Any trailing slash is dropped so that
/// joining the versioned API root never doubles a separator. Query strings
/// and fragments are rejected.
///
/// # Example
///
/// ```rust
/// use howler_api::BaseUrl;
///
/// let url = BaseUrl::new("https://howler.example.com/").unwrap();
/// assert_eq!(url.as_str(), "https://howler.example.com");
///
/// assert!(BaseUrl::new("ftp://howler.example.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the value is not an
    /// absolute `http`/`https` URL, has no host, or carries a query string
    /// or fragment.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into();
        let trimmed = raw.trim();

        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw,
                reason: "missing host".to_string(),
            });
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw,
                reason: "query strings and fragments are not allowed".to_string(),
            });
        }

        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    /// Returns the normalized URL string (no trailing slash).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration for the Howler API client.
///
/// # Thread Safety
///
/// `HowlerConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Sessions
///
/// Authentication is handled by an external login flow that populates a
/// `reqwest` cookie jar. Pass that jar via
/// [`HowlerConfigBuilder::cookie_jar`] so the client forwards the session
/// cookie on every request; when no jar is supplied, the client creates a
/// private empty one.
#[derive(Clone, Debug)]
pub struct HowlerConfig {
    base_url: BaseUrl,
    timeout: Duration,
    max_attempts: u32,
    retry_base_delay: Duration,
    retry_bad_gateway: bool,
    cache_capacity: usize,
    cookie_jar: Option<Arc<Jar>>,
    user_agent: Option<String>,
}

impl HowlerConfig {
    /// Creates a new builder for constructing a `HowlerConfig`.
    #[must_use]
    pub fn builder() -> HowlerConfigBuilder {
        HowlerConfigBuilder::new()
    }

    /// Returns the API host base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the engine-level request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the total attempt limit for retriable failures.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the base delay of the exponential backoff schedule.
    #[must_use]
    pub const fn retry_base_delay(&self) -> Duration {
        self.retry_base_delay
    }

    /// Returns whether 502 responses are retried client-side.
    #[must_use]
    pub const fn retry_bad_gateway(&self) -> bool {
        self.retry_bad_gateway
    }

    /// Returns the validator cache capacity, in entries.
    #[must_use]
    pub const fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Returns the externally managed session cookie jar, if configured.
    #[must_use]
    pub const fn cookie_jar(&self) -> Option<&Arc<Jar>> {
        self.cookie_jar.as_ref()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

// Verify HowlerConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HowlerConfig>();
};

/// Builder for constructing [`HowlerConfig`] instances.
///
/// The only required field is `base_url`.
///
/// # Defaults
///
/// - `timeout`: 30 seconds
/// - `max_attempts`: 3
/// - `retry_base_delay`: 500 milliseconds
/// - `retry_bad_gateway`: `false`
/// - `cache_capacity`: 128 entries
/// - `cookie_jar`: `None` (a private jar is created)
/// - `user_agent`: `None`
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use howler_api::{BaseUrl, HowlerConfig};
///
/// let config = HowlerConfig::builder()
///     .base_url(BaseUrl::new("https://howler.example.com").unwrap())
///     .timeout(Duration::from_secs(10))
///     .max_attempts(5)
///     .user_agent("triage-bot/2.1")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct HowlerConfigBuilder {
    base_url: Option<BaseUrl>,
    timeout: Option<Duration>,
    max_attempts: Option<u32>,
    retry_base_delay: Option<Duration>,
    retry_bad_gateway: Option<bool>,
    cache_capacity: Option<usize>,
    cookie_jar: Option<Arc<Jar>>,
    user_agent: Option<String>,
}

impl HowlerConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API host base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the engine-level request timeout.
    ///
    /// Individual requests may still override this via
    /// [`ApiRequest::builder`](crate::transport::ApiRequest::builder).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the total attempt limit for retriable failures.
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the base delay of the exponential backoff schedule.
    #[must_use]
    pub const fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    /// Sets whether 502 responses are retried client-side.
    ///
    /// Defaults to `false`: deployments behind a retrying proxy must not
    /// retry a Bad Gateway a second time. Enable this when talking to the
    /// API directly.
    #[must_use]
    pub const fn retry_bad_gateway(mut self, retry: bool) -> Self {
        self.retry_bad_gateway = Some(retry);
        self
    }

    /// Sets the validator cache capacity, in entries.
    #[must_use]
    pub const fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Sets the session cookie jar populated by the external login flow.
    #[must_use]
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent = Some(prefix.into());
        self
    }

    /// Builds the [`HowlerConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not
    /// set, or [`ConfigError::ZeroAttempts`] if `max_attempts` is zero.
    pub fn build(self) -> Result<HowlerConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        let max_attempts = self.max_attempts.unwrap_or(3);
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        Ok(HowlerConfig {
            base_url,
            timeout: self.timeout.unwrap_or(Duration::from_secs(30)),
            max_attempts,
            retry_base_delay: self.retry_base_delay.unwrap_or(Duration::from_millis(500)),
            retry_bad_gateway: self.retry_bad_gateway.unwrap_or(false),
            cache_capacity: self.cache_capacity.unwrap_or(128),
            cookie_jar: self.cookie_jar,
            user_agent: self.user_agent,
        })
    }
}
