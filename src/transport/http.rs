//! The reqwest-backed transport engine.
//!
//! [`HttpTransport`] performs exactly one HTTP attempt per
//! [`send`](crate::transport::Transport::send) call: no retries, no cache.
//! Production clients wrap it in
//! [`RetryTransport`](crate::transport::RetryTransport) for both.
//!
//! Session semantics are cookie-based: the engine always carries a cookie
//! jar (the externally populated one from
//! [`HowlerConfig::cookie_jar`](crate::HowlerConfig), or a fresh private
//! jar), so the session cookie set by the login flow rides along on every
//! request and `Set-Cookie` answers are honored. The engine itself never
//! logs in.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use tracing::debug;

use crate::config::{BaseUrl, HowlerConfig};
use crate::error::ApiError;
use crate::transport::{ApiRequest, Method, RawResponse, Transport};

/// Client version from Cargo.toml.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP engine for the Howler API.
///
/// Responsibilities:
/// - full URL construction from the configured base URL
/// - default headers (User-Agent, Accept) merged with per-request headers
/// - JSON body serialization
/// - parsing every answered response into a [`RawResponse`], whatever its
///   status; only unanswered requests (DNS, refused, timeout) become errors
///
/// # Thread Safety
///
/// `HttpTransport` is `Send + Sync` and cheap to clone (the underlying
/// reqwest client is reference-counted).
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: BaseUrl,
    default_headers: HashMap<String, String>,
}

// Verify HttpTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpTransport>();
};

impl HttpTransport {
    /// Creates a new engine from the client configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This
    /// should only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: &HowlerConfig) -> Self {
        let user_agent_prefix = config
            .user_agent()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Howler API Client v{CLIENT_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let jar = config
            .cookie_jar()
            .map_or_else(|| Arc::new(Jar::default()), Arc::clone);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .cookie_provider(jar)
            .build()
            .expect("Failed to create HTTP transport");

        Self {
            client,
            base_url: config.base_url().clone(),
            default_headers,
        }
    }

    /// Returns the base URL requests are issued against.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the default headers attached to every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Parses response headers into a lowercased multi-value map.
    fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Parses a body's text as JSON.
    ///
    /// Empty bodies (304s, 204s) become `Null`; non-JSON bodies (proxy
    /// error pages) are kept as a JSON string so the envelope normalizer
    /// can still surface their text.
    fn parse_body(text: &str) -> serde_json::Value {
        if text.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        request.verify()?;

        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, %url, "dispatching request");

        let mut req_builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(headers) = &request.headers {
            for (key, value) in headers {
                req_builder = req_builder.header(key, value);
            }
        }
        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }
        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let res = req_builder.send().await?;

        let status = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let text = res.text().await.unwrap_or_default();
        let body = Self::parse_body(&text);

        debug!(method = %request.method, path = %request.path, status, "received response");

        Ok(RawResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HowlerConfig;

    fn test_config() -> HowlerConfig {
        HowlerConfig::builder()
            .base_url(BaseUrl::new("https://howler.example.com").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_headers_include_user_agent_and_accept() {
        let transport = HttpTransport::new(&test_config());

        let user_agent = transport.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.contains("Howler API Client v"));
        assert!(user_agent.contains("Rust"));

        assert_eq!(
            transport.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = HowlerConfig::builder()
            .base_url(BaseUrl::new("https://howler.example.com").unwrap())
            .user_agent("triage-bot/2.1")
            .build()
            .unwrap();
        let transport = HttpTransport::new(&config);

        let user_agent = transport.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("triage-bot/2.1 | "));
    }

    #[test]
    fn test_base_url_is_kept() {
        let transport = HttpTransport::new(&test_config());
        assert_eq!(transport.base_url().as_str(), "https://howler.example.com");
    }

    #[test]
    fn test_parse_body_handles_all_shapes() {
        assert_eq!(HttpTransport::parse_body(""), serde_json::Value::Null);
        assert_eq!(
            HttpTransport::parse_body(r#"{"api_status_code":200}"#),
            serde_json::json!({"api_status_code": 200})
        );
        assert_eq!(
            HttpTransport::parse_body("<html>Bad Gateway</html>"),
            serde_json::Value::String("<html>Bad Gateway</html>".to_string())
        );
    }

    #[test]
    fn test_transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTransport>();
    }
}
