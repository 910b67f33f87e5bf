//! Response types for the transport layer.
//!
//! [`RawResponse`] is the engine-agnostic result of one HTTP call: the
//! status, the response headers, and the parsed JSON body. Transports
//! produce it for every answered request — including error statuses, whose
//! bodies the envelope normalizer needs — and reserve `Err` for failures
//! with no response at all.

use std::collections::HashMap;

/// The parsed result of one HTTP call.
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers, keyed by lowercased name. Repeated headers keep
    /// every value in arrival order.
    pub headers: HashMap<String, Vec<String>>,
    /// The response body parsed as JSON. Bodyless responses (such as 304)
    /// are `Value::Null`.
    pub body: serde_json::Value,
}

impl RawResponse {
    /// Creates a new response, normalizing header names to lowercase.
    #[must_use]
    pub fn new(
        status: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        let mut normalized: HashMap<String, Vec<String>> = HashMap::with_capacity(headers.len());
        for (name, mut values) in headers {
            normalized
                .entry(name.to_lowercase())
                .or_default()
                .append(&mut values);
        }
        Self {
            status,
            headers: normalized,
            body,
        }
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns `true` for a 304 Not Modified answer.
    #[must_use]
    pub const fn is_not_modified(&self) -> bool {
        self.status == 304
    }

    /// Returns the first value of the named header, if present.
    ///
    /// Lookup is case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the response's `ETag` validator, if the server sent one.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.header("etag")
    }
}
