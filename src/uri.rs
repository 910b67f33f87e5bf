//! Pure path-composition helpers for the versioned API root.
//!
//! Every resource module builds its paths through these functions, which
//! guarantee the structural invariants of the API's URI space: exactly one
//! `/` between consecutive segments, no trailing slash on item paths, and a
//! trailing slash only for the collection-root form (requested by passing an
//! empty final segment).
//!
//! Structural segments are joined verbatim. Dynamic segments (ids supplied by
//! callers) should be escaped exactly once with [`encode_segment`] at the
//! point of insertion — the join itself never re-encodes, so already-encoded
//! values pass through untouched.
//!
//! # Example
//!
//! ```rust
//! use howler_api::uri;
//!
//! assert_eq!(uri::uri(&["hits", "abc123"]), "/api/v1/hits/abc123");
//! assert_eq!(uri::uri(&["hits", ""]), "/api/v1/hits/");
//! assert_eq!(
//!     uri::join("/api/v1/hits/abc123", &["comments", ""]),
//!     "/api/v1/hits/abc123/comments/"
//! );
//! ```

use std::borrow::Cow;

/// The versioned root all API paths hang off.
pub const API_ROOT: &str = "/api/v1";

/// Joins the API root with any number of path segments.
///
/// Empty segments are ignored, except a final empty segment, which yields a
/// trailing slash (the collection-root form). Segments are stripped of any
/// leading/trailing slashes before joining, so the output always has single
/// `/` separators regardless of how callers spell their segments.
///
/// # Example
///
/// ```rust
/// use howler_api::uri::uri;
///
/// assert_eq!(uri(&[]), "/api/v1");
/// assert_eq!(uri(&["views", "v-1", "favourite"]), "/api/v1/views/v-1/favourite");
/// assert_eq!(uri(&["views", ""]), "/api/v1/views/");
/// ```
#[must_use]
pub fn uri(segments: &[&str]) -> String {
    join(API_ROOT, segments)
}

/// Joins further segments onto an existing base path.
///
/// Sub-resource modules use this to extend their parent's path
/// (`resource/id/subresource`), applying the same separator and
/// trailing-slash rules as [`uri`].
#[must_use]
pub fn join(base: &str, segments: &[&str]) -> String {
    let mut path = String::from(base.trim_end_matches('/'));
    for segment in segments {
        let trimmed = segment.trim_matches('/');
        if !trimmed.is_empty() {
            path.push('/');
            path.push_str(trimmed);
        }
    }
    if segments
        .last()
        .map_or(false, |s| s.trim_matches('/').is_empty())
    {
        path.push('/');
    }
    path
}

/// Percent-encodes one dynamic path segment.
///
/// Apply this to caller-supplied ids exactly once, at the point the id is
/// inserted into a path. Structural segment names never need it.
///
/// # Example
///
/// ```rust
/// use howler_api::uri::encode_segment;
///
/// assert_eq!(encode_segment("plain-id"), "plain-id");
/// assert_eq!(encode_segment("needs escaping"), "needs%20escaping");
/// ```
#[must_use]
pub fn encode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}
