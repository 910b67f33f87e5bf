//! Hit resource implementation.
//!
//! Hits are the central entity of the triage workflow: one hit is one alert
//! raised by an analytic, carrying the `howler` envelope of triage state
//! (status, assignment, assessment, labels) alongside the raw event fields
//! the analytic matched on.
//!
//! # Example
//!
//! ```rust,ignore
//! let hit = client.hits().get("abc-123").await?;
//!
//! // Conditional refresh: a 304 is answered from the validator cache.
//! let etag = hit.etag().unwrap().to_string();
//! let fresh = client.hits().get_if("abc-123", &etag).await?;
//!
//! // Workflow transition with an idempotency token.
//! let updated = client
//!     .hits()
//!     .transition("abc-123", "assess", "req-0193")
//!     .await?;
//!
//! // Sub-resources hang off the hit id.
//! client.hits().comments("abc-123").add("looks benign").await?;
//! client.hits().labels("abc-123", "insight").add(&["reviewed"]).await?;
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::HowlerClient;
use crate::envelope::{unwrap_empty, unwrap_response, unwrap_versioned, Versioned};
use crate::error::ApiError;
use crate::uri;

/// One alert in the triage queue.
///
/// The `howler` sub-object is the service's own triage state; every other
/// field of the stored document (the raw event data the analytic matched)
/// is captured in `event`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Hit {
    /// The triage envelope maintained by the service.
    pub howler: HitCore,

    /// The raw event fields outside the `howler` envelope.
    #[serde(flatten)]
    pub event: serde_json::Map<String, serde_json::Value>,
}

/// The triage state of one hit.
///
/// # Fields
///
/// ## Read-Only Fields
/// - `id` - The unique identifier, assigned on creation
/// - `hash` - Content hash used for deduplication
/// - `labels` - Mutated through the labels sub-resource, never by update
/// - `comment` - Mutated through the comments sub-resource
///
/// ## Writable Fields
/// - `analytic` / `detection` - Provenance of the alert
/// - `assignment` - The user currently responsible
/// - `status` - Workflow state (`open`, `in-progress`, `on-hold`, `resolved`)
/// - `escalated` - Whether the hit was escalated
/// - `assessment` / `rationale` - The triage verdict and its justification
/// - `score` - The analytic's confidence score
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HitCore {
    /// The unique identifier of the hit.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub id: Option<String>,

    /// The analytic that raised this hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytic: Option<String>,

    /// The detection within the analytic, when it has more than one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<String>,

    /// The user the hit is assigned to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,

    /// The workflow status: open, in-progress, on-hold, resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Whether the hit has been escalated to an alert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalated: Option<bool>,

    /// The triage verdict (for example `ambiguous`, `false-positive`,
    /// `legitimate`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<String>,

    /// Free-text justification of the assessment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    /// The analytic's confidence score for this hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Content hash used for deduplication.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub hash: Option<String>,

    /// Label values keyed by category.
    /// Read-only field - use the labels sub-resource to change.
    #[serde(skip_serializing)]
    pub labels: Option<HashMap<String, Vec<String>>>,

    /// Comments on this hit.
    /// Read-only field - use the comments sub-resource to change.
    #[serde(default, skip_serializing)]
    pub comment: Vec<Comment>,
}

/// A comment on a hit or an analytic.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Comment {
    /// The unique identifier of the comment.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub id: Option<String>,

    /// The user who wrote the comment.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub user: Option<String>,

    /// The comment text.
    pub value: String,

    /// When the comment was created.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub timestamp: Option<DateTime<Utc>>,

    /// When the comment was last edited.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub modified: Option<DateTime<Utc>>,

    /// Reactions on the comment, reaction type keyed by username.
    /// Read-only field - use the react sub-resource to change.
    #[serde(default, skip_serializing)]
    pub reactions: HashMap<String, String>,
}

/// Accessor for the hits resource.
#[derive(Clone, Copy, Debug)]
pub struct Hits<'a> {
    client: &'a HowlerClient,
}

impl<'a> Hits<'a> {
    pub(crate) const fn new(client: &'a HowlerClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        uri::uri(&["hits", &uri::encode_segment(id)])
    }

    /// Fetches one hit, with the validator it arrived with.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] with status 404 when no such hit exists.
    pub async fn get(&self, id: &str) -> Result<Versioned<Hit>, ApiError> {
        let raw = self.client.get(&Self::item_path(id)).await?;
        unwrap_versioned(raw)
    }

    /// Fetches one hit conditionally, presenting a previously returned
    /// validator as `If-Match`.
    ///
    /// When the resource is unchanged the server answers 304 and the body
    /// is served from the validator cache, so the returned value is
    /// byte-identical to the earlier response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::CacheMiss`] when a 304 arrives but the cache no
    /// longer holds the referenced body; refetch with [`Hits::get`].
    pub async fn get_if(&self, id: &str, etag: &str) -> Result<Versioned<Hit>, ApiError> {
        let raw = self.client.get_if(&Self::item_path(id), etag).await?;
        unwrap_versioned(raw)
    }

    /// Creates a hit from a map of fields.
    ///
    /// The map uses the service's flattened key syntax
    /// (`"howler.analytic": "..."`, `"howler.score": 0.8`), matching what
    /// ingestors submit.
    pub async fn create(&self, map: serde_json::Value) -> Result<Hit, ApiError> {
        let raw = self.client.post(&uri::uri(&["hits", ""]), map).await?;
        unwrap_response(raw)
    }

    /// Applies a partial update to a hit.
    ///
    /// Pass the validator from an earlier [`Hits::get`] as `if_match` for
    /// optimistic concurrency: a stale validator is rejected by the server
    /// with a 412-class [`ApiError::Client`] and is never retried.
    pub async fn update(
        &self,
        id: &str,
        changes: serde_json::Value,
        if_match: Option<&str>,
    ) -> Result<Hit, ApiError> {
        let raw = self
            .client
            .put(&Self::item_path(id), changes, if_match)
            .await?;
        unwrap_response(raw)
    }

    /// Deletes one hit.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let raw = self.client.delete(&Self::item_path(id), None).await?;
        unwrap_empty(raw)
    }

    /// Deletes several hits in one request.
    pub async fn delete_many(&self, ids: &[&str]) -> Result<(), ApiError> {
        let raw = self
            .client
            .delete(&uri::uri(&["hits", ""]), Some(json!(ids)))
            .await?;
        unwrap_empty(raw)
    }

    /// Applies a workflow transition (`assess`, `release`, `promote`, ...)
    /// to a hit.
    ///
    /// `request_id` is the caller-supplied idempotency token: a retried or
    /// duplicated request with the same token is applied once server-side,
    /// which is what makes this POST safe under the retry policy.
    pub async fn transition(
        &self,
        id: &str,
        transition: &str,
        request_id: &str,
    ) -> Result<Hit, ApiError> {
        let path = uri::join(&Self::item_path(id), &["transition"]);
        let body = json!({"transition": transition, "request_id": request_id});
        let raw = self.client.post(&path, body).await?;
        unwrap_response(raw)
    }

    /// Returns the comments sub-resource of one hit.
    #[must_use]
    pub fn comments(&self, id: &str) -> HitComments<'a> {
        HitComments {
            client: self.client,
            path: uri::join(&Self::item_path(id), &["comments"]),
        }
    }

    /// Returns one label category of one hit.
    ///
    /// Categories are the server's label buckets (`generic`, `insight`,
    /// `mitigation`, ...).
    #[must_use]
    pub fn labels(&self, id: &str, category: &str) -> HitLabels<'a> {
        HitLabels {
            client: self.client,
            path: uri::join(
                &Self::item_path(id),
                &["labels", &uri::encode_segment(category)],
            ),
        }
    }
}

/// Accessor for the comments of one hit.
#[derive(Clone, Debug)]
pub struct HitComments<'a> {
    client: &'a HowlerClient,
    path: String,
}

impl HitComments<'_> {
    /// Lists the comments on the hit, oldest first.
    pub async fn list(&self) -> Result<Vec<Comment>, ApiError> {
        let raw = self.client.get(&uri::join(&self.path, &[""])).await?;
        unwrap_response(raw)
    }

    /// Adds a comment.
    pub async fn add(&self, value: &str) -> Result<Comment, ApiError> {
        let raw = self
            .client
            .post(&uri::join(&self.path, &[""]), json!({"value": value}))
            .await?;
        unwrap_response(raw)
    }

    /// Replaces the text of an existing comment.
    pub async fn edit(&self, comment_id: &str, value: &str) -> Result<Comment, ApiError> {
        let path = uri::join(&self.path, &[&uri::encode_segment(comment_id)]);
        let raw = self.client.put(&path, json!({"value": value}), None).await?;
        unwrap_response(raw)
    }

    /// Removes a comment.
    pub async fn remove(&self, comment_id: &str) -> Result<(), ApiError> {
        let path = uri::join(&self.path, &[&uri::encode_segment(comment_id)]);
        let raw = self.client.delete(&path, None).await?;
        unwrap_empty(raw)
    }
}

/// Accessor for one label category of one hit.
#[derive(Clone, Debug)]
pub struct HitLabels<'a> {
    client: &'a HowlerClient,
    path: String,
}

impl HitLabels<'_> {
    /// Adds label values to the category.
    pub async fn add(&self, values: &[&str]) -> Result<(), ApiError> {
        let raw = self
            .client
            .put(&self.path, json!({"value": values}), None)
            .await?;
        unwrap_empty(raw)
    }

    /// Removes label values from the category.
    pub async fn remove(&self, values: &[&str]) -> Result<(), ApiError> {
        let raw = self
            .client
            .delete(&self.path, Some(json!({"value": values})))
            .await?;
        unwrap_empty(raw)
    }
}
