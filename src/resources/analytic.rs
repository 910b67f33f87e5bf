//! Analytic resource implementation.
//!
//! An analytic is a detection rule set: the thing that raises hits. The
//! client can inspect and maintain analytics, and discuss them through the
//! comments sub-resource, whose comments additionally support reactions.
//!
//! # Example
//!
//! ```rust,ignore
//! let analytics = client.analytics().list().await?;
//!
//! let comments = client.analytics().comments("an-1");
//! let note = comments.add("tuning threshold to 0.8").await?;
//! comments.react(note.id.as_deref().unwrap(), "thumbs-up").await?;
//! ```

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::HowlerClient;
use crate::envelope::{unwrap_empty, unwrap_response, unwrap_versioned, Versioned};
use crate::error::ApiError;
use crate::resources::Comment;
use crate::uri;

/// A detection rule set that raises hits.
///
/// # Fields
///
/// ## Read-Only Fields
/// - `analytic_id` - The unique identifier
/// - `detections` - Maintained by the ingest pipeline
/// - `owner` - Set on creation
/// - `comment` - Mutated through the comments sub-resource
///
/// ## Writable Fields
/// - `name`, `description` - Presentation metadata
/// - `contributors` - Users allowed to maintain the analytic
/// - `rule`, `rule_type` - The rule source for rule-backed analytics
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Analytic {
    /// The unique identifier of the analytic.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub analytic_id: Option<String>,

    /// The display name of the analytic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A description of what the analytic detects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The detections this analytic raises hits under.
    /// Read-only field.
    #[serde(default, skip_serializing)]
    pub detections: Vec<String>,

    /// The user who owns the analytic.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub owner: Option<String>,

    /// Users allowed to maintain the analytic.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<String>,

    /// The rule source, for rule-backed analytics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// The rule language (`lucene`, `eql`, `sigma`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,

    /// Comments on this analytic.
    /// Read-only field - use the comments sub-resource to change.
    #[serde(default, skip_serializing)]
    pub comment: Vec<Comment>,
}

/// Accessor for the analytics resource.
#[derive(Clone, Copy, Debug)]
pub struct Analytics<'a> {
    client: &'a HowlerClient,
}

impl<'a> Analytics<'a> {
    pub(crate) const fn new(client: &'a HowlerClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        uri::uri(&["analytics", &uri::encode_segment(id)])
    }

    /// Fetches one analytic, with the validator it arrived with.
    pub async fn get(&self, id: &str) -> Result<Versioned<Analytic>, ApiError> {
        let raw = self.client.get(&Self::item_path(id)).await?;
        unwrap_versioned(raw)
    }

    /// Lists every analytic.
    pub async fn list(&self) -> Result<Vec<Analytic>, ApiError> {
        let raw = self.client.get(&uri::uri(&["analytics", ""])).await?;
        unwrap_response(raw)
    }

    /// Applies a partial update to an analytic.
    pub async fn update(
        &self,
        id: &str,
        changes: serde_json::Value,
    ) -> Result<Analytic, ApiError> {
        let raw = self.client.put(&Self::item_path(id), changes, None).await?;
        unwrap_response(raw)
    }

    /// Deletes an analytic.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let raw = self.client.delete(&Self::item_path(id), None).await?;
        unwrap_empty(raw)
    }

    /// Returns the comments sub-resource of one analytic.
    #[must_use]
    pub fn comments(&self, id: &str) -> AnalyticComments<'a> {
        AnalyticComments {
            client: self.client,
            path: uri::join(&Self::item_path(id), &["comments"]),
        }
    }
}

/// Accessor for the comments of one analytic.
///
/// Analytic comments support everything hit comments do, plus reactions:
/// each user can attach one reaction type per comment.
#[derive(Clone, Debug)]
pub struct AnalyticComments<'a> {
    client: &'a HowlerClient,
    path: String,
}

impl AnalyticComments<'_> {
    fn comment_path(&self, comment_id: &str) -> String {
        uri::join(&self.path, &[&uri::encode_segment(comment_id)])
    }

    /// Lists the comments on the analytic, oldest first.
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
        let raw = self
            .client
            .put(&self.comment_path(comment_id), json!({"value": value}), None)
            .await?;
        unwrap_response(raw)
    }

    /// Removes a comment.
    pub async fn remove(&self, comment_id: &str) -> Result<(), ApiError> {
        let raw = self.client.delete(&self.comment_path(comment_id), None).await?;
        unwrap_empty(raw)
    }

    /// Sets the calling user's reaction on a comment, replacing any
    /// previous one.
    pub async fn react(&self, comment_id: &str, reaction_type: &str) -> Result<(), ApiError> {
        let path = uri::join(&self.comment_path(comment_id), &["react"]);
        let raw = self
            .client
            .put(&path, json!({"type": reaction_type}), None)
            .await?;
        unwrap_empty(raw)
    }

    /// Clears the calling user's reaction on a comment.
    pub async fn unreact(&self, comment_id: &str) -> Result<(), ApiError> {
        let path = uri::join(&self.comment_path(comment_id), &["react"]);
        let raw = self.client.delete(&path, None).await?;
        unwrap_empty(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytic_serialization_omits_read_only_fields() {
        let analytic = Analytic {
            analytic_id: Some("an-1".to_string()),
            name: Some("Beacon Detector".to_string()),
            description: Some("Finds periodic callbacks".to_string()),
            detections: vec!["periodic-callback".to_string()],
            owner: Some("jdoe".to_string()),
            contributors: vec!["asmith".to_string()],
            ..Default::default()
        };

        let parsed = serde_json::to_value(&analytic).unwrap();

        assert_eq!(parsed["name"], "Beacon Detector");
        assert_eq!(parsed["contributors"], json!(["asmith"]));

        assert!(parsed.get("analytic_id").is_none());
        assert!(parsed.get("detections").is_none());
        assert!(parsed.get("owner").is_none());
        assert!(parsed.get("comment").is_none());
    }

    #[test]
    fn test_analytic_deserialization() {
        let json = r#"{
            "analytic_id": "an-1",
            "name": "Beacon Detector",
            "detections": ["periodic-callback", "long-poll"],
            "owner": "jdoe",
            "rule": "event.category:network AND interval:>300",
            "rule_type": "lucene",
            "comment": [{"id": "c-1", "user": "jdoe", "value": "tuned"}]
        }"#;

        let analytic: Analytic = serde_json::from_str(json).unwrap();

        assert_eq!(analytic.analytic_id.as_deref(), Some("an-1"));
        assert_eq!(analytic.detections.len(), 2);
        assert_eq!(analytic.rule_type.as_deref(), Some("lucene"));
        assert_eq!(analytic.comment[0].value, "tuned");
    }
}
