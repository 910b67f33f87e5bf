//! View resource implementation.
//!
//! A view is a saved hit search: a query plus an optional time span, shown
//! as a shortcut in the triage UI. Views are personal by default and can be
//! shared globally.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::HowlerClient;
use crate::envelope::{unwrap_empty, unwrap_response, unwrap_versioned, Versioned};
use crate::error::ApiError;
use crate::uri;

/// A saved hit search.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct View {
    /// The unique identifier of the view.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub view_id: Option<String>,

    /// The display title of the view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The hit query the view runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// The time span the view covers (`1d`, `1w`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,

    /// The sort applied to results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// The visibility of the view (`personal` or `global`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// The user who owns the view.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub owner: Option<String>,
}

/// Accessor for the views resource.
#[derive(Clone, Copy, Debug)]
pub struct Views<'a> {
    client: &'a HowlerClient,
}

impl<'a> Views<'a> {
    pub(crate) const fn new(client: &'a HowlerClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        uri::uri(&["views", &uri::encode_segment(id)])
    }

    /// Fetches one view, with the validator it arrived with.
    pub async fn get(&self, id: &str) -> Result<Versioned<View>, ApiError> {
        let raw = self.client.get(&Self::item_path(id)).await?;
        unwrap_versioned(raw)
    }

    /// Lists every view visible to the session user.
    pub async fn list(&self) -> Result<Vec<View>, ApiError> {
        let raw = self.client.get(&uri::uri(&["views", ""])).await?;
        unwrap_response(raw)
    }

    /// Creates a personal view.
    pub async fn create(
        &self,
        title: &str,
        query: &str,
        span: Option<&str>,
    ) -> Result<View, ApiError> {
        let mut body = json!({"title": title, "query": query});
        if let Some(span) = span {
            body["span"] = json!(span);
        }
        let raw = self.client.post(&uri::uri(&["views", ""]), body).await?;
        unwrap_response(raw)
    }

    /// Applies a partial update to a view.
    pub async fn update(&self, id: &str, changes: serde_json::Value) -> Result<View, ApiError> {
        let raw = self.client.put(&Self::item_path(id), changes, None).await?;
        unwrap_response(raw)
    }

    /// Deletes a view.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let raw = self.client.delete(&Self::item_path(id), None).await?;
        unwrap_empty(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_serialization_omits_server_fields() {
        let view = View {
            view_id: Some("v-1".to_string()),
            title: Some("Open escalations".to_string()),
            query: Some("howler.status:open AND howler.escalated:true".to_string()),
            span: Some("1w".to_string()),
            owner: Some("jdoe".to_string()),
            ..Default::default()
        };

        let parsed = serde_json::to_value(&view).unwrap();

        assert_eq!(parsed["title"], "Open escalations");
        assert_eq!(parsed["span"], "1w");
        assert!(parsed.get("view_id").is_none());
        assert!(parsed.get("owner").is_none());
    }

    #[test]
    fn test_view_deserialization_maps_type_to_kind() {
        let view: View = serde_json::from_str(
            r#"{"view_id": "v-1", "title": "Everything", "type": "global", "owner": "admin"}"#,
        )
        .unwrap();

        assert_eq!(view.view_id.as_deref(), Some("v-1"));
        assert_eq!(view.kind.as_deref(), Some("global"));
    }
}
