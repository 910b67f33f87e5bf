//! Template resource implementation.
//!
//! A template controls which event fields the triage UI surfaces for hits
//! of a given analytic (and optionally detection): the `keys` list names
//! the fields worth an analyst's first glance.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::HowlerClient;
use crate::envelope::{unwrap_empty, unwrap_response, unwrap_versioned, Versioned};
use crate::error::ApiError;
use crate::uri;

/// A field-display template for one analytic or detection.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Template {
    /// The unique identifier of the template.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub template_id: Option<String>,

    /// The analytic the template applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytic: Option<String>,

    /// The detection the template applies to; absent means every detection
    /// of the analytic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<String>,

    /// The visibility of the template (`personal` or `global`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// The event fields to surface, in display order.
    #[serde(default)]
    pub keys: Vec<String>,

    /// The user who owns the template.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub owner: Option<String>,
}

/// Accessor for the templates resource.
#[derive(Clone, Copy, Debug)]
pub struct Templates<'a> {
    client: &'a HowlerClient,
}

impl<'a> Templates<'a> {
    pub(crate) const fn new(client: &'a HowlerClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        uri::uri(&["templates", &uri::encode_segment(id)])
    }

    /// Fetches one template, with the validator it arrived with.
    pub async fn get(&self, id: &str) -> Result<Versioned<Template>, ApiError> {
        let raw = self.client.get(&Self::item_path(id)).await?;
        unwrap_versioned(raw)
    }

    /// Lists every template visible to the session user.
    pub async fn list(&self) -> Result<Vec<Template>, ApiError> {
        let raw = self.client.get(&uri::uri(&["templates", ""])).await?;
        unwrap_response(raw)
    }

    /// Creates a template.
    pub async fn create(&self, template: &Template) -> Result<Template, ApiError> {
        let body = serde_json::to_value(template)?;
        let raw = self.client.post(&uri::uri(&["templates", ""]), body).await?;
        unwrap_response(raw)
    }

    /// Replaces the field list of a template.
    pub async fn update(&self, id: &str, keys: &[&str]) -> Result<Template, ApiError> {
        let raw = self
            .client
            .put(&Self::item_path(id), json!({"keys": keys}), None)
            .await?;
        unwrap_response(raw)
    }

    /// Deletes a template.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let raw = self.client.delete(&Self::item_path(id), None).await?;
        unwrap_empty(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_serialization() {
        let template = Template {
            template_id: Some("t-1".to_string()),
            analytic: Some("Beacon Detector".to_string()),
            detection: Some("periodic-callback".to_string()),
            kind: Some("global".to_string()),
            keys: vec!["source.ip".to_string(), "destination.ip".to_string()],
            owner: Some("jdoe".to_string()),
        };

        let parsed = serde_json::to_value(&template).unwrap();

        assert_eq!(parsed["analytic"], "Beacon Detector");
        assert_eq!(parsed["type"], "global");
        assert_eq!(parsed["keys"], json!(["source.ip", "destination.ip"]));
        assert!(parsed.get("template_id").is_none());
        assert!(parsed.get("owner").is_none());
    }

    #[test]
    fn test_template_deserialization_defaults_keys() {
        let template: Template =
            serde_json::from_str(r#"{"template_id": "t-1", "analytic": "Beacon Detector"}"#)
                .unwrap();

        assert_eq!(template.template_id.as_deref(), Some("t-1"));
        assert!(template.keys.is_empty());
        assert!(template.detection.is_none());
    }
}
