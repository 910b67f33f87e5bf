//! Dossier resource implementation.
//!
//! A dossier is a saved investigation aid: a query selecting the hits it
//! applies to, plus a set of leads (pivot links, notes, enrichment panels)
//! shown alongside any matching hit.

use serde::{Deserialize, Serialize};

use crate::client::HowlerClient;
use crate::envelope::{unwrap_empty, unwrap_response, unwrap_versioned, Versioned};
use crate::error::ApiError;
use crate::uri;

/// A saved investigation aid attached to matching hits.
///
/// `dossier_id` and `owner` are server-assigned and read-only; everything
/// else is writable.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Dossier {
    /// The unique identifier of the dossier.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub dossier_id: Option<String>,

    /// The display title of the dossier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The query selecting the hits this dossier applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// The visibility of the dossier (`personal` or `global`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// The user who owns the dossier.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub owner: Option<String>,

    /// The leads shown alongside matching hits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leads: Vec<Lead>,
}

/// One lead inside a dossier.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Lead {
    /// The icon shown next to the lead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// The label of the lead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// The lead content (markdown, or a templated pivot URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Accessor for the dossiers resource.
#[derive(Clone, Copy, Debug)]
pub struct Dossiers<'a> {
    client: &'a HowlerClient,
}

impl<'a> Dossiers<'a> {
    pub(crate) const fn new(client: &'a HowlerClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        uri::uri(&["dossiers", &uri::encode_segment(id)])
    }

    /// Fetches one dossier, with the validator it arrived with.
    pub async fn get(&self, id: &str) -> Result<Versioned<Dossier>, ApiError> {
        let raw = self.client.get(&Self::item_path(id)).await?;
        unwrap_versioned(raw)
    }

    /// Lists every dossier visible to the session user.
    pub async fn list(&self) -> Result<Vec<Dossier>, ApiError> {
        let raw = self.client.get(&uri::uri(&["dossiers", ""])).await?;
        unwrap_response(raw)
    }

    /// Creates a dossier.
    pub async fn create(&self, dossier: &Dossier) -> Result<Dossier, ApiError> {
        let body = serde_json::to_value(dossier)?;
        let raw = self.client.post(&uri::uri(&["dossiers", ""]), body).await?;
        unwrap_response(raw)
    }

    /// Applies a partial update to a dossier.
    pub async fn update(
        &self,
        id: &str,
        changes: serde_json::Value,
    ) -> Result<Dossier, ApiError> {
        let raw = self.client.put(&Self::item_path(id), changes, None).await?;
        unwrap_response(raw)
    }

    /// Deletes a dossier.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let raw = self.client.delete(&Self::item_path(id), None).await?;
        unwrap_empty(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dossier_serialization() {
        let dossier = Dossier {
            dossier_id: Some("d-1".to_string()),
            title: Some("C2 infrastructure".to_string()),
            query: Some("howler.analytic:\"Beacon Detector\"".to_string()),
            kind: Some("global".to_string()),
            owner: Some("jdoe".to_string()),
            leads: vec![Lead {
                icon: Some("link".to_string()),
                label: Some("Passive DNS".to_string()),
                content: Some("https://dns.example.com/?q={destination.ip}".to_string()),
            }],
        };

        let parsed = serde_json::to_value(&dossier).unwrap();

        assert_eq!(parsed["title"], "C2 infrastructure");
        assert_eq!(parsed["type"], "global");
        assert_eq!(parsed["leads"][0]["label"], "Passive DNS");

        // Server-assigned fields are omitted
        assert!(parsed.get("dossier_id").is_none());
        assert!(parsed.get("owner").is_none());
    }

    #[test]
    fn test_dossier_deserialization() {
        let dossier: Dossier = serde_json::from_value(json!({
            "dossier_id": "d-1",
            "title": "C2 infrastructure",
            "type": "personal",
            "owner": "jdoe",
            "leads": []
        }))
        .unwrap();

        assert_eq!(dossier.dossier_id.as_deref(), Some("d-1"));
        assert_eq!(dossier.kind.as_deref(), Some("personal"));
        assert!(dossier.leads.is_empty());
    }
}
