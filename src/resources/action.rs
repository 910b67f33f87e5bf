//! Action resource implementation.
//!
//! Actions are saved bulk operations: a query selecting hits plus a list of
//! operations to apply to every match (transition, label, assign, ...).
//! They can run on demand through [`Actions::execute`] or automatically on
//! the triggers they declare.
//!
//! Execution is a side-effecting POST, so it carries a caller-supplied
//! idempotency token: the server applies a given `request_id` exactly once,
//! which keeps the transport's retry policy safe for this verb.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::HowlerClient;
use crate::envelope::{unwrap_empty, unwrap_response, unwrap_versioned, Versioned};
use crate::error::ApiError;
use crate::uri;

/// A saved bulk operation over matching hits.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ActionRecord {
    /// The unique identifier of the action.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub action_id: Option<String>,

    /// The display name of the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The query selecting the hits the action applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// The user who owns the action.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub owner_id: Option<String>,

    /// Events that run the action automatically (`create`, `promote`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,

    /// The operations applied to each matching hit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<ActionOperation>,
}

/// One operation inside an action.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ActionOperation {
    /// The operation to perform (`transition`, `add_label`, ...).
    pub operation_id: String,

    /// Operation-specific parameters, serialized as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_json: Option<String>,
}

/// The outcome of one operation of an executed action.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ActionReport {
    /// The query slice of hits this outcome covers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// The outcome class: `success`, `skipped`, or `error`.
    pub outcome: String,

    /// A short human-readable title for the outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// A longer explanation of the outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Accessor for the actions resource.
#[derive(Clone, Copy, Debug)]
pub struct Actions<'a> {
    client: &'a HowlerClient,
}

impl<'a> Actions<'a> {
    pub(crate) const fn new(client: &'a HowlerClient) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> String {
        uri::uri(&["actions", &uri::encode_segment(id)])
    }

    /// Fetches one action, with the validator it arrived with.
    pub async fn get(&self, id: &str) -> Result<Versioned<ActionRecord>, ApiError> {
        let raw = self.client.get(&Self::item_path(id)).await?;
        unwrap_versioned(raw)
    }

    /// Lists every action visible to the session user.
    pub async fn list(&self) -> Result<Vec<ActionRecord>, ApiError> {
        let raw = self.client.get(&uri::uri(&["actions", ""])).await?;
        unwrap_response(raw)
    }

    /// Creates an action.
    pub async fn create(&self, action: &ActionRecord) -> Result<ActionRecord, ApiError> {
        let body = serde_json::to_value(action)?;
        let raw = self.client.post(&uri::uri(&["actions", ""]), body).await?;
        unwrap_response(raw)
    }

    /// Applies a partial update to an action.
    pub async fn update(
        &self,
        id: &str,
        changes: serde_json::Value,
    ) -> Result<ActionRecord, ApiError> {
        let raw = self.client.put(&Self::item_path(id), changes, None).await?;
        unwrap_response(raw)
    }

    /// Deletes an action.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let raw = self.client.delete(&Self::item_path(id), None).await?;
        unwrap_empty(raw)
    }

    /// Runs an action now, returning one report per operation outcome.
    ///
    /// `request_id` is the idempotency token: replaying the same token
    /// (after a retry or a duplicated call) executes the action only once
    /// server-side.
    pub async fn execute(
        &self,
        id: &str,
        request_id: &str,
    ) -> Result<Vec<ActionReport>, ApiError> {
        let path = uri::join(&Self::item_path(id), &["execute"]);
        let raw = self
            .client
            .post(&path, json!({"request_id": request_id}))
            .await?;
        unwrap_response(raw)
    }
}
