//! User resource implementation.
//!
//! Users are managed by the external identity flow; this module exposes the
//! session's own identity (`whoami`), profile lookups and updates, and the
//! favourites sub-resource pinning views and analytics to a user's home
//! screen.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::HowlerClient;
use crate::envelope::{unwrap_empty, unwrap_response, unwrap_versioned, Versioned};
use crate::error::ApiError;
use crate::uri;

/// A user profile.
///
/// `uname`, `groups`, and the favourite lists are server-managed and
/// read-only; favourites change through [`Favourites`], never by update.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct User {
    /// The unique username.
    /// Read-only field.
    #[serde(skip_serializing)]
    pub uname: Option<String>,

    /// The display name of the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The email address of the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Group memberships from the identity provider.
    /// Read-only field.
    #[serde(default, skip_serializing)]
    pub groups: Vec<String>,

    /// Roles granted to the user (`user`, `admin`, `automation`).
    /// Read-only field.
    #[serde(default, skip_serializing)]
    pub roles: Vec<String>,

    /// Ids of the views the user pinned.
    /// Read-only field - use the favourites sub-resource to change.
    #[serde(default, skip_serializing)]
    pub favourite_views: Vec<String>,

    /// Ids of the analytics the user pinned.
    /// Read-only field - use the favourites sub-resource to change.
    #[serde(default, skip_serializing)]
    pub favourite_analytics: Vec<String>,
}

/// The kinds of resources a user can pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FavouriteKind {
    /// Pinned views.
    Views,
    /// Pinned analytics.
    Analytics,
}

impl FavouriteKind {
    /// Returns the kind as it appears in favourites paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Analytics => "analytics",
        }
    }
}

/// Accessor for the users resource.
#[derive(Clone, Copy, Debug)]
pub struct Users<'a> {
    client: &'a HowlerClient,
}

impl<'a> Users<'a> {
    pub(crate) const fn new(client: &'a HowlerClient) -> Self {
        Self { client }
    }

    fn item_path(username: &str) -> String {
        uri::uri(&["users", &uri::encode_segment(username)])
    }

    /// Fetches the user behind the current session cookie.
    ///
    /// # Errors
    ///
    /// Returns an auth-class [`ApiError::Client`] (401/403) when the
    /// session cookie is missing or expired.
    pub async fn whoami(&self) -> Result<User, ApiError> {
        let raw = self.client.get(&uri::uri(&["users", "whoami"])).await?;
        unwrap_response(raw)
    }

    /// Fetches one user profile, with the validator it arrived with.
    pub async fn get(&self, username: &str) -> Result<Versioned<User>, ApiError> {
        let raw = self.client.get(&Self::item_path(username)).await?;
        unwrap_versioned(raw)
    }

    /// Applies a partial update to a user profile.
    pub async fn update(
        &self,
        username: &str,
        changes: serde_json::Value,
    ) -> Result<User, ApiError> {
        let raw = self
            .client
            .put(&Self::item_path(username), changes, None)
            .await?;
        unwrap_response(raw)
    }

    /// Returns the session user's favourites sub-resource.
    #[must_use]
    pub const fn favourites(&self) -> Favourites<'a> {
        Favourites {
            client: self.client,
        }
    }
}

/// Accessor for the session user's pinned views and analytics.
#[derive(Clone, Copy, Debug)]
pub struct Favourites<'a> {
    client: &'a HowlerClient,
}

impl Favourites<'_> {
    /// Pins a view or analytic.
    pub async fn add(&self, kind: FavouriteKind, id: &str) -> Result<(), ApiError> {
        let path = uri::uri(&["users", "favourites", kind.as_str(), ""]);
        let raw = self.client.post(&path, json!({"id": id})).await?;
        unwrap_empty(raw)
    }

    /// Unpins a view or analytic.
    pub async fn remove(&self, kind: FavouriteKind, id: &str) -> Result<(), ApiError> {
        let path = uri::uri(&[
            "users",
            "favourites",
            kind.as_str(),
            &uri::encode_segment(id),
        ]);
        let raw = self.client.delete(&path, None).await?;
        unwrap_empty(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_sends_profile_fields_only() {
        let user = User {
            uname: Some("jdoe".to_string()),
            name: Some("Jane Doe".to_string()),
            email: Some("jdoe@example.com".to_string()),
            groups: vec!["analysts".to_string()],
            roles: vec!["user".to_string()],
            favourite_views: vec!["v-1".to_string()],
            favourite_analytics: vec![],
        };

        let parsed = serde_json::to_value(&user).unwrap();

        assert_eq!(parsed["name"], "Jane Doe");
        assert_eq!(parsed["email"], "jdoe@example.com");

        assert!(parsed.get("uname").is_none());
        assert!(parsed.get("groups").is_none());
        assert!(parsed.get("roles").is_none());
        assert!(parsed.get("favourite_views").is_none());
    }

    #[test]
    fn test_user_deserialization() {
        let json = r#"{
            "uname": "jdoe",
            "name": "Jane Doe",
            "groups": ["analysts", "responders"],
            "roles": ["user", "admin"],
            "favourite_views": ["v-1", "v-2"],
            "favourite_analytics": ["an-1"]
        }"#;

        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.uname.as_deref(), Some("jdoe"));
        assert_eq!(user.groups.len(), 2);
        assert_eq!(user.favourite_views, vec!["v-1", "v-2"]);
    }

    #[test]
    fn test_favourite_kind_path_segments() {
        assert_eq!(FavouriteKind::Views.as_str(), "views");
        assert_eq!(FavouriteKind::Analytics.as_str(), "analytics");
    }
}
