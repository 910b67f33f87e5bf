//! Search resource implementation.
//!
//! All search variants are POST-bodied calls under `search/...`, one per
//! index. When the caller supplies no query, the index's wildcard
//! expression is substituted — an omitted query is shorthand for "all
//! records of this type", not an error. That substitution is part of the
//! API's back-compatibility contract and must not change.
//!
//! # Example
//!
//! ```rust,ignore
//! use howler_api::resources::{Index, SearchRequest};
//!
//! // No query: searches howler.id:* (everything).
//! let all = client.search().hits(SearchRequest::default()).await?;
//!
//! let open = client
//!     .search()
//!     .hits(SearchRequest {
//!         query: Some("howler.status:open".to_string()),
//!         rows: Some(25),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let total = client.search().count(Index::Hits, None).await?;
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::HowlerClient;
use crate::envelope::unwrap_response;
use crate::error::ApiError;
use crate::resources::{Analytic, Dossier, Hit, Template, User, View};
use crate::uri;

/// A searchable collection.
///
/// Each index carries its own wildcard expression, substituted when a
/// search request omits its query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Index {
    /// The hits index.
    Hits,
    /// The analytics index.
    Analytics,
    /// The dossiers index.
    Dossiers,
    /// The templates index.
    Templates,
    /// The views index.
    Views,
    /// The users index.
    Users,
}

impl Index {
    /// Returns the index name as it appears in search paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hits => "hits",
            Self::Analytics => "analytics",
            Self::Dossiers => "dossiers",
            Self::Templates => "templates",
            Self::Views => "views",
            Self::Users => "users",
        }
    }

    /// Returns the index's match-everything expression.
    #[must_use]
    pub const fn wildcard(self) -> &'static str {
        match self {
            Self::Hits => "howler.id:*",
            Self::Analytics => "analytic_id:*",
            Self::Dossiers => "dossier_id:*",
            Self::Templates => "template_id:*",
            Self::Views => "view_id:*",
            Self::Users => "uname:*",
        }
    }
}

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search call's parameters.
///
/// All fields are optional; `..Default::default()` is the idiomatic way to
/// set only what a call needs. An absent `query` becomes the index's
/// wildcard on dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// The query expression. `None` means "everything in this index".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Result offset for paging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,

    /// Sort expression (`field asc`, `field desc`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Comma-separated field list to return, trimming large documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fl: Option<String>,

    /// Additional filter expressions ANDed onto the query.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
}

impl SearchRequest {
    /// Serializes the request for one index, substituting the wildcard
    /// when no query was set.
    fn into_body(mut self, index: Index) -> Result<serde_json::Value, ApiError> {
        if self.query.is_none() {
            self.query = Some(index.wildcard().to_string());
        }
        serde_json::to_value(&self).map_err(ApiError::from)
    }
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchResults<T> {
    /// The matching documents of this page.
    pub items: Vec<T>,
    /// The total number of matches across all pages.
    pub total: u64,
    /// The offset this page starts at.
    #[serde(default)]
    pub offset: u64,
    /// The page size used.
    #[serde(default)]
    pub rows: u64,
}

/// Results of a grouped search: matches bucketed by a field's values.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GroupedResults {
    /// One bucket per distinct field value.
    pub items: Vec<SearchGroup>,
    /// The total number of matches across all buckets.
    pub total: u64,
}

/// One bucket of a grouped search.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchGroup {
    /// The field value this bucket groups.
    pub value: String,
    /// The number of matches in the bucket.
    pub total: u64,
    /// A sample of the bucket's documents.
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

/// Accessor for the search resource.
#[derive(Clone, Copy, Debug)]
pub struct Search<'a> {
    client: &'a HowlerClient,
}

impl<'a> Search<'a> {
    pub(crate) const fn new(client: &'a HowlerClient) -> Self {
        Self { client }
    }

    async fn query_index<T: DeserializeOwned>(
        &self,
        index: Index,
        request: SearchRequest,
    ) -> Result<SearchResults<T>, ApiError> {
        let path = uri::uri(&["search", index.as_str(), ""]);
        let raw = self.client.post(&path, request.into_body(index)?).await?;
        unwrap_response(raw)
    }

    /// Searches the hits index.
    pub async fn hits(&self, request: SearchRequest) -> Result<SearchResults<Hit>, ApiError> {
        self.query_index(Index::Hits, request).await
    }

    /// Searches the analytics index.
    pub async fn analytics(
        &self,
        request: SearchRequest,
    ) -> Result<SearchResults<Analytic>, ApiError> {
        self.query_index(Index::Analytics, request).await
    }

    /// Searches the dossiers index.
    pub async fn dossiers(
        &self,
        request: SearchRequest,
    ) -> Result<SearchResults<Dossier>, ApiError> {
        self.query_index(Index::Dossiers, request).await
    }

    /// Searches the templates index.
    pub async fn templates(
        &self,
        request: SearchRequest,
    ) -> Result<SearchResults<Template>, ApiError> {
        self.query_index(Index::Templates, request).await
    }

    /// Searches the views index.
    pub async fn views(&self, request: SearchRequest) -> Result<SearchResults<View>, ApiError> {
        self.query_index(Index::Views, request).await
    }

    /// Searches the users index.
    pub async fn users(&self, request: SearchRequest) -> Result<SearchResults<User>, ApiError> {
        self.query_index(Index::Users, request).await
    }

    /// Counts the matches of a query without fetching them.
    ///
    /// `None` counts the whole index, through the same wildcard
    /// substitution as the search variants.
    pub async fn count(&self, index: Index, query: Option<&str>) -> Result<u64, ApiError> {
        let path = uri::uri(&["search", "count", index.as_str(), ""]);
        let body = SearchRequest {
            query: query.map(str::to_string),
            ..Default::default()
        }
        .into_body(index)?;
        let raw = self.client.post(&path, body).await?;
        let result: CountResult = unwrap_response(raw)?;
        Ok(result.count)
    }

    /// Searches an index with results bucketed by a field's values.
    pub async fn grouped(
        &self,
        index: Index,
        field: &str,
        request: SearchRequest,
    ) -> Result<GroupedResults, ApiError> {
        let path = uri::uri(&[
            "search",
            "grouped",
            index.as_str(),
            &uri::encode_segment(field),
            "",
        ]);
        let raw = self.client.post(&path, request.into_body(index)?).await?;
        unwrap_response(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wildcard_table_is_exact() {
        assert_eq!(Index::Hits.wildcard(), "howler.id:*");
        assert_eq!(Index::Analytics.wildcard(), "analytic_id:*");
        assert_eq!(Index::Dossiers.wildcard(), "dossier_id:*");
        assert_eq!(Index::Templates.wildcard(), "template_id:*");
        assert_eq!(Index::Views.wildcard(), "view_id:*");
        assert_eq!(Index::Users.wildcard(), "uname:*");
    }

    #[test]
    fn test_omitted_query_becomes_wildcard() {
        let body = SearchRequest::default().into_body(Index::Hits).unwrap();
        assert_eq!(body["query"], "howler.id:*");
    }

    #[test]
    fn test_explicit_query_is_kept() {
        let body = SearchRequest {
            query: Some("howler.status:open".to_string()),
            rows: Some(25),
            ..Default::default()
        }
        .into_body(Index::Hits)
        .unwrap();

        assert_eq!(body["query"], "howler.status:open");
        assert_eq!(body["rows"], 25);
        // Unset fields are not serialized at all.
        assert!(body.get("offset").is_none());
        assert!(body.get("filters").is_none());
    }

    #[test]
    fn test_search_results_deserialization() {
        let results: SearchResults<serde_json::Value> = serde_json::from_value(json!({
            "items": [{"a": 1}, {"a": 2}],
            "total": 41,
            "offset": 0,
            "rows": 2
        }))
        .unwrap();

        assert_eq!(results.items.len(), 2);
        assert_eq!(results.total, 41);
        assert_eq!(results.rows, 2);
    }

    #[test]
    fn test_grouped_results_deserialization() {
        let grouped: GroupedResults = serde_json::from_value(json!({
            "items": [
                {"value": "open", "total": 12, "items": []},
                {"value": "resolved", "total": 29}
            ],
            "total": 41
        }))
        .unwrap();

        assert_eq!(grouped.items.len(), 2);
        assert_eq!(grouped.items[1].value, "resolved");
        assert!(grouped.items[1].items.is_empty());
    }

    #[test]
    fn test_index_display_matches_paths() {
        assert_eq!(Index::Hits.to_string(), "hits");
        assert_eq!(
            uri::uri(&["search", Index::Users.as_str(), ""]),
            "/api/v1/search/users/"
        );
    }
}
