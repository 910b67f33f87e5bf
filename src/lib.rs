//! # Howler API Rust Client
//!
//! A typed, async Rust client for the Howler alert-triage API: a
//! hierarchical resource surface over a pluggable HTTP transport with
//! conditional-request caching, automatic retry, and uniform response
//! envelope handling.
//!
//! ## Overview
//!
//! This client provides:
//! - Type-safe configuration via [`HowlerConfig`] and [`HowlerConfigBuilder`]
//! - A pluggable [`transport::Transport`] abstraction with interchangeable
//!   backends (reqwest engine, retrying/caching decorator, fixture server)
//! - Conditional GETs: `ETag` validators are cached and 304 answers are
//!   resolved back to their stored bodies
//! - Automatic retry with exponential backoff for network failures and
//!   retriable server errors (502 excluded by default)
//! - Uniform envelope normalization: every call returns a typed value or a
//!   typed [`ApiError`], never an ambiguous empty payload
//! - One resource module per server entity — hits, analytics, dossiers,
//!   actions, search, users, views, templates — with sub-resources for
//!   comments, reactions, favourites, and labels
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use howler_api::{BaseUrl, HowlerClient, HowlerConfig};
//! use howler_api::resources::SearchRequest;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HowlerConfig::builder()
//!     .base_url(BaseUrl::new("https://howler.example.com")?)
//!     .build()?;
//! let client = HowlerClient::new(&config);
//!
//! // An explicit query; omitting it searches everything in the index.
//! let open = client.search().hits(SearchRequest {
//!     query: Some("howler.status:open".to_string()),
//!     rows: Some(25),
//!     ..Default::default()
//! }).await?;
//! println!("{} open hits", open.total);
//!
//! // Fetch one hit and refresh it conditionally later.
//! let hit = client.hits().get("example-id").await?;
//! if let Some(etag) = hit.etag() {
//!     let refreshed = client.hits().get_if("example-id", etag).await?;
//!     assert_eq!(refreshed.howler.id, hit.howler.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Sessions
//!
//! Authentication is an external collaborator: a login flow populates a
//! `reqwest` cookie jar, and the client forwards the session cookie on
//! every request. Pass the jar via
//! [`HowlerConfigBuilder::cookie_jar`]; the client never manages login
//! itself.
//!
//! ## Offline development
//!
//! [`transport::FixtureTransport`] serves canned JSON fixtures from an
//! explicit route table, so the full resource surface can run without a
//! server:
//!
//! ```rust
//! use std::sync::Arc;
//! use howler_api::transport::{FixtureTransport, Method};
//! use howler_api::{uri, HowlerClient};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), howler_api::ApiError> {
//! let transport = FixtureTransport::new().respond(
//!     Method::Get,
//!     &uri::uri(&["hits", "{id}"]),
//!     json!({"howler": {"id": "abc", "status": "open"}}),
//! );
//! let client = HowlerClient::with_transport(Arc::new(transport));
//! let hit = client.hits().get("abc").await?;
//! assert_eq!(hit.howler.status.as_deref(), Some("open"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: client configuration and the validated [`BaseUrl`]
//! - [`transport`]: the [`Transport`](transport::Transport) trait and its
//!   backends, the validator cache, and the retry policy
//! - [`envelope`]: envelope normalization and the [`Versioned`] wrapper
//! - [`resources`]: the typed API surface
//! - [`uri`]: pure path composition over the `/api/v1` root
//! - [`error`]: the [`ApiError`] taxonomy

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod resources;
pub mod transport;
pub mod uri;

// Re-export main types at crate root for convenience
pub use client::HowlerClient;
pub use config::{BaseUrl, HowlerConfig, HowlerConfigBuilder};
pub use envelope::Versioned;
pub use error::{ApiError, ConfigError, InvalidRequestError};
