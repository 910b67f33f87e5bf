//! The typed API surface, one module per server-side entity.
//!
//! Every module follows the same shape: a borrowing accessor struct obtained
//! from [`HowlerClient`](crate::HowlerClient) (`client.hits()`), whose
//! methods build a path with [`uri`](crate::uri), dispatch it through the
//! transport, and normalize the envelope into a typed value. Sub-resources
//! (comments, reactions, favourites, labels) are reached the same way,
//! recursively (`client.hits().comments("id")`), mirroring the server's
//! resource hierarchy.
//!
//! Resource accessors hold no state beyond the client borrow — all mutable
//! state (cache, cookies) lives in the transport.

mod action;
mod analytic;
mod dossier;
mod hit;
mod search;
mod template;
mod user;
mod view;

pub use action::{ActionOperation, ActionRecord, ActionReport, Actions};
pub use analytic::{Analytic, AnalyticComments, Analytics};
pub use dossier::{Dossier, Dossiers, Lead};
pub use hit::{Comment, Hit, HitComments, HitCore, HitLabels, Hits};
pub use search::{GroupedResults, Index, Search, SearchGroup, SearchRequest, SearchResults};
pub use template::{Template, Templates};
pub use user::{FavouriteKind, Favourites, User, Users};
pub use view::{View, Views};
