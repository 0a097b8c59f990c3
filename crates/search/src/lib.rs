//! Marginalia annotation search
//!
//! This crate compiles annotation search requests into boolean queries for a
//! document search engine, runs them, and decodes the response into ordered
//! annotation ids and aggregation buckets.
//!
//! A request is a flat, multi-valued parameter set ([`Params`]), for example
//! `uri=http://example.com&tag=rust&tag=search&sort=created&limit=50`. The
//! rules that shape the query live in small, composable stages:
//!
//! - visibility: [`AuthFilter`](query::AuthFilter),
//!   [`GroupAuthFilter`](query::GroupAuthFilter),
//!   [`HiddenFilter`](query::HiddenFilter),
//!   [`DeletedFilter`](query::DeletedFilter)
//! - scoping: [`GroupFilter`](query::GroupFilter),
//!   [`UserFilter`](query::UserFilter), [`UriFilter`](query::UriFilter),
//!   [`UriCombinedWildcardFilter`](query::UriCombinedWildcardFilter)
//! - matching: [`AnyMatcher`](query::AnyMatcher),
//!   [`TagsMatcher`](query::TagsMatcher),
//!   [`KeyValueMatcher`](query::KeyValueMatcher)
//! - paging and ordering: [`Limiter`](query::Limiter),
//!   [`Sorter`](query::Sorter)
//! - counting: [`TagsAggregation`](query::TagsAggregation),
//!   [`UsersAggregation`](query::UsersAggregation)
//!
//! Each stage claims the parameters it understands by removing them, so the
//! final [`KeyValueMatcher`](query::KeyValueMatcher) only sees what is left.
//!
//! # Architecture
//!
//! - [`core`] - the stage, engine and collaborator traits
//! - [`query`] - the stage library
//! - [`search`] - [`Search`], the composition root
//! - [`backends`] - engine implementations ([`MemoryIndex`](backends::MemoryIndex))
//! - [`schema`] - index fields and the annotation presenter
//! - [`services`] - static group and URI-equivalence collaborators
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use marginalia_search::backends::MemoryIndex;
//! use marginalia_search::context::{SearchContext, Viewer};
//! use marginalia_search::services::{IdentityUriEquivalence, StaticGroupService};
//! use marginalia_search::{Params, Search};
//!
//! let context = SearchContext::new(
//!     "example.com",
//!     Arc::new(StaticGroupService::new()),
//!     Arc::new(IdentityUriEquivalence),
//! )
//! .with_viewer(Viewer::new("acct:alice@example.com"));
//!
//! let search = Search::new(Arc::new(MemoryIndex::new()), context);
//!
//! let mut params = Params::new()
//!     .with("tag", "rust")
//!     .with("sort", "created")
//!     .with("order", "asc");
//! let body = search.build(&mut params).unwrap().to_body();
//!
//! assert!(params.is_empty());
//! assert_eq!(body["sort"][0]["created"]["order"], "asc");
//! assert_eq!(body["size"], 20);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod builder;
pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod params;
pub mod query;
pub mod schema;
pub mod search;
pub mod services;
pub mod types;
pub mod uri;

pub use builder::QueryBuilder;
pub use config::SearchConfig;
pub use context::{SearchContext, Viewer};
pub use error::{EngineError, QueryResult, SearchError, ServiceError};
pub use params::Params;
pub use search::Search;
pub use types::SearchResult;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
