//! The stage library.
//!
//! Each stage is a small value implementing [`Modifier`](crate::core::Modifier)
//! or [`Aggregation`](crate::core::Aggregation). A [`Search`](crate::Search)
//! applies them in registration order to a fresh
//! [`QueryBuilder`](crate::QueryBuilder).
//!
//! | Stage | Claims | Effect |
//! |-------|--------|--------|
//! | [`Limiter`] | `offset`, `limit` | paging |
//! | [`Sorter`] | `sort`, `order`, `search_after` | ordering, cursor |
//! | [`AuthFilter`] | | shared, or the viewer's own |
//! | [`GroupFilter`] | `group` | one group |
//! | [`GroupAuthFilter`] | | readable groups |
//! | [`UserFilter`] | `user` | authors |
//! | [`UriFilter`] | `uri`, `url` | documents |
//! | [`UriCombinedWildcardFilter`] | `uri`, `url`, `wildcard_uri` | documents, with patterns |
//! | [`AnyMatcher`] | `any` | free text |
//! | [`TagsMatcher`] | `tag`, `tags` | tags |
//! | [`KeyValueMatcher`] | everything left | exact field matches |

mod aggregations;
mod date;
mod filters;
mod limiter;
mod matchers;
mod sorter;
mod uri_filter;

pub use aggregations::{DEFAULT_BUCKET_LIMIT, TagsAggregation, UsersAggregation};
pub use date::parse_date_cursor;
pub use filters::{
    AuthFilter, AuthorityFilter, DeletedFilter, GroupAuthFilter, GroupFilter, HiddenFilter,
    TopLevelAnnotationsFilter, UserFilter,
};
pub use limiter::{LIMIT_DEFAULT, LIMIT_MAX, Limiter, OFFSET_DEFAULT, OFFSET_MAX};
pub use matchers::{AnyMatcher, KeyValueMatcher, RepliesMatcher, TagsMatcher};
pub use sorter::{DEFAULT_SORT, Sorter};
pub use uri_filter::{UriCombinedWildcardFilter, UriFilter, wildcard_uri_is_valid};
