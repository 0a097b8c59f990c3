//! Result ordering and cursor paging.

use tracing::debug;

use super::date::parse_date_cursor;
use crate::builder::QueryBuilder;
use crate::core::Modifier;
use crate::error::QueryResult;
use crate::params::Params;
use crate::types::{CursorValue, SortDirection, SortField};

/// Sort key used when none (or an unknown one) is requested.
pub const DEFAULT_SORT: &str = "updated";

/// Secondary sort key that keeps pages stable when primary values tie.
const TIEBREAKER: &str = "id";

/// Maps a public sort key to the index field and whether it holds a date.
fn sort_field(key: &str) -> Option<(&'static str, bool)> {
    match key {
        "updated" => Some(("updated", true)),
        "created" => Some(("created", true)),
        "group" => Some(("group", false)),
        "id" => Some(("id", false)),
        "user" => Some(("userid", false)),
        _ => None,
    }
}

/// Claims `sort`, `order` and `search_after`.
///
/// The cursor is interpreted according to the sort field: date fields
/// accept partial ISO 8601 dates or epoch milliseconds, every other field
/// takes the value verbatim. A cursor that cannot be interpreted is dropped.
///
/// Without a cursor the sort is pinned with an ascending `id` tiebreaker.
/// With a cursor only the primary field is emitted, since `search_after`
/// must carry exactly one value per sort field.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sorter;

impl Sorter {
    /// Creates the stage.
    pub fn new() -> Self {
        Self
    }
}

impl Modifier for Sorter {
    fn name(&self) -> &'static str {
        "sorter"
    }

    fn apply(&self, builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        let requested = params.pop("sort");
        let (field, is_date) = match requested.as_deref().map(str::trim) {
            None | Some("") => sort_field(DEFAULT_SORT),
            Some(key) => sort_field(key).or_else(|| {
                debug!(sort = key, "unknown sort field, using default");
                sort_field(DEFAULT_SORT)
            }),
        }
        .unwrap_or(("updated", true));

        let direction = params
            .pop("order")
            .and_then(|order| SortDirection::parse(&order))
            .unwrap_or_default();

        let cursor = params.pop("search_after").and_then(|raw| {
            let value = if is_date {
                parse_date_cursor(&raw).map(CursorValue::Number)
            } else {
                Some(raw.trim()).filter(|s| !s.is_empty()).map(|s| CursorValue::String(s.to_string()))
            };
            if value.is_none() {
                debug!(search_after = %raw, field, "unparseable cursor ignored");
            }
            value
        });

        let mut sort = vec![SortField::new(field, direction)];
        let builder = match cursor {
            Some(value) => builder.with_search_after(vec![value]),
            None => {
                if field != TIEBREAKER {
                    sort.push(SortField::new(TIEBREAKER, SortDirection::Asc));
                }
                builder
            }
        };

        Ok(builder.with_sort(sort))
    }
}
