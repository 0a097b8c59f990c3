//! Paging: the `offset` and `limit` parameters.

use tracing::debug;

use crate::builder::QueryBuilder;
use crate::core::Modifier;
use crate::error::QueryResult;
use crate::params::Params;

/// Page size when `limit` is absent or unusable.
pub const LIMIT_DEFAULT: usize = 20;
/// Largest page size a request may ask for.
pub const LIMIT_MAX: usize = 200;
/// Offset when `offset` is absent or unusable.
pub const OFFSET_DEFAULT: usize = 0;
/// Deepest offset a request may ask for.
pub const OFFSET_MAX: usize = 9800;

/// Claims `offset` and `limit` and sets `from`/`size`.
///
/// Anything that is not a non-negative integer falls back to the default.
/// Integers beyond the maximum are clamped to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limiter;

impl Limiter {
    /// Creates the stage.
    pub fn new() -> Self {
        Self
    }
}

impl Modifier for Limiter {
    fn name(&self) -> &'static str {
        "limiter"
    }

    fn apply(&self, builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        let offset = parse_bounded(params.pop("offset").as_deref(), OFFSET_DEFAULT, OFFSET_MAX);
        let limit = parse_bounded(params.pop("limit").as_deref(), LIMIT_DEFAULT, LIMIT_MAX);
        Ok(builder.with_pagination(offset, limit))
    }
}

/// Parses a paging value. Never fails.
pub(crate) fn parse_bounded(raw: Option<&str>, default: usize, max: usize) -> usize {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<i128>() {
        Ok(n) if n < 0 => {
            debug!(value = raw, "negative paging value, using default");
            default
        }
        Ok(n) => usize::try_from(n).map_or(max, |n| n.min(max)),
        Err(e) => match e.kind() {
            std::num::IntErrorKind::PosOverflow => max,
            _ => {
                debug!(value = raw, "unparseable paging value, using default");
                default
            }
        },
    }
}
