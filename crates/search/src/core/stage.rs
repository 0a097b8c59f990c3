//! Pipeline stage traits.

use serde_json::Value;

use crate::builder::QueryBuilder;
use crate::error::QueryResult;
use crate::params::Params;
use crate::types::Bucket;

/// A stage that adds clauses, paging or sorting to a query.
///
/// A modifier removes every parameter it recognizes from `params`, so stages
/// that run later (in particular [`KeyValueMatcher`](crate::query::KeyValueMatcher))
/// only see unclaimed keys.
pub trait Modifier: Send + Sync {
    /// Stage name for logging.
    fn name(&self) -> &'static str;

    /// Applies the stage and returns the extended builder.
    fn apply(&self, builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder>;
}

/// A bucketed count computed alongside the hits.
pub trait Aggregation: Send + Sync {
    /// The aggregation name, used both in the request and in the result.
    fn name(&self) -> &str;

    /// Registers the aggregation on the builder.
    fn apply(&self, builder: &mut QueryBuilder);

    /// Decodes `aggregations.<name>` from the raw response.
    fn parse(&self, raw: &Value) -> Vec<Bucket>;
}
