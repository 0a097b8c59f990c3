//! Search engine client trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::EngineError;

/// A search engine able to run a serialized query.
///
/// The request body follows the Elasticsearch query DSL produced by
/// [`QueryBuilder::to_body`](crate::QueryBuilder::to_body). The response must
/// carry `hits.total`, the ordered `hits.hits` (each with an `_id`) and,
/// when aggregations were requested, `aggregations.<name>.buckets`.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// A short name for logging.
    fn name(&self) -> &str;

    /// Executes the query body and returns the raw response.
    async fn execute(&self, body: Value) -> Result<Value, EngineError>;
}
