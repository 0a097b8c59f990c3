//! The composition root: an ordered pipeline of stages plus an engine.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::builder::QueryBuilder;
use crate::config::SearchConfig;
use crate::context::SearchContext;
use crate::core::{Aggregation, Modifier, SearchEngine};
use crate::error::{EngineError, QueryResult};
use crate::params::Params;
use crate::query::{
    AnyMatcher, AuthFilter, DeletedFilter, GroupAuthFilter, GroupFilter, HiddenFilter,
    KeyValueMatcher, Limiter, RepliesMatcher, Sorter, TagsMatcher, TopLevelAnnotationsFilter,
    UriCombinedWildcardFilter, UriFilter, UserFilter,
};
use crate::types::SearchResult;

/// Runs annotation searches.
///
/// A `Search` owns an ordered list of [`Modifier`]s and [`Aggregation`]s. On
/// every [`run`](Search::run) each modifier is applied in order to a fresh
/// [`QueryBuilder`], claiming the parameters it understands, then each
/// aggregation registers itself. The finished body goes to the engine and
/// the response is decoded into a [`SearchResult`].
///
/// Stages hold only what they were constructed with, so one `Search` can
/// serve any number of sequential runs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use marginalia_search::backends::MemoryIndex;
/// use marginalia_search::context::SearchContext;
/// use marginalia_search::services::{IdentityUriEquivalence, StaticGroupService};
/// use marginalia_search::types::Annotation;
/// use marginalia_search::{Params, Search};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let index = Arc::new(MemoryIndex::new());
/// let mut annotation = Annotation::new("acct:alice@example.com", "http://example.com");
/// annotation.shared = true;
/// index.index(&annotation);
///
/// let context = SearchContext::new(
///     "example.com",
///     Arc::new(StaticGroupService::new()),
///     Arc::new(IdentityUriEquivalence),
/// );
/// let search = Search::new(index, context);
///
/// let result = search.run(Params::new().with("uri", "https://example.com/")).await.unwrap();
/// assert_eq!(result.annotation_ids, vec![annotation.id.clone()]);
/// # }
/// ```
pub struct Search {
    engine: Arc<dyn SearchEngine>,
    context: SearchContext,
    config: SearchConfig,
    modifiers: Vec<Box<dyn Modifier>>,
    aggregations: Vec<Box<dyn Aggregation>>,
}

impl Search {
    /// Creates a search with the default pipeline and configuration.
    pub fn new(engine: Arc<dyn SearchEngine>, context: SearchContext) -> Self {
        Self::with_config(engine, context, SearchConfig::default())
    }

    /// Creates a search with the default pipeline shaped by `config`.
    pub fn with_config(
        engine: Arc<dyn SearchEngine>,
        context: SearchContext,
        config: SearchConfig,
    ) -> Self {
        let uri_filter: Box<dyn Modifier> = if config.wildcard_uri {
            Box::new(UriCombinedWildcardFilter::new(
                &context,
                config.separate_wildcard_uri_keys,
            ))
        } else {
            Box::new(UriFilter::new(&context))
        };

        let modifiers: Vec<Box<dyn Modifier>> = vec![
            Box::new(Sorter),
            Box::new(Limiter),
            Box::new(DeletedFilter),
            Box::new(AuthFilter::new(&context)),
            Box::new(GroupAuthFilter::new(&context)),
            Box::new(GroupFilter),
            uri_filter,
            Box::new(UserFilter::new(&context)),
            Box::new(HiddenFilter::new(&context)),
            Box::new(AnyMatcher),
            Box::new(TagsMatcher),
            Box::new(KeyValueMatcher),
        ];

        Self {
            engine,
            context,
            config,
            modifiers,
            aggregations: Vec::new(),
        }
    }

    /// The request context.
    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    /// The configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Names of the registered modifiers, in order.
    pub fn modifier_names(&self) -> Vec<&'static str> {
        self.modifiers.iter().map(|m| m.name()).collect()
    }

    /// Drops every stage except sorting, leaving a pipeline that matches
    /// everything until new stages are appended.
    pub fn clear(&mut self) {
        self.modifiers = vec![Box::new(Sorter)];
        self.aggregations.clear();
    }

    /// Appends a modifier to the end of the pipeline.
    pub fn append_modifier(&mut self, modifier: impl Modifier + 'static) {
        self.modifiers.push(Box::new(modifier));
    }

    /// Appends an aggregation.
    pub fn append_aggregation(&mut self, aggregation: impl Aggregation + 'static) {
        self.aggregations.push(Box::new(aggregation));
    }

    /// Applies the pipeline to `params` without executing the query.
    ///
    /// Claimed keys are removed from `params`.
    pub fn build(&self, params: &mut Params) -> QueryResult<QueryBuilder> {
        let mut builder = apply_modifiers(&self.modifiers, params)?;
        for aggregation in &self.aggregations {
            aggregation.apply(&mut builder);
        }
        Ok(builder)
    }

    /// Executes a search.
    ///
    /// Bad parameter values never fail a search; errors only come from the
    /// collaborator services and the engine.
    pub async fn run(&self, mut params: Params) -> QueryResult<SearchResult> {
        let mut builder = self.build(&mut params)?;
        if self.config.separate_replies {
            builder = TopLevelAnnotationsFilter.apply(builder, &mut params)?;
        }

        let raw = self.execute(&builder).await?;
        let (total, annotation_ids) = parse_hits(&raw)?;

        let mut result = SearchResult::new(total, annotation_ids);
        for aggregation in &self.aggregations {
            result = result.with_aggregation(aggregation.name(), aggregation.parse(&raw));
        }

        if self.config.separate_replies && !result.annotation_ids.is_empty() {
            let reply_ids = self.search_replies(&result.annotation_ids).await?;
            result = result.with_replies(reply_ids);
        }

        Ok(result)
    }

    async fn search_replies(&self, annotation_ids: &[String]) -> QueryResult<Vec<String>> {
        let modifiers: Vec<Box<dyn Modifier>> = vec![
            Box::new(Sorter),
            Box::new(Limiter),
            Box::new(DeletedFilter),
            Box::new(AuthFilter::new(&self.context)),
            Box::new(GroupAuthFilter::new(&self.context)),
            Box::new(HiddenFilter::new(&self.context)),
            Box::new(RepliesMatcher::new(annotation_ids.to_vec())),
        ];

        let mut params = Params::new().with("limit", self.config.replies_limit.to_string());
        let builder = apply_modifiers(&modifiers, &mut params)?;

        let raw = self.execute(&builder).await?;
        let (total, reply_ids) = parse_hits(&raw)?;

        if total > reply_ids.len() as u64 {
            warn!(
                total,
                returned = reply_ids.len(),
                limit = self.config.replies_limit,
                "reply search truncated"
            );
        }

        Ok(reply_ids)
    }

    async fn execute(&self, builder: &QueryBuilder) -> QueryResult<Value> {
        let body = builder.to_body();
        debug!(engine = self.engine.name(), query = %body, "executing search");

        let started = Instant::now();
        let raw = self.engine.execute(body).await?;
        debug!(
            engine = self.engine.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(raw)
    }
}

impl std::fmt::Debug for Search {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("engine", &self.engine.name())
            .field("context", &self.context)
            .field("config", &self.config)
            .field("modifiers", &self.modifier_names())
            .finish_non_exhaustive()
    }
}

fn apply_modifiers(modifiers: &[Box<dyn Modifier>], params: &mut Params) -> QueryResult<QueryBuilder> {
    let mut builder = QueryBuilder::new();
    for modifier in modifiers {
        builder = modifier.apply(builder, params)?;
    }
    Ok(builder)
}

/// Extracts the hit count and the ordered hit ids.
fn parse_hits(raw: &Value) -> Result<(u64, Vec<String>), EngineError> {
    let hits = raw
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::invalid_response("missing hits.hits"))?;

    let ids = hits
        .iter()
        .map(|hit| {
            hit.get("_id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| EngineError::invalid_response("hit without _id"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total = raw
        .get("hits")
        .and_then(|h| h.get("total"))
        .and_then(|t| t.get("value").unwrap_or(t).as_u64())
        .unwrap_or(ids.len() as u64);

    Ok((total, ids))
}
