//! An in-process search engine.
//!
//! [`MemoryIndex`] stores presented annotations (see [`crate::schema`]) and
//! evaluates the query bodies produced by [`QueryBuilder`](crate::QueryBuilder)
//! against them. It understands the subset of the Elasticsearch query DSL the
//! stage library emits:
//!
//! - `bool` with `must`, `filter`, `should`, `must_not` and
//!   `minimum_should_match`
//! - `term`, `terms`, `exists`, `wildcard`, `multi_match`, `match_all`
//! - `sort` (missing values last), `search_after`, `from` / `size`
//! - `terms` aggregations
//!
//! Anything else is rejected with [`EngineError::QueryError`].
//!
//! It is meant for tests, fixtures and the command line tool. Every search
//! scans the whole index.

mod analysis;
mod eval;

use std::cmp::Ordering;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value, json};
use tracing::trace;

use crate::core::SearchEngine;
use crate::error::EngineError;
use crate::schema;
use crate::types::Annotation;

use eval::{SortKey, SortSpec, compare_keys, matches, terms_aggregation};

/// Page size when the body does not set one.
const DEFAULT_SIZE: usize = 10;

/// An in-memory annotation index.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: RwLock<Vec<Value>>,
}

impl MemoryIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an index holding `annotations`.
    pub fn with_annotations<'a>(annotations: impl IntoIterator<Item = &'a Annotation>) -> Self {
        let index = Self::new();
        for annotation in annotations {
            index.index(annotation);
        }
        index
    }

    /// Adds an annotation, replacing any earlier version with the same id.
    pub fn index(&self, annotation: &Annotation) {
        let source = schema::to_source(annotation);
        let mut documents = self.documents.write();
        match documents.iter_mut().find(|doc| doc["id"] == source["id"]) {
            Some(existing) => *existing = source,
            None => documents.push(source),
        }
    }

    /// Marks an annotation deleted. Returns false if it is not indexed.
    pub fn delete(&self, id: &str) -> bool {
        let mut documents = self.documents.write();
        match documents.iter_mut().find(|doc| doc["id"] == id) {
            Some(doc) => {
                doc["deleted"] = Value::Bool(true);
                true
            }
            None => false,
        }
    }

    /// Number of indexed documents, deleted ones included.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// The mapping an Elasticsearch index for these documents would use.
    pub fn mapping(&self) -> Value {
        schema::index_mapping()
    }

    fn search(&self, body: &Value) -> Result<Value, EngineError> {
        let query = body.get("query").cloned().unwrap_or_else(|| json!({ "match_all": {} }));
        let from = read_usize(body, "from")?.unwrap_or(0);
        let size = read_usize(body, "size")?.unwrap_or(DEFAULT_SIZE);
        let specs = SortSpec::parse_all(body.get("sort"))?;

        let documents = self.documents.read();

        let mut matched: Vec<&Value> = Vec::new();
        for doc in documents.iter() {
            if matches(&query, doc)? {
                matched.push(doc);
            }
        }
        let total = matched.len();

        let mut aggregations = Map::new();
        if let Some(aggs) = body.get("aggs").and_then(Value::as_object) {
            for (name, spec) in aggs {
                aggregations.insert(name.clone(), terms_aggregation(spec, &matched)?);
            }
        }

        let mut ranked: Vec<(Vec<SortKey>, &Value)> = matched
            .into_iter()
            .map(|doc| (specs.iter().map(|spec| spec.key(doc)).collect(), doc))
            .collect();
        ranked.sort_by(|(a, _), (b, _)| compare_keys(&specs, a, b));

        if let Some(cursor) = body.get("search_after") {
            let cursor = cursor
                .as_array()
                .ok_or_else(|| EngineError::query("search_after must be an array"))?;
            if cursor.len() != specs.len() {
                return Err(EngineError::query(format!(
                    "search_after has {} values but sort has {} fields",
                    cursor.len(),
                    specs.len()
                )));
            }
            let after: Vec<SortKey> = specs
                .iter()
                .zip(cursor)
                .map(|(spec, value)| spec.cursor_key(value))
                .collect();
            ranked.retain(|(keys, _)| compare_keys(&specs, keys, &after) == Ordering::Greater);
        }

        let hits: Vec<Value> = ranked
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(keys, doc)| {
                json!({
                    "_id": doc["id"],
                    "_source": doc,
                    "sort": keys.iter().map(SortKey::to_json).collect::<Vec<_>>(),
                })
            })
            .collect();

        trace!(total, returned = hits.len(), "memory index search");

        Ok(json!({
            "hits": {
                "total": { "value": total, "relation": "eq" },
                "hits": hits,
            },
            "aggregations": Value::Object(aggregations),
        }))
    }
}

#[async_trait]
impl SearchEngine for MemoryIndex {
    fn name(&self) -> &str {
        "memory"
    }

    async fn execute(&self, body: Value) -> Result<Value, EngineError> {
        self.search(&body)
    }
}

fn read_usize(body: &Value, key: &str) -> Result<Option<usize>, EngineError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| EngineError::query(format!("[{}] must be a non-negative integer", key))),
    }
}
