//! The query builder shared by every pipeline stage.
//!
//! Translates the accumulated clauses, paging, sort and aggregations into an
//! Elasticsearch Query DSL body.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::types::{CursorValue, SortField};

/// Page size used when no stage sets one (the engine's own default).
pub const DEFAULT_SIZE: usize = 10;

/// Accumulates a boolean query plus paging, sort and aggregations.
///
/// Each `with_*` method consumes and returns the builder so stages can be
/// chained:
///
/// ```
/// use marginalia_search::QueryBuilder;
/// use serde_json::json;
///
/// let body = QueryBuilder::new()
///     .with_filter(json!({ "term": { "shared": true } }))
///     .with_pagination(20, 10)
///     .to_body();
///
/// assert_eq!(body["from"], 20);
/// assert_eq!(body["query"]["bool"]["filter"][0]["term"]["shared"], true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    must: Vec<Value>,
    should: Vec<Value>,
    must_not: Vec<Value>,
    filter: Vec<Value>,
    from: usize,
    size: usize,
    sort: Vec<SortField>,
    search_after: Option<Vec<CursorValue>>,
    aggregations: BTreeMap<String, Value>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            must: Vec::new(),
            should: Vec::new(),
            must_not: Vec::new(),
            filter: Vec::new(),
            from: 0,
            size: DEFAULT_SIZE,
            sort: Vec::new(),
            search_after: None,
            aggregations: BTreeMap::new(),
        }
    }
}

impl QueryBuilder {
    /// Creates an empty builder (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clause every hit must match.
    pub fn with_must(mut self, clause: Value) -> Self {
        self.must.push(clause);
        self
    }

    /// Adds an alternative; at least one `should` clause must match.
    pub fn with_should(mut self, clause: Value) -> Self {
        self.should.push(clause);
        self
    }

    /// Adds a clause no hit may match.
    pub fn with_must_not(mut self, clause: Value) -> Self {
        self.must_not.push(clause);
        self
    }

    /// Adds a non-scoring clause every hit must match.
    pub fn with_filter(mut self, clause: Value) -> Self {
        self.filter.push(clause);
        self
    }

    /// Sets `from` and `size`.
    pub fn with_pagination(mut self, from: usize, size: usize) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    /// Replaces the sort specification.
    pub fn with_sort(mut self, sort: Vec<SortField>) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the `search_after` cursor. Values align with the sort fields.
    pub fn with_search_after(mut self, cursor: Vec<CursorValue>) -> Self {
        self.search_after = Some(cursor);
        self
    }

    /// Registers (or replaces) a named aggregation.
    pub fn insert_aggregation(&mut self, name: impl Into<String>, spec: Value) {
        self.aggregations.insert(name.into(), spec);
    }

    /// The `must` clauses.
    pub fn must(&self) -> &[Value] {
        &self.must
    }

    /// The `should` clauses.
    pub fn should(&self) -> &[Value] {
        &self.should
    }

    /// The `must_not` clauses.
    pub fn must_not(&self) -> &[Value] {
        &self.must_not
    }

    /// The `filter` clauses.
    pub fn filter(&self) -> &[Value] {
        &self.filter
    }

    /// Offset of the first hit.
    pub fn from(&self) -> usize {
        self.from
    }

    /// Page size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The sort specification.
    pub fn sort(&self) -> &[SortField] {
        &self.sort
    }

    /// The `search_after` cursor, if any.
    pub fn search_after(&self) -> Option<&[CursorValue]> {
        self.search_after.as_deref()
    }

    /// Registered aggregations by name.
    pub fn aggregations(&self) -> &BTreeMap<String, Value> {
        &self.aggregations
    }

    /// Builds the request body.
    ///
    /// Empty clause slots are left out. A non-empty `should` slot always
    /// carries `minimum_should_match: 1`, so it restricts the results even
    /// when `must` or `filter` clauses are present.
    pub fn to_body(&self) -> Value {
        let mut bool_query = Map::new();
        if !self.must.is_empty() {
            bool_query.insert("must".to_string(), json!(self.must));
        }
        if !self.should.is_empty() {
            bool_query.insert("should".to_string(), json!(self.should));
            bool_query.insert("minimum_should_match".to_string(), json!(1));
        }
        if !self.must_not.is_empty() {
            bool_query.insert("must_not".to_string(), json!(self.must_not));
        }
        if !self.filter.is_empty() {
            bool_query.insert("filter".to_string(), json!(self.filter));
        }

        let mut body = json!({
            "query": { "bool": Value::Object(bool_query) },
            "from": self.from,
            "size": self.size,
        });

        if !self.sort.is_empty() {
            body["sort"] = Value::Array(self.sort.iter().map(SortField::to_json).collect());
        }

        if let Some(ref cursor) = self.search_after {
            body["search_after"] = Value::Array(cursor.iter().map(CursorValue::to_json).collect());
        }

        if !self.aggregations.is_empty() {
            let aggs: Map<String, Value> = self
                .aggregations
                .iter()
                .map(|(name, spec)| (name.clone(), spec.clone()))
                .collect();
            body["aggs"] = Value::Object(aggs);
        }

        body
    }
}
