//! Bucketed counts over tags and authors.

use serde_json::{Value, json};

use crate::builder::QueryBuilder;
use crate::core::Aggregation;
use crate::types::{Bucket, BucketKind};

/// Bucket limit when none is configured.
pub const DEFAULT_BUCKET_LIMIT: usize = 10;

/// A `terms` aggregation on one keyword field.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TermsAggregation {
    name: &'static str,
    field: &'static str,
    kind: BucketKind,
    limit: usize,
}

impl TermsAggregation {
    fn apply(&self, builder: &mut QueryBuilder) {
        builder.insert_aggregation(
            self.name,
            json!({ "terms": { "field": self.field, "size": self.limit } }),
        );
    }

    /// Reads `aggregations.<name>.buckets`. A missing or malformed
    /// aggregation yields no buckets.
    fn parse(&self, raw: &Value) -> Vec<Bucket> {
        let Some(buckets) = raw
            .get("aggregations")
            .and_then(|aggs| aggs.get(self.name))
            .and_then(|agg| agg.get("buckets"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        let mut parsed: Vec<Bucket> = buckets
            .iter()
            .filter_map(|bucket| {
                let key = match bucket.get("key")? {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let count = bucket.get("doc_count")?.as_u64()?;
                Some(Bucket::new(self.kind, key, count))
            })
            .collect();

        parsed.sort_by(|a, b| b.count.cmp(&a.count));
        parsed.truncate(self.limit);
        parsed
    }
}

/// Counts annotations per tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsAggregation(TermsAggregation);

impl TagsAggregation {
    /// Creates the aggregation with a custom bucket limit.
    pub fn with_limit(limit: usize) -> Self {
        Self(TermsAggregation {
            name: "tags",
            field: "tags_raw",
            kind: BucketKind::Tag,
            limit,
        })
    }

    /// The bucket limit.
    pub fn limit(&self) -> usize {
        self.0.limit
    }
}

impl Default for TagsAggregation {
    fn default() -> Self {
        Self::with_limit(DEFAULT_BUCKET_LIMIT)
    }
}

impl Aggregation for TagsAggregation {
    fn name(&self) -> &str {
        self.0.name
    }

    fn apply(&self, builder: &mut QueryBuilder) {
        self.0.apply(builder);
    }

    fn parse(&self, raw: &Value) -> Vec<Bucket> {
        self.0.parse(raw)
    }
}

/// Counts annotations per author userid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersAggregation(TermsAggregation);

impl UsersAggregation {
    /// Creates the aggregation with a custom bucket limit.
    pub fn with_limit(limit: usize) -> Self {
        Self(TermsAggregation {
            name: "users",
            field: "userid",
            kind: BucketKind::User,
            limit,
        })
    }

    /// The bucket limit.
    pub fn limit(&self) -> usize {
        self.0.limit
    }
}

impl Default for UsersAggregation {
    fn default() -> Self {
        Self::with_limit(DEFAULT_BUCKET_LIMIT)
    }
}

impl Aggregation for UsersAggregation {
    fn name(&self) -> &str {
        self.0.name
    }

    fn apply(&self, builder: &mut QueryBuilder) {
        self.0.apply(builder);
    }

    fn parse(&self, raw: &Value) -> Vec<Bucket> {
        self.0.parse(raw)
    }
}
