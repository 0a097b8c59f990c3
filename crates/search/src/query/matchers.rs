//! Content matchers.

use serde_json::{Value, json};

use crate::builder::QueryBuilder;
use crate::core::Modifier;
use crate::error::QueryResult;
use crate::params::Params;

/// Fields searched by the free-text `any` parameter.
const ANY_FIELDS: &[&str] = &["quote", "tags", "text", "uri"];

/// Claims `any`; matches the terms against the annotation text, quote, tags
/// and the tokenized target URI. A document matching any term of any value
/// is a hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMatcher;

impl Modifier for AnyMatcher {
    fn name(&self) -> &'static str {
        "any_matcher"
    }

    fn apply(&self, builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        let terms: Vec<String> = params
            .pop_all("any")
            .into_iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();

        if terms.is_empty() {
            return Ok(builder);
        }

        Ok(builder.with_must(json!({
            "multi_match": {
                "query": terms.join(" "),
                "fields": ANY_FIELDS,
                "type": "cross_fields",
                "operator": "or"
            }
        })))
    }
}

/// Claims `tag` and its alias `tags`; every value must be one of the
/// annotation's tags. Tags match exactly, case included.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagsMatcher;

impl Modifier for TagsMatcher {
    fn name(&self) -> &'static str {
        "tags_matcher"
    }

    fn apply(&self, mut builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        let mut tags = params.pop_all("tag");
        tags.extend(params.pop_all("tags"));

        let mut seen: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !seen.contains(&tag) {
                builder = builder.with_filter(json!({ "term": { "tags_raw": tag } }));
                seen.push(tag);
            }
        }
        Ok(builder)
    }
}

/// Matches every reply, at any depth, to the given annotations.
///
/// Thread ancestry is stored in full on each reply, so a single lookup on
/// `references` also finds replies to replies.
#[derive(Debug, Clone, Default)]
pub struct RepliesMatcher {
    ids: Vec<String>,
}

impl RepliesMatcher {
    /// Matches replies to `ids`.
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }
}

impl Modifier for RepliesMatcher {
    fn name(&self) -> &'static str {
        "replies_matcher"
    }

    fn apply(&self, builder: QueryBuilder, _params: &mut Params) -> QueryResult<QueryBuilder> {
        Ok(builder.with_filter(json!({ "terms": { "references": self.ids } })))
    }
}

/// Turns every parameter nobody else claimed into an exact field match.
///
/// Distinct keys must all match; several values of one key are
/// alternatives. Must run last.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueMatcher;

impl Modifier for KeyValueMatcher {
    fn name(&self) -> &'static str {
        "key_value_matcher"
    }

    fn apply(&self, mut builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        for key in params.keys() {
            let values = params.pop_all(&key);
            let clause: Value = match values.as_slice() {
                [single] => json!({ "term": { key.as_str(): single } }),
                _ => json!({ "terms": { key.as_str(): values } }),
            };
            builder = builder.with_must(clause);
        }
        Ok(builder)
    }
}
