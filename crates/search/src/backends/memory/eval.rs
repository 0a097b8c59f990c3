//! Query DSL evaluation against indexed source documents.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::DateTime;
use serde_json::{Map, Value};

use super::analysis::{glob_regex, tokenize};
use crate::error::EngineError;
use crate::query::parse_date_cursor;
use crate::schema::{FieldKind, field_kind};

/// Returns true if `doc` matches `query`.
pub(super) fn matches(query: &Value, doc: &Value) -> Result<bool, EngineError> {
    let (kind, body) = single_entry(query)?;
    match kind {
        "match_all" => Ok(true),
        "bool" => eval_bool(body, doc),
        "term" => {
            let (field, value) = field_entry(body)?;
            let value = value.get("value").unwrap_or(value);
            Ok(field_matches(doc, field, |kind, candidate| term_matches(kind, candidate, value)))
        }
        "terms" => {
            let (field, values) = field_entry(body)?;
            let values = values
                .as_array()
                .ok_or_else(|| EngineError::query(format!("terms on [{}] needs an array", field)))?;
            Ok(field_matches(doc, field, |kind, candidate| {
                values.iter().any(|value| term_matches(kind, candidate, value))
            }))
        }
        "exists" => {
            let field = body
                .get("field")
                .and_then(Value::as_str)
                .ok_or_else(|| EngineError::query("exists needs a field"))?;
            Ok(exists(doc, field))
        }
        "wildcard" => {
            let (field, pattern) = field_entry(body)?;
            let pattern = pattern
                .get("value")
                .unwrap_or(pattern)
                .as_str()
                .ok_or_else(|| EngineError::query(format!("wildcard on [{}] needs a string", field)))?;
            let regex = glob_regex(pattern).map_err(|e| {
                EngineError::query(format!("invalid wildcard [{}] on [{}]: {}", pattern, field, e))
            })?;
            Ok(field_matches(doc, field, |_, candidate| {
                candidate.as_str().is_some_and(|s| regex.is_match(s))
            }))
        }
        "multi_match" => eval_multi_match(body, doc),
        other => Err(EngineError::query(format!("unknown query type [{}]", other))),
    }
}

fn eval_bool(body: &Value, doc: &Value) -> Result<bool, EngineError> {
    let clauses = |slot: &str| -> Vec<&Value> {
        match body.get(slot) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(single) => vec![single],
        }
    };

    let must = clauses("must");
    let filter = clauses("filter");
    let should = clauses("should");
    let must_not = clauses("must_not");

    for clause in must.iter().chain(filter.iter()) {
        if !matches(clause, doc)? {
            return Ok(false);
        }
    }

    for clause in &must_not {
        if matches(clause, doc)? {
            return Ok(false);
        }
    }

    if should.is_empty() {
        return Ok(true);
    }

    let minimum = match body.get("minimum_should_match").and_then(Value::as_u64) {
        Some(n) => n as usize,
        None if must.is_empty() && filter.is_empty() => 1,
        None => 0,
    };

    let mut matched = 0;
    for clause in &should {
        if matches(clause, doc)? {
            matched += 1;
        }
    }
    Ok(matched >= minimum)
}

fn eval_multi_match(body: &Value, doc: &Value) -> Result<bool, EngineError> {
    let query = body
        .get("query")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::query("multi_match needs a query string"))?;
    let fields: Vec<&str> = body
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let require_all = body
        .get("operator")
        .and_then(Value::as_str)
        .is_some_and(|op| op.eq_ignore_ascii_case("and"));

    let wanted = tokenize(query);
    if wanted.is_empty() {
        return Ok(false);
    }

    let mut present: Vec<String> = Vec::new();
    for field in fields {
        for value in field_values(doc, field) {
            if let Some(s) = value.as_str() {
                present.extend(tokenize(s));
            }
        }
    }

    let found = |token: &String| present.contains(token);
    Ok(if require_all {
        wanted.iter().all(found)
    } else {
        wanted.iter().any(found)
    })
}

/// Applies `check` to every value of `field`. Unmapped fields never match.
fn field_matches(doc: &Value, field: &str, check: impl Fn(FieldKind, &Value) -> bool) -> bool {
    let Some(kind) = field_kind(field) else {
        return false;
    };
    field_values(doc, field).into_iter().any(|value| check(kind, value))
}

fn field_values<'a>(doc: &'a Value, field: &str) -> Vec<&'a Value> {
    match doc.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).collect(),
        Some(value) => vec![value],
    }
}

fn exists(doc: &Value, field: &str) -> bool {
    !field_values(doc, field).is_empty()
}

fn term_matches(kind: FieldKind, candidate: &Value, value: &Value) -> bool {
    match kind {
        FieldKind::Keyword => match (candidate, value) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::String(a), other) => *a == other.to_string(),
            _ => false,
        },
        FieldKind::Text => match (candidate.as_str(), value.as_str()) {
            (Some(text), Some(term)) => tokenize(text).iter().any(|token| token == term),
            _ => false,
        },
        FieldKind::Boolean => candidate.as_bool().is_some() && candidate.as_bool() == as_bool(value),
        FieldKind::Date => match (date_millis(candidate), date_millis(value)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn date_millis(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis() as f64)
            .or_else(|| parse_date_cursor(s)),
        _ => None,
    }
}

/// A comparable sort value.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum SortKey {
    Missing,
    Bool(bool),
    Num(f64),
    Str(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Num(_) => 1,
            SortKey::Str(_) => 2,
            SortKey::Missing => 3,
        }
    }

    /// The value reported back in a hit's `sort` array.
    pub(super) fn to_json(&self) -> Value {
        match self {
            SortKey::Missing => Value::Null,
            SortKey::Bool(b) => Value::Bool(*b),
            SortKey::Num(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            SortKey::Str(s) => Value::String(s.clone()),
        }
    }
}

/// One parsed sort entry.
#[derive(Debug, Clone)]
pub(super) struct SortSpec {
    field: String,
    descending: bool,
}

impl SortSpec {
    /// Parses the body's `sort` array.
    pub(super) fn parse_all(sort: Option<&Value>) -> Result<Vec<SortSpec>, EngineError> {
        let Some(sort) = sort else {
            return Ok(Vec::new());
        };
        let entries = sort
            .as_array()
            .ok_or_else(|| EngineError::query("sort must be an array"))?;

        entries
            .iter()
            .map(|entry| match entry {
                Value::String(field) => Ok(SortSpec {
                    field: field.clone(),
                    descending: false,
                }),
                Value::Object(_) => {
                    let (field, options) = field_entry(entry)?;
                    let order = options
                        .get("order")
                        .and_then(Value::as_str)
                        .or_else(|| options.as_str())
                        .unwrap_or("asc");
                    Ok(SortSpec {
                        field: field.to_string(),
                        descending: order.eq_ignore_ascii_case("desc"),
                    })
                }
                _ => Err(EngineError::query("malformed sort entry")),
            })
            .collect()
    }

    /// Extracts this field's key from a document.
    pub(super) fn key(&self, doc: &Value) -> SortKey {
        let kind = field_kind(&self.field);
        match field_values(doc, &self.field).first() {
            None => SortKey::Missing,
            Some(value) => to_key(kind, value),
        }
    }

    /// Converts a `search_after` value to a key of this field's type.
    pub(super) fn cursor_key(&self, value: &Value) -> SortKey {
        if value.is_null() {
            return SortKey::Missing;
        }
        to_key(field_kind(&self.field), value)
    }

    /// Orders two keys of this field. Missing values always sort last.
    pub(super) fn compare(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Missing, _) => Ordering::Greater,
            (_, SortKey::Missing) => Ordering::Less,
            _ => {
                let natural = match (a, b) {
                    (SortKey::Bool(x), SortKey::Bool(y)) => x.cmp(y),
                    (SortKey::Num(x), SortKey::Num(y)) => x.total_cmp(y),
                    (SortKey::Str(x), SortKey::Str(y)) => x.cmp(y),
                    _ => a.rank().cmp(&b.rank()),
                };
                if self.descending { natural.reverse() } else { natural }
            }
        }
    }
}

fn to_key(kind: Option<FieldKind>, value: &Value) -> SortKey {
    if kind == Some(FieldKind::Date)
        && let Some(ms) = date_millis(value)
    {
        return SortKey::Num(ms);
    }
    match value {
        Value::Bool(b) => SortKey::Bool(*b),
        Value::Number(n) => n.as_f64().map_or(SortKey::Missing, SortKey::Num),
        Value::String(s) => SortKey::Str(s.clone()),
        Value::Null => SortKey::Missing,
        other => SortKey::Str(other.to_string()),
    }
}

/// Compares two key tuples field by field.
pub(super) fn compare_keys(specs: &[SortSpec], a: &[SortKey], b: &[SortKey]) -> Ordering {
    specs
        .iter()
        .zip(a.iter().zip(b.iter()))
        .map(|(spec, (x, y))| spec.compare(x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Computes a `terms` aggregation over the matched documents.
///
/// Each distinct value counts once per document. Buckets are ordered by
/// count, then key, and cut to `size`.
pub(super) fn terms_aggregation(spec: &Value, docs: &[&Value]) -> Result<Value, EngineError> {
    let terms = spec
        .get("terms")
        .ok_or_else(|| EngineError::query("only terms aggregations are supported"))?;
    let field = terms
        .get("field")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::query("terms aggregation needs a field"))?;
    let size = terms.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;

    let mut counts: HashMap<String, u64> = HashMap::new();
    for doc in docs {
        let mut seen: Vec<String> = Vec::new();
        for value in field_values(doc, field) {
            let key = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !seen.contains(&key) {
                *counts.entry(key.clone()).or_default() += 1;
                seen.push(key);
            }
        }
    }

    let mut buckets: Vec<(String, u64)> = counts.into_iter().collect();
    buckets.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    buckets.truncate(size);

    let buckets: Vec<Value> = buckets
        .into_iter()
        .map(|(key, count)| serde_json::json!({ "key": key, "doc_count": count }))
        .collect();
    Ok(serde_json::json!({ "buckets": buckets }))
}

fn single_entry(value: &Value) -> Result<(&str, &Value), EngineError> {
    let object = as_object(value)?;
    let mut entries = object.iter();
    match (entries.next(), entries.next()) {
        (Some((key, body)), None) => Ok((key.as_str(), body)),
        _ => Err(EngineError::query(format!("expected a single-key object, got {}", value))),
    }
}

/// Reads `{ "<field>": <value> }`, the shape of term-level query bodies.
fn field_entry(value: &Value) -> Result<(&str, &Value), EngineError> {
    single_entry(value)
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, EngineError> {
    value
        .as_object()
        .ok_or_else(|| EngineError::query(format!("expected an object, got {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "id": "a1",
            "userid": "acct:alice@example.com",
            "group": "__world__",
            "shared": true,
            "tags": ["Rust", "search"],
            "tags_raw": ["Rust", "search"],
            "text": "Hello, World",
            "references": [],
            "updated": "2018-01-01T00:00:00+00:00"
        })
    }

    #[test]
    fn test_term_kinds() {
        let doc = doc();
        assert!(matches(&json!({ "term": { "shared": true } }), &doc).unwrap());
        assert!(matches(&json!({ "term": { "shared": "true" } }), &doc).unwrap());
        assert!(matches(&json!({ "term": { "tags_raw": "Rust" } }), &doc).unwrap());
        assert!(!matches(&json!({ "term": { "tags_raw": "rust" } }), &doc).unwrap());
        assert!(matches(&json!({ "term": { "text": "hello" } }), &doc).unwrap());
        assert!(matches(&json!({ "term": { "updated": 1514764800000.0 } }), &doc).unwrap());
        assert!(!matches(&json!({ "term": { "unmapped": "x" } }), &doc).unwrap());
    }

    #[test]
    fn test_exists_ignores_empty_arrays() {
        let doc = doc();
        assert!(!matches(&json!({ "exists": { "field": "references" } }), &doc).unwrap());
        assert!(matches(&json!({ "exists": { "field": "tags" } }), &doc).unwrap());
    }

    #[test]
    fn test_bool_minimum_should_match() {
        let doc = doc();
        let only_should = json!({ "bool": { "should": [{ "term": { "shared": false } }] } });
        assert!(!matches(&only_should, &doc).unwrap());

        let with_filter = json!({ "bool": {
            "filter": [{ "term": { "shared": true } }],
            "should": [{ "term": { "shared": false } }]
        } });
        assert!(matches(&with_filter, &doc).unwrap());

        let forced = json!({ "bool": {
            "filter": [{ "term": { "shared": true } }],
            "should": [{ "term": { "shared": false } }],
            "minimum_should_match": 1
        } });
        assert!(!matches(&forced, &doc).unwrap());
    }

    #[test]
    fn test_multi_match_operators() {
        let doc = doc();
        let or = json!({ "multi_match": { "query": "world nothing", "fields": ["text", "tags"] } });
        assert!(matches(&or, &doc).unwrap());
        let and = json!({ "multi_match": {
            "query": "world nothing", "fields": ["text", "tags"], "operator": "and"
        } });
        assert!(!matches(&and, &doc).unwrap());
    }

    #[test]
    fn test_unknown_query_type_is_an_error() {
        let err = matches(&json!({ "fuzzy": { "text": "x" } }), &doc()).unwrap_err();
        assert!(matches!(err, EngineError::QueryError { .. }));
    }

    #[test]
    fn test_missing_sorts_last_in_both_directions() {
        for descending in [false, true] {
            let spec = SortSpec {
                field: "group".to_string(),
                descending,
            };
            assert_eq!(
                spec.compare(&SortKey::Missing, &SortKey::Str("a".to_string())),
                Ordering::Greater
            );
        }
    }

    #[test]
    fn test_terms_aggregation_counts_once_per_document() {
        let a = json!({ "tags_raw": ["x", "x", "y"] });
        let b = json!({ "tags_raw": ["y"] });
        let result = terms_aggregation(
            &json!({ "terms": { "field": "tags_raw", "size": 5 } }),
            &[&a, &b],
        )
        .unwrap();
        assert_eq!(
            result["buckets"],
            json!([{ "key": "y", "doc_count": 2 }, { "key": "x", "doc_count": 1 }])
        );
    }
}
