//! Index schema and the annotation presenter.
//!
//! The presenter turns an [`Annotation`] into the source document that is
//! stored in the index. Several fields are derived at index time so that the
//! query stages can stay simple term lookups:
//!
//! - `authority`: the authority segment of the author's userid
//! - `user`: lowercased author tokens (`acct:name@authority`,
//!   `name@authority` and the bare `name`), so `user=Name` matches by
//!   username alone
//! - `target_uri_normalized`: see [`crate::uri::normalize`]
//! - `uri`: the target URI again, analyzed into words for free-text search
//! - `quote`: the exact text of every selector
//! - `tags` (analyzed) and `tags_raw` (exact)

use serde_json::{Map, Value, json};

use crate::types::Annotation;
use crate::uri::normalize;

/// How a field is indexed and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Exact string match.
    Keyword,
    /// Analyzed into lowercase words.
    Text,
    /// `true` / `false`.
    Boolean,
    /// RFC 3339 timestamp, compared as epoch milliseconds.
    Date,
}

const FIELDS: &[(&str, FieldKind)] = &[
    ("id", FieldKind::Keyword),
    ("authority", FieldKind::Keyword),
    ("userid", FieldKind::Keyword),
    ("user", FieldKind::Keyword),
    ("group", FieldKind::Keyword),
    ("target_uri", FieldKind::Keyword),
    ("target_uri_normalized", FieldKind::Keyword),
    ("tags_raw", FieldKind::Keyword),
    ("references", FieldKind::Keyword),
    ("shared", FieldKind::Boolean),
    ("deleted", FieldKind::Boolean),
    ("hidden", FieldKind::Boolean),
    ("nipsa", FieldKind::Boolean),
    ("uri", FieldKind::Text),
    ("quote", FieldKind::Text),
    ("text", FieldKind::Text),
    ("tags", FieldKind::Text),
    ("created", FieldKind::Date),
    ("updated", FieldKind::Date),
];

/// Returns the kind of an indexed field, or `None` if the field is not
/// mapped.
pub fn field_kind(field: &str) -> Option<FieldKind> {
    FIELDS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, kind)| *kind)
}

/// The Elasticsearch mapping for the annotation index.
pub fn index_mapping() -> Value {
    let properties: Map<String, Value> = FIELDS
        .iter()
        .map(|(name, kind)| {
            let spec = match kind {
                FieldKind::Keyword => json!({ "type": "keyword" }),
                FieldKind::Text => json!({ "type": "text", "analyzer": "standard" }),
                FieldKind::Boolean => json!({ "type": "boolean" }),
                FieldKind::Date => json!({ "type": "date" }),
            };
            (name.to_string(), spec)
        })
        .collect();

    json!({
        "settings": {
            "index.max_result_window": 10000
        },
        "mappings": {
            "dynamic": false,
            "properties": Value::Object(properties)
        }
    })
}

/// Builds the indexed source document for an annotation.
pub fn to_source(annotation: &Annotation) -> Value {
    let quotes: Vec<&str> = annotation.quotes().collect();

    json!({
        "id": annotation.id,
        "authority": annotation.authority(),
        "userid": annotation.userid,
        "user": user_tokens(&annotation.userid),
        "group": annotation.groupid,
        "shared": annotation.shared,
        "deleted": annotation.deleted,
        "hidden": annotation.hidden,
        "nipsa": annotation.nipsa,
        "target_uri": annotation.target_uri,
        "target_uri_normalized": normalize(&annotation.target_uri),
        "uri": annotation.target_uri,
        "quote": quotes,
        "text": annotation.text,
        "tags": annotation.tags,
        "tags_raw": annotation.tags,
        "references": annotation.references,
        "created": annotation.created.to_rfc3339(),
        "updated": annotation.updated.to_rfc3339(),
    })
}

fn user_tokens(userid: &str) -> Vec<String> {
    let lower = userid.to_lowercase();
    let bare = lower.strip_prefix("acct:").unwrap_or(&lower);

    let mut tokens = vec![format!("acct:{}", bare), bare.to_string()];
    if let Some((username, _)) = bare.split_once('@') {
        tokens.push(username.to_string());
    }
    tokens.dedup();
    tokens
}
