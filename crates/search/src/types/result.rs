//! The decoded outcome of a search.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What the values of an aggregation's buckets are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKind {
    /// A tag.
    Tag,
    /// An author userid.
    User,
}

/// One aggregation bucket: a distinct field value and how many documents
/// carry it.
///
/// Serializes with the value under the field named by its kind:
/// `{"tag": "rust", "count": 3}` or `{"user": "acct:a@b", "count": 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BucketEntry", try_from = "BucketEntry")]
pub struct Bucket {
    /// Whether `key` is a tag or a userid.
    pub kind: BucketKind,
    /// The field value.
    pub key: String,
    /// Number of matching documents with that value.
    pub count: u64,
}

impl Bucket {
    /// Creates a bucket.
    pub fn new(kind: BucketKind, key: impl Into<String>, count: u64) -> Self {
        Self {
            kind,
            key: key.into(),
            count,
        }
    }

    /// Creates a tag bucket.
    pub fn tag(tag: impl Into<String>, count: u64) -> Self {
        Self::new(BucketKind::Tag, tag, count)
    }

    /// Creates a user bucket.
    pub fn user(userid: impl Into<String>, count: u64) -> Self {
        Self::new(BucketKind::User, userid, count)
    }
}

#[derive(Serialize, Deserialize)]
struct BucketEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    count: u64,
}

impl From<Bucket> for BucketEntry {
    fn from(bucket: Bucket) -> Self {
        let (tag, user) = match bucket.kind {
            BucketKind::Tag => (Some(bucket.key), None),
            BucketKind::User => (None, Some(bucket.key)),
        };
        Self {
            tag,
            user,
            count: bucket.count,
        }
    }
}

impl TryFrom<BucketEntry> for Bucket {
    type Error = String;

    fn try_from(entry: BucketEntry) -> Result<Self, Self::Error> {
        match (entry.tag, entry.user) {
            (Some(tag), None) => Ok(Bucket::tag(tag, entry.count)),
            (None, Some(user)) => Ok(Bucket::user(user, entry.count)),
            _ => Err("bucket needs exactly one of `tag` or `user`".to_string()),
        }
    }
}

/// Result of [`Search::run`](crate::Search::run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Number of documents matching the query, regardless of paging.
    pub total: u64,

    /// Matching annotation ids, in engine order.
    pub annotation_ids: Vec<String>,

    /// Replies to `annotation_ids` when replies are searched separately.
    pub reply_ids: Vec<String>,

    /// Buckets per aggregation name.
    pub aggregations: BTreeMap<String, Vec<Bucket>>,
}

impl SearchResult {
    /// Creates a result with the given hits.
    pub fn new(total: u64, annotation_ids: Vec<String>) -> Self {
        Self {
            total,
            annotation_ids,
            ..Default::default()
        }
    }

    /// Sets the reply ids.
    pub fn with_replies(mut self, reply_ids: Vec<String>) -> Self {
        self.reply_ids = reply_ids;
        self
    }

    /// Adds the buckets of one aggregation.
    pub fn with_aggregation(mut self, name: impl Into<String>, buckets: Vec<Bucket>) -> Self {
        self.aggregations.insert(name.into(), buckets);
        self
    }

    /// Looks up the count of `key` in the named aggregation.
    pub fn bucket_count(&self, aggregation: &str, key: &str) -> Option<u64> {
        self.aggregations
            .get(aggregation)?
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.count)
    }
}
