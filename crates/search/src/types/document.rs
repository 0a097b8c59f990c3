//! The annotation document the filters reason about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group id of the public, world-readable group.
pub const WORLD_GROUP: &str = "__world__";

/// An annotation as handed to the index.
///
/// The moderation flags (`hidden`, `nipsa`) are already materialized: the
/// search pipeline filters on them but never computes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique annotation id.
    pub id: String,
    /// Author, formatted `acct:<name>@<authority>`.
    pub userid: String,
    /// Group the annotation was posted in.
    #[serde(default = "default_group")]
    pub groupid: String,
    /// Whether the annotation is visible beyond its author.
    #[serde(default)]
    pub shared: bool,
    /// Tombstone flag set when the annotation is deleted.
    #[serde(default)]
    pub deleted: bool,
    /// Hidden by a moderator.
    #[serde(default)]
    pub hidden: bool,
    /// Author is flagged "not in public site areas".
    #[serde(default)]
    pub nipsa: bool,
    /// The annotated document.
    pub target_uri: String,
    /// Selectors locating the annotated span.
    #[serde(default)]
    pub target_selectors: Vec<Selector>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Annotation body.
    #[serde(default)]
    pub text: String,
    /// Thread ancestry: the root first, the immediate parent last.
    #[serde(default)]
    pub references: Vec<String>,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last modification time.
    pub updated: DateTime<Utc>,
}

fn default_group() -> String {
    WORLD_GROUP.to_string()
}

/// A target selector. Only the quoted text matters for search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    /// The exact quoted text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<String>,
    /// Text immediately before the quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Text immediately after the quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Selector {
    /// Creates a selector quoting `exact`.
    pub fn quote(exact: impl Into<String>) -> Self {
        Self {
            exact: Some(exact.into()),
            ..Default::default()
        }
    }
}

impl Annotation {
    /// Creates a private annotation in the world group with a fresh id.
    pub fn new(userid: impl Into<String>, target_uri: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            userid: userid.into(),
            groupid: default_group(),
            shared: false,
            deleted: false,
            hidden: false,
            nipsa: false,
            target_uri: target_uri.into(),
            target_selectors: Vec::new(),
            tags: Vec::new(),
            text: String::new(),
            references: Vec::new(),
            created: now,
            updated: now,
        }
    }

    /// Returns the authority segment of the author's userid.
    pub fn authority(&self) -> Option<&str> {
        split_userid(&self.userid).map(|(_, authority)| authority)
    }

    /// Returns the username segment of the author's userid.
    pub fn username(&self) -> Option<&str> {
        split_userid(&self.userid).map(|(username, _)| username)
    }

    /// Returns true if this annotation replies to another one.
    pub fn is_reply(&self) -> bool {
        !self.references.is_empty()
    }

    /// The quoted text of every selector that has one.
    pub fn quotes(&self) -> impl Iterator<Item = &str> {
        self.target_selectors
            .iter()
            .filter_map(|s| s.exact.as_deref())
    }
}

/// Splits `acct:<name>@<authority>` into `(name, authority)`.
///
/// The `acct:` prefix is optional. Returns `None` if there is no `@` or
/// either side is empty.
pub fn split_userid(userid: &str) -> Option<(&str, &str)> {
    let bare = userid.strip_prefix("acct:").unwrap_or(userid);
    let (username, authority) = bare.split_once('@')?;
    if username.is_empty() || authority.is_empty() {
        return None;
    }
    Some((username, authority))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_userid() {
        assert_eq!(split_userid("acct:bob@example.com"), Some(("bob", "example.com")));
        assert_eq!(split_userid("bob@example.com"), Some(("bob", "example.com")));
        assert_eq!(split_userid("acct:bob"), None);
        assert_eq!(split_userid("acct:@example.com"), None);
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let annotation: Annotation = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "userid": "acct:alice@example.com",
            "target_uri": "http://example.com",
            "created": "2018-01-01T00:00:00Z",
            "updated": "2018-01-02T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(annotation.groupid, WORLD_GROUP);
        assert!(!annotation.shared);
        assert!(annotation.references.is_empty());
        assert_eq!(annotation.authority(), Some("example.com"));
    }

    #[test]
    fn test_quotes_skip_selectors_without_exact() {
        let mut annotation = Annotation::new("acct:alice@example.com", "http://example.com");
        annotation.target_selectors = vec![Selector::default(), Selector::quote("some words")];
        assert_eq!(annotation.quotes().collect::<Vec<_>>(), vec!["some words"]);
    }
}
