//! Annotation fixtures.

use chrono::{DateTime, NaiveDate, Utc};

use marginalia_search::types::{Annotation, Selector};

/// Default author of fixture annotations.
pub const DEFAULT_USER: &str = "acct:alice@example.com";

/// Default target of fixture annotations.
pub const DEFAULT_URI: &str = "http://uridoesnotmatch.com";

/// Builds annotations for tests.
///
/// Fixtures are private by default, like freshly created annotations, and
/// carry neutral text, quote and URI so free-text searches only match what a
/// test sets explicitly.
#[derive(Debug, Clone)]
pub struct AnnotationFixture {
    annotation: Annotation,
}

impl Default for AnnotationFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationFixture {
    /// Creates a fixture with default values.
    pub fn new() -> Self {
        let mut annotation = Annotation::new(DEFAULT_USER, DEFAULT_URI);
        annotation.target_selectors = vec![Selector::quote("quotedoesnotmatch")];
        let epoch = date(2000, 1, 1);
        annotation.created = epoch;
        annotation.updated = epoch;
        Self { annotation }
    }

    /// Sets the id.
    pub fn id(mut self, id: &str) -> Self {
        self.annotation.id = id.to_string();
        self
    }

    /// Sets the author.
    pub fn user(mut self, userid: &str) -> Self {
        self.annotation.userid = userid.to_string();
        self
    }

    /// Sets the group.
    pub fn group(mut self, groupid: &str) -> Self {
        self.annotation.groupid = groupid.to_string();
        self
    }

    /// Marks the annotation shared.
    pub fn shared(mut self) -> Self {
        self.annotation.shared = true;
        self
    }

    /// Marks the annotation deleted.
    pub fn deleted(mut self) -> Self {
        self.annotation.deleted = true;
        self
    }

    /// Sets the moderation flags.
    pub fn moderation(mut self, hidden: bool, nipsa: bool) -> Self {
        self.annotation.hidden = hidden;
        self.annotation.nipsa = nipsa;
        self
    }

    /// Sets the target URI.
    pub fn uri(mut self, uri: &str) -> Self {
        self.annotation.target_uri = uri.to_string();
        self
    }

    /// Replaces the quote.
    pub fn quote(mut self, exact: &str) -> Self {
        self.annotation.target_selectors = vec![Selector::quote(exact)];
        self
    }

    /// Sets the body text.
    pub fn text(mut self, text: &str) -> Self {
        self.annotation.text = text.to_string();
        self
    }

    /// Sets the tags.
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.annotation.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Sets the thread ancestry.
    pub fn references(mut self, references: &[&str]) -> Self {
        self.annotation.references = references.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Sets the creation time.
    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.annotation.created = created;
        self
    }

    /// Sets the modification time.
    pub fn updated(mut self, updated: DateTime<Utc>) -> Self {
        self.annotation.updated = updated;
        self
    }

    /// Returns the annotation.
    pub fn build(self) -> Annotation {
        self.annotation
    }
}

/// Midnight UTC on the given day.
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    datetime(year, month, day, 0, 0, 0, 0)
}

/// A UTC timestamp with millisecond precision.
pub fn datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    milli: u32,
) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_milli_opt(hour, minute, second, milli))
        .expect("valid fixture date")
        .and_utc()
}
