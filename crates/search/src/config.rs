//! Search pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::query::LIMIT_MAX;

/// Options that shape the default pipeline built by [`Search::new`](crate::Search::new).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search top-level annotations only and fetch their replies with a
    /// second query.
    #[serde(default)]
    pub separate_replies: bool,

    /// Maximum number of replies fetched by the second query.
    #[serde(default = "default_replies_limit")]
    pub replies_limit: usize,

    /// Use the wildcard-aware URI filter instead of the exact one.
    #[serde(default)]
    pub wildcard_uri: bool,

    /// With `wildcard_uri`, take wildcard patterns from `wildcard_uri` only
    /// and treat `uri`/`url` as exact. Otherwise every `uri`/`url` value is
    /// classified on its own.
    #[serde(default = "default_separate_wildcard_uri_keys")]
    pub separate_wildcard_uri_keys: bool,
}

fn default_replies_limit() -> usize {
    200
}

fn default_separate_wildcard_uri_keys() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            separate_replies: false,
            replies_limit: default_replies_limit(),
            wildcard_uri: false,
            separate_wildcard_uri_keys: default_separate_wildcard_uri_keys(),
        }
    }
}

impl SearchConfig {
    /// Enables the separate replies search.
    pub fn with_separate_replies(mut self, enabled: bool) -> Self {
        self.separate_replies = enabled;
        self
    }

    /// Sets the reply page size.
    pub fn with_replies_limit(mut self, limit: usize) -> Self {
        self.replies_limit = limit;
        self
    }

    /// Selects the wildcard-aware URI filter.
    pub fn with_wildcard_uri(mut self, enabled: bool, separate_keys: bool) -> Self {
        self.wildcard_uri = enabled;
        self.separate_wildcard_uri_keys = separate_keys;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.separate_replies && self.replies_limit == 0 {
            errors.push("replies_limit must be greater than 0 when separate_replies is on".to_string());
        }

        if self.replies_limit > LIMIT_MAX {
            errors.push(format!("replies_limit must not exceed {}", LIMIT_MAX));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
