//! Document URI filters.
//!
//! Annotations are matched on the normalized form of their target URI (see
//! [`crate::uri`]). Each requested URI is first expanded through the
//! [`UriEquivalence`] collaborator so that, for example, a PDF fingerprint
//! URN also finds annotations made on a web copy of the same document.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::builder::QueryBuilder;
use crate::context::SearchContext;
use crate::core::{Modifier, UriEquivalence};
use crate::error::QueryResult;
use crate::params::Params;
use crate::uri::{normalize, normalize_wildcard};

const URI_FIELD: &str = "target_uri_normalized";

/// Claims `uri` and its alias `url`; matches any of the given documents.
#[derive(Clone)]
pub struct UriFilter {
    uris: Arc<dyn UriEquivalence>,
}

impl UriFilter {
    /// Creates the filter with the context's URI equivalence service.
    pub fn new(context: &SearchContext) -> Self {
        Self {
            uris: Arc::clone(context.uris()),
        }
    }
}

impl Modifier for UriFilter {
    fn name(&self) -> &'static str {
        "uri_filter"
    }

    fn apply(&self, builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        let mut requested = params.pop_all("uri");
        requested.extend(params.pop_all("url"));
        if requested.is_empty() {
            return Ok(builder);
        }

        let normalized = expand_and_normalize(self.uris.as_ref(), &requested)?;
        Ok(builder.with_filter(json!({ "terms": { URI_FIELD: normalized } })))
    }
}

/// Claims `uri`, `url` and `wildcard_uri`; OR's exact and wildcard matches.
///
/// With `separate_keys`, patterns come from `wildcard_uri` only and every
/// `uri`/`url` value is matched exactly. Without it, `wildcard_uri` is
/// ignored and each `uri`/`url` value containing `*` or `?` is treated as a
/// pattern.
///
/// Patterns rejected by [`wildcard_uri_is_valid`] are dropped. The three keys
/// are always removed from the parameters, even when no clause results.
#[derive(Clone)]
pub struct UriCombinedWildcardFilter {
    uris: Arc<dyn UriEquivalence>,
    separate_keys: bool,
}

impl UriCombinedWildcardFilter {
    /// Creates the filter with the context's URI equivalence service.
    pub fn new(context: &SearchContext, separate_keys: bool) -> Self {
        Self {
            uris: Arc::clone(context.uris()),
            separate_keys,
        }
    }
}

impl Modifier for UriCombinedWildcardFilter {
    fn name(&self) -> &'static str {
        "uri_combined_wildcard_filter"
    }

    fn apply(&self, mut builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        let mut uris = params.pop_all("uri");
        uris.extend(params.pop_all("url"));
        let wildcard_uris = params.pop_all("wildcard_uri");

        let (exact, patterns): (Vec<String>, Vec<String>) = if self.separate_keys {
            (uris, wildcard_uris)
        } else {
            if !wildcard_uris.is_empty() {
                debug!(count = wildcard_uris.len(), "wildcard_uri ignored without separate keys");
            }
            uris.into_iter().partition(|uri| !has_wildcard(uri))
        };

        for pattern in &patterns {
            if wildcard_uri_is_valid(pattern) {
                builder = builder.with_should(json!({
                    "wildcard": { URI_FIELD: normalize_wildcard(pattern) }
                }));
            } else {
                debug!(pattern = %pattern, "wildcard pattern rejected");
            }
        }

        if !exact.is_empty() {
            let normalized = expand_and_normalize(self.uris.as_ref(), &exact)?;
            builder = builder.with_should(json!({ "terms": { URI_FIELD: normalized } }));
        }

        Ok(builder)
    }
}

fn expand_and_normalize(uris: &dyn UriEquivalence, requested: &[String]) -> QueryResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::new();
    for uri in requested {
        let mut forms = uris.expand(uri)?;
        if !forms.contains(uri) {
            forms.push(uri.clone());
        }
        for form in forms {
            let form = normalize(&form);
            if !normalized.contains(&form) {
                normalized.push(form);
            }
        }
    }
    Ok(normalized)
}

fn has_wildcard(value: &str) -> bool {
    value.contains(['*', '?'])
}

/// Returns true if `pattern` is a wildcard pattern the URI filter accepts.
///
/// A pattern must contain `*` or `?`, and neither may appear in the scheme
/// or the host (including its port). Schemes without an authority part, such
/// as `urn:` and `doi:`, take wildcards anywhere after the scheme.
///
/// ```
/// use marginalia_search::query::wildcard_uri_is_valid;
///
/// assert!(wildcard_uri_is_valid("http://foo.com/*"));
/// assert!(wildcard_uri_is_valid("urn:x-pdf:*"));
/// assert!(!wildcard_uri_is_valid("http://*.org/*"));
/// assert!(!wildcard_uri_is_valid("https://foo.com"));
/// ```
pub fn wildcard_uri_is_valid(pattern: &str) -> bool {
    if !has_wildcard(pattern) {
        return false;
    }

    let Some((scheme, rest)) = pattern.split_once(':') else {
        return false;
    };
    if !is_scheme(scheme) {
        return false;
    }

    match rest.strip_prefix("//") {
        Some(after_slashes) => {
            let authority = after_slashes.split('/').next().unwrap_or_default();
            !has_wildcard(authority)
        }
        None => true,
    }
}

fn is_scheme(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
