//! URI normalization.
//!
//! Documents are indexed under a normalized form of their target URI so that
//! trivially different spellings of the same web address find each other:
//!
//! - `http` and `https` collapse into the pseudo-scheme `httpx`
//! - the host is lowercased and a default port is dropped
//! - trailing slashes and the fragment are removed
//! - `utm_*` tracking parameters are dropped from the query
//!
//! Other schemes (`urn:`, `doi:`, `file:`) and strings that do not parse as
//! URLs are kept verbatim apart from surrounding whitespace.

use url::Url;

/// Returns the normalized form of `uri`.
///
/// ```
/// use marginalia_search::uri::normalize;
///
/// assert_eq!(normalize("HTTPS://Example.COM:443/a/?utm_source=x#top"), "httpx://example.com/a");
/// assert_eq!(normalize("urn:x-pdf:abc"), "urn:x-pdf:abc");
/// ```
pub fn normalize(uri: &str) -> String {
    let trimmed = uri.trim();
    let Ok(url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    if !matches!(url.scheme(), "http" | "https") {
        return trimmed.to_string();
    }

    let mut out = String::from("httpx://");

    if !url.username().is_empty() {
        out.push_str(url.username());
        if let Some(password) = url.password() {
            out.push(':');
            out.push_str(password);
        }
        out.push('@');
    }

    if let Some(host) = url.host_str() {
        out.push_str(&host.to_ascii_lowercase());
    }
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }

    out.push_str(url.path().trim_end_matches('/'));

    if let Some(query) = url.query() {
        let kept: Vec<&str> = query
            .split('&')
            .filter(|pair| !pair.is_empty() && !pair.starts_with("utm_"))
            .collect();
        if !kept.is_empty() {
            out.push('?');
            out.push_str(&kept.join("&"));
        }
    }

    out
}

/// Stand-ins for wildcard markers while the rest of a pattern is parsed.
/// Lowercase alphanumerics pass through URL parsing and host lowercasing
/// untouched.
const STAR_PLACEHOLDER: &str = "xwildcardstarx";
const QMARK_PLACEHOLDER: &str = "xwildcardqmarkx";

/// Normalizes a wildcard pattern.
///
/// A single trailing `*` or `?` is set aside before normalizing and put back
/// afterwards, so `http://example.com/*` becomes `httpx://example.com*` and
/// still matches the bare site. Markers elsewhere are swapped for
/// placeholders so a mid-path `?` is not read as the start of a query.
pub fn normalize_wildcard(pattern: &str) -> String {
    let trimmed = pattern.trim();
    let (head, last) = match trimmed.chars().last() {
        Some(last @ ('*' | '?')) => (&trimmed[..trimmed.len() - 1], Some(last)),
        _ => (trimmed, None),
    };

    let masked = head
        .replace('*', STAR_PLACEHOLDER)
        .replace('?', QMARK_PLACEHOLDER);
    let mut normalized = normalize(&masked)
        .replace(STAR_PLACEHOLDER, "*")
        .replace(QMARK_PLACEHOLDER, "?");
    if let Some(last) = last {
        normalized.push(last);
    }
    normalized
}
