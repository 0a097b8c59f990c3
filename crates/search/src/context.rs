//! Request context handed to the stages that depend on who is searching.
//!
//! A [`SearchContext`] bundles the viewer identity (if any), the authority
//! of the running instance, and the collaborator services. Stages capture
//! what they need from it at construction time and never mutate it, so a
//! single context can be shared by every stage of a request.

use std::fmt;
use std::sync::Arc;

use crate::core::{GroupService, UriEquivalence};
use crate::types::split_userid;

/// The identity of an authenticated viewer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Viewer {
    userid: String,
}

impl Viewer {
    /// Creates a viewer from a `acct:<name>@<authority>` userid.
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
        }
    }

    /// The full userid.
    pub fn userid(&self) -> &str {
        &self.userid
    }

    /// The username segment, if the userid is well formed.
    pub fn username(&self) -> Option<&str> {
        split_userid(&self.userid).map(|(username, _)| username)
    }

    /// The authority segment, if the userid is well formed.
    pub fn authority(&self) -> Option<&str> {
        split_userid(&self.userid).map(|(_, authority)| authority)
    }
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.userid)
    }
}

/// Per-request context for the search pipeline.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use marginalia_search::context::{SearchContext, Viewer};
/// use marginalia_search::services::{IdentityUriEquivalence, StaticGroupService};
///
/// let context = SearchContext::new(
///     "example.com",
///     Arc::new(StaticGroupService::new()),
///     Arc::new(IdentityUriEquivalence),
/// )
/// .with_viewer(Viewer::new("acct:alice@example.com"));
///
/// assert_eq!(context.viewer().map(Viewer::userid), Some("acct:alice@example.com"));
/// ```
#[derive(Clone)]
pub struct SearchContext {
    viewer: Option<Viewer>,
    authority: String,
    groups: Arc<dyn GroupService>,
    uris: Arc<dyn UriEquivalence>,
}

impl SearchContext {
    /// Creates an anonymous context.
    pub fn new(
        authority: impl Into<String>,
        groups: Arc<dyn GroupService>,
        uris: Arc<dyn UriEquivalence>,
    ) -> Self {
        Self {
            viewer: None,
            authority: authority.into(),
            groups,
            uris,
        }
    }

    /// Binds a viewer identity to the context.
    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = Some(viewer);
        self
    }

    /// Binds or clears the viewer identity.
    pub fn with_optional_viewer(mut self, viewer: Option<Viewer>) -> Self {
        self.viewer = viewer;
        self
    }

    /// The viewer, or `None` for anonymous requests.
    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    /// Authority of the running instance.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// The group membership service.
    pub fn groups(&self) -> &Arc<dyn GroupService> {
        &self.groups
    }

    /// The URI equivalence service.
    pub fn uris(&self) -> &Arc<dyn UriEquivalence> {
        &self.uris
    }
}

impl fmt::Debug for SearchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchContext")
            .field("viewer", &self.viewer)
            .field("authority", &self.authority)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{IdentityUriEquivalence, StaticGroupService};

    fn context() -> SearchContext {
        SearchContext::new(
            "example.com",
            Arc::new(StaticGroupService::new()),
            Arc::new(IdentityUriEquivalence),
        )
    }

    #[test]
    fn test_context_is_anonymous_by_default() {
        assert!(context().viewer().is_none());
    }

    #[test]
    fn test_viewer_segments() {
        let viewer = Viewer::new("acct:bob@auth2");
        assert_eq!(viewer.username(), Some("bob"));
        assert_eq!(viewer.authority(), Some("auth2"));

        let ctx = context().with_viewer(viewer.clone());
        assert_eq!(ctx.viewer(), Some(&viewer));
        assert!(context().with_optional_viewer(None).viewer().is_none());
    }
}
