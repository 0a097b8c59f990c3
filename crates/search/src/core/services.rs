//! Collaborator service traits.
//!
//! Both services are called synchronously while the query is assembled. They
//! are expected to be side-effect free; a failure aborts the whole request.

use crate::context::Viewer;
use crate::error::ServiceError;

/// Group membership lookups.
pub trait GroupService: Send + Sync {
    /// Ids of every group the viewer may read. Anonymous viewers pass `None`.
    fn groupids_readable_by(&self, viewer: Option<&Viewer>) -> Result<Vec<String>, ServiceError>;

    /// Ids of the groups created by `user`.
    fn groupids_created_by(&self, user: &Viewer) -> Result<Vec<String>, ServiceError>;
}

/// Resolves a URI into the set of URIs known to identify the same document.
pub trait UriEquivalence: Send + Sync {
    /// Returns the equivalent URIs. The result always contains `uri` itself.
    fn expand(&self, uri: &str) -> Result<Vec<String>, ServiceError>;
}
