//! In-process collaborator implementations.
//!
//! These back the command line tool and the test suite. A deployment that
//! talks to a real group store or URI-equivalence database implements
//! [`GroupService`] and [`UriEquivalence`] itself.

use std::collections::{HashMap, HashSet};

use crate::context::Viewer;
use crate::core::{GroupService, UriEquivalence};
use crate::error::ServiceError;
use crate::types::WORLD_GROUP;

/// A group service backed by fixed membership tables.
///
/// Anonymous viewers may read the world-readable groups. An identified
/// viewer may additionally read every group they are a member of.
#[derive(Debug, Clone)]
pub struct StaticGroupService {
    world_readable: Vec<String>,
    members: HashMap<String, Vec<String>>,
    creators: HashMap<String, Vec<String>>,
}

impl Default for StaticGroupService {
    fn default() -> Self {
        Self {
            world_readable: vec![WORLD_GROUP.to_string()],
            members: HashMap::new(),
            creators: HashMap::new(),
        }
    }
}

impl StaticGroupService {
    /// Creates a service where only the world group is readable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the world-readable group list.
    pub fn with_world_readable<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.world_readable = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Adds `userid` as a member of `groupid`.
    pub fn with_member(mut self, userid: impl Into<String>, groupid: impl Into<String>) -> Self {
        self.members
            .entry(userid.into())
            .or_default()
            .push(groupid.into());
        self
    }

    /// Records `userid` as the creator of `groupid`. Creators are members.
    pub fn with_creator(mut self, userid: impl Into<String>, groupid: impl Into<String>) -> Self {
        let userid = userid.into();
        let groupid = groupid.into();
        self.creators
            .entry(userid.clone())
            .or_default()
            .push(groupid.clone());
        self.with_member(userid, groupid)
    }
}

impl GroupService for StaticGroupService {
    fn groupids_readable_by(&self, viewer: Option<&Viewer>) -> Result<Vec<String>, ServiceError> {
        let mut seen = HashSet::new();
        let mut groups = Vec::new();
        let memberships = viewer
            .and_then(|v| self.members.get(v.userid()))
            .map(Vec::as_slice)
            .unwrap_or_default();
        for groupid in self.world_readable.iter().chain(memberships) {
            if seen.insert(groupid.as_str()) {
                groups.push(groupid.clone());
            }
        }
        Ok(groups)
    }

    fn groupids_created_by(&self, user: &Viewer) -> Result<Vec<String>, ServiceError> {
        Ok(self.creators.get(user.userid()).cloned().unwrap_or_default())
    }
}

/// URI equivalence that knows no aliases: every URI only expands to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityUriEquivalence;

impl UriEquivalence for IdentityUriEquivalence {
    fn expand(&self, uri: &str) -> Result<Vec<String>, ServiceError> {
        Ok(vec![uri.to_string()])
    }
}

/// URI equivalence over declared classes of interchangeable URIs.
///
/// Lookups compare normalized forms, so `https://example.com/` finds a class
/// declared with `http://example.com`.
#[derive(Debug, Clone, Default)]
pub struct StaticUriEquivalence {
    classes: Vec<Vec<String>>,
}

impl StaticUriEquivalence {
    /// Creates a service with no declared classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a class of URIs that identify the same document.
    pub fn with_class<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes.push(uris.into_iter().map(Into::into).collect());
        self
    }
}

impl UriEquivalence for StaticUriEquivalence {
    fn expand(&self, uri: &str) -> Result<Vec<String>, ServiceError> {
        let needle = crate::uri::normalize(uri);
        let mut expanded = vec![uri.to_string()];
        for class in &self.classes {
            if class.iter().any(|member| crate::uri::normalize(member) == needle) {
                for member in class {
                    if !expanded.contains(member) {
                        expanded.push(member.clone());
                    }
                }
            }
        }
        Ok(expanded)
    }
}
