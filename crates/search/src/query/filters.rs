//! Visibility and scoping filters.
//!
//! Every filter here adds non-scoring clauses. Filters that depend on who is
//! searching capture what they need from the [`SearchContext`] when they are
//! constructed.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::builder::QueryBuilder;
use crate::context::{SearchContext, Viewer};
use crate::core::{GroupService, Modifier};
use crate::error::QueryResult;
use crate::params::Params;

/// Excludes replies, keeping only annotations that start a thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopLevelAnnotationsFilter;

impl Modifier for TopLevelAnnotationsFilter {
    fn name(&self) -> &'static str {
        "top_level_annotations_filter"
    }

    fn apply(&self, builder: QueryBuilder, _params: &mut Params) -> QueryResult<QueryBuilder> {
        Ok(builder.with_must_not(json!({ "exists": { "field": "references" } })))
    }
}

/// Restricts results to annotations whose author belongs to one authority.
#[derive(Debug, Clone)]
pub struct AuthorityFilter {
    authority: String,
}

impl AuthorityFilter {
    /// Creates a filter for `authority`.
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }
}

impl Modifier for AuthorityFilter {
    fn name(&self) -> &'static str {
        "authority_filter"
    }

    fn apply(&self, builder: QueryBuilder, _params: &mut Params) -> QueryResult<QueryBuilder> {
        Ok(builder.with_filter(json!({ "term": { "authority": self.authority } })))
    }
}

/// Shows shared annotations, plus the viewer's own private ones.
#[derive(Debug, Clone, Default)]
pub struct AuthFilter {
    viewer: Option<Viewer>,
}

impl AuthFilter {
    /// Captures the viewer from `context`.
    pub fn new(context: &SearchContext) -> Self {
        Self {
            viewer: context.viewer().cloned(),
        }
    }
}

impl Modifier for AuthFilter {
    fn name(&self) -> &'static str {
        "auth_filter"
    }

    fn apply(&self, builder: QueryBuilder, _params: &mut Params) -> QueryResult<QueryBuilder> {
        let shared = json!({ "term": { "shared": true } });
        let clause = match &self.viewer {
            None => shared,
            Some(viewer) => json!({
                "bool": {
                    "should": [shared, { "term": { "userid": viewer.userid() } }],
                    "minimum_should_match": 1
                }
            }),
        };
        Ok(builder.with_filter(clause))
    }
}

/// Claims `group` and restricts results to that group.
///
/// When `group` is given several times the last value wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupFilter;

impl Modifier for GroupFilter {
    fn name(&self) -> &'static str {
        "group_filter"
    }

    fn apply(&self, builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        Ok(match params.pop("group") {
            Some(groupid) => builder.with_filter(json!({ "term": { "group": groupid } })),
            None => builder,
        })
    }
}

/// Restricts results to groups the viewer is allowed to read.
///
/// The readable set is looked up when the filter runs. An empty set matches
/// nothing.
#[derive(Clone)]
pub struct GroupAuthFilter {
    viewer: Option<Viewer>,
    groups: Arc<dyn GroupService>,
}

impl GroupAuthFilter {
    /// Captures the viewer and group service from `context`.
    pub fn new(context: &SearchContext) -> Self {
        Self {
            viewer: context.viewer().cloned(),
            groups: Arc::clone(context.groups()),
        }
    }
}

impl Modifier for GroupAuthFilter {
    fn name(&self) -> &'static str {
        "group_auth_filter"
    }

    fn apply(&self, builder: QueryBuilder, _params: &mut Params) -> QueryResult<QueryBuilder> {
        let readable = self.groups.groupids_readable_by(self.viewer.as_ref())?;
        Ok(builder.with_filter(json!({ "terms": { "group": readable } })))
    }
}

/// Claims `user`; matches annotations by any of the given authors.
///
/// A value containing `@` is a qualified `name@authority` or
/// `acct:name@authority` userid. Anything else is a bare username and is
/// qualified with the authority of the running instance. Matching ignores
/// case.
#[derive(Debug, Clone)]
pub struct UserFilter {
    authority: String,
}

impl UserFilter {
    /// Captures the instance authority from `context`.
    pub fn new(context: &SearchContext) -> Self {
        Self {
            authority: context.authority().to_lowercase(),
        }
    }

    fn qualify(&self, user: &str) -> String {
        let user = user.trim().to_lowercase();
        if user.contains('@') {
            return user;
        }
        let username = user.strip_prefix("acct:").unwrap_or(&user);
        format!("acct:{}@{}", username, self.authority)
    }
}

impl Modifier for UserFilter {
    fn name(&self) -> &'static str {
        "user_filter"
    }

    fn apply(&self, builder: QueryBuilder, params: &mut Params) -> QueryResult<QueryBuilder> {
        let users: Vec<String> = params
            .pop_all("user")
            .iter()
            .filter(|user| !user.trim().is_empty())
            .map(|user| self.qualify(user))
            .collect();

        if users.is_empty() {
            return Ok(builder);
        }
        Ok(builder.with_filter(json!({ "terms": { "user": users } })))
    }
}

/// Excludes tombstoned annotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletedFilter;

impl Modifier for DeletedFilter {
    fn name(&self) -> &'static str {
        "deleted_filter"
    }

    fn apply(&self, builder: QueryBuilder, _params: &mut Params) -> QueryResult<QueryBuilder> {
        Ok(builder.with_must_not(json!({ "term": { "deleted": true } })))
    }
}

/// Hides moderated annotations and annotations by NIPSA'd users.
///
/// A hidden annotation stays visible to its author, and to the creator of
/// the group it was posted in.
#[derive(Clone)]
pub struct HiddenFilter {
    viewer: Option<Viewer>,
    groups: Arc<dyn GroupService>,
}

impl HiddenFilter {
    /// Captures the viewer and group service from `context`.
    pub fn new(context: &SearchContext) -> Self {
        Self {
            viewer: context.viewer().cloned(),
            groups: Arc::clone(context.groups()),
        }
    }
}

impl Modifier for HiddenFilter {
    fn name(&self) -> &'static str {
        "hidden_filter"
    }

    fn apply(&self, builder: QueryBuilder, _params: &mut Params) -> QueryResult<QueryBuilder> {
        let mut should: Vec<Value> = vec![json!({
            "bool": {
                "must_not": [
                    { "term": { "nipsa": true } },
                    { "term": { "hidden": true } }
                ]
            }
        })];

        if let Some(viewer) = &self.viewer {
            should.push(json!({ "term": { "user": viewer.userid().to_lowercase() } }));

            let created = self.groups.groupids_created_by(viewer)?;
            if !created.is_empty() {
                should.push(json!({ "terms": { "group": created } }));
            }
        }

        Ok(builder.with_filter(json!({
            "bool": { "should": should, "minimum_should_match": 1 }
        })))
    }
}
