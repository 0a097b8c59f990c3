//! A search harness over an in-memory index.

use std::sync::Arc;

use marginalia_search::backends::MemoryIndex;
use marginalia_search::context::{SearchContext, Viewer};
use marginalia_search::core::{GroupService, Modifier, UriEquivalence};
use marginalia_search::error::ServiceError;
use marginalia_search::services::{StaticGroupService, StaticUriEquivalence};
use marginalia_search::types::SearchResult;
use marginalia_search::{Params, Search, SearchConfig};

use super::fixtures::AnnotationFixture;

/// Authority of the instance under test.
pub const AUTHORITY: &str = "example.com";

/// Holds an index and the collaborators a search is built from.
pub struct Harness {
    /// The index fixtures are written to.
    pub index: Arc<MemoryIndex>,
    groups: Arc<dyn GroupService>,
    uris: Arc<dyn UriEquivalence>,
    viewer: Option<Viewer>,
    config: SearchConfig,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// An anonymous harness with only the world group readable.
    pub fn new() -> Self {
        Self {
            index: Arc::new(MemoryIndex::new()),
            groups: Arc::new(StaticGroupService::new()),
            uris: Arc::new(StaticUriEquivalence::new()),
            viewer: None,
            config: SearchConfig::default(),
        }
    }

    /// Shares another harness's index.
    pub fn with_index(mut self, index: Arc<MemoryIndex>) -> Self {
        self.index = index;
        self
    }

    /// Replaces the group service.
    pub fn with_groups(mut self, groups: impl GroupService + 'static) -> Self {
        self.groups = Arc::new(groups);
        self
    }

    /// Replaces the URI equivalence service.
    pub fn with_uris(mut self, uris: impl UriEquivalence + 'static) -> Self {
        self.uris = Arc::new(uris);
        self
    }

    /// Searches as `userid`.
    pub fn as_viewer(mut self, userid: &str) -> Self {
        self.viewer = Some(Viewer::new(userid));
        self
    }

    /// Replaces the search configuration.
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Indexes a fixture and returns its id.
    pub fn add(&self, fixture: AnnotationFixture) -> String {
        let annotation = fixture.build();
        self.index.index(&annotation);
        annotation.id
    }

    /// Indexes `count` fixtures produced by `make` and returns their ids.
    pub fn add_many(&self, count: usize, make: impl Fn() -> AnnotationFixture) -> Vec<String> {
        (0..count).map(|_| self.add(make())).collect()
    }

    /// The request context for the current viewer.
    pub fn context(&self) -> SearchContext {
        SearchContext::new(AUTHORITY, Arc::clone(&self.groups), Arc::clone(&self.uris))
            .with_optional_viewer(self.viewer.clone())
    }

    /// A search with the default pipeline.
    pub fn search(&self) -> Search {
        Search::with_config(self.index.clone(), self.context(), self.config.clone())
    }

    /// A search reduced to sorting plus `modifier`.
    pub fn search_with(&self, modifier: impl Modifier + 'static) -> Search {
        let mut search = self.search();
        search.clear();
        search.append_modifier(modifier);
        search
    }

    /// A search reduced to sorting only.
    pub fn bare_search(&self) -> Search {
        let mut search = self.search();
        search.clear();
        search
    }
}

/// Runs `search` and panics on error.
pub async fn run<const N: usize>(search: &Search, params: [(&str, &str); N]) -> SearchResult {
    search
        .run(Params::from(params))
        .await
        .expect("search should succeed")
}

/// Runs `search` and returns the matching ids, sorted.
pub async fn matching_ids<const N: usize>(
    search: &Search,
    params: [(&str, &str); N],
) -> Vec<String> {
    let mut ids = run(search, params).await.annotation_ids;
    ids.sort();
    ids
}

/// Sorts a list of ids for order-insensitive comparison.
pub fn sorted<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().map(|id| id.as_ref().to_string()).collect();
    ids.sort();
    ids
}

/// A group service whose lookups always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGroupService;

impl GroupService for FailingGroupService {
    fn groupids_readable_by(&self, _viewer: Option<&Viewer>) -> Result<Vec<String>, ServiceError> {
        Err(ServiceError::unavailable("groups", "group store offline"))
    }

    fn groupids_created_by(&self, _user: &Viewer) -> Result<Vec<String>, ServiceError> {
        Err(ServiceError::unavailable("groups", "group store offline"))
    }
}

/// A URI equivalence service whose lookups always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingUriEquivalence;

impl UriEquivalence for FailingUriEquivalence {
    fn expand(&self, uri: &str) -> Result<Vec<String>, ServiceError> {
        Err(ServiceError::lookup_failed(
            "uri equivalence",
            format!("no equivalence data for {uri}"),
        ))
    }
}
