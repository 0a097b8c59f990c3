//! Marginalia command line search.
//!
//! Loads a JSON array of annotations into an in-memory index, runs one search
//! through the default pipeline and prints the result as JSON.

mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use marginalia_search::backends::MemoryIndex;
use marginalia_search::query::{TagsAggregation, UsersAggregation};
use marginalia_search::services::{StaticGroupService, StaticUriEquivalence};
use marginalia_search::types::Annotation;
use marginalia_search::{Search, SearchContext, Viewer};
use tracing::info;

use crate::config::CliConfig;

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over
/// `level`. Logs go to stderr so stdout stays valid JSON.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("marginalia_search={level},marginalia={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_annotations(path: &Path) -> anyhow::Result<Vec<Annotation>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing annotations in {}", path.display()))
}

fn group_service(config: &CliConfig) -> StaticGroupService {
    let mut groups = StaticGroupService::new().with_world_readable(config.world_groups.clone());
    if let Some(viewer) = &config.viewer {
        for groupid in &config.readable_groups {
            groups = groups.with_member(viewer.clone(), groupid.clone());
        }
        for groupid in &config.created_groups {
            groups = groups.with_creator(viewer.clone(), groupid.clone());
        }
    }
    groups
}

fn uri_equivalence(config: &CliConfig) -> StaticUriEquivalence {
    config
        .uri_class_members()
        .into_iter()
        .fold(StaticUriEquivalence::new(), |uris, class| uris.with_class(class))
}

/// Builds the search described by `config` over `annotations`.
fn build_search(config: &CliConfig, annotations: &[Annotation]) -> Search {
    let index = Arc::new(MemoryIndex::with_annotations(annotations));

    let context = SearchContext::new(
        config.authority.clone(),
        Arc::new(group_service(config)),
        Arc::new(uri_equivalence(config)),
    )
    .with_optional_viewer(config.viewer.as_deref().map(Viewer::new));

    let mut search = Search::with_config(index, context, config.search_config());
    if config.aggregate_tags {
        search.append_aggregation(TagsAggregation::with_limit(config.bucket_limit));
    }
    if config.aggregate_users {
        search.append_aggregation(UsersAggregation::with_limit(config.bucket_limit));
    }
    search
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let annotations = load_annotations(&config.documents)?;
    info!(
        documents = %config.documents.display(),
        count = annotations.len(),
        viewer = config.viewer.as_deref().unwrap_or("anonymous"),
        "Loaded annotations"
    );

    let search = build_search(&config, &annotations);
    let result = search
        .run(config.search_params())
        .await
        .context("search failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const ANNOTATIONS: &str = r#"[
        {
            "id": "a1",
            "userid": "acct:alice@localhost",
            "target_uri": "https://example.com/article",
            "shared": true,
            "tags": ["rust"],
            "created": "2018-01-01T00:00:00Z",
            "updated": "2018-01-02T00:00:00Z"
        },
        {
            "id": "a2",
            "userid": "acct:bob@localhost",
            "target_uri": "https://example.com/article",
            "tags": ["rust"],
            "created": "2018-01-01T00:00:00Z",
            "updated": "2018-01-03T00:00:00Z"
        },
        {
            "id": "a3",
            "userid": "acct:bob@localhost",
            "groupid": "team",
            "target_uri": "https://example.com/other",
            "shared": true,
            "created": "2018-01-01T00:00:00Z",
            "updated": "2018-01-04T00:00:00Z"
        }
    ]"#;

    fn documents() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ANNOTATIONS.as_bytes()).unwrap();
        file
    }

    fn cli(file: &tempfile::NamedTempFile, args: &[&str]) -> CliConfig {
        let path = file.path().to_str().unwrap();
        let mut argv = vec!["marginalia", "--documents", path];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_load_annotations() {
        let file = documents();
        let annotations = load_annotations(file.path()).unwrap();
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[2].groupid, "team");
    }

    #[test]
    fn test_load_annotations_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = load_annotations(file.path()).unwrap_err();
        assert!(err.to_string().contains("parsing annotations"));
    }

    #[tokio::test]
    async fn test_anonymous_search() {
        let file = documents();
        let config = cli(&file, &["tag=rust"]);
        let annotations = load_annotations(&config.documents).unwrap();

        let result = build_search(&config, &annotations)
            .run(config.search_params())
            .await
            .unwrap();
        assert_eq!(result.annotation_ids, vec!["a1"]);
    }

    #[tokio::test]
    async fn test_viewer_with_group_membership() {
        let file = documents();
        let config = cli(
            &file,
            &[
                "--viewer",
                "acct:bob@localhost",
                "--readable-group",
                "team",
                "--aggregate-users",
            ],
        );
        let annotations = load_annotations(&config.documents).unwrap();

        let result = build_search(&config, &annotations)
            .run(config.search_params())
            .await
            .unwrap();
        assert_eq!(result.annotation_ids, vec!["a3", "a2", "a1"]);
        assert_eq!(result.bucket_count("users", "acct:bob@localhost"), Some(2));
    }
}
