//! Command line configuration.
//!
//! Every option can also be set through the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MARGINALIA_DOCUMENTS` | | JSON file holding an array of annotations |
//! | `MARGINALIA_AUTHORITY` | localhost | Authority of this instance |
//! | `MARGINALIA_VIEWER` | | Userid to search as |
//! | `MARGINALIA_READABLE_GROUPS` | | Extra groups the viewer may read |
//! | `MARGINALIA_CREATED_GROUPS` | | Groups the viewer created |
//! | `MARGINALIA_WORLD_GROUPS` | `__world__` | Groups anyone may read |
//! | `MARGINALIA_SEPARATE_REPLIES` | false | Return replies apart from top-level hits |
//! | `MARGINALIA_REPLIES_LIMIT` | 200 | Cap on the reply search |
//! | `MARGINALIA_WILDCARD_URI` | false | Accept wildcard URI patterns |
//! | `MARGINALIA_SEPARATE_WILDCARD_KEYS` | true | Read patterns from `wildcard_uri` only |
//! | `MARGINALIA_LOG_LEVEL` | warn | Log level |

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use marginalia_search::query::DEFAULT_BUCKET_LIMIT;
use marginalia_search::{Params, SearchConfig};

/// Runs one annotation search over a JSON file of annotations.
#[derive(Debug, Clone, Parser)]
#[command(name = "marginalia")]
#[command(about = "Search a file of annotations the way the annotation API does")]
pub struct CliConfig {
    /// JSON file holding an array of annotations.
    #[arg(short, long, env = "MARGINALIA_DOCUMENTS")]
    pub documents: PathBuf,

    /// Authority of this instance.
    #[arg(long, env = "MARGINALIA_AUTHORITY", default_value = "localhost")]
    pub authority: String,

    /// Userid to search as (`acct:name@authority`). Anonymous when absent.
    #[arg(long, env = "MARGINALIA_VIEWER")]
    pub viewer: Option<String>,

    /// Groups the viewer is a member of, beyond the world-readable ones.
    #[arg(
        long = "readable-group",
        env = "MARGINALIA_READABLE_GROUPS",
        value_delimiter = ','
    )]
    pub readable_groups: Vec<String>,

    /// Groups the viewer created.
    #[arg(
        long = "created-group",
        env = "MARGINALIA_CREATED_GROUPS",
        value_delimiter = ','
    )]
    pub created_groups: Vec<String>,

    /// Groups readable by everyone.
    #[arg(
        long = "world-group",
        env = "MARGINALIA_WORLD_GROUPS",
        value_delimiter = ',',
        default_value = "__world__"
    )]
    pub world_groups: Vec<String>,

    /// URIs that identify the same document, comma separated. Repeatable.
    #[arg(long = "uri-class")]
    pub uri_classes: Vec<String>,

    /// Return replies to the hits separately instead of inline.
    #[arg(long, env = "MARGINALIA_SEPARATE_REPLIES")]
    pub separate_replies: bool,

    /// Maximum number of replies fetched when replies are separate.
    #[arg(long, env = "MARGINALIA_REPLIES_LIMIT", default_value = "200")]
    pub replies_limit: usize,

    /// Accept `*` and `?` patterns in URI parameters.
    #[arg(long, env = "MARGINALIA_WILDCARD_URI")]
    pub wildcard_uri: bool,

    /// Read patterns from `wildcard_uri` only and match `uri`/`url` exactly.
    #[arg(
        long,
        env = "MARGINALIA_SEPARATE_WILDCARD_KEYS",
        default_value = "true",
        action = ArgAction::Set
    )]
    pub separate_wildcard_keys: bool,

    /// Add tag counts to the result.
    #[arg(long)]
    pub aggregate_tags: bool,

    /// Add author counts to the result.
    #[arg(long)]
    pub aggregate_users: bool,

    /// Number of buckets per aggregation.
    #[arg(long, default_value_t = DEFAULT_BUCKET_LIMIT)]
    pub bucket_limit: usize,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "MARGINALIA_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Search parameters as `key=value`, e.g. `tag=rust user=alice`.
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

impl CliConfig {
    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.authority.trim().is_empty() {
            errors.push("Authority cannot be empty".to_string());
        }

        if let Some(viewer) = &self.viewer
            && marginalia_search::types::split_userid(viewer).is_none()
        {
            errors.push(format!("Viewer '{}' is not of the form acct:name@authority", viewer));
        }

        if self.bucket_limit == 0 {
            errors.push("Bucket limit cannot be 0".to_string());
        }

        for raw in &self.params {
            if !raw.contains('=') {
                errors.push(format!("Parameter '{}' is not of the form key=value", raw));
            }
        }

        if let Err(search_errors) = self.search_config().validate() {
            errors.extend(search_errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The pipeline configuration selected by the flags.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_separate_replies(self.separate_replies)
            .with_replies_limit(self.replies_limit)
            .with_wildcard_uri(self.wildcard_uri, self.separate_wildcard_keys)
    }

    /// The search parameters, in the order given. Values may contain `=`.
    pub fn search_params(&self) -> Params {
        self.params
            .iter()
            .filter_map(|raw| raw.split_once('='))
            .collect()
    }

    /// The declared URI equivalence classes.
    pub fn uri_class_members(&self) -> Vec<Vec<String>> {
        self.uri_classes
            .iter()
            .map(|class| {
                class
                    .split(',')
                    .map(str::trim)
                    .filter(|uri| !uri.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|class| class.len() > 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["marginalia", "--documents", "annotations.json"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.authority, "localhost");
        assert_eq!(config.world_groups, vec!["__world__"]);
        assert!(config.viewer.is_none());
        assert!(config.separate_wildcard_keys);
        assert!(!config.separate_replies);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_params_keep_order_and_repeats() {
        let config = parse(&["tag=a", "tag=b", "uri=http://x.com/?q=1"]);
        let params = config.search_params();
        assert_eq!(params.get_all("tag"), vec!["a", "b"]);
        assert_eq!(params.get("uri"), Some("http://x.com/?q=1"));
    }

    #[test]
    fn test_validate_rejects_bad_params_and_viewer() {
        let config = parse(&["--viewer", "alice", "tag"]);
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Viewer")));
        assert!(errors.iter().any(|e| e.contains("key=value")));
    }

    #[test]
    fn test_validate_includes_search_config_errors() {
        let config = parse(&["--separate-replies", "--replies-limit", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_separate_wildcard_keys_can_be_disabled() {
        let config = parse(&["--wildcard-uri", "--separate-wildcard-keys", "false"]);
        let search = config.search_config();
        assert!(search.wildcard_uri);
        assert!(!search.separate_wildcard_uri_keys);
    }

    #[test]
    fn test_uri_classes() {
        let config = parse(&[
            "--uri-class",
            "urn:x-pdf:1, http://a.com/doc.pdf",
            "--uri-class",
            "single",
        ]);
        assert_eq!(
            config.uri_class_members(),
            vec![vec!["urn:x-pdf:1".to_string(), "http://a.com/doc.pdf".to_string()]]
        );
    }
}
