//! Application configuration for specpub.
//!
//! Project config lives at `<root>/specpub.toml`, with a user-level fallback
//! at `~/.specpub/specpub.toml`. CLI flags override config file values, which
//! override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecPubError};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "specpub.toml";

/// Default user config directory name under the home directory.
const CONFIG_DIR_NAME: &str = ".specpub";

// ---------------------------------------------------------------------------
// Config structs (matching specpub.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source and output locations, relative to the project root.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Markers bounding the generated section of the site config.
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Cross-repository link rewriting.
    #[serde(default)]
    pub links: LinksConfig,

    /// Front matter defaults and reserved filenames.
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Git history correlation.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the source spec documents.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Root of the documentation site tree.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Published specs directory, relative to `docs_dir`.
    #[serde(default = "default_specs_subdir")]
    pub specs_subdir: String,

    /// Dashboard page, relative to `docs_dir`.
    #[serde(default = "default_dashboard_file")]
    pub dashboard_file: String,

    /// Implementation summaries directory, relative to `docs_dir`.
    #[serde(default = "default_workflows_subdir")]
    pub workflows_subdir: String,

    /// Frontend search index, relative to `docs_dir`.
    #[serde(default = "default_search_index_file")]
    pub search_index_file: String,

    /// Site configuration file holding the navigation tree.
    #[serde(default = "default_site_config")]
    pub site_config: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            docs_dir: default_docs_dir(),
            specs_subdir: default_specs_subdir(),
            dashboard_file: default_dashboard_file(),
            workflows_subdir: default_workflows_subdir(),
            search_index_file: default_search_index_file(),
            site_config: default_site_config(),
        }
    }
}

fn default_source_dir() -> String {
    "project/specs".into()
}
fn default_docs_dir() -> String {
    "mkdocs-docs".into()
}
fn default_specs_subdir() -> String {
    "engineering/specs".into()
}
fn default_dashboard_file() -> String {
    "engineering/dashboard.md".into()
}
fn default_workflows_subdir() -> String {
    "engineering/dev-workflows".into()
}
fn default_search_index_file() -> String {
    "assets/js/search-index.json".into()
}
fn default_site_config() -> String {
    "mkdocs.yml".into()
}

/// `[navigation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Line that opens the generated specs section.
    #[serde(default = "default_start_marker")]
    pub start_marker: String,

    /// Text that follows the generated section; never rewritten.
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
        }
    }
}

fn default_start_marker() -> String {
    "      - Specs:".into()
}
fn default_end_marker() -> String {
    "\n      - PM Workflows (Legacy):".into()
}

/// `[links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Base URL that relative repository links are rewritten onto.
    #[serde(default = "default_repo_blob_base")]
    pub repo_blob_base: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            repo_blob_base: default_repo_blob_base(),
        }
    }
}

fn default_repo_blob_base() -> String {
    "https://github.com/kangxh75/NextPM/blob/master".into()
}

/// `[metadata]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Filename stem of the grandfathered first spec.
    #[serde(default = "default_legacy_stem")]
    pub legacy_stem: String,

    /// Filename skipped by the loader (case-insensitive).
    #[serde(default = "default_excluded_file")]
    pub excluded_file: String,

    /// Assignee used when front matter omits one.
    #[serde(default = "default_assignee")]
    pub default_assignee: String,

    /// Category used when front matter omits one.
    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            legacy_stem: default_legacy_stem(),
            excluded_file: default_excluded_file(),
            default_assignee: default_assignee(),
            default_category: default_category(),
        }
    }
}

fn default_legacy_stem() -> String {
    "0.00-project-start".into()
}
fn default_excluded_file() -> String {
    "README.md".into()
}
fn default_assignee() -> String {
    "Kang".into()
}
fn default_category() -> String {
    "nextpm-feature".into()
}

/// `[history]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Whether to query git at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound for a single git invocation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Trailing window for the recent-activity list.
    #[serde(default = "default_recent_days")]
    pub recent_days: i64,

    /// Maximum number of recent-activity entries.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Maximum number of changed paths stored per commit.
    #[serde(default = "default_changed_files_limit")]
    pub changed_files_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_timeout_secs(),
            recent_days: default_recent_days(),
            recent_limit: default_recent_limit(),
            changed_files_limit: default_changed_files_limit(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_recent_days() -> i64 {
    30
}
fn default_recent_limit() -> usize {
    5
}
fn default_changed_files_limit() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Build config (runtime, resolved against the project root)
// ---------------------------------------------------------------------------

/// Runtime build configuration with every location resolved to a full path.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project root; also the git repository queried for history.
    pub root: PathBuf,
    /// Directory holding the source spec documents.
    pub source_dir: PathBuf,
    /// Root of the documentation site tree.
    pub docs_dir: PathBuf,
    /// Published specs directory.
    pub specs_dir: PathBuf,
    /// Published specs directory as a site-relative path (used in nav entries).
    pub specs_site_path: String,
    /// Dashboard page.
    pub dashboard_path: PathBuf,
    /// Implementation summaries directory.
    pub workflows_dir: PathBuf,
    /// Frontend search index.
    pub search_index_path: PathBuf,
    /// Site configuration file.
    pub site_config_path: PathBuf,
    /// Navigation markers.
    pub navigation: NavigationConfig,
    /// Base URL for rewritten repository links.
    pub repo_blob_base: String,
    /// Front matter defaults and reserved names.
    pub metadata: MetadataConfig,
    /// History correlation settings.
    pub history: HistoryConfig,
}

impl BuildConfig {
    /// Resolve every configured path against `root`.
    pub fn resolve(config: &AppConfig, root: &Path) -> Self {
        let paths = &config.paths;
        let docs_dir = root.join(&paths.docs_dir);

        Self {
            root: root.to_path_buf(),
            source_dir: root.join(&paths.source_dir),
            specs_dir: docs_dir.join(&paths.specs_subdir),
            specs_site_path: paths.specs_subdir.trim_matches('/').to_string(),
            dashboard_path: docs_dir.join(&paths.dashboard_file),
            workflows_dir: docs_dir.join(&paths.workflows_subdir),
            search_index_path: docs_dir.join(&paths.search_index_file),
            site_config_path: root.join(&paths.site_config),
            docs_dir,
            navigation: config.navigation.clone(),
            repo_blob_base: config.links.repo_blob_base.trim_end_matches('/').to_string(),
            metadata: config.metadata.clone(),
            history: config.history.clone(),
        }
    }

    /// Timeout applied to each git invocation.
    pub fn history_timeout(&self) -> Duration {
        Duration::from_secs(self.history.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.specpub/`).
pub fn user_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SpecPubError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the project config file (`<root>/specpub.toml`).
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load config for a project root.
///
/// Looks for `<root>/specpub.toml`, then `~/.specpub/specpub.toml`, and
/// returns defaults if neither exists.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let project = project_config_path(root);
    if project.exists() {
        return load_config_from(&project);
    }

    match user_config_dir() {
        Ok(dir) => {
            let user = dir.join(CONFIG_FILE_NAME);
            if user.exists() {
                return load_config_from(&user);
            }
        }
        Err(e) => tracing::debug!(error = %e, "skipping user config lookup"),
    }

    tracing::debug!(path = ?project, "config file not found, using defaults");
    Ok(AppConfig::default())
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SpecPubError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SpecPubError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into the project root.
/// Returns the path to the created file.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = project_config_path(root);
    if path.exists() {
        return Err(SpecPubError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SpecPubError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SpecPubError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("source_dir"));
        assert!(toml_str.contains("project/specs"));
        assert!(toml_str.contains("repo_blob_base"));
    }

    #[test]
    fn config_roundtrip_keeps_markers() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.navigation.start_marker, "      - Specs:");
        assert_eq!(
            parsed.navigation.end_marker,
            "\n      - PM Workflows (Legacy):"
        );
        assert_eq!(parsed.history.recent_days, 30);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[paths]
source_dir = "specs"

[history]
enabled = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.source_dir, "specs");
        assert_eq!(config.paths.docs_dir, "mkdocs-docs");
        assert!(!config.history.enabled);
        assert_eq!(config.history.changed_files_limit, 10);
        assert_eq!(config.metadata.default_assignee, "Kang");
    }

    #[test]
    fn build_config_resolves_against_root() {
        let mut app = AppConfig::default();
        app.links.repo_blob_base = "https://example.com/blob/main/".into();
        let build = BuildConfig::resolve(&app, Path::new("/work/project"));

        assert_eq!(build.source_dir, Path::new("/work/project/project/specs"));
        assert_eq!(
            build.specs_dir,
            Path::new("/work/project/mkdocs-docs/engineering/specs")
        );
        assert_eq!(
            build.dashboard_path,
            Path::new("/work/project/mkdocs-docs/engineering/dashboard.md")
        );
        assert_eq!(build.site_config_path, Path::new("/work/project/mkdocs.yml"));
        assert_eq!(build.specs_site_path, "engineering/specs");
        assert_eq!(build.repo_blob_base, "https://example.com/blob/main");
        assert_eq!(build.history_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = std::env::temp_dir().join(format!("specpub-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[paths\nsource_dir = 1").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, SpecPubError::Config { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
