//! Full `build` runs against a temporary project tree.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};

use specpub_core::{SilentProgress, build_site};
use specpub_history::{LogQuery, RawCommit, RevisionSource};
use specpub_shared::{AppConfig, BuildConfig, Result, SpecPubError, Status};

const SITE_CONFIG: &str = "\
site_name: Demo
nav:
  - Home: index.md
  - Engineering:
      - Specs:
          - Overview: engineering/specs/index.md
      - PM Workflows (Legacy):
          - Index: pm-workflows/index.md
";

const FEATURE_X: &str = "\
---
status: completed
priority: high
demonstrates:
  - history tracking
---
# Feature X

See [ADR](../../meta/adr/0001-mkdocs.md).
";

/// Revision source answering from a fixed commit list.
#[derive(Default)]
struct FakeRevisions {
    commits: Vec<RawCommit>,
    fail: bool,
}

impl RevisionSource for FakeRevisions {
    async fn log(&self, query: &LogQuery) -> Result<Vec<RawCommit>> {
        if self.fail {
            return Err(SpecPubError::Revision("git not installed".into()));
        }
        Ok(self
            .commits
            .iter()
            .filter(|c| c.subject.contains(&query.grep))
            .cloned()
            .collect())
    }

    async fn changed_files(&self, _hash: &str) -> Result<Vec<String>> {
        if self.fail {
            return Err(SpecPubError::Revision("git not installed".into()));
        }
        Ok(vec!["project/specs/2026-02-09-01-feature-x.md".into()])
    }

    async fn branches(&self, _pattern: &str) -> Result<Vec<String>> {
        if self.fail {
            return Err(SpecPubError::Revision("git not installed".into()));
        }
        Ok(Vec::new())
    }
}

fn feature_commits() -> FakeRevisions {
    let now = Utc::now();
    FakeRevisions {
        commits: vec![
            RawCommit {
                hash: "2222222222222222222222222222222222222222".into(),
                timestamp: (now - Duration::days(1)).fixed_offset(),
                subject: "Finish feature #2026-02-09-01".into(),
                author: "Robin".into(),
            },
            RawCommit {
                hash: "1111111111111111111111111111111111111111".into(),
                timestamp: (now - Duration::days(2)).fixed_offset(),
                subject: "Start feature #2026-02-09-01".into(),
                author: "Kang".into(),
            },
        ],
        fail: false,
    }
}

/// Create a project root with two specs, a README and a site config.
fn project() -> (PathBuf, BuildConfig) {
    let root = std::env::temp_dir().join(format!("specpub-it-{}", uuid::Uuid::now_v7()));
    let specs = root.join("project/specs");
    std::fs::create_dir_all(&specs).unwrap();

    std::fs::write(specs.join("0.00-project-start.md"), "# Project Start\nHello.").unwrap();
    std::fs::write(specs.join("2026-02-09-01-feature-x.md"), FEATURE_X).unwrap();
    std::fs::write(specs.join("README.md"), "# About specs").unwrap();
    std::fs::write(root.join("mkdocs.yml"), SITE_CONFIG).unwrap();

    let config = BuildConfig::resolve(&AppConfig::default(), &root);
    (root, config)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn build_publishes_enriched_specs_and_aggregates() {
    let (root, config) = project();
    std::fs::create_dir_all(&config.specs_dir).unwrap();
    std::fs::write(config.specs_dir.join("removed-spec.md"), "stale").unwrap();

    let result = build_site(&config, &feature_commits(), &SilentProgress).await.unwrap();

    assert_eq!(result.spec_count, 2);
    assert_eq!(result.removed, 1);
    assert_eq!(result.history_unavailable, 0);
    assert_eq!(
        result.status_summary,
        vec![(Status::Draft, 1), (Status::Completed, 1)]
    );

    // Published specs
    assert!(!config.specs_dir.join("removed-spec.md").exists());
    assert!(!config.specs_dir.join("README.md").exists());

    let start = read(&config.specs_dir.join("0.00-project-start.md"));
    assert!(start.starts_with("# Project Start\n\n<span class=\"spec-state-badge spec-state-draft\""));
    assert!(start.contains("&quot;spec_id&quot;:&quot;0.00&quot;"));
    assert!(start.ends_with("></div>\n\nHello."));

    let feature = read(&config.specs_dir.join("2026-02-09-01-feature-x.md"));
    assert!(!feature.starts_with("---"));
    assert!(feature.contains("🔥 Completed"));
    assert!(feature.find("#22222222").unwrap() < feature.find("#11111111").unwrap());
    assert!(feature.contains(
        "(https://github.com/kangxh75/NextPM/blob/master/meta/adr/0001-mkdocs.md)"
    ));

    // Navigation
    let site = read(&root.join("mkdocs.yml"));
    assert!(site.contains(
        "      - Specs:\n\
         \x20         - Overview: engineering/specs/index.md\n\
         \x20         - 📝 Project Start: engineering/specs/0.00-project-start.md\n\
         \x20         - 🎉 Feature X: engineering/specs/2026-02-09-01-feature-x.md\n\
         \x20     - PM Workflows (Legacy):"
    ));
    assert!(site.starts_with("site_name: Demo\nnav:\n  - Home: index.md\n"));

    // Aggregates
    assert!(config.specs_dir.join("index.md").exists());
    assert!(read(&config.dashboard_path).contains("<div class=\"stat-number\">2</div>"));
    assert_eq!(
        result.workflows_generated,
        vec!["2026_02_09_01_implementation_summary.md"]
    );
    let summary = read(&config.workflows_dir.join("2026_02_09_01_implementation_summary.md"));
    assert!(summary.contains("- **Contributors**: Kang, Robin"));

    let index: serde_json::Value = serde_json::from_str(&read(&config.search_index_path)).unwrap();
    assert_eq!(index["total_specs"], 2);
    assert_eq!(index["index"][1]["git_commits"], 2);
    assert_eq!(index["index"][1]["demonstrates"][0], "history tracking");

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn rebuild_is_stable_and_keeps_summaries() {
    let (root, config) = project();
    let revisions = feature_commits();

    build_site(&config, &revisions, &SilentProgress).await.unwrap();
    let summary_path = config.workflows_dir.join("2026_02_09_01_implementation_summary.md");
    std::fs::write(&summary_path, "edited by hand").unwrap();
    let first_spec = read(&config.specs_dir.join("2026-02-09-01-feature-x.md"));
    let first_site = read(&root.join("mkdocs.yml"));

    let second = build_site(&config, &revisions, &SilentProgress).await.unwrap();

    assert!(second.workflows_generated.is_empty());
    assert_eq!(second.workflows_skipped.len(), 1);
    assert_eq!(read(&summary_path), "edited by hand");
    assert_eq!(read(&config.specs_dir.join("2026-02-09-01-feature-x.md")), first_spec);
    assert_eq!(read(&root.join("mkdocs.yml")), first_site);

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn unavailable_git_does_not_stop_the_build() {
    let (root, config) = project();
    let revisions = FakeRevisions {
        fail: true,
        ..FakeRevisions::default()
    };

    let result = build_site(&config, &revisions, &SilentProgress).await.unwrap();

    assert_eq!(result.spec_count, 2);
    assert_eq!(result.history_unavailable, 2);
    assert!(result.workflows_generated.is_empty());

    let feature = read(&config.specs_dir.join("2026-02-09-01-feature-x.md"));
    assert!(feature.contains("spec-state-completed"));
    assert!(!feature.contains("commit-timeline"));

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn disabled_history_skips_the_revision_source() {
    let (root, _) = project();
    let mut app = AppConfig::default();
    app.history.enabled = false;
    let config = BuildConfig::resolve(&app, &root);

    let result = build_site(&config, &feature_commits(), &SilentProgress).await.unwrap();

    assert_eq!(result.history_unavailable, 0);
    assert!(result.workflows_generated.is_empty());

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn missing_markers_abort_before_writing() {
    let (root, config) = project();
    let original = "site_name: Demo\nnav:\n  - Home: index.md\n";
    std::fs::write(root.join("mkdocs.yml"), original).unwrap();

    let err = build_site(&config, &feature_commits(), &SilentProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, SpecPubError::Setup { .. }));
    assert_eq!(read(&root.join("mkdocs.yml")), original);
    assert!(!config.specs_dir.exists());

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn missing_source_dir_is_fatal() {
    let (root, config) = project();
    std::fs::remove_dir_all(&config.source_dir).unwrap();

    let err = build_site(&config, &feature_commits(), &SilentProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, SpecPubError::Setup { .. }));

    let _ = std::fs::remove_dir_all(&root);
}
