//! End-to-end `build` pipeline: load → parse → correlate → enrich → publish → aggregate.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, instrument};

use specpub_history::{CorrelateOptions, NoHistory, RevisionSource, correlate};
use specpub_markdown::{EnrichInput, EnrichOptions, enrich};
use specpub_shared::{BuildConfig, Result, SpecDocument, Status};

use crate::aggregate::{dashboard, index_page, navigation, search_index, workflow};
use crate::loader;
use crate::publisher;

/// Result of a `build` run.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Number of specs published.
    pub spec_count: usize,
    /// Stale Markdown files removed from the specs directory.
    pub removed: usize,
    /// Spec count per status, in lifecycle order, statuses with no spec omitted.
    pub status_summary: Vec<(Status, usize)>,
    /// Specs whose history could not be queried.
    pub history_unavailable: usize,
    pub workflows_generated: Vec<String>,
    pub workflows_skipped: Vec<String>,
    pub specs_dir: PathBuf,
    pub dashboard_path: PathBuf,
    pub search_index_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a stage.
    fn phase(&self, name: &str);
    /// Called when a stage finishes, with the number of items it handled.
    fn stage_complete(&self, name: &str, count: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn stage_complete(&self, _name: &str, _count: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Load source specs
/// 2. Parse front matter and derive identifiers
/// 3. Correlate git history
/// 4. Enrich bodies
/// 5. Clean-rebuild the published specs directory
/// 6. Write dashboard, navigation, specs index, workflow summaries and search index
///
/// The site config is checked for its navigation markers before anything is
/// written. Any error aborts the run.
#[instrument(skip_all, fields(root = %config.root.display()))]
pub async fn build_site(
    config: &BuildConfig,
    revisions: &impl RevisionSource,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    info!(source = %config.source_dir.display(), "starting build");

    // --- Stage 1: Load ---
    progress.phase("Loading specs");
    let files = loader::load_sources(&config.source_dir, &config.metadata.excluded_file)?;
    navigation::check_site_config(&config.site_config_path, &config.navigation)?;
    progress.stage_complete("load", files.len());

    // --- Stage 2: Parse + identify ---
    progress.phase("Parsing front matter");
    let mut docs = loader::parse_sources(files, &config.metadata);
    progress.stage_complete("parse", docs.len());

    // --- Stage 3: Correlate ---
    progress.phase("Correlating git history");
    let options = CorrelateOptions::from(&config.history);
    for doc in &mut docs {
        doc.history = if config.history.enabled {
            correlate(revisions, &doc.id, &options).await
        } else {
            correlate(&NoHistory, &doc.id, &options).await
        };
    }
    let with_commits = docs.iter().filter(|d| d.history.has_commits()).count();
    let history_unavailable = docs.iter().filter(|d| d.history.error.is_some()).count();
    progress.stage_complete("correlate", with_commits);

    // --- Stage 4: Enrich ---
    progress.phase("Enriching specs");
    let enriched = enrich_all(&mut docs, &config.repo_blob_base);
    progress.stage_complete("enrich", enriched.len());

    // --- Stage 5: Publish ---
    progress.phase("Publishing specs");
    let pages: Vec<(&str, &str)> = docs
        .iter()
        .zip(&enriched)
        .map(|(doc, body)| (doc.filename.as_str(), body.as_str()))
        .collect();
    let published = publisher::publish(&config.specs_dir, &pages)?;
    progress.stage_complete("publish", published.written);

    // --- Stage 6: Aggregate ---
    progress.phase("Writing dashboard and navigation");
    let generated_at = Utc::now();

    dashboard::write_dashboard(&config.dashboard_path, &docs)?;

    let entries = navigation::build_entries(&docs, &config.specs_site_path);
    navigation::update_site_config(
        &config.site_config_path,
        &config.navigation,
        &entries,
        &config.specs_site_path,
    )?;

    let source_label = config
        .source_dir
        .strip_prefix(&config.root)
        .unwrap_or(config.source_dir.as_path())
        .display()
        .to_string();
    index_page::write_index(&config.specs_dir, &source_label, &config.metadata.legacy_stem)?;

    let workflows = workflow::write_summaries(&config.workflows_dir, &docs, generated_at)?;

    search_index::write_search_index(
        &config.search_index_path,
        &docs,
        &config.specs_site_path,
        generated_at,
    )?;
    progress.stage_complete("aggregate", entries.len());

    let result = BuildResult {
        spec_count: docs.len(),
        removed: published.removed,
        status_summary: status_summary(&docs),
        history_unavailable,
        workflows_generated: workflows.generated,
        workflows_skipped: workflows.skipped,
        specs_dir: published.specs_dir,
        dashboard_path: config.dashboard_path.clone(),
        search_index_path: config.search_index_path.clone(),
        elapsed: start.elapsed(),
    };

    info!(
        specs = result.spec_count,
        workflows = result.workflows_generated.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "build complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Enrich every spec from its untouched source body and stamp `enriched_at`.
fn enrich_all(docs: &mut [SpecDocument], repo_blob_base: &str) -> Vec<String> {
    let opts = EnrichOptions { repo_blob_base };

    docs.iter_mut()
        .map(|doc| {
            let input = EnrichInput {
                id: &doc.id,
                metadata: &doc.metadata,
                history: &doc.history,
            };
            let body = enrich(&doc.body, &input, &opts).body;
            doc.enriched_at = Some(Utc::now());
            body
        })
        .collect()
}

/// Spec count per status in lifecycle order.
pub fn status_summary(docs: &[SpecDocument]) -> Vec<(Status, usize)> {
    Status::ALL
        .into_iter()
        .map(|status| {
            let count = docs.iter().filter(|d| d.metadata.status == status).count();
            (status, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
