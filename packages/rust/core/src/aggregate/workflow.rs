//! Per-spec implementation summaries.
//!
//! Summaries are first-write-wins: once a file exists it belongs to whoever
//! edits it next and is never regenerated.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use specpub_markdown::fragments::{commit_timeline, escape_html};
use specpub_shared::{Result, SpecDocument, SpecId, SpecPubError};

use super::SPECS_LINK_PREFIX;

/// Number of commits listed as key decisions.
const KEY_DECISIONS: usize = 5;

/// Names of summaries written and left alone in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOutcome {
    pub generated: Vec<String>,
    pub skipped: Vec<String>,
}

/// `2026-02-09-01` → `2026_02_09_01_implementation_summary.md`.
pub fn summary_filename(id: &SpecId) -> String {
    format!("{}_implementation_summary.md", id.as_str().replace('-', "_"))
}

/// Render the summary for a spec with at least one commit.
pub fn render_summary(doc: &SpecDocument, generated_at: DateTime<Utc>) -> String {
    let history = &doc.history;
    let stamp = generated_at.format("%Y-%m-%d %H:%M UTC");

    let mut md = format!(
        "# {id} Implementation Summary

**Spec**: [{title}]({SPECS_LINK_PREFIX}/{filename})
**Status**: {status}
**Last Updated**: {stamp}

## Development Activity

{timeline}
## Implementation Statistics

- **Total Commits**: {commits}
- **Contributors**: {contributors}
- **Branches**: {branches}
- **Files Changed**: {files}

## Key Development Decisions

",
        id = doc.id,
        title = doc.title,
        filename = doc.filename,
        status = doc.metadata.status.label(),
        timeline = commit_timeline(history),
        commits = history.commits.len(),
        contributors = history.contributors.join(", "),
        branches = history.branches.len(),
        files = history.total_files_changed(),
    );

    for commit in history.commits.iter().take(KEY_DECISIONS) {
        let _ = writeln!(
            md,
            "- **{}**: {}",
            commit.timestamp.format("%Y-%m-%d"),
            escape_html(&commit.message)
        );
    }

    let _ = write!(
        md,
        "
## Next Steps

- Continue monitoring development progress
- Update spec status as implementation progresses
- Revisit this summary as commits accumulate

---

**Auto-generated**: {stamp}
**Source**: Automated dev workflow generation from git commit data
"
    );

    md
}

/// Write a summary for every spec with commits, skipping existing files.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_summaries(
    dir: &Path,
    docs: &[SpecDocument],
    generated_at: DateTime<Utc>,
) -> Result<WorkflowOutcome> {
    std::fs::create_dir_all(dir).map_err(|e| SpecPubError::io(dir, e))?;

    let mut outcome = WorkflowOutcome::default();
    for doc in docs.iter().filter(|d| d.history.has_commits()) {
        let filename = summary_filename(&doc.id);
        let path = dir.join(&filename);

        if write_new(&path, &render_summary(doc, generated_at))? {
            debug!(file = %filename, "generated implementation summary");
            outcome.generated.push(filename);
        } else {
            debug!(file = %filename, "summary exists, leaving it alone");
            outcome.skipped.push(filename);
        }
    }

    info!(
        generated = outcome.generated.len(),
        skipped = outcome.skipped.len(),
        "implementation summaries done"
    );
    Ok(outcome)
}

/// Create `path` with `content` only if it does not exist yet.
/// Returns `false` when the file was already there.
///
/// The content is written to a sibling temp file first and then hard-linked
/// into place, so `path` either does not exist or holds the full summary.
fn write_new(path: &Path, content: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("summary");
    let temp = path.with_file_name(format!(".{filename}.tmp"));

    let written = std::fs::write(&temp, content).map_err(|e| SpecPubError::io(&temp, e));
    let linked = written.and_then(|()| match std::fs::hard_link(&temp, path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(SpecPubError::io(path, e)),
    });

    if let Err(e) = std::fs::remove_file(&temp) {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %temp.display(), error = %e, "could not remove temp summary");
        }
    }
    linked
}
