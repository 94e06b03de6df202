//! Correlation of spec documents with revision history.
//!
//! The revision tool sits behind [`RevisionSource`]. [`GitCli`] queries a real
//! repository, [`NoHistory`] answers every query with nothing. [`correlate`]
//! turns the raw answers into a [`ChangeHistory`] and never fails: any query
//! error yields an empty history carrying a note.

mod git;

use std::collections::BTreeSet;
use std::future::Future;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::{debug, instrument, warn};

use specpub_shared::{
    ChangeHistory, CommitRecord, HistoryConfig, RecentActivity, Result, SpecId,
};

pub use git::GitCli;

/// Number of hash characters kept for display.
pub const SHORT_HASH_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// A commit-log query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Fixed string the commit message must contain.
    pub grep: String,
    /// Only commits authored at or after this instant.
    pub since: Option<DateTime<Utc>>,
}

impl LogQuery {
    /// Commits tagged with `#<id>`.
    pub fn tagged(id: &SpecId) -> Self {
        Self {
            grep: format!("#{id}"),
            since: None,
        }
    }

    /// Commits mentioning `<id>` anywhere, authored since `since`.
    pub fn mentioning_since(id: &SpecId, since: DateTime<Utc>) -> Self {
        Self {
            grep: id.to_string(),
            since: Some(since),
        }
    }
}

/// One commit as reported by the revision tool.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCommit {
    pub hash: String,
    pub timestamp: DateTime<FixedOffset>,
    pub subject: String,
    pub author: String,
}

/// Read-only queries against a revision-tracking tool.
pub trait RevisionSource: Send + Sync {
    /// Commits matching `query`, newest first.
    fn log(&self, query: &LogQuery) -> impl Future<Output = Result<Vec<RawCommit>>> + Send;

    /// Paths touched by the commit `hash`.
    fn changed_files(&self, hash: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Local and remote branch names containing `pattern`.
    fn branches(&self, pattern: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Source that reports no history at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl RevisionSource for NoHistory {
    async fn log(&self, _query: &LogQuery) -> Result<Vec<RawCommit>> {
        Ok(Vec::new())
    }

    async fn changed_files(&self, _hash: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn branches(&self, _pattern: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Limits applied while correlating.
#[derive(Debug, Clone)]
pub struct CorrelateOptions {
    /// Trailing window for recent activity.
    pub recent_days: i64,
    pub recent_limit: usize,
    /// Maximum changed paths stored per commit.
    pub changed_files_limit: usize,
}

impl Default for CorrelateOptions {
    fn default() -> Self {
        Self::from(&HistoryConfig::default())
    }
}

impl From<&HistoryConfig> for CorrelateOptions {
    fn from(config: &HistoryConfig) -> Self {
        Self {
            recent_days: config.recent_days,
            recent_limit: config.recent_limit,
            changed_files_limit: config.changed_files_limit,
        }
    }
}

/// Build the change history for the spec `id`.
///
/// Query failures are logged and produce [`ChangeHistory::unavailable`].
#[instrument(skip_all, fields(spec_id = %id))]
pub async fn correlate(
    source: &impl RevisionSource,
    id: &SpecId,
    options: &CorrelateOptions,
) -> ChangeHistory {
    match try_correlate(source, id, options, Utc::now()).await {
        Ok(history) => {
            debug!(
                commits = history.commits.len(),
                branches = history.branches.len(),
                recent = history.recent_activity.len(),
                "history correlated"
            );
            history
        }
        Err(e) => {
            warn!(error = %e, "revision history unavailable, continuing without it");
            ChangeHistory::unavailable(e.to_string())
        }
    }
}

async fn try_correlate(
    source: &impl RevisionSource,
    id: &SpecId,
    options: &CorrelateOptions,
    now: DateTime<Utc>,
) -> Result<ChangeHistory> {
    let mut raw = source.log(&LogQuery::tagged(id)).await?;
    raw.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut commits = Vec::with_capacity(raw.len());
    for commit in raw {
        let mut files = source.changed_files(&commit.hash).await?;
        let file_count = files.len();
        files.truncate(options.changed_files_limit);

        commits.push(CommitRecord {
            short_hash: short_hash(&commit.hash),
            hash: commit.hash,
            timestamp: commit.timestamp,
            message: commit.subject,
            author: commit.author,
            file_count,
            changed_files: files,
        });
    }

    let mut branches = source.branches(id.as_str()).await?;
    branches.sort();
    branches.dedup();

    let since = now - Duration::days(options.recent_days);
    let recent_activity = source
        .log(&LogQuery::mentioning_since(id, since))
        .await?
        .into_iter()
        .take(options.recent_limit)
        .map(|c| RecentActivity {
            short_hash: short_hash(&c.hash),
            date: c.timestamp.date_naive(),
            message: c.subject,
        })
        .collect();

    let contributors = commits
        .iter()
        .map(|c| c.author.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(ChangeHistory {
        commits,
        branches,
        recent_activity,
        contributors,
        error: None,
    })
}

fn short_hash(hash: &str) -> String {
    hash.chars().take(SHORT_HASH_LEN).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
