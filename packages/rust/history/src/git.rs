//! [`RevisionSource`] backed by the `git` command line.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use chrono::DateTime;
use tokio::process::Command;
use tracing::trace;

use specpub_shared::{Result, SpecPubError};

use crate::{LogQuery, RawCommit, RevisionSource};

/// Field separator in `git log` output (ASCII unit separator).
const FIELD_SEP: char = '\u{1f}';

const LOG_FORMAT: &str = "--pretty=format:%H%x1f%aI%x1f%s%x1f%an";

/// Runs read-only `git` queries in an explicit repository directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
    timeout: Duration,
}

impl GitCli {
    /// Query the repository at `repo`, bounding every invocation by `timeout`.
    pub fn new(repo: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            repo: repo.into(),
            timeout,
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Run `git <args>` and return stdout. Non-zero exit, spawn failure and
    /// timeout are all errors.
    async fn run(&self, args: &[String]) -> Result<String> {
        let subcommand = args.first().map(String::as_str).unwrap_or("");
        trace!(repo = ?self.repo, ?args, "running git");

        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.repo)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = bounded(self.timeout, subcommand, cmd.output()).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpecPubError::Revision(format!(
                "git {subcommand} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|_| SpecPubError::Revision(format!("git {subcommand} produced non-UTF-8 output")))
    }
}

/// Await `fut` for at most `limit`. Both an I/O failure and an elapsed
/// deadline become [`SpecPubError::Revision`] naming the git subcommand.
pub(crate) async fn bounded<T>(
    limit: Duration,
    subcommand: &str,
    fut: impl Future<Output = std::io::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(|e| {
            SpecPubError::Revision(format!("failed to run git {subcommand}: {e}"))
        }),
        Err(_) => Err(SpecPubError::Revision(format!(
            "git {subcommand} timed out after {}s",
            limit.as_secs_f64()
        ))),
    }
}

impl RevisionSource for GitCli {
    async fn log(&self, query: &LogQuery) -> Result<Vec<RawCommit>> {
        let mut args = vec![
            "log".to_string(),
            "--no-color".to_string(),
            "--fixed-strings".to_string(),
            format!("--grep={}", query.grep),
            LOG_FORMAT.to_string(),
        ];
        if let Some(since) = query.since {
            args.push(format!("--since={}", since.format("%Y-%m-%d %H:%M:%S %z")));
        }

        parse_log(&self.run(&args).await?)
    }

    async fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
        let args = [
            "diff-tree",
            "--no-commit-id",
            "--name-only",
            "--root",
            "-r",
            hash,
        ]
        .map(String::from);

        Ok(non_empty_lines(&self.run(&args).await?))
    }

    async fn branches(&self, pattern: &str) -> Result<Vec<String>> {
        let args = [
            "branch".to_string(),
            "--all".to_string(),
            "--no-color".to_string(),
            "--format=%(refname:short)".to_string(),
            "--list".to_string(),
            format!("*{pattern}*"),
        ];

        Ok(non_empty_lines(&self.run(&args).await?))
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// Parse `git log` output produced with [`LOG_FORMAT`].
fn parse_log(stdout: &str) -> Result<Vec<RawCommit>> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_log_line)
        .collect()
}

fn parse_log_line(line: &str) -> Result<RawCommit> {
    let malformed = || SpecPubError::Revision(format!("unparseable git log line: {line:?}"));

    let mut fields = line.splitn(3, FIELD_SEP);
    let hash = fields.next().filter(|h| !h.is_empty()).ok_or_else(malformed)?;
    let date = fields.next().ok_or_else(malformed)?;
    // The author is the last field so a separator inside a subject stays in the subject.
    let (subject, author) = fields
        .next()
        .and_then(|rest| rest.rsplit_once(FIELD_SEP))
        .ok_or_else(malformed)?;

    let timestamp = DateTime::parse_from_rfc3339(date).map_err(|e| {
        SpecPubError::Revision(format!("invalid commit date {date:?} for {hash}: {e}"))
    })?;

    Ok(RawCommit {
        hash: hash.to_string(),
        timestamp,
        subject: subject.to_string(),
        author: author.to_string(),
    })
}

fn non_empty_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
