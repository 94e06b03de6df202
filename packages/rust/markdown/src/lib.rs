//! Spec document parsing and enrichment.
//!
//! Splits source specs into typed metadata and body, derives identifiers and
//! titles, and produces the published body: relative repository links
//! rewritten, plus a status badge, timeline snapshot and commit timeline
//! inserted after the first top-level heading.
//!
//! Enrichment is a pure function of its inputs. Callers always pass the
//! untouched source body, so re-running never stacks fragments.

pub mod fragments;
pub mod frontmatter;
pub mod identity;
mod links;

use tracing::{debug, instrument};

use specpub_shared::{ChangeHistory, SpecId, SpecMetadata};

pub use frontmatter::{ParsedDocument, parse_document};
pub use identity::{derive_id, fallback_title, file_stem, title_case};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Everything known about a spec that shows up in its enriched body.
#[derive(Debug, Clone, Copy)]
pub struct EnrichInput<'a> {
    pub id: &'a SpecId,
    pub metadata: &'a SpecMetadata,
    pub history: &'a ChangeHistory,
}

/// Options for enrichment.
#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions<'a> {
    /// Base URL that relative repository links are rewritten onto.
    pub repo_blob_base: &'a str,
}

/// Result of enriching one body.
#[derive(Debug, Clone)]
pub struct EnrichResult {
    /// The published Markdown body.
    pub body: String,
    /// Whether fragments were inserted (false when the body has no heading).
    pub inserted: bool,
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Produce the published body for a spec.
///
/// After the first `# ` line outside fenced code this inserts, in order: a
/// blank line, the status badge, a blank line, the timeline snapshot, a blank
/// line and, when the spec has commits, the commit timeline and a blank line.
/// Every other line is kept as is. A body with no heading only gets its links
/// rewritten.
#[instrument(skip_all, fields(spec_id = %input.id))]
pub fn enrich(source_body: &str, input: &EnrichInput<'_>, opts: &EnrichOptions<'_>) -> EnrichResult {
    let rewritten = links::rewrite_links(source_body, opts.repo_blob_base);

    let Some(heading) = first_heading_line(&rewritten) else {
        debug!("no top-level heading, publishing without fragments");
        return EnrichResult {
            body: rewritten,
            inserted: false,
        };
    };

    let badge = fragments::state_badge(input.metadata.status, input.metadata.priority);
    let timeline = fragments::timeline_snapshot(input.id, input.metadata);
    let commits = input
        .history
        .has_commits()
        .then(|| fragments::commit_timeline(input.history));

    let lines: Vec<&str> = rewritten.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 7);
    out.extend_from_slice(&lines[..=heading]);
    out.extend(["", badge.as_str(), "", timeline.as_str(), ""]);
    if let Some(commits) = &commits {
        out.extend([commits.trim_end_matches('\n'), ""]);
    }
    out.extend_from_slice(&lines[heading + 1..]);

    EnrichResult {
        body: out.join("\n"),
        inserted: true,
    }
}

/// Index of the first line starting with `# `, skipping fenced code blocks.
pub fn first_heading_line(body: &str) -> Option<usize> {
    let mut fence: Option<(char, usize)> = None;

    for (i, line) in body.split('\n').enumerate() {
        let trimmed = line.trim_start();
        match fence {
            Some((marker, len)) => {
                if closes_fence(trimmed, marker, len) {
                    fence = None;
                }
            }
            None => {
                if let Some(open) = opening_fence(trimmed) {
                    fence = Some(open);
                } else if line.starts_with("# ") {
                    return Some(i);
                }
            }
        }
    }

    None
}

/// Marker character and run length of a line opening a fenced block.
fn opening_fence(trimmed: &str) -> Option<(char, usize)> {
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

/// A closing fence is a run of the opening marker, at least as long, with
/// nothing but whitespace after it. Lines carrying an info string are content.
fn closes_fence(trimmed: &str, marker: char, len: usize) -> bool {
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    run >= len && trimmed[run * marker.len_utf8()..].trim().is_empty()
}

/// Text of the first top-level heading, if the body has a non-empty one.
pub fn extract_title(body: &str) -> Option<String> {
    let index = first_heading_line(body)?;
    let line = body.split('\n').nth(index)?;
    let title = line.trim_start_matches("# ").trim();
    (!title.is_empty()).then(|| title.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
