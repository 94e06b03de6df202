//! HTML fragments injected into published specs.
//!
//! The site stylesheet and frontend scripts key off the class names and
//! `data-*` attributes emitted here, so their spelling is part of the output
//! contract.

use serde::Serialize;
use tracing::warn;

use specpub_shared::{ChangeHistory, Priority, SpecId, SpecMetadata, Status, serialize_hours};

/// Badge color for a status spelling. Unknown spellings render gray.
pub fn status_color(status: &str) -> &'static str {
    match status {
        "draft" => "orange",
        "review" => "blue",
        "approved" => "green",
        "in-progress" => "purple",
        "completed" => "success",
        _ => "gray",
    }
}

/// Icon shown inside the badge for a priority.
pub fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔥",
        Priority::Medium => "📋",
        Priority::Low => "📝",
    }
}

/// `<span>` status badge for a spec.
pub fn state_badge(status: Status, priority: Priority) -> String {
    let status_str = status.as_str();
    format!(
        "<span class=\"spec-state-badge spec-state-{status_str}\" data-status=\"{status_str}\" \
         data-priority=\"{}\" data-color=\"{}\">\n    {} {}\n</span>",
        priority.as_str(),
        status_color(status_str),
        priority_icon(priority),
        status.label(),
    )
}

// ---------------------------------------------------------------------------
// Timeline snapshot
// ---------------------------------------------------------------------------

/// Payload read by the frontend timeline script. Field order is stable.
#[derive(Serialize)]
struct TimelineSnapshot<'a> {
    spec_id: &'a SpecId,
    status: Status,
    state_history: &'a [serde_yaml::Value],
    #[serde(serialize_with = "serialize_hours")]
    estimated_hours: f64,
    #[serde(serialize_with = "serialize_hours")]
    actual_hours: f64,
    priority: Priority,
    category: &'a str,
    demonstrates: &'a [String],
}

/// `<div>` carrying the JSON timeline snapshot in its `data-timeline` attribute.
pub fn timeline_snapshot(id: &SpecId, metadata: &SpecMetadata) -> String {
    let snapshot = TimelineSnapshot {
        spec_id: id,
        status: metadata.status,
        state_history: &metadata.state_history,
        estimated_hours: metadata.estimated_hours,
        actual_hours: metadata.actual_hours,
        priority: metadata.priority,
        category: &metadata.category,
        demonstrates: &metadata.demonstrates,
    };

    let json = serde_json::to_string(&snapshot).unwrap_or_else(|e| {
        warn!(spec_id = %id, error = %e, "timeline snapshot not serializable, emitting empty object");
        "{}".to_string()
    });

    format!(
        "<div class=\"spec-timeline\" data-timeline=\"{}\"></div>",
        escape_attr(&json)
    )
}

// ---------------------------------------------------------------------------
// Commit timeline
// ---------------------------------------------------------------------------

/// Placeholder rendered when no commit references a spec.
pub const EMPTY_COMMIT_TIMELINE: &str =
    "<div class=\"commit-timeline-empty\">No commits linked to this spec yet.</div>";

/// Commit timeline for a spec's change history, newest entry marked `latest`.
pub fn commit_timeline(history: &ChangeHistory) -> String {
    if !history.has_commits() {
        return EMPTY_COMMIT_TIMELINE.to_string();
    }

    let mut html = String::from("<div class=\"commit-timeline\">\n");
    html.push_str("    <h4>📝 Development Timeline</h4>\n");
    html.push_str("    <div class=\"timeline-container\">\n");

    for (i, commit) in history.commits.iter().enumerate() {
        let class = if i == 0 {
            "timeline-item latest"
        } else {
            "timeline-item"
        };
        html.push_str(&format!(
            "        <div class=\"{class}\">
            <div class=\"timeline-marker\"></div>
            <div class=\"timeline-content\">
                <div class=\"commit-header\">
                    <span class=\"commit-hash\">#{hash}</span>
                    <span class=\"commit-date\">{date}</span>
                </div>
                <div class=\"commit-message\">{message}</div>
                <div class=\"commit-meta\">
                    <span class=\"commit-author\">👤 {author}</span>
                    <span class=\"files-changed\">📁 {files} files changed</span>
                </div>
            </div>
        </div>\n",
            hash = escape_html(&commit.short_hash),
            date = commit.timestamp.format("%Y-%m-%d"),
            message = escape_html(&commit.message),
            author = escape_html(&commit.author),
            files = commit.file_count,
        ));
    }

    html.push_str("    </div>\n</div>\n");
    html
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Escape a value for a double-quoted HTML attribute.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

/// Escape text content for HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
