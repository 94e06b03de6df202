//! Spec status dashboard.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use specpub_markdown::fragments::{escape_html, priority_icon, state_badge};
use specpub_shared::{Priority, Result, SpecDocument, Status};

use super::SPECS_LINK_PREFIX;
use crate::publisher::write_atomic;

/// Number of specs listed under recent activity.
pub const RECENT_LIMIT: usize = 5;

/// A spec listed under recent activity.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentSpec {
    pub filename: String,
    pub title: String,
    pub status: Status,
    pub priority: Priority,
    pub enriched_at: Option<DateTime<Utc>>,
}

/// Aggregate counts over one run's spec set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub total: usize,
    pub by_status: BTreeMap<Status, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// Most recently enriched first.
    pub recent: Vec<RecentSpec>,
}

impl DashboardSnapshot {
    pub fn build(docs: &[SpecDocument]) -> Self {
        let mut snapshot = Self {
            total: docs.len(),
            ..Self::default()
        };

        for doc in docs {
            *snapshot.by_status.entry(doc.metadata.status).or_default() += 1;
            *snapshot.by_priority.entry(doc.metadata.priority).or_default() += 1;
            *snapshot
                .by_category
                .entry(doc.metadata.category.clone())
                .or_default() += 1;
        }

        let mut recent: Vec<&SpecDocument> = docs.iter().collect();
        recent.sort_by(|a, b| b.enriched_at.cmp(&a.enriched_at));
        snapshot.recent = recent
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|doc| RecentSpec {
                filename: doc.filename.clone(),
                title: doc.title.clone(),
                status: doc.metadata.status,
                priority: doc.metadata.priority,
                enriched_at: doc.enriched_at,
            })
            .collect();

        snapshot
    }

    pub fn count(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Render the dashboard page.
    pub fn render(&self) -> String {
        let mut md = String::from("# 📊 Spec Dashboard\n\n<div class=\"dashboard-container\">\n\n");

        md.push_str("## 📈 Statistics\n\n<div class=\"stats-grid\">\n");
        for (value, label) in [
            (self.total, "Total Specs"),
            (self.count(Status::Completed), "Completed"),
            (self.count(Status::InProgress), "In Progress"),
            (self.count(Status::Draft), "Draft"),
        ] {
            let _ = write!(
                md,
                "    <div class=\"stat-card\">\n        <div class=\"stat-number\">{value}</div>\n        \
                 <div class=\"stat-label\">{label}</div>\n    </div>\n"
            );
        }
        md.push_str("</div>\n\n");

        md.push_str("## 📋 Status Breakdown\n\n<div class=\"status-breakdown\">\n");
        for (status, count) in &self.by_status {
            let _ = write!(
                md,
                "    <div class=\"status-item\">\n        \
                 <span class=\"spec-state-badge spec-state-{}\">{}</span>\n        \
                 <div class=\"progress-bar\">\n            \
                 <div class=\"progress-fill\" style=\"width: {:.1}%\"></div>\n        \
                 </div>\n        <span class=\"count\">{count}</span>\n    </div>\n",
                status.as_str(),
                status.label(),
                percentage(*count, self.total),
            );
        }
        md.push_str("</div>\n\n");

        md.push_str("## 🎯 Priority Breakdown\n\n");
        for (priority, count) in &self.by_priority {
            let _ = writeln!(
                md,
                "- {} **{}**: {count} ({:.1}%)",
                priority_icon(*priority),
                priority.label(),
                percentage(*count, self.total),
            );
        }
        md.push('\n');

        md.push_str("## 🗂️ Categories\n\n");
        for (category, count) in &self.by_category {
            let _ = writeln!(md, "- **{}**: {count}", escape_html(category));
        }
        md.push('\n');

        md.push_str("## 🔄 Recent Activity\n\n<div class=\"recent-activity\">\n");
        for spec in &self.recent {
            let updated = spec
                .enriched_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            let badge = state_badge(spec.status, spec.priority).replace('\n', "\n            ");
            let _ = write!(
                md,
                "    <div class=\"activity-item\">\n        <div class=\"activity-header\">\n            \
                 <strong><a href=\"{SPECS_LINK_PREFIX}/{}\">{}</a></strong>\n            {badge}\n        \
                 </div>\n        <div class=\"activity-meta\">\n            Updated: {updated} |\n            \
                 Priority: {}\n        </div>\n    </div>\n",
                spec.filename,
                escape_html(&spec.title),
                spec.priority.label(),
            );
        }
        md.push_str("</div>\n\n</div>\n");

        md
    }
}

/// Share of `count` in `total`, in percent. Zero when `total` is zero.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Build and write the dashboard page.
#[instrument(skip_all, fields(path = %path.display(), specs = docs.len()))]
pub fn write_dashboard(path: &Path, docs: &[SpecDocument]) -> Result<DashboardSnapshot> {
    let snapshot = DashboardSnapshot::build(docs);
    write_atomic(path, &snapshot.render())?;
    debug!(total = snapshot.total, "dashboard written");
    Ok(snapshot)
}
