//! Core domain types for published spec documents.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Serialize, Serializer};

use crate::config::MetadataConfig;

// ---------------------------------------------------------------------------
// SpecId
// ---------------------------------------------------------------------------

/// Canonical sortable identifier derived from a spec's filename.
///
/// The legacy variant orders before every named identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecId {
    /// The grandfathered first spec.
    Legacy,
    /// A date-sequence prefix (`2026-02-09-01`) or a plain filename stem.
    Named(String),
}

impl SpecId {
    /// Display form of the legacy identifier.
    pub const LEGACY_LABEL: &'static str = "0.00";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Legacy => Self::LEGACY_LABEL,
            Self::Named(s) => s,
        }
    }

    /// Parse a displayed identifier back into a `SpecId`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label == Self::LEGACY_LABEL {
            Self::Legacy
        } else {
            Self::Named(label.to_string())
        }
    }
}

impl std::fmt::Display for SpecId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SpecId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status / Priority
// ---------------------------------------------------------------------------

/// Lifecycle state of a spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Draft,
    Review,
    Approved,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Self::Draft,
        Self::Review,
        Self::Approved,
        Self::InProgress,
        Self::Completed,
    ];

    /// Front matter spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Human-readable label (`In Progress`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Review => "Review",
            Self::Approved => "Approved",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Parse a front matter value, tolerating case, spaces and underscores.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = normalize_label(raw);
        Self::ALL.into_iter().find(|s| s.as_str() == normalized)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative importance of a spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = normalize_label(raw);
        Self::ALL.into_iter().find(|p| p.as_str() == normalized)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c == ' ' || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// SpecMetadata
// ---------------------------------------------------------------------------

/// Typed front matter with every recognized field resolved to a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecMetadata {
    pub status: Status,
    pub priority: Priority,
    #[serde(serialize_with = "serialize_hours")]
    pub estimated_hours: f64,
    #[serde(serialize_with = "serialize_hours")]
    pub actual_hours: f64,
    pub assignee: String,
    pub category: String,
    pub demonstrates: Vec<String>,
    pub state_history: Vec<serde_yaml::Value>,
    /// Unrecognized keys, and recognized keys whose value had the wrong shape.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl SpecMetadata {
    /// Metadata for a document that declares nothing.
    pub fn defaults(config: &MetadataConfig) -> Self {
        Self {
            status: Status::default(),
            priority: Priority::default(),
            estimated_hours: 0.0,
            actual_hours: 0.0,
            assignee: config.default_assignee.clone(),
            category: config.default_category.clone(),
            demonstrates: Vec::new(),
            state_history: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// Serialize hours so whole numbers stay integers (`12`, not `12.0`).
pub fn serialize_hours<S: Serializer>(hours: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if hours.fract() == 0.0 && hours.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*hours as i64)
    } else {
        serializer.serialize_f64(*hours)
    }
}

// ---------------------------------------------------------------------------
// ChangeHistory
// ---------------------------------------------------------------------------

/// A commit that references a spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRecord {
    pub hash: String,
    pub short_hash: String,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
    pub author: String,
    /// True number of paths touched, even when `changed_files` is truncated.
    pub file_count: usize,
    pub changed_files: Vec<String>,
}

/// A commit in the trailing recent-activity window, reduced for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    pub short_hash: String,
    pub date: NaiveDate,
    pub message: String,
}

/// Git activity correlated with one spec. Recomputed on every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeHistory {
    /// Newest first.
    pub commits: Vec<CommitRecord>,
    /// Sorted, de-duplicated.
    pub branches: Vec<String>,
    pub recent_activity: Vec<RecentActivity>,
    /// Sorted, de-duplicated commit authors.
    pub contributors: Vec<String>,
    /// Set when the revision tool could not be queried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChangeHistory {
    /// Empty history annotated with the reason the tool was unavailable.
    pub fn unavailable(note: impl Into<String>) -> Self {
        Self {
            error: Some(note.into()),
            ..Self::default()
        }
    }

    pub fn has_commits(&self) -> bool {
        !self.commits.is_empty()
    }

    /// Sum of `file_count` across all commits.
    pub fn total_files_changed(&self) -> usize {
        self.commits.iter().map(|c| c.file_count).sum()
    }
}

// ---------------------------------------------------------------------------
// SpecDocument
// ---------------------------------------------------------------------------

/// One source spec, parsed and identified, carried through the pipeline.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    /// Source filename, unique within the source set.
    pub filename: String,
    pub id: SpecId,
    /// First top-level heading, or a title derived from the filename.
    pub title: String,
    pub metadata: SpecMetadata,
    /// Source body without front matter. Never replaced by enriched output.
    pub body: String,
    pub history: ChangeHistory,
    /// Set when the enriched body is produced.
    pub enriched_at: Option<DateTime<Utc>>,
}
