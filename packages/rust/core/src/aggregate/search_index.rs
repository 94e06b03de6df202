//! JSON search index read by the site's frontend scripts.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use specpub_markdown::file_stem;
use specpub_shared::{
    Priority, Result, SpecDocument, SpecId, SpecPubError, Status, serialize_hours,
};

use crate::publisher::write_atomic;

/// Maximum length of an entry's content excerpt, in characters.
pub const EXCERPT_CHARS: usize = 500;

/// The whole index file.
#[derive(Debug, Clone, Serialize)]
pub struct SearchIndex {
    pub generated_at: DateTime<Utc>,
    pub total_specs: usize,
    pub index: Vec<SearchEntry>,
}

/// One spec as seen by the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct SearchEntry {
    pub id: SpecId,
    pub filename: String,
    pub title: String,
    pub url: String,
    pub status: Status,
    pub priority: Priority,
    pub category: String,
    pub assignee: String,
    #[serde(serialize_with = "serialize_hours")]
    pub estimated_hours: f64,
    #[serde(serialize_with = "serialize_hours")]
    pub actual_hours: f64,
    pub demonstrates: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub git_commits: usize,
    /// No pull request source is queried; always zero.
    pub pull_requests: usize,
    /// Lowercased plain-text excerpt of the body.
    pub content: String,
}

impl SearchIndex {
    /// Build the index in identifier order.
    pub fn build(docs: &[SpecDocument], specs_site_path: &str, generated_at: DateTime<Utc>) -> Self {
        let mut ordered: Vec<&SpecDocument> = docs.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.filename.cmp(&b.filename)));

        let index: Vec<SearchEntry> = ordered
            .into_iter()
            .map(|doc| SearchEntry {
                id: doc.id.clone(),
                filename: doc.filename.clone(),
                title: doc.title.clone(),
                url: format!("/{specs_site_path}/{}/", file_stem(&doc.filename)),
                status: doc.metadata.status,
                priority: doc.metadata.priority,
                category: doc.metadata.category.clone(),
                assignee: doc.metadata.assignee.clone(),
                estimated_hours: doc.metadata.estimated_hours,
                actual_hours: doc.metadata.actual_hours,
                demonstrates: doc.metadata.demonstrates.clone(),
                last_updated: doc.enriched_at,
                git_commits: doc.history.commits.len(),
                pull_requests: 0,
                content: excerpt(&doc.body),
            })
            .collect();

        Self {
            generated_at,
            total_specs: index.len(),
            index,
        }
    }
}

/// Plain lowercase excerpt: Markdown markers dropped, whitespace collapsed,
/// at most [`EXCERPT_CHARS`] characters.
pub fn excerpt(body: &str) -> String {
    let plain: String = body
        .chars()
        .map(|c| match c {
            '#' | '*' | '_' | '`' | '>' | '|' => ' ',
            c => c,
        })
        .collect();

    plain
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .take(EXCERPT_CHARS)
        .collect()
}

/// Build and write the search index as pretty-printed JSON.
#[instrument(skip_all, fields(path = %path.display(), specs = docs.len()))]
pub fn write_search_index(
    path: &Path,
    docs: &[SpecDocument],
    specs_site_path: &str,
    generated_at: DateTime<Utc>,
) -> Result<SearchIndex> {
    let index = SearchIndex::build(docs, specs_site_path, generated_at);
    let json = serde_json::to_string_pretty(&index)
        .map_err(|e| SpecPubError::validation(format!("search index serialization failed: {e}")))?;

    write_atomic(path, &json)?;
    debug!(entries = index.total_specs, "search index written");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use specpub_shared::{ChangeHistory, MetadataConfig, SpecMetadata};

    use super::*;

    fn doc(filename: &str, id: SpecId, body: &str) -> SpecDocument {
        SpecDocument {
            filename: filename.to_string(),
            id,
            title: "Title".into(),
            metadata: SpecMetadata::defaults(&MetadataConfig::default()),
            body: body.to_string(),
            history: ChangeHistory::default(),
            enriched_at: Some(Utc.with_ymd_and_hms(2026, 2, 9, 10, 0, 0).unwrap()),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 9, 11, 0, 0).unwrap()
    }

    #[test]
    fn excerpt_is_plain_and_bounded() {
        assert_eq!(excerpt("# Title\n\n**Bold** `code`\n> quote"), "title bold code quote");
        let long = "word ".repeat(300);
        assert_eq!(excerpt(&long).chars().count(), EXCERPT_CHARS);
        assert_eq!(excerpt("Ünïcödé ".repeat(100).as_str()).chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn index_entries_follow_identifier_order() {
        let docs = vec![
            doc("2026-02-09-01-x.md", SpecId::Named("2026-02-09-01".into()), "# X"),
            doc("0.00-project-start.md", SpecId::Legacy, "# Start"),
        ];
        let index = SearchIndex::build(&docs, "engineering/specs", at());

        assert_eq!(index.total_specs, 2);
        assert_eq!(index.index[0].id, SpecId::Legacy);
        assert_eq!(index.index[1].url, "/engineering/specs/2026-02-09-01-x/");
    }

    #[test]
    fn json_shape_matches_frontend() {
        let docs = vec![doc("0.00-project-start.md", SpecId::Legacy, "# Start\nHello.")];
        let index = SearchIndex::build(&docs, "engineering/specs", at());
        let value = serde_json::to_value(&index).unwrap();

        assert_eq!(value["total_specs"], 1);
        let entry = &value["index"][0];
        assert_eq!(entry["id"], "0.00");
        assert_eq!(entry["status"], "draft");
        assert_eq!(entry["priority"], "medium");
        assert_eq!(entry["assignee"], "Kang");
        assert_eq!(entry["git_commits"], 0);
        assert_eq!(entry["pull_requests"], 0);
        assert_eq!(entry["content"], "start hello.");
        assert_eq!(entry["estimated_hours"].to_string(), "0");
        assert_eq!(entry["last_updated"], "2026-02-09T10:00:00Z");
        assert!(entry["demonstrates"].is_array());
    }

    #[test]
    fn index_is_written_as_json() {
        let dir = std::env::temp_dir().join(format!("specpub-search-test-{}", uuid::Uuid::now_v7()));
        let path = dir.join("assets/js/search-index.json");

        write_search_index(&path, &[], "engineering/specs", at()).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["total_specs"], 0);
        assert_eq!(parsed["index"].as_array().unwrap().len(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
