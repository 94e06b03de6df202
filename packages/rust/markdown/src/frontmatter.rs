//! YAML front matter splitting and decoding.
//!
//! A document may open with a `---` line, a YAML mapping, and a closing `---`
//! line. Everything after the closing line is the body. Decoding never fails
//! the caller: malformed front matter degrades to default metadata with the
//! whole text kept as body.

use serde_yaml::Value;
use tracing::{debug, warn};

use specpub_shared::{MetadataConfig, Priority, Result, SpecMetadata, SpecPubError, Status};

/// Result of splitting and decoding one document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub metadata: SpecMetadata,
    pub body: String,
    /// Whether a front matter block was found and decoded.
    pub had_front_matter: bool,
}

/// Split `raw` into metadata and body, applying defaults for missing fields.
pub fn parse_document(raw: &str, defaults: &MetadataConfig) -> ParsedDocument {
    let Some((yaml, body)) = split_front_matter(raw) else {
        return ParsedDocument {
            metadata: SpecMetadata::defaults(defaults),
            body: raw.to_string(),
            had_front_matter: false,
        };
    };

    match decode_metadata(yaml, defaults) {
        Ok(metadata) => ParsedDocument {
            metadata,
            body: body.to_string(),
            had_front_matter: true,
        },
        Err(e) => {
            warn!(error = %e, "malformed front matter, treating whole document as body");
            ParsedDocument {
                metadata: SpecMetadata::defaults(defaults),
                body: raw.to_string(),
                had_front_matter: false,
            }
        }
    }
}

/// Locate the front matter block. Returns `(yaml, body)` when the text opens
/// with a `---` line and a matching closing `---` line exists.
pub(crate) fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let mut lines = raw.split_inclusive('\n');
    let first = lines.next()?;
    if !first.ends_with('\n') || strip_eol(first) != "---" {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if strip_eol(line) == "---" {
            return Some((&raw[yaml_start..offset], &raw[offset + line.len()..]));
        }
        offset += line.len();
    }

    debug!("opening front matter delimiter without a closing one");
    None
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Recognized front matter keys.
#[derive(Debug, Clone, Copy)]
enum Field {
    Status,
    Priority,
    EstimatedHours,
    ActualHours,
    Assignee,
    Category,
    Demonstrates,
    StateHistory,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "status" => Self::Status,
            "priority" => Self::Priority,
            "estimated_hours" => Self::EstimatedHours,
            "actual_hours" => Self::ActualHours,
            "assignee" => Self::Assignee,
            "category" => Self::Category,
            "demonstrates" => Self::Demonstrates,
            "state_history" => Self::StateHistory,
            _ => return None,
        })
    }
}

/// Decode a YAML block into typed metadata.
fn decode_metadata(yaml: &str, defaults: &MetadataConfig) -> Result<SpecMetadata> {
    let mut metadata = SpecMetadata::defaults(defaults);

    let value: Value = serde_yaml::from_str(yaml)
        .map_err(|e| SpecPubError::parse(format!("front matter is not valid YAML: {e}")))?;

    let mapping = match value {
        Value::Null => return Ok(metadata),
        Value::Mapping(mapping) => mapping,
        _ => return Err(SpecPubError::parse("front matter is not a mapping")),
    };

    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s,
            other => serde_yaml::to_string(&other)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        };

        let Some(field) = Field::from_key(&key) else {
            metadata.extra.insert(key, value);
            continue;
        };

        if !apply_field(&mut metadata, field, &value) {
            warn!(field = %key, "unexpected value for metadata field, keeping default");
            metadata.extra.insert(key, value);
        }
    }

    Ok(metadata)
}

/// Store `value` into the typed field. Returns `false` if the shape is wrong.
fn apply_field(metadata: &mut SpecMetadata, field: Field, value: &Value) -> bool {
    match field {
        Field::Status => match value.as_str().and_then(Status::parse_lenient) {
            Some(status) => metadata.status = status,
            None => return false,
        },
        Field::Priority => match value.as_str().and_then(Priority::parse_lenient) {
            Some(priority) => metadata.priority = priority,
            None => return false,
        },
        Field::EstimatedHours => match hours(value) {
            Some(h) => metadata.estimated_hours = h,
            None => return false,
        },
        Field::ActualHours => match hours(value) {
            Some(h) => metadata.actual_hours = h,
            None => return false,
        },
        Field::Assignee => match scalar_string(value) {
            Some(s) => metadata.assignee = s,
            None => return false,
        },
        Field::Category => match scalar_string(value) {
            Some(s) => metadata.category = s,
            None => return false,
        },
        Field::Demonstrates => match string_list(value) {
            Some(list) => metadata.demonstrates = list,
            None => return false,
        },
        Field::StateHistory => match value {
            Value::Sequence(entries) => metadata.state_history = entries.clone(),
            Value::Null => metadata.state_history = Vec::new(),
            _ => return false,
        },
    }
    true
}

fn hours(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => items.iter().map(scalar_string).collect(),
        Value::String(s) => Some(vec![s.clone()]),
        Value::Null => Some(Vec::new()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> MetadataConfig {
        MetadataConfig::default()
    }

    #[test]
    fn no_front_matter_keeps_full_text() {
        let raw = "# Project Start\nHello.";
        let parsed = parse_document(raw, &defaults());
        assert!(!parsed.had_front_matter);
        assert_eq!(parsed.body, raw);
        assert_eq!(parsed.metadata, SpecMetadata::defaults(&defaults()));
    }

    #[test]
    fn delimiter_not_at_start_is_body() {
        let raw = "\n---\nstatus: completed\n---\n# Title\n";
        let parsed = parse_document(raw, &defaults());
        assert!(!parsed.had_front_matter);
        assert_eq!(parsed.body, raw);
        assert_eq!(parsed.metadata.status, Status::Draft);
    }

    #[test]
    fn well_formed_front_matter_applies_defaults() {
        let raw = "---\nstatus: completed\npriority: high\n---\n# Feature X\n\nBody.\n";
        let parsed = parse_document(raw, &defaults());

        assert!(parsed.had_front_matter);
        assert_eq!(parsed.body, "# Feature X\n\nBody.\n");
        assert_eq!(parsed.metadata.status, Status::Completed);
        assert_eq!(parsed.metadata.priority, Priority::High);
        assert_eq!(parsed.metadata.estimated_hours, 0.0);
        assert_eq!(parsed.metadata.assignee, "Kang");
        assert_eq!(parsed.metadata.category, "nextpm-feature");
        assert!(parsed.metadata.demonstrates.is_empty());
        assert!(parsed.metadata.extra.is_empty());
    }

    #[test]
    fn present_fields_are_preserved() {
        let raw = "---\n\
status: in-progress\n\
estimated_hours: 12\n\
actual_hours: 3.5\n\
assignee: Robin\n\
category: infra\n\
demonstrates:\n  - state tracking\n  - timelines\n\
state_history:\n  - status: draft\n    date: 2026-02-01\n\
---\n# T\n";
        let parsed = parse_document(raw, &defaults());
        let meta = parsed.metadata;

        assert_eq!(meta.status, Status::InProgress);
        assert_eq!(meta.estimated_hours, 12.0);
        assert_eq!(meta.actual_hours, 3.5);
        assert_eq!(meta.assignee, "Robin");
        assert_eq!(meta.category, "infra");
        assert_eq!(meta.demonstrates, vec!["state tracking", "timelines"]);
        assert_eq!(meta.state_history.len(), 1);
        assert_eq!(meta.state_history[0]["status"].as_str(), Some("draft"));
    }

    #[test]
    fn unknown_fields_go_to_extra() {
        let raw = "---\nstatus: review\nreviewers: [a, b]\nticket: 42\n---\nbody";
        let parsed = parse_document(raw, &defaults());
        let extra = &parsed.metadata.extra;

        assert_eq!(extra.len(), 2);
        assert_eq!(extra["ticket"].as_u64(), Some(42));
        assert!(extra["reviewers"].is_sequence());
    }

    #[test]
    fn misspelled_status_defaults_to_draft_and_is_kept() {
        let raw = "---\nstatus: finsihed\n---\nbody";
        let parsed = parse_document(raw, &defaults());
        assert_eq!(parsed.metadata.status, Status::Draft);
        assert_eq!(parsed.metadata.extra["status"].as_str(), Some("finsihed"));
    }

    #[test]
    fn malformed_yaml_is_non_fatal() {
        let raw = "---\nstatus: [unclosed\n---\n# Title\n";
        let parsed = parse_document(raw, &defaults());
        assert!(!parsed.had_front_matter);
        assert_eq!(parsed.body, raw);
        assert_eq!(parsed.metadata.status, Status::Draft);
    }

    #[test]
    fn non_mapping_yaml_is_non_fatal() {
        let raw = "---\n- just\n- a list\n---\nbody";
        let parsed = parse_document(raw, &defaults());
        assert!(!parsed.had_front_matter);
        assert_eq!(parsed.body, raw);
    }

    #[test]
    fn empty_front_matter_is_defaults() {
        let parsed = parse_document("---\n---\n# T\n", &defaults());
        assert!(parsed.had_front_matter);
        assert_eq!(parsed.body, "# T\n");
        assert_eq!(parsed.metadata.priority, Priority::Medium);
    }

    #[test]
    fn unclosed_front_matter_is_body() {
        let raw = "---\nstatus: completed\n# Title\n";
        let parsed = parse_document(raw, &defaults());
        assert!(!parsed.had_front_matter);
        assert_eq!(parsed.body, raw);
    }

    #[test]
    fn crlf_delimiters_are_accepted() {
        let raw = "---\r\nstatus: approved\r\n---\r\n# T\r\n";
        let parsed = parse_document(raw, &defaults());
        assert!(parsed.had_front_matter);
        assert_eq!(parsed.metadata.status, Status::Approved);
        assert_eq!(parsed.body, "# T\r\n");
    }

    #[test]
    fn closing_delimiter_at_eof() {
        let (yaml, body) = split_front_matter("---\nstatus: review\n---").unwrap();
        assert_eq!(yaml, "status: review\n");
        assert_eq!(body, "");
    }
}
