//! Spec identifiers and filename-derived titles.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use specpub_shared::SpecId;

/// Matches the `YYYY-MM-DD-NN` prefix and an optional descriptive remainder.
static DATE_SEQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}-\d{2})(?:-(.+))?").expect("date sequence regex")
});

/// Filename without its extension.
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

/// Derive the canonical identifier for a spec filename.
///
/// - the legacy stem maps to [`SpecId::Legacy`]
/// - a `YYYY-MM-DD-NN` prefix becomes the identifier
/// - anything else uses the stem itself
pub fn derive_id(filename: &str, legacy_stem: &str) -> SpecId {
    let stem = file_stem(filename);
    if stem == legacy_stem {
        return SpecId::Legacy;
    }

    match DATE_SEQ_RE.captures(stem) {
        Some(caps) => SpecId::Named(caps[1].to_string()),
        None => SpecId::Named(stem.to_string()),
    }
}

/// Readable title for a spec that has no top-level heading.
pub fn fallback_title(filename: &str, legacy_stem: &str) -> String {
    let stem = file_stem(filename);

    if stem == legacy_stem {
        let rest = stem.split_once('-').map(|(_, rest)| rest).unwrap_or("");
        return join_title(SpecId::LEGACY_LABEL, &title_case(rest));
    }

    if let Some(caps) = DATE_SEQ_RE.captures(stem) {
        let rest = caps.get(2).map(|m| title_case(m.as_str())).unwrap_or_default();
        return join_title(&caps[1], &rest);
    }

    title_case(stem)
}

/// Convert a kebab/snake-case slug to Title Case (`feature-x` → `Feature X`).
pub fn title_case(slug: &str) -> String {
    slug.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    format!("{upper}{}", chars.as_str().to_lowercase())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_title(prefix: &str, rest: &str) -> String {
    if rest.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix} {rest}")
    }
}
