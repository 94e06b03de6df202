//! Specs navigation section of the site config.
//!
//! Only the text between the start marker and the end marker is ever
//! rewritten. Everything else in the file is left byte for byte.

use std::path::Path;

use tracing::{debug, info, instrument};

use specpub_shared::{NavigationConfig, Result, SpecDocument, SpecPubError, Status};

use crate::publisher::write_atomic;

/// One specs entry in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    pub display_title: String,
    pub status_icon: &'static str,
    /// Site-relative path of the published spec.
    pub output_path: String,
}

/// Navigation icon for a status.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Draft => "📝",
        Status::Review => "👀",
        Status::Approved => "✅",
        Status::InProgress => "🚧",
        Status::Completed => "🎉",
    }
}

/// Entries for every spec, ordered by identifier then filename.
pub fn build_entries(docs: &[SpecDocument], specs_site_path: &str) -> Vec<NavigationEntry> {
    let mut ordered: Vec<&SpecDocument> = docs.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.filename.cmp(&b.filename)));

    ordered
        .into_iter()
        .map(|doc| NavigationEntry {
            display_title: doc.title.clone(),
            status_icon: status_icon(doc.metadata.status),
            output_path: format!("{specs_site_path}/{}", doc.filename),
        })
        .collect()
}

/// Render the specs section, starting with the start marker line. No trailing newline.
pub fn render_section(entries: &[NavigationEntry], start_marker: &str, specs_site_path: &str) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 2);
    lines.push(start_marker.to_string());
    lines.push(format!("          - Overview: {specs_site_path}/index.md"));

    for entry in entries {
        let key = yaml_key(&format!("{} {}", entry.status_icon, entry.display_title));
        lines.push(format!("          - {key}: {}", entry.output_path));
    }

    lines.join("\n")
}

/// Quote a mapping key when it holds characters YAML would otherwise interpret.
fn yaml_key(key: &str) -> String {
    const SIGNIFICANT: &[char] = &[':', '#', '"', '\'', '[', ']', '{', '}', ',', '&', '*', '!', '|', '>', '%', '@', '`'];

    if key.contains(SIGNIFICANT) {
        format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        key.to_string()
    }
}

/// Replace the marker-bounded section of `content` with `section`.
///
/// The replaced range starts at the start marker and ends right before the
/// first end marker that follows it.
pub fn splice_section(content: &str, markers: &NavigationConfig, section: &str) -> Result<String> {
    let start = content.find(&markers.start_marker).ok_or_else(|| {
        SpecPubError::setup(format!(
            "site config has no navigation start marker {:?}",
            markers.start_marker
        ))
    })?;

    let search_from = start + markers.start_marker.len();
    let end = content[search_from..]
        .find(&markers.end_marker)
        .map(|offset| search_from + offset)
        .ok_or_else(|| {
            SpecPubError::setup(format!(
                "site config has no navigation end marker {:?} after the start marker",
                markers.end_marker
            ))
        })?;

    let mut out = String::with_capacity(content.len() + section.len());
    out.push_str(&content[..start]);
    out.push_str(section);
    out.push_str(&content[end..]);
    Ok(out)
}

/// Read the site config and make sure both markers are present.
pub fn check_site_config(path: &Path, markers: &NavigationConfig) -> Result<String> {
    if !path.is_file() {
        return Err(SpecPubError::setup(format!(
            "site config {} not found",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path).map_err(|e| SpecPubError::io(path, e))?;
    splice_section(&content, markers, "")?;
    Ok(content)
}

/// Rewrite the specs section of the site config at `path`.
///
/// Missing file or markers leave the file untouched and return a setup error.
#[instrument(skip_all, fields(path = %path.display(), entries = entries.len()))]
pub fn update_site_config(
    path: &Path,
    markers: &NavigationConfig,
    entries: &[NavigationEntry],
    specs_site_path: &str,
) -> Result<()> {
    let content = check_site_config(path, markers)?;
    let section = render_section(entries, &markers.start_marker, specs_site_path);
    let updated = splice_section(&content, markers, &section)?;

    if updated == content {
        debug!("navigation unchanged");
        return Ok(());
    }

    write_atomic(path, &updated)?;
    info!("site navigation updated");
    Ok(())
}
