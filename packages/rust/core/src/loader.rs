//! Source spec discovery and parsing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use specpub_markdown::{derive_id, extract_title, fallback_title, parse_document};
use specpub_shared::{ChangeHistory, MetadataConfig, Result, SpecDocument, SpecPubError};

/// A source file read from disk, not yet parsed.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Bare filename (`2026-02-09-01-feature-x.md`).
    pub filename: String,
    pub path: PathBuf,
    pub raw: String,
}

/// Read every `*.md` file directly inside `source_dir`, sorted by filename.
///
/// `excluded` is compared case-insensitively. A missing directory is a setup
/// error; an empty one yields no files.
#[instrument(skip_all, fields(dir = %source_dir.display()))]
pub fn load_sources(source_dir: &Path, excluded: &str) -> Result<Vec<SourceFile>> {
    if !source_dir.is_dir() {
        return Err(SpecPubError::setup(format!(
            "source directory {} does not exist",
            source_dir.display()
        )));
    }

    let entries = std::fs::read_dir(source_dir).map_err(|e| SpecPubError::io(source_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SpecPubError::io(source_dir, e))?;
        let path = entry.path();

        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            debug!(path = %path.display(), "skipping non-UTF-8 filename");
            continue;
        };
        if !path.is_file() || !filename.ends_with(".md") {
            continue;
        }
        if filename.eq_ignore_ascii_case(excluded) {
            debug!(%filename, "skipping excluded file");
            continue;
        }

        let raw = std::fs::read_to_string(&path).map_err(|e| SpecPubError::io(&path, e))?;
        files.push(SourceFile {
            filename: filename.to_string(),
            path,
            raw,
        });
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    info!(count = files.len(), "loaded source specs");
    Ok(files)
}

/// Parse front matter, derive identifiers and titles.
///
/// Output keeps filename order. Duplicate identifiers are reported but kept;
/// downstream ordering breaks the tie by filename.
#[instrument(skip_all, fields(count = files.len()))]
pub fn parse_sources(files: Vec<SourceFile>, defaults: &MetadataConfig) -> Vec<SpecDocument> {
    let docs: Vec<SpecDocument> = files
        .into_iter()
        .map(|file| {
            let parsed = parse_document(&file.raw, defaults);
            let id = derive_id(&file.filename, &defaults.legacy_stem);
            let title = extract_title(&parsed.body)
                .unwrap_or_else(|| fallback_title(&file.filename, &defaults.legacy_stem));

            debug!(
                filename = %file.filename,
                spec_id = %id,
                status = %parsed.metadata.status,
                front_matter = parsed.had_front_matter,
                "parsed spec"
            );

            SpecDocument {
                filename: file.filename,
                id,
                title,
                metadata: parsed.metadata,
                body: parsed.body,
                history: ChangeHistory::default(),
                enriched_at: None,
            }
        })
        .collect();

    warn_duplicate_ids(&docs);
    docs
}

fn warn_duplicate_ids(docs: &[SpecDocument]) {
    let mut by_id: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for doc in docs {
        by_id.entry(doc.id.as_str()).or_default().push(&doc.filename);
    }

    for (id, filenames) in by_id.into_iter().filter(|(_, f)| f.len() > 1) {
        warn!(spec_id = id, files = ?filenames, "identifier shared by several specs");
    }
}
