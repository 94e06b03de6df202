//! Overview page of the published specs section.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use specpub_shared::{Result, SpecId};

use crate::publisher::write_atomic;

/// Filename of the overview page inside the specs directory.
pub const INDEX_FILE: &str = "index.md";

/// Render the overview page.
pub fn render(source_dir_label: &str, legacy_stem: &str) -> String {
    format!(
        "# Specifications

This section contains the published specifications. They are the single source of truth for feature planning and requirements.

## About These Specs

- **Source**: Files are published automatically from the `{source_dir_label}/` directory
- **Format**: Each spec starts with YAML front matter followed by Markdown prose
- **Workflow**: Edit the source files directly, never the published copies
- **Navigation**: This page and the navigation are regenerated on every build

## Spec Naming Convention

- **Format**: `YYYY-MM-DD-nn-descriptive-name.md`
- **Example**: `2026-02-09-01-engineering-history-tracking.md`
- **Exception**: `{legacy_stem}.md` (grandfathered first spec, identifier `{legacy_label}`)

## Related

For development implementation summaries, see [Dev Workflows](../dev-workflows/index.md).
",
        legacy_label = SpecId::LEGACY_LABEL,
    )
}

/// Write the overview page into `specs_dir`. Runs after the clean rebuild.
#[instrument(skip_all, fields(dir = %specs_dir.display()))]
pub fn write_index(specs_dir: &Path, source_dir_label: &str, legacy_stem: &str) -> Result<PathBuf> {
    let path = specs_dir.join(INDEX_FILE);
    write_atomic(&path, &render(source_dir_label, legacy_stem))?;
    debug!("specs index written");
    Ok(path)
}
