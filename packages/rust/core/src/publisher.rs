//! Writes enriched specs into the site tree.
//!
//! The specs directory is clean-rebuilt on every run: stale `*.md` files are
//! removed before the current set is written. Every file goes through a temp
//! file and a rename so readers never observe a half-written page.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use specpub_shared::{Result, SpecPubError};

/// Output of a publish run.
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Directory the specs were written to.
    pub specs_dir: PathBuf,
    /// Number of specs written.
    pub written: usize,
    /// Number of stale Markdown files removed first.
    pub removed: usize,
}

/// Clean-rebuild `specs_dir` with `pages`.
///
/// Each entry in `pages` is a `(filename, content)` pair. Any failure aborts
/// with the path that failed; files already written stay in place.
#[instrument(skip_all, fields(dir = %specs_dir.display(), count = pages.len()))]
pub fn publish(specs_dir: &Path, pages: &[(&str, &str)]) -> Result<PublishResult> {
    std::fs::create_dir_all(specs_dir).map_err(|e| SpecPubError::io(specs_dir, e))?;

    let removed = clean_markdown(specs_dir)?;

    for (filename, content) in pages {
        write_atomic(&specs_dir.join(filename), content)?;
        debug!(file = %filename, size = content.len(), "published spec");
    }

    info!(written = pages.len(), removed, "specs published");

    Ok(PublishResult {
        specs_dir: specs_dir.to_path_buf(),
        written: pages.len(),
        removed,
    })
}

/// Delete every `*.md` file directly inside `dir`. Returns how many were removed.
fn clean_markdown(dir: &Path) -> Result<usize> {
    let entries = std::fs::read_dir(dir).map_err(|e| SpecPubError::io(dir, e))?;

    let mut removed = 0;
    for entry in entries {
        let path = entry.map_err(|e| SpecPubError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            std::fs::remove_file(&path).map_err(|e| SpecPubError::io(&path, e))?;
            removed += 1;
        }
    }

    debug!(removed, "cleaned stale specs");
    Ok(removed)
}

/// Write `content` to `path` via a sibling temp file and a rename.
///
/// Parent directories are created as needed.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| SpecPubError::validation(format!("{} has no parent", path.display())))?;
    std::fs::create_dir_all(parent).map_err(|e| SpecPubError::io(parent, e))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SpecPubError::validation(format!("{} has no file name", path.display())))?;
    let temp = parent.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| SpecPubError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(SpecPubError::io(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "specpub-publisher-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn list(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn publish_creates_dir_and_writes_pages() {
        let tmp = temp_dir();
        let specs = tmp.join("docs/engineering/specs");

        let result = publish(&specs, &[("a.md", "# A\n"), ("b.md", "# B\n")]).unwrap();

        assert_eq!(result.written, 2);
        assert_eq!(result.removed, 0);
        assert_eq!(std::fs::read_to_string(specs.join("a.md")).unwrap(), "# A\n");
        assert_eq!(list(&specs), vec!["a.md", "b.md"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn publish_removes_stale_markdown_only() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("stale.md"), "old").unwrap();
        std::fs::write(tmp.join("keep.css"), "body {}").unwrap();
        std::fs::create_dir_all(tmp.join("assets")).unwrap();

        let result = publish(&tmp, &[("fresh.md", "new")]).unwrap();

        assert_eq!(result.removed, 1);
        assert_eq!(list(&tmp), vec!["assets", "fresh.md", "keep.css"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn republish_is_idempotent() {
        let tmp = temp_dir();
        let pages = [("a.md", "# A\n")];

        publish(&tmp, &pages).unwrap();
        let second = publish(&tmp, &pages).unwrap();

        assert_eq!(second.removed, 1);
        assert_eq!(list(&tmp), vec!["a.md"]);
        assert_eq!(std::fs::read_to_string(tmp.join("a.md")).unwrap(), "# A\n");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unwritable_target_aborts_with_its_path() {
        let tmp = temp_dir();
        let blocked = tmp.join("b.md");
        std::fs::create_dir_all(&blocked).unwrap();

        let err = publish(&tmp, &[("a.md", "# A\n"), ("b.md", "# B\n"), ("c.md", "# C\n")])
            .unwrap_err();

        match err {
            SpecPubError::Io { path, .. } => assert_eq!(path, blocked),
            other => panic!("expected Io error, got {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(tmp.join("a.md")).unwrap(), "# A\n");
        assert!(!tmp.join("c.md").exists());
        assert_eq!(list(&tmp), vec!["a.md", "b.md"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let tmp = temp_dir();
        let target = tmp.join("nested/page.md");

        write_atomic(&target, "one").unwrap();
        write_atomic(&target, "two").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "two");
        assert_eq!(list(&tmp.join("nested")), vec!["page.md"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
