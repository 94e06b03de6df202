//! Rewriting of relative cross-repository links.
//!
//! Specs live outside the site tree and link to repository files with
//! relative paths (`../../AI-NATIVE.md`). Those targets do not exist in the
//! published site, so they are pointed at the repository browser instead.
//!
//! Every rule is matched against the original text and all replacements are
//! spliced in one pass, so no rule ever sees another rule's output.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Builds the replacement for one match. Must be pure.
type Replacer = fn(&Captures<'_>, &str) -> String;

/// A single `(pattern, replacement)` rewriting rule.
struct LinkRule {
    name: &'static str,
    pattern: Regex,
    replace: Replacer,
}

impl LinkRule {
    fn new(name: &'static str, pattern: &str, replace: Replacer) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid link rule regex"),
            replace,
        }
    }
}

/// Point the captured repository path at the blob base.
fn to_blob(caps: &Captures<'_>, base: &str) -> String {
    format!("]({base}/{})", &caps["path"])
}

static RULES: LazyLock<Vec<LinkRule>> = LazyLock::new(|| {
    vec![
        // Root project files that don't exist in the site
        LinkRule::new(
            "root-files",
            r"\]\(\.\./\.\./(?P<path>AI-NATIVE\.md|GETTING-STARTED\.md|mkdocs\.yml)\)",
            to_blob,
        ),
        LinkRule::new(
            "ai-context",
            r"\]\(\.\./\.\./(?P<path>ai-context/(?:README|conventions)\.md)\)",
            to_blob,
        ),
        LinkRule::new(
            "adr-from-root",
            r"\]\(\.\./\.\./(?P<path>meta/adr/[^)\s]+)\)",
            to_blob,
        ),
        LinkRule::new(
            "adr-sibling",
            r"\]\(\.\./(?P<path>meta/adr/[^)\s]+)\)",
            to_blob,
        ),
        LinkRule::new(
            "project",
            r"\]\(\.\./\.\./(?P<path>project/[^)\s]+)\)",
            to_blob,
        ),
    ]
});

/// Rewrite every known relative repository link in `md` onto `base`.
pub(crate) fn rewrite_links(md: &str, base: &str) -> String {
    let mut edits: Vec<(usize, usize, String)> = RULES
        .iter()
        .flat_map(|rule| {
            rule.pattern.captures_iter(md).filter_map(move |caps| {
                let whole = caps.get(0)?;
                tracing::trace!(rule = rule.name, target = whole.as_str(), "rewriting link");
                Some((whole.start(), whole.end(), (rule.replace)(&caps, base)))
            })
        })
        .collect();

    if edits.is_empty() {
        return md.to_string();
    }

    edits.sort_by_key(|(start, _, _)| *start);

    let mut out = String::with_capacity(md.len());
    let mut cursor = 0;
    for (start, end, replacement) in edits {
        if start < cursor {
            continue;
        }
        out.push_str(&md[cursor..start]);
        out.push_str(&replacement);
        cursor = end;
    }
    out.push_str(&md[cursor..]);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
