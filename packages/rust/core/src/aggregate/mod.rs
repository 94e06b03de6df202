//! Cross-document outputs derived from the full spec set.
//!
//! Each submodule owns one artifact: the dashboard page, the navigation
//! section of the site config, the specs overview page, per-spec
//! implementation summaries and the frontend search index.

pub mod dashboard;
pub mod index_page;
pub mod navigation;
pub mod search_index;
pub mod workflow;

/// Link prefix from pages under `engineering/` to published specs.
pub(crate) const SPECS_LINK_PREFIX: &str = "../specs";
