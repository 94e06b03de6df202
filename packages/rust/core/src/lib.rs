//! Publication pipeline for specpub.
//!
//! Ties together loading, history correlation, enrichment, publishing and the
//! cross-document outputs into the `build` workflow.

pub mod aggregate;
pub mod loader;
pub mod pipeline;
pub mod publisher;

pub use pipeline::{BuildResult, ProgressReporter, SilentProgress, build_site, status_summary};
