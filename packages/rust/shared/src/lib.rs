//! Shared types, error model, and configuration for specpub.
//!
//! This crate is the foundation depended on by all other specpub crates.
//! It provides:
//! - [`SpecPubError`]: the unified error type
//! - Domain types ([`SpecDocument`], [`SpecMetadata`], [`SpecId`], [`ChangeHistory`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, CONFIG_FILE_NAME, HistoryConfig, LinksConfig, MetadataConfig,
    NavigationConfig, PathsConfig, init_config, load_config, load_config_from,
    project_config_path, user_config_dir,
};
pub use error::{Result, SpecPubError};
pub use types::{
    ChangeHistory, CommitRecord, Priority, RecentActivity, SpecDocument, SpecId, SpecMetadata,
    Status, serialize_hours,
};
