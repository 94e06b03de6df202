//! Error types for specpub.
//!
//! Library crates use [`SpecPubError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all specpub operations.
#[derive(Debug, thiserror::Error)]
pub enum SpecPubError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Front matter or other structured input could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The revision-tracking tool failed, timed out, or produced unreadable output.
    #[error("revision tool error: {0}")]
    Revision(String),

    /// A precondition of the run is not met (missing source dir, missing markers).
    #[error("setup error: {message}")]
    Setup { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (serialization, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpecPubError>;

impl SpecPubError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a setup error from any displayable message.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SpecPubError::setup("source directory project/specs does not exist");
        assert_eq!(
            err.to_string(),
            "setup error: source directory project/specs does not exist"
        );

        let err = SpecPubError::Revision("git exited with status 128".into());
        assert!(err.to_string().contains("status 128"));
    }

    #[test]
    fn io_error_includes_path() {
        let err = SpecPubError::io(
            "/tmp/out/spec.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out/spec.md"));
        assert!(msg.contains("denied"));
    }
}
