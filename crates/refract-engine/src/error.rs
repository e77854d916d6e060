//! Engine and configuration errors.

use std::path::PathBuf;

use refract_catalog::{StageError, TransformId};
use refract_core::GraphError;
use thiserror::Error;

/// Errors returned by [`Engine`](crate::Engine) operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No track is loaded.
    #[error("engine not ready: no track loaded")]
    EngineNotReady,

    /// The engine must be resumed first. A resume has been requested.
    #[error("engine suspended: resume requested, retry once running")]
    EngineSuspended,

    /// A transform's constructor failed during a rebuild.
    #[error("stage construction failed for transform {id}: {source}")]
    StageConstructionFailed {
        /// The transform that failed.
        id: TransformId,
        /// What went wrong.
        #[source]
        source: StageError,
    },

    /// The id does not name a catalog transform.
    #[error("unknown transform id {0}")]
    UnknownTransformId(u16),

    /// An export is already running.
    #[error("a recording is already in progress")]
    RecordingAlreadyInProgress,

    /// Capture, encoding or delivery failed.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// A track could not be decoded.
    #[error("track I/O failed: {0}")]
    Track(#[from] refract_io::Error),

    /// The fixed part of the graph could not be wired.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Wraps an encode or delivery error as [`EngineError::CaptureFailed`].
    pub fn capture(err: impl std::fmt::Display) -> Self {
        Self::CaptureFailed(err.to_string())
    }
}

/// Errors from loading or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field holds an unusable value.
    #[error("invalid config field '{field}': {reason}")]
    Invalid {
        /// Name of the field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid field error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_read_file_display_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "mock");
        let err = ConfigError::read_file("/a/engine.toml", io);
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/engine.toml"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_display() {
        let err = ConfigError::invalid("block_size", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid config field 'block_size': must be at least 1"
        );
    }

    #[test]
    fn test_stage_failure_exposes_source() {
        let id = TransformId::new(7).unwrap();
        let err = EngineError::StageConstructionFailed {
            id,
            source: StageError::construction(id, "boom"),
        };
        assert!(err.to_string().contains("#7"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_delivery_errors_become_capture_failures() {
        let err = EngineError::capture(refract_io::Error::Delivery("disk full".into()));
        assert!(matches!(err, EngineError::CaptureFailed(ref m) if m.contains("disk full")));
    }
}
