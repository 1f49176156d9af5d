//! Error types for artifact loading and inference

use crate::types::record::ColumnMismatch;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a usable model bundle. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact {} does not match the expected schema: {reason}", .path.display())]
    Schema { path: PathBuf, reason: String },

    #[error("artifact format '{0}' is not supported by this build")]
    Unsupported(&'static str),

    #[error("model backend failed to load {}: {message}", .path.display())]
    Backend { path: PathBuf, message: String },
}

/// Failure of a single transform + predict call. Reported to the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    #[error("missing feature column '{0}'")]
    MissingFeature(String),

    #[error("unexpected feature column '{0}'")]
    UnexpectedFeature(String),

    #[error("feature column '{0}' given more than once")]
    DuplicateFeature(String),

    #[error("feature columns out of order at position {position}: expected '{expected}', found '{found}'")]
    FeatureOrder {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("{stage} expects {expected} features, got {found}")]
    Width {
        stage: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{stage} produced a non-finite value")]
    NonFinite { stage: &'static str },

    #[error("model backend error: {0}")]
    Backend(String),
}

impl From<ColumnMismatch> for InferenceError {
    fn from(mismatch: ColumnMismatch) -> Self {
        match mismatch {
            ColumnMismatch::Missing(name) => InferenceError::MissingFeature(name),
            ColumnMismatch::Unexpected(name) => InferenceError::UnexpectedFeature(name),
            ColumnMismatch::Duplicate(name) => InferenceError::DuplicateFeature(name),
            ColumnMismatch::OutOfOrder {
                position,
                expected,
                found,
            } => InferenceError::FeatureOrder {
                position,
                expected,
                found,
            },
        }
    }
}
