//! Error handling for the forecasting pipeline.
//!
//! One variant family per failure class: argument errors, artifact-load
//! errors, dataset errors and unexpected processing errors. Every variant
//! renders to the human-readable message carried in the failure JSON.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Incomplete arguments: {message}")]
    MissingArgument { message: String },

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Artifact {artifact} rejected input: {reason}")]
    ArtifactShape { artifact: String, reason: String },

    #[error("Failed to load dataset {path}: {reason}")]
    Dataset { path: PathBuf, reason: String },

    #[error("Failed to load dataset: time column not found")]
    TimeColumnNotFound,

    #[error("Failed to load dataset: column '{column}' not found")]
    MissingColumn { column: String },

    #[error("Failed to load dataset: dataset empty after cleaning")]
    EmptyDataset,

    #[error("Processing failed: {reason}")]
    Processing { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl ForecastError {
    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an artifact load error for a specific file
    pub fn artifact_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an error for input an artifact cannot consume
    pub fn artifact_shape(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArtifactShape {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// Create a processing error
    pub fn processing(reason: impl Into<String>) -> Self {
        Self::Processing {
            reason: reason.into(),
        }
    }

    /// Whether the error originates from user-supplied arguments
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. } | Self::InvalidArgument { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
