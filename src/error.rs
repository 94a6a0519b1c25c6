use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the loaders and the batching pipeline
#[derive(Debug, Error)]
pub enum SourceError {
    /// The document source or a reference table could not be read
    #[error("source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// Input did not have the expected structure, or a required field is absent
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A caller-supplied parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl SourceError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SourceError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
