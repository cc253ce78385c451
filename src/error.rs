//! Error taxonomy shared by the loader, the aggregator and the date validator.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, validating or aggregating a survey dataset.
///
/// None of these are fatal to a session: the CLI reports them and moves on to
/// the next dataset.
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("dataset '{}' not found", .path.display())]
    DatasetNotFound { path: PathBuf },

    #[error("dataset contains no records")]
    EmptyDataset,

    /// `line` is the 1-based data row (header excluded).
    #[error("malformed record at row {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("{0}")]
    InvalidDate(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SurveyError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        SurveyError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;
