pub mod config;
pub mod core;
pub mod encoder;
pub mod logging;
pub mod report;
pub mod report_cmd;
pub mod source;
pub mod storage;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A live transaction could not be read; aborts the whole batch.
    #[error("failed to read transaction #{index}: {reason}")]
    SourceRead { index: usize, reason: String },

    #[error("failed to open input {}: {source}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML document: {0}")]
    MalformedDocument(String),

    #[error("template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("template is missing placeholder {0}")]
    TemplatePlaceholder(&'static str),

    #[error("failed to write report to {}: {source}", path.display())]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset entry {id} is invalid: {reason}")]
    InvalidEntry { id: usize, reason: String },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("failed to serialize dataset: {0}")]
    Dataset(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
