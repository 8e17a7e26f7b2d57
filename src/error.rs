use thiserror::Error;

use crate::summarize::SummarizeError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid secrets file: {0}")]
    Secrets(String),

    #[error("Missing required secret: {0}")]
    MissingSecret(String),

    #[error("Malformed dataset: {0}")]
    Dataset(String),

    #[error("Duplicate bill id in dataset: {0}")]
    DuplicateBillId(String),

    #[error("Bill not found: {0}")]
    BillNotFound(String),

    #[error("Summary for {bill_id} was not saved: {reason}")]
    NotSaved { bill_id: String, reason: String },

    #[error("Summarization failed: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("Prompt error: {0}")]
    Prompt(String),
}
