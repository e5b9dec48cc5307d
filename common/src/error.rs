use std::{path::PathBuf, str::Utf8Error};

use thiserror::Error;

// Every variant is fatal for the split being converted
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error(
        "Input format error in {} line {line}: expected {expected} tab-separated fields, found {found}",
        .path.display()
    )]
    InputFormat {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid UTF-8 in {} line {line}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: Utf8Error,
    },
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error("Encoding precondition failed: {0}")]
    EncodingPrecondition(String),
    #[error("Resource error for {}: {reason}", .path.display())]
    Resource { path: PathBuf, reason: String },
    #[error("Record error: {0}")]
    Record(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    pub fn resource(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Resource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
