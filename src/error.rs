//! Error types for the enhancer.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for enhancer operations
pub type Result<T> = std::result::Result<T, EnhanceError>;

/// A parser backend failed to produce a tree for one file.
///
/// Cloneable so every record waiting on the same in-flight parse sees it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error in {}: {message}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub message: String,
}

impl ParseError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Main error type for enhancer operations
#[derive(Error, Debug)]
pub enum EnhanceError {
    /// Invalid or incomplete configuration, raised before any parsing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A file could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Reading record input failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON line that is not a documentation record
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}
