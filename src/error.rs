//! Error types for the media archiver

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media archiver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media archiver
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("Target root is not a readable directory: {0}")]
    TargetUnreadable(PathBuf),

    #[error("Invalid filename: {0}")]
    InvalidFilename(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    GlobPattern { pattern: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
