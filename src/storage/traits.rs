//! Storage traits and error types
//!
//! This module defines the trait interface for persisting downloaded report
//! files and the associated error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for report file persistence
///
/// Reports are transient: the crawler saves one, extracts it, and removes it
/// whatever the extraction outcome.
pub trait ReportStorage {
    /// Saves `contents` under `file_name`
    ///
    /// # Returns
    ///
    /// The local path of the saved file
    fn save(&self, file_name: &str, contents: &[u8]) -> StorageResult<PathBuf>;

    /// Removes a previously saved file; removing a missing file succeeds
    fn remove(&self, file_name: &str) -> StorageResult<()>;
}
