//! Platform runtime abstraction
//!
//! This module defines the `Runtime` trait that abstracts file access for the
//! analysis pass. The compiler host reads every source file through it, which
//! keeps analysis testable against an in-memory file system.

pub mod native;

// Test utilities (available in test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// File metadata
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
    /// Last modified timestamp (milliseconds since epoch)
    pub modified: Option<u64>,
}

/// Platform runtime trait
///
/// Analysis is synchronous: an entry point is analysed start to finish without
/// yielding, so the trait exposes blocking operations only.
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Get file metadata
    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Get the current working directory
    fn get_cwd(&self) -> RuntimeResult<PathBuf>;

    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes)
            .map_err(|e| RuntimeError::Other(format!("Invalid UTF-8 in {}: {}", path.display(), e)))
    }

    /// Check if a path exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool {
        self.exists(path) && self.metadata(path).map(|m| m.is_file).unwrap_or(false)
    }
}
