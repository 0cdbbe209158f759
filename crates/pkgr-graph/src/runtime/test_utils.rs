//! Test utilities for pkgr-graph.
//!
//! `TestRuntime` keeps a virtual file system in memory and records every read,
//! so tests can assert on caching behaviour and on files that must never be
//! touched.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// In-memory runtime for tests.
#[derive(Debug, Default)]
pub struct TestRuntime {
    cwd: PathBuf,
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
    reads: RwLock<Vec<PathBuf>>,
}

impl TestRuntime {
    /// Create a runtime whose working directory is `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    /// Create a runtime pre-populated with `(path, content)` pairs.
    ///
    /// Relative paths are placed under `cwd`.
    pub fn with_files(cwd: impl Into<PathBuf>, files: &[(&str, &str)]) -> Self {
        let runtime = Self::new(cwd);
        for (path, content) in files {
            runtime.write(path, content);
        }
        runtime
    }

    /// Add or replace a file.
    pub fn write(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.absolute(path.as_ref());
        self.files.write().insert(path, content.as_bytes().to_vec());
    }

    /// Remove a file.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = self.absolute(path.as_ref());
        self.files.write().remove(&path);
    }

    /// Number of times `path` has been read.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        let path = self.absolute(path.as_ref());
        self.reads.read().iter().filter(|p| **p == path).count()
    }

    /// Total number of reads across all files.
    pub fn total_reads(&self) -> usize {
        self.reads.read().len()
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        self.cwd.join(path).clean()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files.read().keys().any(|file| file != path && file.starts_with(path))
    }
}

impl Runtime for TestRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.absolute(path);
        self.reads.write().push(path.clone());
        self.files
            .read()
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let path = self.absolute(path);
        if let Some(content) = self.files.read().get(&path) {
            return Ok(FileMetadata {
                size: content.len() as u64,
                is_dir: false,
                is_file: true,
                modified: None,
            });
        }
        if self.is_dir(&path) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
                modified: None,
            });
        }
        Err(RuntimeError::FileNotFound(path))
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.absolute(path);
        self.files.read().contains_key(&path) || self.is_dir(&path)
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
