//! Native Runtime Implementation

// NativeRuntime is platform-specific and wraps std::fs by design
#![allow(clippy::disallowed_methods)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Native filesystem Runtime implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    /// Create a new NativeRuntime instance.
    pub fn new() -> Self {
        Self
    }
}

fn map_io_error(path: &Path, error: std::io::Error) -> RuntimeError {
    if error.kind() == ErrorKind::NotFound {
        RuntimeError::FileNotFound(path.to_path_buf())
    } else {
        RuntimeError::Io(format!("{}: {}", path.display(), error))
    }
}

impl Runtime for NativeRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e))
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let metadata = std::fs::metadata(path).map_err(|e| map_io_error(path, e))?;
        Ok(FileMetadata {
            size: metadata.len(),
            is_file: metadata.is_file(),
            is_dir: metadata.is_dir(),
            modified: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(|e| RuntimeError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_files_and_reports_missing_ones() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.ts");
        std::fs::write(&file, "export const x = 1;").unwrap();

        let runtime = NativeRuntime::new();
        assert_eq!(runtime.read_to_string(&file).unwrap(), "export const x = 1;");
        assert!(runtime.is_file(&file));
        assert!(!runtime.is_file(temp.path()));

        let missing = temp.path().join("missing.ts");
        assert!(matches!(
            runtime.read_file(&missing),
            Err(RuntimeError::FileNotFound(p)) if p == missing
        ));
    }
}
