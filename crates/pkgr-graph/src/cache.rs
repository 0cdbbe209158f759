//! Per-entry-point memoization of source files and module resolution.
//!
//! Every entry point owns one [`EntryPointCache`]. Repeated analysis passes
//! (incremental rebuilds) reuse parsed files; a file whose content hash is
//! unchanged after [`SourcesFileCache::refresh`] keeps its parse.

use std::ops::{AddAssign, Sub};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::compiler::SourceFile;
use crate::runtime::{Runtime, RuntimeResult};

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    /// Fraction of lookups served from cache, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl AddAssign for CacheStats {
    fn add_assign(&mut self, other: Self) {
        self.hits += other.hits;
        self.misses += other.misses;
    }
}

impl Sub for CacheStats {
    type Output = Self;

    fn sub(self, earlier: Self) -> Self {
        Self {
            hits: self.hits.saturating_sub(earlier.hits),
            misses: self.misses.saturating_sub(earlier.misses),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedSource {
    hash: blake3::Hash,
    source_file: Arc<SourceFile>,
}

/// Read-and-parse cache keyed by file path.
#[derive(Debug, Default)]
pub struct SourcesFileCache {
    entries: FxHashMap<PathBuf, CachedSource>,
    stats: CacheStats,
}

impl SourcesFileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the parsed file, reading and parsing it on first use.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        runtime: &dyn Runtime,
    ) -> RuntimeResult<Arc<SourceFile>> {
        if let Some(cached) = self.entries.get(path) {
            self.stats.hits += 1;
            return Ok(Arc::clone(&cached.source_file));
        }

        self.stats.misses += 1;
        let text = runtime.read_to_string(path)?;
        let cached = CachedSource {
            hash: blake3::hash(text.as_bytes()),
            source_file: Arc::new(SourceFile::parse(path, text)),
        };
        let source_file = Arc::clone(&cached.source_file);
        self.entries.insert(path.to_path_buf(), cached);
        Ok(source_file)
    }

    /// Re-read a cached file and re-parse it only if its content changed.
    ///
    /// Returns `true` when the file was re-parsed. Files not in the cache are
    /// left alone and reported as unchanged.
    pub fn refresh(&mut self, path: &Path, runtime: &dyn Runtime) -> RuntimeResult<bool> {
        let Some(cached) = self.entries.get_mut(path) else {
            return Ok(false);
        };

        let text = runtime.read_to_string(path)?;
        let hash = blake3::hash(text.as_bytes());
        if hash == cached.hash {
            return Ok(false);
        }

        tracing::trace!("Source changed, re-parsing {}", path.display());
        cached.hash = hash;
        cached.source_file = Arc::new(SourceFile::parse(path, text));
        Ok(true)
    }

    /// Drop a file from the cache. Returns whether it was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Paths currently cached, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Module resolution results keyed by (containing directory, specifier).
///
/// Negative results are cached too.
#[derive(Debug, Default)]
pub struct ModuleResolutionCache {
    entries: FxHashMap<(PathBuf, String), Option<PathBuf>>,
    stats: CacheStats,
}

impl ModuleResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached resolution. The outer `Option` is the cache lookup, the inner
    /// one the resolution result.
    pub fn get(&mut self, containing_dir: &Path, specifier: &str) -> Option<Option<PathBuf>> {
        let found = self
            .entries
            .get(&(containing_dir.to_path_buf(), specifier.to_string()))
            .cloned();
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, containing_dir: &Path, specifier: &str, resolved: Option<PathBuf>) {
        self.entries
            .insert((containing_dir.to_path_buf(), specifier.to_string()), resolved);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Caches owned by one entry point node.
#[derive(Debug, Default)]
pub struct EntryPointCache {
    pub sources_file_cache: SourcesFileCache,
    pub analysis_module_resolution_cache: ModuleResolutionCache,
}

impl EntryPointCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget a changed file.
    ///
    /// Resolution results are dropped wholesale since adding or removing a
    /// file can change how any specifier resolves.
    pub fn invalidate(&mut self, path: &Path) {
        self.sources_file_cache.invalidate(path);
        self.analysis_module_resolution_cache.clear();
    }

    /// Combined counters of both caches.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.sources_file_cache.stats();
        stats += self.analysis_module_resolution_cache.stats();
        stats
    }
}
