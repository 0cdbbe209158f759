//! Compiler hosts: file access and module resolution for a compiler service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pkgr_config::TsConfig;

use super::resolve::ModuleResolver;
use super::syntax::SourceFile;
use crate::cache::EntryPointCache;
use crate::runtime::{Runtime, RuntimeResult};

/// File-reading and resolution primitives a compiler service builds a program with.
pub trait CompilerHost {
    /// Read and parse a source file.
    fn get_source_file(&mut self, path: &Path) -> RuntimeResult<Arc<SourceFile>>;

    fn file_exists(&self, path: &Path) -> bool;

    /// Resolve a module specifier imported from `containing_file`.
    fn resolve_module_name(&mut self, specifier: &str, containing_file: &Path) -> Option<PathBuf>;

    /// Load a component resource (template or stylesheet).
    fn read_resource(&mut self, path: &Path) -> RuntimeResult<String>;
}

/// Host backed by an entry point's caches.
pub struct CachedCompilerHost<'a> {
    resolver: ModuleResolver<'a>,
    runtime: &'a dyn Runtime,
    cache: &'a mut EntryPointCache,
}

impl<'a> CachedCompilerHost<'a> {
    pub fn new(
        ts_config: &'a TsConfig,
        cache: &'a mut EntryPointCache,
        runtime: &'a dyn Runtime,
    ) -> Self {
        Self {
            resolver: ModuleResolver::new(ts_config, runtime),
            runtime,
            cache,
        }
    }
}

impl CompilerHost for CachedCompilerHost<'_> {
    fn get_source_file(&mut self, path: &Path) -> RuntimeResult<Arc<SourceFile>> {
        self.cache.sources_file_cache.get_or_load(path, self.runtime)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.cache.sources_file_cache.contains(path) || self.runtime.is_file(path)
    }

    fn resolve_module_name(&mut self, specifier: &str, containing_file: &Path) -> Option<PathBuf> {
        let dir = containing_file.parent().unwrap_or(Path::new(""));
        let resolutions = &mut self.cache.analysis_module_resolution_cache;
        if let Some(cached) = resolutions.get(dir, specifier) {
            return cached;
        }

        let resolved = self.resolver.resolve(specifier, containing_file);
        tracing::trace!(
            "Resolved '{}' from {} to {:?}",
            specifier,
            containing_file.display(),
            resolved
        );
        resolutions.insert(dir, specifier, resolved.clone());
        resolved
    }

    fn read_resource(&mut self, path: &Path) -> RuntimeResult<String> {
        self.runtime.read_to_string(path)
    }
}

/// Wraps a host so resource loading is a no-op returning empty text.
///
/// Templates and stylesheets play no part in dependency discovery and may
/// not exist yet while analysis runs.
pub struct NoResourceHost<H> {
    inner: H,
}

impl<H: CompilerHost> NoResourceHost<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: CompilerHost> CompilerHost for NoResourceHost<H> {
    fn get_source_file(&mut self, path: &Path) -> RuntimeResult<Arc<SourceFile>> {
        self.inner.get_source_file(path)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.inner.file_exists(path)
    }

    fn resolve_module_name(&mut self, specifier: &str, containing_file: &Path) -> Option<PathBuf> {
        self.inner.resolve_module_name(specifier, containing_file)
    }

    fn read_resource(&mut self, _path: &Path) -> RuntimeResult<String> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_utils::TestRuntime;
    use pkgr_config::CompilerOptions;

    #[test]
    fn resolutions_are_memoized() {
        let runtime = TestRuntime::with_files("/repo", &[("src/a.ts", ""), ("src/b.ts", "")]);
        let config = TsConfig::new(Vec::new(), CompilerOptions::default());
        let mut cache = EntryPointCache::new();
        let mut host = CachedCompilerHost::new(&config, &mut cache, &runtime);

        let from = Path::new("/repo/src/a.ts");
        assert_eq!(
            host.resolve_module_name("./b", from),
            Some(PathBuf::from("/repo/src/b.ts"))
        );
        assert_eq!(
            host.resolve_module_name("./b", from),
            Some(PathBuf::from("/repo/src/b.ts"))
        );

        let stats = cache.analysis_module_resolution_cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn no_resource_host_never_touches_the_runtime() {
        let runtime = TestRuntime::with_files("/repo", &[("src/a.component.html", "<p></p>")]);
        let config = TsConfig::new(Vec::new(), CompilerOptions::default());
        let mut cache = EntryPointCache::new();
        let mut host = NoResourceHost::new(CachedCompilerHost::new(&config, &mut cache, &runtime));

        let template = Path::new("/repo/src/a.component.html");
        assert_eq!(host.read_resource(template).unwrap(), "");
        assert_eq!(host.read_resource(Path::new("/repo/missing.css")).unwrap(), "");
        assert_eq!(runtime.total_reads(), 0);

        let mut plain = host.into_inner();
        assert_eq!(plain.read_resource(template).unwrap(), "<p></p>");
    }
}
