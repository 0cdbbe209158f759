//! Module resolution for the analysis host.
//!
//! Relative specifiers resolve against the importing file. Non-relative
//! specifiers resolve only through `compilerOptions.paths`; anything else is
//! an external package and stays unresolved.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use pkgr_config::TsConfig;

use crate::runtime::Runtime;

/// Extensions tried, in order, when a candidate path has no file on disk.
pub const EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "mts", "cts", "js", "jsx", "mjs"];

/// Relative specifiers start with a dot (`./x`, `../x`, `.`).
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// Match `specifier` against a `paths` pattern with at most one `*`.
///
/// Returns the text captured by the wildcard (empty for exact patterns).
pub fn match_pattern<'s>(pattern: &str, specifier: &'s str) -> Option<&'s str> {
    match pattern.split_once('*') {
        None => (pattern == specifier).then_some(""),
        Some((prefix, suffix)) => {
            let fits = specifier.len() >= prefix.len() + suffix.len()
                && specifier.starts_with(prefix)
                && specifier.ends_with(suffix);
            fits.then(|| &specifier[prefix.len()..specifier.len() - suffix.len()])
        }
    }
}

pub struct ModuleResolver<'a> {
    ts_config: &'a TsConfig,
    runtime: &'a dyn Runtime,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(ts_config: &'a TsConfig, runtime: &'a dyn Runtime) -> Self {
        Self { ts_config, runtime }
    }

    /// Resolve `specifier` imported from `containing_file` to a source file.
    pub fn resolve(&self, specifier: &str, containing_file: &Path) -> Option<PathBuf> {
        if is_relative(specifier) || Path::new(specifier).is_absolute() {
            let dir = containing_file.parent().unwrap_or(Path::new(""));
            return self.resolve_file_or_directory(&dir.join(specifier).clean());
        }

        self.path_mapping_candidates(specifier)
            .into_iter()
            .find_map(|candidate| self.resolve_file_or_directory(&candidate))
    }

    /// Candidate locations from `paths`.
    ///
    /// An exact key wins; otherwise the wildcard pattern with the longest
    /// prefix is used.
    fn path_mapping_candidates(&self, specifier: &str) -> Vec<PathBuf> {
        let paths = &self.ts_config.options.paths;

        let selected = match paths.get(specifier) {
            Some(targets) if !specifier.contains('*') => Some((targets, "")),
            _ => paths
                .iter()
                .filter(|(pattern, _)| pattern.contains('*'))
                .filter_map(|(pattern, targets)| {
                    match_pattern(pattern, specifier).map(|captured| (pattern, targets, captured))
                })
                .max_by_key(|(pattern, _, _)| pattern.find('*').unwrap_or(0))
                .map(|(_, targets, captured)| (targets, captured)),
        };

        let Some((targets, captured)) = selected else {
            return Vec::new();
        };

        let base = match self.ts_config.paths_base() {
            Some(base) => base.to_path_buf(),
            None => self.runtime.get_cwd().unwrap_or_default(),
        };

        targets
            .iter()
            .map(|target| base.join(target.replacen('*', captured, 1)).clean())
            .collect()
    }

    fn resolve_file_or_directory(&self, candidate: &Path) -> Option<PathBuf> {
        if self.runtime.is_file(candidate) {
            return Some(candidate.to_path_buf());
        }

        if let Some(found) = self.with_extensions(candidate) {
            return Some(found);
        }

        EXTENSIONS
            .iter()
            .map(|ext| candidate.join(format!("index.{ext}")))
            .find(|index| self.runtime.is_file(index))
    }

    fn with_extensions(&self, candidate: &Path) -> Option<PathBuf> {
        EXTENSIONS.iter().find_map(|ext| {
            let mut name = OsString::from(candidate.as_os_str());
            name.push(".");
            name.push(ext);
            let path = PathBuf::from(name);
            self.runtime.is_file(&path).then_some(path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_utils::TestRuntime;
    use pkgr_config::CompilerOptions;

    fn config(paths: &[(&str, &str)]) -> TsConfig {
        let mut options = CompilerOptions::default();
        for (pattern, target) in paths {
            options.add_path_mapping(*pattern, *target);
        }
        TsConfig::new(Vec::new(), options).with_config_dir("/repo")
    }

    #[test]
    fn matches_wildcard_patterns() {
        assert_eq!(match_pattern("@lib/*", "@lib/core/testing"), Some("core/testing"));
        assert_eq!(match_pattern("*.css", "theme.css"), Some("theme"));
        assert_eq!(match_pattern("@lib/core", "@lib/core"), Some(""));
        assert_eq!(match_pattern("@lib/core", "@lib/core2"), None);
        assert_eq!(match_pattern("@lib/*", "@other/x"), None);
    }

    #[test]
    fn resolves_relative_with_extensions_and_index() {
        let runtime = TestRuntime::with_files(
            "/repo",
            &[
                ("src/util.service.ts", ""),
                ("src/widgets/index.ts", ""),
                ("src/types.d.ts", ""),
            ],
        );
        let config = config(&[]);
        let resolver = ModuleResolver::new(&config, &runtime);
        let from = Path::new("/repo/src/index.ts");

        assert_eq!(
            resolver.resolve("./util.service", from),
            Some(PathBuf::from("/repo/src/util.service.ts"))
        );
        assert_eq!(
            resolver.resolve("./widgets", from),
            Some(PathBuf::from("/repo/src/widgets/index.ts"))
        );
        assert_eq!(
            resolver.resolve("./types", from),
            Some(PathBuf::from("/repo/src/types.d.ts"))
        );
        assert_eq!(resolver.resolve("./missing", from), None);
    }

    #[test]
    fn resolves_through_paths() {
        let runtime = TestRuntime::with_files(
            "/repo",
            &[
                ("core/src/public-api.ts", ""),
                ("libs/forms/index.ts", ""),
                ("custom/forms.ts", ""),
            ],
        );
        let config = config(&[
            ("@lib/core", "/repo/core/src/public-api.ts"),
            ("@lib/*", "libs/*"),
            ("@lib/forms", "custom/forms"),
        ]);
        let resolver = ModuleResolver::new(&config, &runtime);
        let from = Path::new("/repo/app/main.ts");

        assert_eq!(
            resolver.resolve("@lib/core", from),
            Some(PathBuf::from("/repo/core/src/public-api.ts"))
        );
        // Exact key beats the wildcard
        assert_eq!(
            resolver.resolve("@lib/forms", from),
            Some(PathBuf::from("/repo/custom/forms.ts"))
        );
        assert_eq!(resolver.resolve("rxjs", from), None);
    }

    #[test]
    fn falls_back_to_later_targets() {
        let runtime = TestRuntime::with_files("/repo", &[("fallback/a.ts", "")]);
        let config = config(&[("@lib/a", "first/a"), ("@lib/a", "fallback/a")]);
        let resolver = ModuleResolver::new(&config, &runtime);

        assert_eq!(
            resolver.resolve("@lib/a", Path::new("/repo/main.ts")),
            Some(PathBuf::from("/repo/fallback/a.ts"))
        );
    }
}
