//! Non-relative module specifiers of a program.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexSet;
use pkgr_config::AnalysisSettings;
use regex::Regex;

use crate::compiler::resolve::is_relative;
use crate::compiler::{SourceFile, is_declaration_path, unquote};
use crate::error::Result;

/// Specifiers found by [`ImportExtractor::extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedImports {
    /// Distinct non-relative specifiers in first-occurrence order.
    pub specifiers: IndexSet<String>,
    /// Files that passed the exclusion filter.
    pub files_scanned: usize,
}

/// Scans source files for import and export specifiers.
#[derive(Debug, Clone)]
pub struct ImportExtractor {
    excluded: Option<Regex>,
}

impl ImportExtractor {
    /// Build the exclusion filter: the vendor directory as a path segment and
    /// any generated-artifact marker anywhere in the path.
    pub fn new(settings: &AnalysisSettings) -> Result<Self> {
        let mut alternatives = Vec::with_capacity(settings.generated_markers.len() + 1);
        if !settings.vendor_dir.is_empty() {
            alternatives.push(format!(
                r"(?:^|[/\\]){}(?:[/\\]|$)",
                regex::escape(&settings.vendor_dir)
            ));
        }
        alternatives.extend(
            settings
                .generated_markers
                .iter()
                .filter(|marker| !marker.is_empty())
                .map(|marker| regex::escape(marker)),
        );

        let excluded = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&alternatives.join("|"))?)
        };

        Ok(Self { excluded })
    }

    /// Vendored, generated and declaration files take no part in linking.
    pub fn is_excluded(&self, path: &Path) -> bool {
        is_declaration_path(path)
            || self
                .excluded
                .as_ref()
                .is_some_and(|excluded| excluded.is_match(&path.to_string_lossy()))
    }

    pub fn extract(&self, source_files: &[Arc<SourceFile>]) -> ExtractedImports {
        let mut extracted = ExtractedImports::default();

        for file in source_files {
            if self.is_excluded(&file.file_name) {
                tracing::trace!("Skipping {}", file.file_name.display());
                continue;
            }
            extracted.files_scanned += 1;

            for text in file.module_specifier_texts() {
                let specifier = unquote(text);
                if !is_relative(specifier) {
                    extracted.specifiers.insert(specifier.to_string());
                }
            }
        }

        extracted
    }
}
