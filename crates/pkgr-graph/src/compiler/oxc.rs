//! Syntax-level compiler service built on the OXC parser.
//!
//! Builds a program the way a TypeScript compiler would collect its files:
//! start from the root names and follow every import/export the host can
//! resolve. Semantic checking is limited to what OXC reports (parse errors and
//! early syntax errors) plus unresolvable relative imports.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use path_clean::PathClean;
use rustc_hash::FxHashSet;
use serde_json::Value;

use super::diagnostics::Diagnostic;
use super::resolve::is_relative;
use super::syntax::{SourceFile, unquote};
use super::{CompilerService, CreateProgram, Program};
use crate::Result;

const JS_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs"];

/// Default [`CompilerService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcCompilerService;

impl OxcCompilerService {
    pub fn new() -> Self {
        Self
    }
}

/// Program produced by [`OxcCompilerService`].
#[derive(Debug, Default)]
pub struct OxcProgram {
    source_files: Vec<Arc<SourceFile>>,
    diagnostics: Vec<Diagnostic>,
}

impl Program for OxcProgram {
    fn semantic_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.clone()
    }

    fn source_files(&self) -> &[Arc<SourceFile>] {
        &self.source_files
    }
}

fn is_js_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| JS_EXTENSIONS.contains(&ext))
}

impl CompilerService for OxcCompilerService {
    type Program = OxcProgram;

    fn create_program(&self, request: CreateProgram<'_>) -> Result<OxcProgram> {
        let CreateProgram {
            root_names,
            options,
            host,
        } = request;

        let allow_js = options
            .extra
            .get("allowJs")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut program = OxcProgram::default();
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut queue: VecDeque<PathBuf> = VecDeque::new();

        for root in root_names {
            if !host.file_exists(root) {
                program.diagnostics.push(
                    Diagnostic::error(format!("File '{}' not found.", root.display()))
                        .with_code("missing-root"),
                );
                continue;
            }
            if seen.insert(root.clone()) {
                queue.push_back(root.clone());
            }
        }

        while let Some(path) = queue.pop_front() {
            let file = host.get_source_file(&path)?;
            program.diagnostics.extend(file.diagnostics.iter().cloned());

            let dir = path.parent().unwrap_or(Path::new(""));
            for url in &file.resource_urls {
                let resource = dir.join(url).clean();
                if let Err(e) = host.read_resource(&resource) {
                    program.diagnostics.push(
                        Diagnostic::error(format!("Could not load resource: {}", e))
                            .with_code("resource")
                            .in_file(&path, &file.text, None),
                    );
                }
            }

            for statement in &file.statements {
                let Some(text) = statement.module_specifier_text(&file.text) else {
                    continue;
                };
                let specifier = unquote(text);

                match host.resolve_module_name(specifier, &path) {
                    Some(resolved) => {
                        if is_js_file(&resolved) && !allow_js {
                            continue;
                        }
                        if seen.insert(resolved.clone()) {
                            queue.push_back(resolved);
                        }
                    }
                    None if is_relative(specifier) => {
                        let offset = statement.module_specifier.map(|span| span.start as usize);
                        program.diagnostics.push(
                            Diagnostic::error(format!("Cannot find module '{}'.", specifier))
                                .with_code("unresolved-import")
                                .in_file(&path, &file.text, offset),
                        );
                    }
                    None => {}
                }
            }

            program.source_files.push(file);
        }

        tracing::trace!(
            "Built program with {} source files and {} diagnostics",
            program.source_files.len(),
            program.diagnostics.len()
        );

        Ok(program)
    }
}
