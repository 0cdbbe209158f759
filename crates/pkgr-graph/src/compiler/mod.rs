//! Compiler service boundary.
//!
//! The analysis never talks to a compiler directly. It asks a
//! [`CompilerService`] for a [`Program`] built from root files, options and a
//! [`CompilerHost`], then reads diagnostics and source files off the program.
//! [`OxcCompilerService`] is the built-in syntax-level implementation; tests
//! and embedders can supply their own.

mod diagnostics;
mod host;
mod oxc;
pub mod resolve;
mod syntax;

pub use diagnostics::{Diagnostic, DiagnosticCategory, format_diagnostics};
pub use host::{CachedCompilerHost, CompilerHost, NoResourceHost};
pub use oxc::{OxcCompilerService, OxcProgram};
pub use syntax::{ModuleStatement, SourceFile, StatementKind, is_declaration_path, unquote};

use std::path::PathBuf;
use std::sync::Arc;

use pkgr_config::CompilerOptions;

use crate::Result;

/// Inputs for [`CompilerService::create_program`].
pub struct CreateProgram<'a> {
    pub root_names: &'a [PathBuf],
    pub options: &'a CompilerOptions,
    pub host: &'a mut dyn CompilerHost,
}

/// A built program.
pub trait Program {
    /// Semantic diagnostics for the whole program. Empty means the sources are valid.
    fn semantic_diagnostics(&self) -> Vec<Diagnostic>;

    /// Every source file in the program, roots first.
    fn source_files(&self) -> &[Arc<SourceFile>];
}

/// External compiler used to validate sources and expose their syntax.
pub trait CompilerService {
    type Program: Program;

    fn create_program(&self, request: CreateProgram<'_>) -> Result<Self::Program>;

    fn format_diagnostics(&self, diagnostics: &[Diagnostic]) -> String {
        format_diagnostics(diagnostics)
    }
}
