//! Syntax view of a single source file.
//!
//! OXC ASTs borrow from an arena allocator, so they cannot outlive the parse
//! call. `SourceFile` keeps the owned facts the analysis needs: the text, the
//! top-level import/export statements with the span of their module
//! specifier, referenced resource URLs, and any syntax errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use oxc_allocator::Allocator;
use oxc_ast::ast::{ArrayExpressionElement, Expression, ModuleDeclaration, ObjectProperty};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::SemanticBuilder;
use oxc_span::{SourceType, Span};

use super::diagnostics::Diagnostic;

/// Object keys whose string values point at component resources.
const RESOURCE_KEYS: &[&str] = &["templateUrl", "styleUrl", "styleUrls"];

/// Declaration-only file extensions.
const DECLARATION_SUFFIXES: &[&str] = &[".d.ts", ".d.mts", ".d.cts"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Import,
    Export,
}

/// A top-level import or export statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleStatement {
    pub kind: StatementKind,
    /// Span of the specifier literal, quotes included. `None` for exports
    /// without a `from` clause.
    pub module_specifier: Option<Span>,
}

impl ModuleStatement {
    /// Raw specifier text as written, quotes included.
    pub fn module_specifier_text<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.module_specifier
            .and_then(|span| source.get(span.start as usize..span.end as usize))
    }
}

/// Parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: PathBuf,
    pub text: Arc<str>,
    pub statements: Vec<ModuleStatement>,
    pub resource_urls: Vec<String>,
    /// Parse and syntax errors found in this file.
    pub diagnostics: Vec<Diagnostic>,
}

impl SourceFile {
    /// Parse `text` as the contents of `file_name`.
    ///
    /// Never fails: syntax problems are recorded in `diagnostics` and the
    /// statements recovered so far are kept.
    pub fn parse(file_name: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        let file_name = file_name.into();
        let text: Arc<str> = text.into();

        let source_type = SourceType::from_path(&file_name).unwrap_or_else(|_| SourceType::ts());
        let allocator = Allocator::default();
        let ParserReturn {
            program,
            errors,
            panicked,
            ..
        } = Parser::new(&allocator, &text, source_type).parse();

        let mut diagnostics: Vec<Diagnostic> = errors
            .iter()
            .map(|error| {
                let offset = error
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.first())
                    .map(|label| label.offset());
                Diagnostic::error(error.message.to_string())
                    .with_code("syntax")
                    .in_file(&file_name, &text, offset)
            })
            .collect();

        if !panicked {
            let semantic = SemanticBuilder::new()
                .with_check_syntax_error(true)
                .build(&program);
            diagnostics.extend(semantic.errors.iter().map(|error| {
                let offset = error
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.first())
                    .map(|label| label.offset());
                Diagnostic::error(error.message.to_string())
                    .with_code("semantic")
                    .in_file(&file_name, &text, offset)
            }));
        }

        let statements = program
            .body
            .iter()
            .filter_map(|stmt| stmt.as_module_declaration())
            .map(module_statement)
            .collect();

        let mut collector = ResourceUrlCollector::default();
        collector.visit_program(&program);

        Self {
            file_name,
            text,
            statements,
            resource_urls: collector.urls,
            diagnostics,
        }
    }

    /// True for `.d.ts` style declaration files.
    pub fn is_declaration_file(&self) -> bool {
        is_declaration_path(&self.file_name)
    }

    /// Specifiers of every import/export that has one, as written (quotes included).
    pub fn module_specifier_texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.statements
            .iter()
            .filter_map(|stmt| stmt.module_specifier_text(&self.text))
    }
}

/// Strip the surrounding quote characters of a specifier literal.
pub fn unquote(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '\'' | '"' | '`') => {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

pub fn is_declaration_path(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    DECLARATION_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn module_statement(decl: &ModuleDeclaration<'_>) -> ModuleStatement {
    let (kind, module_specifier) = match decl {
        ModuleDeclaration::ImportDeclaration(import) => {
            (StatementKind::Import, Some(import.source.span))
        }
        ModuleDeclaration::ExportAllDeclaration(all) => {
            (StatementKind::Export, Some(all.source.span))
        }
        ModuleDeclaration::ExportNamedDeclaration(named) => (
            StatementKind::Export,
            named.source.as_ref().map(|source| source.span),
        ),
        ModuleDeclaration::ExportDefaultDeclaration(_)
        | ModuleDeclaration::TSExportAssignment(_)
        | ModuleDeclaration::TSNamespaceExportDeclaration(_) => (StatementKind::Export, None),
    };

    ModuleStatement {
        kind,
        module_specifier,
    }
}

/// Collects resource URLs such as `templateUrl: './foo.html'`.
#[derive(Default)]
struct ResourceUrlCollector {
    urls: Vec<String>,
}

impl ResourceUrlCollector {
    fn collect(&mut self, value: &Expression<'_>) {
        match value {
            Expression::StringLiteral(lit) => self.urls.push(lit.value.to_string()),
            Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => {
                if let Some(quasi) = tpl.quasis.first() {
                    self.urls.push(quasi.value.raw.to_string());
                }
            }
            Expression::ArrayExpression(array) => {
                for element in &array.elements {
                    if let ArrayExpressionElement::StringLiteral(lit) = element {
                        self.urls.push(lit.value.to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

impl<'a> Visit<'a> for ResourceUrlCollector {
    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        if let Some(name) = prop.key.static_name() {
            if RESOURCE_KEYS.contains(&&*name) {
                self.collect(&prop.value);
            }
        }
        walk::walk_object_property(self, prop);
    }
}

/// 1-based line and column of a byte offset.
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
