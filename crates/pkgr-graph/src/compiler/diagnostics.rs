//! Compiler diagnostics and their text formatting.

use std::fmt;
use std::path::{Path, PathBuf};

use super::syntax::line_column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Warning => write!(f, "warning"),
        }
    }
}

/// A problem reported by a compiler service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: Option<String>,
    pub file: Option<PathBuf>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code: None,
            file: None,
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            ..Self::error(message)
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a file and, when `offset` is known, the position inside `source`.
    pub fn in_file(mut self, file: &Path, source: &str, offset: Option<usize>) -> Self {
        self.file = Some(file.to_path_buf());
        if let Some(offset) = offset {
            let (line, column) = line_column(source, offset);
            self.line = Some(line);
            self.column = Some(column);
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}", file.display())?;
            if let (Some(line), Some(column)) = (self.line, self.column) {
                write!(f, "({},{})", line, column)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{}", self.category)?;
        if let Some(code) = &self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// One diagnostic per line.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_location_code_and_message() {
        let diagnostic = Diagnostic::error("Cannot find module './missing'")
            .with_code("unresolved-import")
            .in_file(Path::new("/repo/src/index.ts"), "\nimport './missing';", Some(8));

        assert_eq!(
            diagnostic.to_string(),
            "/repo/src/index.ts(2,8): error[unresolved-import]: Cannot find module './missing'"
        );
    }

    #[test]
    fn formats_without_file() {
        assert_eq!(Diagnostic::warning("odd").to_string(), "warning: odd");
    }

    #[test]
    fn joins_multiple_diagnostics() {
        let text = format_diagnostics(&[Diagnostic::error("first"), Diagnostic::error("second")]);
        assert_eq!(text, "error: first\nerror: second");
    }
}
