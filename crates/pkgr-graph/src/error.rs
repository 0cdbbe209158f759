use thiserror::Error;

use crate::compiler::{Diagnostic, format_diagnostics};
use crate::runtime::RuntimeError;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised while analysing entry points or ordering the graph.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The compiler reported diagnostics for an entry point's sources.
    ///
    /// Displays as the formatted diagnostics text, unchanged.
    #[error("{message}")]
    SemanticAnalysis {
        /// Entry point whose program failed to validate.
        module_id: String,
        /// Formatted diagnostics text.
        message: String,
        /// The diagnostics themselves.
        diagnostics: Vec<Diagnostic>,
    },

    /// An entry point imports its own module id.
    #[error("Entry point {module_id} has a circular dependency on itself.")]
    CircularDependency {
        /// Offending entry point.
        module_id: String,
    },

    /// Entry points depend on each other in a loop.
    #[error("Entry points have a circular dependency: {}", .cycle.join(" -> "))]
    DependencyCycle {
        /// Module ids along the cycle, first id repeated at the end.
        cycle: Vec<String>,
    },

    /// Exclusion settings produced an unusable file pattern.
    #[error("Invalid source exclusion pattern: {0}")]
    ExclusionPattern(#[from] regex::Error),

    /// Reading sources failed.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl AnalysisError {
    /// Build a [`AnalysisError::SemanticAnalysis`] using `message` as the display text.
    pub fn semantic(
        module_id: impl Into<String>,
        message: impl Into<String>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self::SemanticAnalysis {
            module_id: module_id.into(),
            message: message.into(),
            diagnostics,
        }
    }

    /// Same as [`AnalysisError::semantic`] with the default diagnostics formatting.
    pub fn from_diagnostics(module_id: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        let message = format_diagnostics(&diagnostics);
        Self::semantic(module_id, message, diagnostics)
    }

    /// Module id the error is about, when it concerns a single entry point.
    pub fn module_id(&self) -> Option<&str> {
        match self {
            Self::SemanticAnalysis { module_id, .. } | Self::CircularDependency { module_id } => {
                Some(module_id)
            }
            Self::DependencyCycle { .. } | Self::ExclusionPattern(_) | Self::Runtime(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_dependency_names_the_entry_point() {
        let err = AnalysisError::CircularDependency {
            module_id: "@lib/core".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Entry point @lib/core has a circular dependency on itself."
        );
        assert_eq!(err.module_id(), Some("@lib/core"));
    }

    #[test]
    fn semantic_analysis_displays_diagnostics_verbatim() {
        let err = AnalysisError::from_diagnostics(
            "D",
            vec![Diagnostic::error("first"), Diagnostic::error("second")],
        );
        assert_eq!(err.to_string(), "error: first\nerror: second");
    }

    #[test]
    fn dependency_cycle_lists_the_path() {
        let err = AnalysisError::DependencyCycle {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(
            err.to_string(),
            "Entry points have a circular dependency: A -> B -> A"
        );
        assert_eq!(err.module_id(), None);
    }
}
