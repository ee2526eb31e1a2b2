//! Diagnostics data model.
//!
//! A diagnostic is a positioned message produced by validation. Hosts render it as an error
//! marker through an [`AnnotationSink`](crate::AnnotationSink).

use crate::annotations::Span;

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Information,
}

/// A single positioned diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Character offset the diagnostic points at.
    pub offset: usize,
    /// Zero-based line containing `offset`.
    pub line: usize,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub severity: DiagnosticSeverity,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(offset: usize, line: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            line,
            message: message.into(),
            severity: DiagnosticSeverity::Error,
        }
    }

    /// Point-anchored span for annotation sinks.
    pub fn span(&self) -> Span {
        Span::new(self.offset, 0)
    }
}
