//! Diagnostic collection
//!
//! Nothing in the engine unwinds on a user error. Failures are recorded
//! here and the offending declaration is marked invalid.

use super::error::{Diagnostic, Severity};

/// Ordered collection of emitted diagnostics
#[derive(Debug, Default, Clone)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn emit(
        &mut self,
        diagnostic: Diagnostic,
    ) {
        match diagnostic.severity {
            Severity::Error => tracing::warn!("{}", diagnostic),
            _ => tracing::debug!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    /// All diagnostics in emission order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of errors
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Any errors recorded
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Diagnostics carrying the given code
    pub fn with_code<'a>(
        &'a self,
        code: &'a str,
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    /// Number of diagnostics recorded so far (used as a checkpoint)
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Nothing recorded
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the sink empty
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::diagnostic::ErrorCodeDefinition;

    #[test]
    fn test_counts_errors_only() {
        let mut sink = DiagnosticSink::new();
        sink.emit(ErrorCodeDefinition::invalid_reification().build());
        sink.emit(Diagnostic::note("context", None));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.has_errors());
        assert_eq!(sink.with_code("E2101").count(), 1);
    }

    #[test]
    fn test_take_empties() {
        let mut sink = DiagnosticSink::new();
        sink.emit(ErrorCodeDefinition::expr_not_constant().build());
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }
}
