//! Diagnostic data structures
//!
//! - `Diagnostic` carries a fully rendered `message` and `help`
//! - Errors and warnings are only created through `DiagnosticBuilder`, so
//!   every code that reaches a user is registered in the code table
//! - Notes carry no code; they hang off a primary diagnostic in `related`
//!
//! ```ignore
//! ErrorCodeDefinition::invalid_injection_operand("int")
//!     .at(span)
//!     .build();
//! ```

use crate::util::span::Span;
use serde::{Deserialize, Serialize};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Info,
    Hint,
}

impl Severity {
    /// Numeric weight, higher is more severe
    pub fn as_u8(&self) -> u8 {
        match self {
            Severity::Error => 5,
            Severity::Warning => 4,
            Severity::Note => 3,
            Severity::Info => 2,
            Severity::Hint => 1,
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A rendered diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Error code (empty for notes)
    pub code: String,
    /// Rendered message
    pub message: String,
    /// Rendered help text
    pub help: String,
    /// Location
    pub span: Option<Span>,
    /// Attached notes and related diagnostics
    pub related: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Create an error diagnostic
    ///
    /// `pub(crate)`: only `DiagnosticBuilder::build()` calls this.
    pub(crate) fn error(
        code: String,
        message: String,
        help: String,
        span: Option<Span>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message,
            help,
            span,
            related: Vec::new(),
        }
    }

    /// Create a warning diagnostic
    pub(crate) fn warning(
        code: String,
        message: String,
        help: String,
        span: Option<Span>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message,
            help,
            span,
            related: Vec::new(),
        }
    }

    /// Create a note; notes are free text and never carry a code
    pub fn note(
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            severity: Severity::Note,
            code: String::new(),
            message: message.into(),
            help: String::new(),
            span,
            related: Vec::new(),
        }
    }

    /// Attach related diagnostics
    pub(crate) fn with_related(
        mut self,
        related: Vec<Diagnostic>,
    ) -> Self {
        self.related = related;
        self
    }

    /// Messages of all attached notes
    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.related
            .iter()
            .filter(|d| d.severity == Severity::Note)
            .map(|d| d.message.as_str())
    }

    /// Is this an error
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl crate::util::span::SpannedError for Diagnostic {
    fn span(&self) -> Span {
        self.span.unwrap_or_default()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
        }
    }
}

impl std::error::Error for Diagnostic {}
