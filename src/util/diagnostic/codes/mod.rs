//! Error code registry
//!
//! Central table of every diagnostic the engine can produce.

pub mod e21xx;
pub mod e22xx;
pub mod e23xx;
pub mod e8xxx;

pub mod builder;
pub use builder::{render_template, DiagnosticBuilder};

use once_cell::sync::Lazy;

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Reflection,  // E21xx: reflection operands, queries, reification
    Injection,   // E22xx: injection operands, contexts, cloning
    Metaprogram, // E23xx: metaprogram evaluation
    Internal,    // E8xxx: internal compiler errors
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ErrorCategory::Reflection => write!(f, "Reflection"),
            ErrorCategory::Injection => write!(f, "Injection"),
            ErrorCategory::Metaprogram => write!(f, "Metaprogram"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}

/// Error code definition
#[derive(Debug, Clone, Copy)]
pub struct ErrorCodeDefinition {
    /// Code, e.g. "E2201"
    pub code: &'static str,
    /// Category
    pub category: ErrorCategory,
    /// Message template with `{param}` placeholders
    pub message_template: &'static str,
    /// Help template with `{param}` placeholders
    pub help_template: &'static str,
}

/// Full registry
static ERROR_CODES: Lazy<Vec<ErrorCodeDefinition>> = Lazy::new(|| {
    let mut codes: Vec<ErrorCodeDefinition> = Vec::new();

    // E21xx: reflection
    codes.extend_from_slice(e21xx::E21XX);
    // E22xx: injection
    codes.extend_from_slice(e22xx::E22XX);
    // E23xx: metaprogram evaluation
    codes.extend_from_slice(e23xx::E23XX);
    // E8xxx: internal compiler errors
    codes.extend_from_slice(e8xxx::E8XXX);

    codes
});

impl ErrorCodeDefinition {
    /// Find a definition by code
    pub fn find(code: &str) -> Option<&'static Self> {
        ERROR_CODES.iter().find(|c| c.code == code)
    }

    /// All definitions
    pub fn all() -> &'static [Self] {
        &ERROR_CODES
    }

    /// Definitions of one category
    pub fn by_category(category: ErrorCategory) -> impl Iterator<Item = &'static Self> {
        ERROR_CODES.iter().filter(move |c| c.category == category)
    }

    /// Start a builder for this code
    pub fn builder(&self) -> DiagnosticBuilder {
        DiagnosticBuilder::new(self.code, self.message_template).help(self.help_template)
    }
}
