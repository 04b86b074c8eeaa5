//! E8xxx: internal compiler errors

use super::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition};

const E8001: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E8001",
    category: ErrorCategory::Internal,
    message_template: "Internal compiler error: {message}",
    help_template: "Please report this issue",
};

const E8101: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E8101",
    category: ErrorCategory::Internal,
    message_template: "declarations of kind '{kind}' cannot be injected",
    help_template: "",
};

/// E8xxx list
pub static E8XXX: &[ErrorCodeDefinition] = &[E8001, E8101];

impl ErrorCodeDefinition {
    /// E8001 internal compiler error
    pub fn internal_error(message: &str) -> DiagnosticBuilder {
        E8001.builder().param("message", message)
    }

    /// E8101 declaration kind not handled by the clone dispatcher
    pub fn unsupported_injection_kind(kind: &str) -> DiagnosticBuilder {
        E8101.builder().param("kind", kind)
    }
}
