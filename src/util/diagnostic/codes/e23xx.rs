//! E23xx: metaprogram evaluation

use super::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition};

const E2301: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2301",
    category: ErrorCategory::Metaprogram,
    message_template: "metaprogram is not a constant expression",
    help_template: "",
};

const E2302: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2302",
    category: ErrorCategory::Metaprogram,
    message_template: "{message}",
    help_template: "raised by __compiler_error",
};

const E2303: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2303",
    category: ErrorCategory::Metaprogram,
    message_template: "metaclass generator for '{class}' could not be applied",
    help_template: "a metaclass generator must be a function taking one reflection",
};

const E2304: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2304",
    category: ErrorCategory::Metaprogram,
    message_template: "expression is not a constant expression",
    help_template: "",
};

/// E23xx list
pub static E23XX: &[ErrorCodeDefinition] = &[E2301, E2302, E2303, E2304];

impl ErrorCodeDefinition {
    /// E2301 metaprogram evaluation failed
    pub fn metaprogram_not_constant() -> DiagnosticBuilder {
        E2301.builder()
    }

    /// E2302 user-triggered compile-time error
    pub fn user_defined_error(message: &str) -> DiagnosticBuilder {
        E2302.builder().param("message", message)
    }

    /// E2303 metaclass generator call could not be built
    pub fn metaclass_generator_failed(class: &str) -> DiagnosticBuilder {
        E2303.builder().param("class", class)
    }

    /// E2304 ordinary constant evaluation failed
    pub fn expr_not_constant() -> DiagnosticBuilder {
        E2304.builder()
    }
}
