//! E22xx: injection operands, contexts and cloning

use super::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition};

const E2201: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2201",
    category: ErrorCategory::Injection,
    message_template: "invalid injection operand of type '{ty}'",
    help_template: "only fragments and reflections of declarations can be injected",
};

const E2202: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2202",
    category: ErrorCategory::Injection,
    message_template: "cannot inject {what} into {target}",
    help_template: "class members can only be injected into classes, namespace members only into namespaces",
};

const E2203: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2203",
    category: ErrorCategory::Injection,
    message_template: "no member named '{name}' in '{class}'",
    help_template: "",
};

const E2204: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2204",
    category: ErrorCategory::Injection,
    message_template: "reference to '{name}' cannot be resolved at the point of injection",
    help_template: "the referenced declaration belongs to a fragment but was not injected",
};

const E2205: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2205",
    category: ErrorCategory::Injection,
    message_template: "name of injected declaration '{name}' does not match its source",
    help_template: "",
};

const E2206: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2206",
    category: ErrorCategory::Injection,
    message_template: "use of undeclared identifier '{name}'",
    help_template: "",
};

const E2207: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2207",
    category: ErrorCategory::Injection,
    message_template: "field '{name}' has incomplete type '{ty}'",
    help_template: "",
};

const E2208: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2208",
    category: ErrorCategory::Injection,
    message_template: "'{name}' is not virtual and cannot be declared pure",
    help_template: "",
};

/// E22xx list
pub static E22XX: &[ErrorCodeDefinition] =
    &[E2201, E2202, E2203, E2204, E2205, E2206, E2207, E2208];

impl ErrorCodeDefinition {
    /// E2201 operand is neither a fragment nor a reachable reflection
    pub fn invalid_injection_operand(ty: &str) -> DiagnosticBuilder {
        E2201.builder().param("ty", ty)
    }

    /// E2202 source and target contexts are incompatible
    pub fn invalid_injection(
        what: &str,
        target: &str,
    ) -> DiagnosticBuilder {
        E2202.builder().param("what", what).param("target", target)
    }

    /// E2203 member lookup failed
    pub fn no_member_named(
        name: &str,
        class: &str,
    ) -> DiagnosticBuilder {
        E2203.builder().param("name", name).param("class", class)
    }

    /// E2204 reference into a fragment with no injected counterpart
    pub fn unresolved_injected_reference(name: &str) -> DiagnosticBuilder {
        E2204.builder().param("name", name)
    }

    /// E2205 name rebuild changed emptiness
    pub fn injected_name_mismatch(name: &str) -> DiagnosticBuilder {
        E2205.builder().param("name", name)
    }

    /// E2206 lookup of an unqualified name failed
    pub fn undeclared_identifier(name: &str) -> DiagnosticBuilder {
        E2206.builder().param("name", name)
    }

    /// E2207 injected field cannot be laid out
    pub fn incomplete_field_type(
        name: &str,
        ty: &str,
    ) -> DiagnosticBuilder {
        E2207.builder().param("name", name).param("ty", ty)
    }

    /// E2208 injected method marked pure but not virtual
    pub fn pure_non_virtual(name: &str) -> DiagnosticBuilder {
        E2208.builder().param("name", name)
    }
}
