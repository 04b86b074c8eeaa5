//! E21xx: reflection operands, queries and reification

use super::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition};

const E2101: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2101",
    category: ErrorCategory::Reflection,
    message_template: "cannot reify invalid reflection",
    help_template: "this reflection was created by __invalid_reflection",
};

const E2102: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2102",
    category: ErrorCategory::Reflection,
    message_template: "invalid reflection operand: {reason}",
    help_template: "reflexpr accepts a type-id, template-name, namespace-name or id-expression",
};

const E2103: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2103",
    category: ErrorCategory::Reflection,
    message_template: "query '{query}' cannot be applied to a reflection of {kind}",
    help_template: "",
};

const E2104: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2104",
    category: ErrorCategory::Reflection,
    message_template: "reflection of {kind} does not designate {expected}",
    help_template: "",
};

const E2105: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2105",
    category: ErrorCategory::Reflection,
    message_template: "'{text}' is not a valid identifier",
    help_template: "identifier splices must concatenate to a non-empty identifier",
};

const E2106: ErrorCodeDefinition = ErrorCodeDefinition {
    code: "E2106",
    category: ErrorCategory::Reflection,
    message_template: "splice operand is not a constant expression",
    help_template: "",
};

/// E21xx list
pub static E21XX: &[ErrorCodeDefinition] = &[E2101, E2102, E2103, E2104, E2105, E2106];

impl ErrorCodeDefinition {
    /// E2101 reifying an invalid reflection
    pub fn invalid_reification() -> DiagnosticBuilder {
        E2101.builder()
    }

    /// E2102 malformed reflection operand
    pub fn invalid_reflection_operand(reason: &str) -> DiagnosticBuilder {
        E2102.builder().param("reason", reason)
    }

    /// E2103 query category does not fit the reflected kind
    pub fn query_kind_mismatch(
        query: &str,
        kind: &str,
    ) -> DiagnosticBuilder {
        E2103.builder().param("query", query).param("kind", kind)
    }

    /// E2104 reflection used where another kind of entity is required
    pub fn reflection_not_designating(
        kind: &str,
        expected: &str,
    ) -> DiagnosticBuilder {
        E2104.builder().param("kind", kind).param("expected", expected)
    }

    /// E2105 identifier splice produced a bad identifier
    pub fn invalid_identifier_splice(text: &str) -> DiagnosticBuilder {
        E2105.builder().param("text", text)
    }

    /// E2106 splice operand failed to evaluate
    pub fn splice_not_constant() -> DiagnosticBuilder {
        E2106.builder()
    }
}
