//! JSON diagnostic renderer
//!
//! Output follows the Language Server Protocol diagnostic shape.

use crate::util::diagnostic::{Diagnostic, Severity};
use crate::util::span::Span;
use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;

/// LSP severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "i32", try_from = "i32")]
pub enum LspDiagnosticSeverity {
    Error,
    Warning,
    Information,
    Hint,
}

impl From<LspDiagnosticSeverity> for i32 {
    fn from(val: LspDiagnosticSeverity) -> Self {
        match val {
            LspDiagnosticSeverity::Error => 1,
            LspDiagnosticSeverity::Warning => 2,
            LspDiagnosticSeverity::Information => 3,
            LspDiagnosticSeverity::Hint => 4,
        }
    }
}

impl TryFrom<i32> for LspDiagnosticSeverity {
    type Error = String;

    fn try_from(val: i32) -> Result<Self, String> {
        match val {
            1 => Ok(LspDiagnosticSeverity::Error),
            2 => Ok(LspDiagnosticSeverity::Warning),
            3 => Ok(LspDiagnosticSeverity::Information),
            4 => Ok(LspDiagnosticSeverity::Hint),
            other => Err(format!("invalid severity {}", other)),
        }
    }
}

/// LSP range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LspRange {
    pub start: LspPosition,
    pub end: LspPosition,
}

/// LSP position (0-indexed)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LspPosition {
    pub line: u32,
    pub character: u32,
}

/// LSP related information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspRelatedDiagnosticInformation {
    pub location: LspRange,
    pub message: String,
}

/// LSP diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LspDiagnostic {
    pub range: LspRange,
    pub severity: Option<LspDiagnosticSeverity>,
    pub code: Option<String>,
    pub source: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_information: Option<Vec<LspRelatedDiagnosticInformation>>,
}

/// JSON renderer
#[derive(Debug, Clone)]
pub struct JsonEmitter;

impl JsonEmitter {
    /// Render one diagnostic
    pub fn render(diagnostic: &Diagnostic) -> String {
        to_string_pretty(&Self::to_lsp_diagnostic(diagnostic)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Render several diagnostics as a JSON array
    pub fn render_all(diagnostics: &[Diagnostic]) -> String {
        let lsp: Vec<LspDiagnostic> = diagnostics.iter().map(Self::to_lsp_diagnostic).collect();
        to_string_pretty(&lsp).unwrap_or_else(|_| "[]".to_string())
    }

    fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> LspDiagnostic {
        let related: Vec<LspRelatedDiagnosticInformation> = diagnostic
            .related
            .iter()
            .map(|r| LspRelatedDiagnosticInformation {
                location: Self::span_to_range(r.span.as_ref().or(diagnostic.span.as_ref())),
                message: r.message.clone(),
            })
            .collect();

        LspDiagnostic {
            range: Self::span_to_range(diagnostic.span.as_ref()),
            severity: Some(match diagnostic.severity {
                Severity::Error => LspDiagnosticSeverity::Error,
                Severity::Warning => LspDiagnosticSeverity::Warning,
                Severity::Note | Severity::Info => LspDiagnosticSeverity::Information,
                Severity::Hint => LspDiagnosticSeverity::Hint,
            }),
            code: (!diagnostic.code.is_empty()).then(|| diagnostic.code.clone()),
            source: "metacxx".to_string(),
            message: diagnostic.message.clone(),
            related_information: (!related.is_empty()).then_some(related),
        }
    }

    fn span_to_range(span: Option<&Span>) -> LspRange {
        match span {
            Some(s) if !s.is_dummy() => LspRange {
                start: LspPosition {
                    line: s.start.line.saturating_sub(1) as u32,
                    character: s.start.column.saturating_sub(1) as u32,
                },
                end: LspPosition {
                    line: s.end.line.saturating_sub(1) as u32,
                    character: s.end.column.saturating_sub(1) as u32,
                },
            },
            _ => LspRange {
                start: LspPosition { line: 0, character: 0 },
                end: LspPosition { line: 0, character: 0 },
            },
        }
    }
}
