//! Diagnostic emitters

pub mod json;
pub mod text;

pub use json::JsonEmitter;
pub use text::{EmitterConfig, TextEmitter};

use crate::util::config::{DiagnosticFormat, DiagnosticsConfig};
use crate::util::diagnostic::Diagnostic;

/// Render diagnostics in the configured format
pub fn render(
    config: &DiagnosticsConfig,
    diagnostics: &[Diagnostic],
) -> String {
    match config.format {
        DiagnosticFormat::Text => TextEmitter::with_config(EmitterConfig {
            show_related: config.show_notes,
            ..EmitterConfig::default()
        })
        .render_all(diagnostics),
        DiagnosticFormat::Json => JsonEmitter::render_all(diagnostics),
    }
}
