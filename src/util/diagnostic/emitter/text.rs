//! Plain text diagnostic renderer
//!
//! ```text
//! error[E2101]: cannot reify invalid reflection
//!  --> 4:12
//!   = note: custom error message
//! ```

use crate::util::diagnostic::Diagnostic;

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Show help text
    pub show_help: bool,
    /// Show notes and related diagnostics
    pub show_related: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            show_help: true,
            show_related: true,
        }
    }
}

/// Text renderer
#[derive(Debug, Clone, Default)]
pub struct TextEmitter {
    config: EmitterConfig,
}

impl TextEmitter {
    /// Create a renderer with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with a custom configuration
    pub fn with_config(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// Render one diagnostic
    pub fn render(
        &self,
        diagnostic: &Diagnostic,
    ) -> String {
        let mut output = String::new();
        self.render_internal(diagnostic, 0, &mut output);
        output
    }

    /// Render several diagnostics
    pub fn render_all(
        &self,
        diagnostics: &[Diagnostic],
    ) -> String {
        diagnostics.iter().map(|d| self.render(d)).collect()
    }

    fn render_internal(
        &self,
        diagnostic: &Diagnostic,
        depth: usize,
        output: &mut String,
    ) {
        if depth == 0 {
            output.push_str(&format!("{}\n", diagnostic));
        } else {
            output.push_str(&format!("  = {}: {}\n", diagnostic.severity, diagnostic.message));
        }

        if let Some(span) = diagnostic.span.filter(|s| !s.is_dummy()) {
            if depth == 0 {
                output.push_str(&format!(" --> {}\n", span.start));
            }
        }

        if self.config.show_help && depth == 0 && !diagnostic.help.is_empty() {
            output.push_str(&format!("  = help: {}\n", diagnostic.help));
        }

        if self.config.show_related {
            for related in &diagnostic.related {
                self.render_internal(related, depth + 1, output);
            }
        }
    }
}
