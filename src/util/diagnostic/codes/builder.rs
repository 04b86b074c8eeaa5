//! Template-driven diagnostic builder
//!
//! Message and help templates carry `{param}` placeholders that are filled
//! from named parameters when the diagnostic is built.

use crate::util::diagnostic::{Diagnostic, Severity};
use crate::util::span::Span;
use std::collections::HashSet;

/// Diagnostic builder (template parameters, span, notes)
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    code: &'static str,
    message_template: &'static str,
    help_template: &'static str,
    severity: Severity,
    params: Vec<(&'static str, String)>,
    span: Option<Span>,
    related: Vec<Diagnostic>,
}

impl DiagnosticBuilder {
    /// Create a builder for an error
    pub fn new(
        code: &'static str,
        template: &'static str,
    ) -> Self {
        Self {
            code,
            message_template: template,
            help_template: "",
            severity: Severity::Error,
            params: Vec::new(),
            span: None,
            related: Vec::new(),
        }
    }

    /// Set the help template
    pub fn help(
        mut self,
        template: &'static str,
    ) -> Self {
        self.help_template = template;
        self
    }

    /// Downgrade to a warning
    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    /// Add a template parameter
    pub fn param(
        mut self,
        key: &'static str,
        value: impl Into<String>,
    ) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Set the location
    #[inline]
    pub fn at(
        mut self,
        span: Span,
    ) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach related diagnostics
    #[inline]
    pub fn with_related(
        mut self,
        related: Vec<Diagnostic>,
    ) -> Self {
        self.related = related;
        self
    }

    /// Attach a single note
    pub fn note(
        mut self,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        self.related.push(Diagnostic::note(message, span));
        self
    }

    /// Build the diagnostic
    ///
    /// A template placeholder without a parameter is a bug in the caller;
    /// it yields an E8001 diagnostic instead of a half-rendered message.
    pub fn build(&self) -> Diagnostic {
        let missing = self.missing_params();
        if !missing.is_empty() {
            tracing::error!(code = self.code, ?missing, "diagnostic template parameters missing");
            let message = format!(
                "Internal diagnostic error: missing template parameter(s) for '{}'. template='{}', missing={:?}",
                self.code, self.message_template, missing
            );
            let help = "Please report this issue".to_string();
            return Diagnostic::error("E8001".to_string(), message, help, self.span)
                .with_related(self.related.clone());
        }

        let message = render_template(self.message_template, &self.params);
        let help = render_template(self.help_template, &self.params);

        let diagnostic = match self.severity {
            Severity::Warning => {
                Diagnostic::warning(self.code.to_string(), message, help, self.span)
            }
            _ => Diagnostic::error(self.code.to_string(), message, help, self.span),
        };

        if self.related.is_empty() {
            diagnostic
        } else {
            diagnostic.with_related(self.related.clone())
        }
    }

    /// Placeholders in either template that have no parameter
    fn missing_params(&self) -> Vec<String> {
        let keys: HashSet<&'static str> = self.params.iter().map(|(k, _)| *k).collect();
        placeholders(self.message_template)
            .into_iter()
            .chain(placeholders(self.help_template))
            .filter(|key| !keys.contains(key.as_str()))
            .collect()
    }
}

/// Extract `{name}` placeholders from a template
fn placeholders(template: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '{' {
            continue;
        }
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == '}' {
                if !key.is_empty() {
                    found.push(key.clone());
                }
                break;
            }
            key.push(c);
        }
    }
    found
}

/// Substitute `{name}` placeholders
pub fn render_template(
    template: &str,
    params: &[(&'static str, String)],
) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}
