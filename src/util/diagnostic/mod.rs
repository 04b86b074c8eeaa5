//! Unified diagnostics
//!
//! - [`error`] - data structures (Diagnostic, Severity)
//! - [`codes`] - error code registry and builder
//! - [`sink`] - diagnostic collection
//! - [`emitter`] - text and JSON rendering
//! - [`result`] - unified Result type

pub mod codes;
pub mod emitter;
pub mod error;
pub mod result;
pub mod sink;

pub use codes::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition};
pub use emitter::{JsonEmitter, TextEmitter};
pub use error::{Diagnostic, Severity};
pub use result::{Result, ResultExt};
pub use sink::DiagnosticSink;
