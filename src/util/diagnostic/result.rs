#![allow(clippy::result_large_err)]

//! Unified Result type
//!
//! Foreign errors are folded into the registry through E8001.

use super::codes::ErrorCodeDefinition;
use super::error::Diagnostic;

/// Unified result type
pub type Result<T, E = Diagnostic> = std::result::Result<T, E>;

/// Result extension
pub trait ResultExt<T, E> {
    fn with_context<F>(
        self,
        f: F,
    ) -> Result<T, Diagnostic>
    where
        F: FnOnce() -> String,
        E: std::fmt::Display;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn with_context<F>(
        self,
        f: F,
    ) -> Result<T, Diagnostic>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| ErrorCodeDefinition::internal_error(&format!("{}: {}", f(), err)).build())
    }
}
