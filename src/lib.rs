//! metacxx
//!
//! Compile-time code injection for a C++-like frontend: reflections,
//! source-code fragments with captured values, metaprograms evaluated during
//! translation, and the injection engine that clones fragment and reflected
//! declarations into classes and namespaces.
//!
//! # Example
//!
//! ```rust
//! use metacxx::frontend::ast::{DeclName, Expr, TagKind, Type};
//! use metacxx::Session;
//! use metacxx::util::span::Span;
//!
//! let mut session = Session::new();
//! let s = session.start_class(TagKind::Struct, "S", Span::dummy());
//!
//! // consteval -> fragment struct { int y = 3; };
//! let frag = session.start_fragment(Span::dummy());
//! let content = session.start_class(TagKind::Struct, DeclName::Empty, Span::dummy());
//! session.add_field("y", Type::Int, Some(Expr::int(3)), Span::dummy());
//! session.finish_class(content);
//! let fragment = session.finish_fragment(frag, content, Span::dummy());
//! session.injection_decl(fragment, Span::dummy());
//!
//! session.finish_class(s);
//! assert!(session.ast().lookup_member(s, "y").is_some());
//! assert!(session.diagnostics().is_empty());
//! ```

#![warn(rust_2018_idioms)]

pub mod frontend;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use frontend::inject::{InjectionContext, Injector};
pub use frontend::sema::Session;
pub use util::config::EngineConfig;
pub use util::diagnostic::{Diagnostic, DiagnosticSink, Severity};

use std::path::Path;
use tracing::debug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create a session configured from a TOML file
///
/// A missing file yields the default configuration.
pub fn session_from_config_file(path: &Path) -> Result<Session> {
    let config = util::config::load_config_or_default(path)
        .with_context(|| format!("Failed to configure session from {}", path.display()))?;
    debug!(path = %path.display(), "session configured");
    Ok(Session::with_config(config))
}

/// Render the diagnostics collected so far in the session's configured
/// format
pub fn render_diagnostics(session: &Session) -> String {
    util::diagnostic::emitter::render(
        &session.config().diagnostics,
        session.diagnostics().diagnostics(),
    )
}
