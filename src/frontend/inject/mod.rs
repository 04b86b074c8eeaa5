//! Injection engine
//!
//! Applying an injection effect clones declarations from a fragment (or a
//! reflected declaration) into the injectee:
//!
//! 1. [`apply`] unwraps the effect value into a source declaration, its
//!    captures and modifiers, and checks that source and target contexts are
//!    compatible.
//! 2. [`Injector`] walks the source subtree and builds an isomorphic copy,
//!    rewriting references through the [`InjectionContext`] substitution
//!    maps.
//! 3. Field initializers and method bodies are queued on the context and
//!    transformed by [`deferred`] once the receiving class has its final
//!    shape.

mod apply;
mod context;
mod decls;
mod deferred;
mod transform;

#[cfg(test)]
mod tests;

pub use context::{
    Captures, ContextState, InjectedDef, InjectedDefKind, InjectionCapture, InjectionContext,
    TypedValue,
};

use crate::frontend::ast::DeclId;
use crate::frontend::sema::Session;

/// Declaration cloner bound to one injection context
///
/// The session is borrowed for allocation, lookup, diagnostics and
/// evaluation; the context is owned outside the session so both can be
/// borrowed at once.
pub struct Injector<'a> {
    pub(crate) sema: &'a mut Session,
    pub(crate) cx: &'a mut InjectionContext,
    /// Nesting of `inject_decl` calls; 1 for the declaration an injection
    /// names directly
    depth: usize,
}

impl<'a> Injector<'a> {
    pub fn new(
        sema: &'a mut Session,
        cx: &'a mut InjectionContext,
    ) -> Self {
        Self { sema, cx, depth: 0 }
    }

    /// Declaration that replaced `decl`, if it was injected in this context
    pub fn replacement(
        &self,
        decl: DeclId,
    ) -> Option<DeclId> {
        self.cx.get_decl_replacement(decl)
    }
}
