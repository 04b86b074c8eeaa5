//! Deferred definitions
//!
//! Field initializers and method bodies of injected class members are
//! transformed once the class has all of its members. Pending contexts are
//! replayed in two passes, every field initializer before any method body.

use super::{InjectedDef, InjectedDefKind, InjectionContext, Injector};
use crate::frontend::ast::{DeclId, DeclKind};
use crate::frontend::sema::Session;
use tracing::{debug, trace};

impl Session {
    /// Whether the most recent pending injection targets `context` or a
    /// class nested in it
    pub fn has_pending_injections(
        &self,
        context: DeclId,
    ) -> bool {
        let injected = match self
            .pending_injections
            .last()
            .and_then(|cx| cx.definitions().first())
        {
            Some(def) => def.injected,
            None => return false,
        };
        let ast = &self.ast;
        ast.ancestors(injected)
            .take_while(|d| !ast.is_file_context(*d))
            .any(|d| d == context)
    }

    /// Number of injection contexts waiting for their deferred phase
    pub fn pending_injection_count(&self) -> usize {
        self.pending_injections.len()
    }

    /// Transform the deferred field initializers of every pending context
    ///
    /// The contexts stay pending until their methods are drained.
    pub fn inject_pending_field_definitions(&mut self) {
        let mut pending = std::mem::take(&mut self.pending_injections);
        for cx in pending.iter_mut() {
            self.inject_field_definitions(cx);
        }
        // contexts created while draining go after the ones drained
        pending.append(&mut self.pending_injections);
        self.pending_injections = pending;
    }

    /// Transform the deferred method bodies of every pending context and
    /// discard the contexts
    pub fn inject_pending_method_definitions(&mut self) {
        let pending = std::mem::take(&mut self.pending_injections);
        for mut cx in pending {
            self.inject_field_definitions(&mut cx);
            self.inject_method_definitions(&mut cx);
        }
    }

    /// Drain every pending context, including contexts created by the
    /// drain itself
    pub fn drain_pending_injections(&mut self) {
        while !self.pending_injections.is_empty() {
            debug!(contexts = self.pending_injections.len(), "draining pending injections");
            self.inject_pending_field_definitions();
            self.inject_pending_method_definitions();
        }
    }

    /// Field pass over one context; runs once per context
    pub fn inject_field_definitions(
        &mut self,
        cx: &mut InjectionContext,
    ) {
        if !cx.begin_draining() {
            return;
        }
        let defs = cx.definitions_of(InjectedDefKind::Field);
        trace!(injectee = %cx.injectee(), count = defs.len(), "injecting field definitions");
        let mut injector = Injector::new(self, cx);
        for def in defs {
            injector.inject_field_definition(def);
        }
    }

    /// Method pass over one context
    pub fn inject_method_definitions(
        &mut self,
        cx: &mut InjectionContext,
    ) {
        let defs = cx.definitions_of(InjectedDefKind::Method);
        trace!(injectee = %cx.injectee(), count = defs.len(), "injecting method definitions");
        let mut injector = Injector::new(self, cx);
        for def in defs {
            injector.inject_method_definition(def);
        }
    }
}

impl Injector<'_> {
    /// Transform a field initializer with `this` bound to the new class
    pub(crate) fn inject_field_definition(
        &mut self,
        def: InjectedDef,
    ) {
        let init = match self.sema.ast.kind(def.fragment) {
            DeclKind::Field(f) => f.init.clone(),
            _ => None,
        };
        let init = match init {
            Some(init) => init,
            None => return,
        };
        let record = self.sema.ast.parent(def.injected);
        let context = record.unwrap_or_else(|| self.sema.ast.translation_unit());
        let saved = self.sema.switch_context_with_this(context, record);
        let init = self.transform_expr(&init);
        self.sema.restore_context(saved);

        match init {
            Some(init) => {
                if let DeclKind::Field(f) = &mut self.sema.ast.decl_mut(def.injected).kind {
                    f.init = Some(init);
                }
            }
            None => self.sema.ast.mark_invalid(def.injected),
        }
    }

    /// Transform a method body and its constructor initializers inside the
    /// new method
    pub(crate) fn inject_method_definition(
        &mut self,
        def: InjectedDef,
    ) {
        let (body, inits) = match self.sema.ast.kind(def.fragment) {
            DeclKind::Method(m) => (m.function.body.clone(), m.ctor_inits.clone()),
            DeclKind::Function(f) => (f.body.clone(), Vec::new()),
            _ => return,
        };
        let record = self.sema.ast.parent(def.injected);

        let saved = self.sema.switch_context(def.injected);
        let inits = self.transform_ctor_inits(&inits, record);
        let body = match body {
            Some(body) => self.transform_stmt(&body).map(Some),
            None => Some(None),
        };
        self.sema.restore_context(saved);

        let ok = inits.is_some() && body.is_some();
        if let DeclKind::Method(m) = &mut self.sema.ast.decl_mut(def.injected).kind {
            if let Some(inits) = inits {
                m.ctor_inits = inits;
            }
            if let Some(body) = body {
                m.function.body = body;
            }
        }
        if !ok {
            self.sema.ast.mark_invalid(def.injected);
        }
    }
}
