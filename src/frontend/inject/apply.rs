//! Applying injection effects
//!
//! An effect carries the static type and value of an injection operand. A
//! fragment closure injects the members of the fragment content; a
//! reflection copies the declaration it designates.

use super::{Captures, InjectionCapture, InjectionContext, Injector};
use crate::frontend::ast::{ContextKind, DeclId, DeclKind};
use crate::frontend::const_eval::{ConstValue, InjectionEffect};
use crate::frontend::reflect::{Reflection, ReflectionModifiers, ReifyError};
use crate::frontend::sema::Session;
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;
use tracing::{debug, warn};

impl Session {
    /// Apply `effects` to `injectee` in order
    ///
    /// A failed effect marks the injectee invalid; later effects still run.
    pub fn apply_effects(
        &mut self,
        effects: &[InjectionEffect],
        injectee: DeclId,
        loc: Span,
    ) -> bool {
        let mut ok = true;
        for effect in effects {
            ok &= self.apply_injection(effect, injectee, loc);
        }
        ok
    }

    /// Apply one effect
    pub fn apply_injection(
        &mut self,
        effect: &InjectionEffect,
        injectee: DeclId,
        loc: Span,
    ) -> bool {
        debug!(injectee = %injectee, ty = ?effect.ty, "applying injection effect");
        let is_closure = effect
            .ty
            .as_record()
            .and_then(|r| self.ast.kind(r).record())
            .map(|r| r.closure)
            .unwrap_or(false);
        let ok = if is_closure {
            self.apply_fragment_injection(&effect.value, injectee, loc)
        } else if effect.ty.is_reflection() {
            self.apply_reflection_injection(&effect.value, injectee, loc)
        } else {
            let ty = self.ast.type_name(&effect.ty);
            self.diags.emit(
                ErrorCodeDefinition::invalid_injection_operand(&ty)
                    .at(loc)
                    .build(),
            );
            false
        };
        if !ok {
            warn!(injectee = %injectee, "injection failed");
            self.ast.mark_invalid(injectee);
        }
        ok
    }

    /// Reflection held by an injection operand, rejecting invalid ones
    fn operand_reflection<'v>(
        &mut self,
        value: &'v ConstValue,
        loc: Span,
    ) -> Option<&'v Reflection> {
        let reflection = match value.as_reflection() {
            Some(r) => r,
            None => {
                self.diags.emit(
                    ErrorCodeDefinition::invalid_injection_operand(value.type_name())
                        .at(loc)
                        .build(),
                );
                return None;
            }
        };
        if let Some(message) = reflection.invalid_message() {
            let err = ReifyError::Invalid {
                message: message.to_string(),
            };
            self.diags.emit(err.to_diagnostic(loc));
            return None;
        }
        Some(reflection)
    }

    /// Inject the content of the fragment a closure value refers to
    pub fn apply_fragment_injection(
        &mut self,
        value: &ConstValue,
        injectee: DeclId,
        loc: Span,
    ) -> bool {
        let object = match value.as_struct() {
            Some(object) => object,
            None => {
                self.diags.emit(
                    ErrorCodeDefinition::internal_error("fragment closure is not an object")
                        .at(loc)
                        .build(),
                );
                return false;
            }
        };
        let content = match object
            .fields
            .first()
            .and_then(|f| self.operand_reflection(f, loc))
            .and_then(|r| r.reachable_declaration(&self.ast))
        {
            Some(content) => content,
            None => return false,
        };
        let fragment = match self.ast.parent(content) {
            Some(f) if matches!(self.ast.kind(f), DeclKind::Fragment(_)) => f,
            _ => {
                self.diags.emit(
                    ErrorCodeDefinition::internal_error("fragment content has no fragment")
                        .at(loc)
                        .build(),
                );
                return false;
            }
        };

        // the first closure field holds the content reflection
        let captures: Captures = self
            .ast
            .fields(object.record)
            .into_iter()
            .zip(object.fields.iter())
            .skip(1)
            .map(|(decl, value)| InjectionCapture {
                decl,
                value: value.clone(),
            })
            .collect();
        self.inject_fragment(injectee, fragment, content, &captures, loc)
    }

    /// Copy the declaration a reflection designates
    pub fn apply_reflection_injection(
        &mut self,
        value: &ConstValue,
        injectee: DeclId,
        loc: Span,
    ) -> bool {
        let reflection = match self.operand_reflection(value, loc) {
            Some(r) => r,
            None => return false,
        };
        match reflection.reachable_declaration(&self.ast) {
            Some(decl) => self.copy_declaration(injectee, decl, reflection.modifiers, loc),
            None => {
                self.diags.emit(
                    ErrorCodeDefinition::invalid_injection_operand(&reflection.kind().to_string())
                        .at(loc)
                        .build(),
                );
                false
            }
        }
    }

    /// Clone every member of `content` into `injectee`, substituting
    /// `captures` for the placeholders of `fragment`
    pub fn inject_fragment(
        &mut self,
        injectee: DeclId,
        fragment: DeclId,
        content: DeclId,
        captures: &[InjectionCapture],
        loc: Span,
    ) -> bool {
        let class_content = self.ast.is_record(content);
        if !self.check_injection_contexts(class_content, injectee, loc) {
            return false;
        }

        let mut cx = InjectionContext::new(injectee);
        cx.add_decl_substitution(content, injectee);
        cx.add_placeholder_substitutions(&self.ast, fragment, captures);

        let members = self.ast.members(content).to_vec();
        let saved = self.switch_context(injectee);
        let mut ok = true;
        {
            let mut injector = Injector::new(self, &mut cx);
            for member in members {
                if injector.sema.ast.decl(member).is_injected_class_name() {
                    continue;
                }
                match injector.inject_decl(member) {
                    Some(new) if !injector.sema.ast.is_invalid(new) => {}
                    _ => ok = false,
                }
            }
        }
        self.restore_context(saved);

        if !ok {
            self.ast.mark_invalid(injectee);
        }
        self.bootstrap_injection(cx);
        ok
    }

    /// Clone `decl` itself into `injectee`
    pub fn copy_declaration(
        &mut self,
        injectee: DeclId,
        decl: DeclId,
        modifiers: ReflectionModifiers,
        loc: Span,
    ) -> bool {
        let class_member = self
            .ast
            .parent(decl)
            .map(|p| self.ast.is_record(p))
            .unwrap_or(false);
        if !self.check_injection_contexts(class_member, injectee, loc) {
            return false;
        }

        let mut cx = InjectionContext::new(injectee);
        if let Some(owner) = self.ast.parent(decl) {
            cx.add_decl_substitution(owner, injectee);
        }
        cx.set_modifiers(modifiers);

        let saved = self.switch_context(injectee);
        let ok = {
            let mut injector = Injector::new(self, &mut cx);
            match injector.inject_decl(decl) {
                Some(new) => !injector.sema.ast.is_invalid(new),
                None => false,
            }
        };
        self.restore_context(saved);

        if !ok {
            self.ast.mark_invalid(injectee);
        }
        self.bootstrap_injection(cx);
        ok
    }

    /// Class members only go into classes, namespace members only into
    /// namespaces or the translation unit
    pub fn check_injection_contexts(
        &mut self,
        class_source: bool,
        injectee: DeclId,
        loc: Span,
    ) -> bool {
        let target = self.ast.context_kind(injectee);
        let compatible = match target {
            ContextKind::Record => class_source,
            ContextKind::TranslationUnit | ContextKind::Namespace => !class_source,
            ContextKind::Function | ContextKind::Other => false,
        };
        if compatible {
            return true;
        }
        let what = if class_source {
            "a class member"
        } else {
            "a namespace member"
        };
        self.diags.emit(
            ErrorCodeDefinition::invalid_injection(what, target.describe())
                .at(loc)
                .build(),
        );
        self.ast.mark_invalid(injectee);
        false
    }

    /// Hand a finished context over to the deferred phase
    ///
    /// A class injectee keeps its definitions pending until the class is
    /// complete; anything else has its definitions replayed now.
    pub(crate) fn bootstrap_injection(
        &mut self,
        mut cx: InjectionContext,
    ) {
        if !cx.has_definitions() {
            return;
        }
        let injectee = cx.injectee();
        if self.ast.is_invalid(injectee) {
            debug!(injectee = %injectee, "dropping definitions of invalid injectee");
            return;
        }
        cx.detach();
        self.pending_injections.push(cx);
        if !self.ast.is_record(injectee) {
            self.drain_pending_injections();
        }
    }
}
