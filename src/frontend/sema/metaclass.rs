//! Metaclasses
//!
//! `class(M) C { ... };` defines `C` by running the generator `M` over a
//! prototype class holding the members written in the braces. The
//! prototype is fragment-flagged: its members are never used directly,
//! only copied or inspected by `M` through the reflection it receives.

use super::{Scope, ScopeKind, Session};
use crate::frontend::ast::{
    Decl, DeclId, DeclKind, DeclName, Expr, ExprKind, RecordData, Stmt, TagKind, Type,
};
use crate::frontend::reflect::Reflection;
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;
use tracing::debug;

impl Session {
    /// Open a metaclass definition; returns the prototype to fill
    pub fn start_metaclass(
        &mut self,
        tag: TagKind,
        name: impl Into<DeclName>,
        metafunction: Expr,
        span: Span,
    ) -> DeclId {
        let name = name.into();
        let class = self.start_class(tag, name.clone(), span);
        if let Some(r) = self.ast.decl_mut(class).kind.record_mut() {
            r.metafunction = Some(metafunction);
        }

        let mut data = RecordData::new(tag);
        data.fragment = true;
        data.has_definition = true;
        let proto = self.ast.alloc(
            Decl::new(DeclKind::Record(data), name, Some(class), span).implicit(),
        );
        self.add_injected_class_name(proto, span);
        let mut scope = Scope::new(ScopeKind::Class, proto);
        scope.access = tag.default_access();
        self.enter(proto, scope);
        proto
    }

    /// Close the prototype, run the generator and complete the class
    pub fn finish_metaclass(
        &mut self,
        proto: DeclId,
        span: Span,
    ) -> DeclId {
        debug_assert_eq!(self.cur_context, proto);
        if let Some(r) = self.ast.decl_mut(proto).kind.record_mut() {
            r.complete = true;
        }
        self.leave();
        let class = self.cur_context;

        let metafunction = self
            .ast
            .kind(class)
            .record()
            .and_then(|r| r.metafunction.clone());
        let applicable = metafunction
            .as_ref()
            .map(|m| match m.ty.unqualified() {
                Type::Function { params, .. } => {
                    params.len() == 1 && params[0].is_reflection()
                }
                _ => false,
            })
            .unwrap_or(false);

        match metafunction {
            Some(metafunction) if applicable => {
                let arg = Expr::new(
                    ExprKind::Reflect(Box::new(Reflection::of_type(Type::Record(proto)))),
                    Type::Reflection,
                    span,
                );
                let call = self.call(metafunction, vec![arg], span);
                let meta = self.create_metaprogram(class, false, span);
                self.set_metaprogram_body(meta, Stmt::compound(vec![Stmt::expr(call)]));
                debug!(class = %class, "running metaclass generator");
                if !self.evaluate_metaprogram(meta) {
                    self.ast.mark_invalid(class);
                }
            }
            _ => {
                let name = self.ast.qualified_name(class);
                self.diags.emit(
                    ErrorCodeDefinition::metaclass_generator_failed(&name)
                        .at(span)
                        .build(),
                );
                self.ast.mark_invalid(class);
            }
        }

        self.finish_class(class);
        class
    }
}
