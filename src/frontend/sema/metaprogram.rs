//! Metaprograms and injection declarations
//!
//! `consteval { ... }` declares a metaprogram: a body evaluated once, at
//! the point it appears, whose injection statements add declarations to
//! the enclosing context. `consteval -> operand;` is the same thing with a
//! single injection statement. Inside a fragment or template the body is
//! kept and only evaluated once injected somewhere concrete.

use super::{Scope, ScopeKind, Session};
use crate::frontend::ast::{
    Access, Decl, DeclId, DeclKind, DeclName, Expr, ExprKind, FunctionData, MetaprogramData,
    MethodData, MethodKind, RecordData, Stmt, StmtKind, TagKind, Type,
};
use crate::frontend::const_eval::EvalNote;
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;
use tracing::{debug, warn};

impl Session {
    /// Create an empty metaprogram declaration linked into `owner`
    ///
    /// At namespace and class scope the body belongs to a synthetic
    /// `__constexpr_decl` function. In a function body it belongs to the
    /// call operator of a closure class.
    pub(crate) fn create_metaprogram(
        &mut self,
        owner: DeclId,
        injection: bool,
        span: Span,
    ) -> DeclId {
        let (callee, closure) = if self.ast.is_function(owner) {
            let closure = self.ast.alloc(
                Decl::new(
                    DeclKind::Record(RecordData {
                        has_definition: true,
                        complete: true,
                        ..RecordData::new(TagKind::Class)
                    }),
                    DeclName::Empty,
                    Some(owner),
                    span,
                )
                .implicit(),
            );
            let mut data = MethodData::new(MethodKind::Ordinary, Type::Void);
            data.function.constexpr = true;
            data.is_const = true;
            let mut decl = Decl::new(
                DeclKind::Method(data),
                DeclName::ident("operator()"),
                Some(closure),
                span,
            )
            .implicit();
            decl.access = Access::Public;
            let call_op = self.ast.alloc(decl);
            self.ast.add_member(closure, call_op);
            (call_op, Some(closure))
        } else {
            let mut data = FunctionData::new(Type::Void);
            data.constexpr = true;
            let function = self.ast.alloc(
                Decl::new(
                    DeclKind::Function(data),
                    DeclName::ident("__constexpr_decl"),
                    Some(owner),
                    span,
                )
                .implicit(),
            );
            (function, None)
        };

        let meta = self.ast.alloc(Decl::new(
            DeclKind::Metaprogram(MetaprogramData {
                callee,
                closure,
                injection,
            }),
            DeclName::Empty,
            Some(owner),
            span,
        ));
        self.ast.add_member(owner, meta);
        meta
    }

    /// Open `consteval { ... }` in the current context
    pub fn start_metaprogram(
        &mut self,
        span: Span,
    ) -> DeclId {
        let meta = self.create_metaprogram(self.cur_context, false, span);
        let callee = self.metaprogram_callee(meta);
        self.enter(callee, Scope::new(ScopeKind::Function, callee));
        meta
    }

    /// Close a metaprogram with its body and run it
    pub fn finish_metaprogram(
        &mut self,
        meta: DeclId,
        body: Stmt,
    ) {
        self.leave();
        self.complete_metaprogram(meta, body);
    }

    /// `consteval -> operand;`
    pub fn injection_decl(
        &mut self,
        operand: Expr,
        span: Span,
    ) -> DeclId {
        let meta = self.create_metaprogram(self.cur_context, true, span);
        let inject = self.injection_stmt(operand, span);
        if matches!(inject.kind, StmtKind::Null) {
            self.ast.mark_invalid(meta);
            self.ast.remove_member(self.cur_context, meta);
            return meta;
        }
        self.complete_metaprogram(meta, inject);
        meta
    }

    pub(crate) fn metaprogram_callee(
        &self,
        meta: DeclId,
    ) -> DeclId {
        match self.ast.kind(meta) {
            DeclKind::Metaprogram(m) => m.callee,
            _ => meta,
        }
    }

    pub(super) fn set_metaprogram_body(
        &mut self,
        meta: DeclId,
        body: Stmt,
    ) {
        let callee = self.metaprogram_callee(meta);
        if let Some(f) = self.ast.decl_mut(callee).kind.function_mut() {
            f.body = Some(body);
        }
    }

    /// Attach the body and evaluate, unless the metaprogram sits in a
    /// dependent context
    pub(crate) fn complete_metaprogram(
        &mut self,
        meta: DeclId,
        body: Stmt,
    ) {
        self.set_metaprogram_body(meta, body);
        if self.ast.is_dependent_context(meta) {
            return;
        }
        self.evaluate_metaprogram(meta);
    }

    /// Run a metaprogram and apply its injection effects to its owner
    ///
    /// The metaprogram is unlinked from its owner afterwards.
    pub fn evaluate_metaprogram(
        &mut self,
        meta: DeclId,
    ) -> bool {
        let (data, owner, span) = {
            let decl = self.ast.decl(meta);
            let data = match &decl.kind {
                DeclKind::Metaprogram(m) => m.clone(),
                _ => return false,
            };
            (data, decl.parent.unwrap_or_else(|| self.ast.translation_unit()), decl.span)
        };

        let callee_ty = self.ast.decl_type(data.callee);
        let callee = match data.closure {
            Some(closure) => {
                let object = Expr::new(
                    ExprKind::Construct {
                        record: closure,
                        ctor: None,
                        args: Vec::new(),
                    },
                    Type::Record(closure),
                    span,
                );
                Expr::new(
                    ExprKind::Member {
                        base: Box::new(object),
                        member: data.callee,
                    },
                    callee_ty,
                    span,
                )
            }
            None => Expr::new(ExprKind::DeclRef(data.callee), callee_ty, span),
        };
        let call = self.call(callee, Vec::new(), span);
        let outcome = self.evaluate(&call);

        let uninitialized_only = matches!(outcome.notes.as_slice(), [EvalNote::Uninitialized { .. }]);
        if !outcome.succeeded() {
            let user_errors: Vec<&EvalNote> =
                outcome.notes.iter().filter(|n| n.is_user_error()).collect();
            if !user_errors.is_empty() {
                for note in user_errors {
                    self.diags.emit(
                        ErrorCodeDefinition::user_defined_error(&note.message())
                            .at(note.span())
                            .build(),
                    );
                }
            } else if !uninitialized_only {
                let mut builder = ErrorCodeDefinition::metaprogram_not_constant().at(span);
                for note in &outcome.notes {
                    builder = builder.note(note.message(), Some(note.span()));
                }
                self.diags.emit(builder.build());
            }
        }

        let ok = if outcome.succeeded() || uninitialized_only {
            debug!(meta = %meta, owner = %owner, effects = outcome.effects.len(), "applying metaprogram effects");
            self.apply_effects(&outcome.effects, owner, span.end_point())
        } else {
            warn!(meta = %meta, "metaprogram evaluation failed");
            self.ast.mark_invalid(meta);
            false
        };
        self.ast.remove_member(owner, meta);
        ok
    }
}
