//! Fragments and their closures
//!
//! A fragment is a class or namespace written inside a metaprogram as
//! source code to inject later. Local variables visible where the
//! fragment is written are captured: inside the fragment each one is
//! replaced by a placeholder of dependent type, and the fragment
//! expression evaluates to an object of a synthesized closure class that
//! carries a reflection of the content plus the captured values.

use super::{Scope, ScopeKind, Session};
use crate::frontend::ast::{
    Access, CtorInit, Decl, DeclId, DeclKind, DeclName, Expr, ExprKind, FieldData, FragmentData,
    FragmentExpr, MethodData, MethodKind, ParamData, RecordData, StorageClass, Stmt, TagKind, Type,
    VarData,
};
use crate::frontend::reflect::Reflection;
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;
use tracing::debug;

impl Session {
    /// Open a fragment in the current context
    ///
    /// The content declaration is built inside the fragment, then handed
    /// to [`Session::finish_fragment`].
    pub fn start_fragment(
        &mut self,
        span: Span,
    ) -> DeclId {
        let captures = self.scopes.find_captures(&self.ast);
        let fragment = self.ast.alloc(Decl::new(
            DeclKind::Fragment(FragmentData::default()),
            DeclName::Empty,
            Some(self.cur_context),
            span,
        ));

        let mut placeholders = Vec::with_capacity(captures.len());
        for capture in &captures {
            let name = self.ast.decl(*capture).name.clone();
            let mut data = VarData::new(Type::Dependent);
            data.storage = StorageClass::Static;
            data.constexpr = true;
            let placeholder = self.ast.alloc(
                Decl::new(DeclKind::Var(data), name, Some(fragment), span).implicit(),
            );
            placeholders.push(placeholder);
        }
        if let DeclKind::Fragment(f) = &mut self.ast.decl_mut(fragment).kind {
            f.placeholders = placeholders.clone();
        }

        let mut scope = Scope::new(ScopeKind::Fragment, fragment);
        scope.decls = placeholders;
        scope.captures = captures;
        self.enter(fragment, scope);
        fragment
    }

    /// Close a fragment whose content is `content`
    pub fn finish_fragment(
        &mut self,
        fragment: DeclId,
        content: DeclId,
        span: Span,
    ) -> Expr {
        debug_assert_eq!(self.cur_context, fragment);
        if let DeclKind::Fragment(f) = &mut self.ast.decl_mut(fragment).kind {
            f.content = Some(content);
        }
        let captured = self.leave().map(|s| s.captures).unwrap_or_default();
        let captures: Vec<Expr> = captured
            .iter()
            .map(|var| {
                let ty = self.ast.decl_type(*var);
                Expr::new(ExprKind::DeclRef(*var), ty, span).rvalue()
            })
            .collect();

        if self.ast.is_dependent_context(self.cur_context) {
            return Expr::new(
                ExprKind::Fragment(Box::new(FragmentExpr {
                    fragment,
                    captures,
                    init: None,
                })),
                Type::Dependent,
                span,
            );
        }
        self.build_fragment_closure(fragment, captures, span)
    }

    /// Synthesize the closure class of a fragment and the expression
    /// constructing it
    ///
    /// The closure has one field holding a reflection of the content
    /// followed by one field per capture, and a constexpr constructor
    /// initializing them in that order.
    pub(crate) fn build_fragment_closure(
        &mut self,
        fragment: DeclId,
        captures: Vec<Expr>,
        span: Span,
    ) -> Expr {
        let (placeholders, content) = match self.ast.kind(fragment) {
            DeclKind::Fragment(f) => (f.placeholders.clone(), f.content),
            _ => (Vec::new(), None),
        };
        let content = match content {
            Some(c) => c,
            None => {
                self.diags.emit(
                    ErrorCodeDefinition::internal_error("fragment has no content")
                        .at(span)
                        .build(),
                );
                return Expr::error(span);
            }
        };

        let mut data = RecordData::new(TagKind::Struct);
        data.closure = true;
        data.has_definition = true;
        data.complete = true;
        let closure = self.ast.alloc(
            Decl::new(
                DeclKind::Record(data),
                DeclName::Empty,
                Some(self.cur_context),
                span,
            )
            .implicit(),
        );

        let mut members: Vec<(String, Type)> = Vec::with_capacity(captures.len() + 1);
        members.push(("fragment_reflection".to_string(), Type::Reflection));
        for (placeholder, capture) in placeholders.iter().zip(&captures) {
            let name = self.ast.decl(*placeholder).name_str().to_string();
            members.push((name, capture.ty.unqualified().clone()));
        }

        let mut fields = Vec::with_capacity(members.len());
        for (index, (name, ty)) in members.iter().enumerate() {
            let (field_name, field_ty) = if index == 0 {
                (name.clone(), ty.clone().const_of())
            } else {
                (format!("__captured_{}", name), ty.clone())
            };
            let mut decl = Decl::new(
                DeclKind::Field(FieldData {
                    ty: field_ty,
                    init: None,
                    mutable: false,
                }),
                DeclName::ident(field_name),
                Some(closure),
                span,
            )
            .implicit();
            decl.access = Access::Public;
            let field = self.ast.alloc(decl);
            self.ast.add_member(closure, field);
            fields.push(field);
        }

        let mut ctor_data = MethodData::new(MethodKind::Constructor, Type::Void);
        ctor_data.function.constexpr = true;
        ctor_data.function.body = Some(Stmt::compound(Vec::new()));
        let mut ctor_decl = Decl::new(
            DeclKind::Method(ctor_data),
            DeclName::Empty,
            Some(closure),
            span,
        )
        .implicit();
        ctor_decl.access = Access::Public;
        let ctor = self.ast.alloc(ctor_decl);

        let mut params = Vec::with_capacity(members.len());
        let mut inits = Vec::with_capacity(members.len());
        for (index, ((name, ty), field)) in members.iter().zip(&fields).enumerate() {
            let param_name = if index == 0 {
                name.clone()
            } else {
                format!("__param_{}", name)
            };
            let param = self.ast.alloc(
                Decl::new(
                    DeclKind::Param(ParamData {
                        ty: ty.clone(),
                        index,
                        default: None,
                    }),
                    DeclName::ident(param_name),
                    Some(ctor),
                    span,
                )
                .implicit(),
            );
            params.push(param);
            inits.push(CtorInit {
                field: *field,
                init: Expr::new(ExprKind::DeclRef(param), ty.clone(), span).rvalue(),
                span,
            });
        }
        if let DeclKind::Method(m) = &mut self.ast.decl_mut(ctor).kind {
            m.function.params = params;
            m.ctor_inits = inits;
        }
        self.ast.add_member(closure, ctor);

        let reflection = Expr::new(
            ExprKind::Reflect(Box::new(Reflection::of_decl(&self.ast, content))),
            Type::Reflection,
            span,
        );
        let mut args = Vec::with_capacity(captures.len() + 1);
        args.push(reflection);
        args.extend(captures.iter().cloned());
        let init = Expr::new(
            ExprKind::Construct {
                record: closure,
                ctor: Some(ctor),
                args,
            },
            Type::Record(closure),
            span,
        );
        debug!(fragment = %fragment, closure = %closure, captures = captures.len(), "built fragment closure");

        Expr::new(
            ExprKind::Fragment(Box::new(FragmentExpr {
                fragment,
                captures,
                init: Some(Box::new(init)),
            })),
            Type::Record(closure),
            span,
        )
    }
}
