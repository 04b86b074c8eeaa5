//! Names and expression building
//!
//! These are the actions a parser would run for id-expressions, member
//! access, calls and object construction. Inside a fragment, names that
//! cannot be resolved until injection produce dependent expressions.

use super::Session;
use crate::frontend::ast::{DeclId, DeclKind, Expr, ExprKind, Type};
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;

impl Session {
    /// Unqualified lookup from the current scope
    pub fn lookup_name(
        &self,
        name: &str,
    ) -> Vec<DeclId> {
        self.scopes.lookup(&self.ast, name)
    }

    /// Placeholder standing for a captured variable
    fn is_placeholder(
        &self,
        decl: DeclId,
    ) -> bool {
        matches!(self.ast.kind(decl), DeclKind::Var(_))
            && self
                .ast
                .parent(decl)
                .map(|p| matches!(self.ast.kind(p), DeclKind::Fragment(_)))
                .unwrap_or(false)
    }

    /// Reference to the declaration named `name`
    ///
    /// Members of the enclosing class are reached through `this`.
    pub fn id_expr(
        &mut self,
        name: &str,
        span: Span,
    ) -> Option<Expr> {
        let decl = match self.lookup_name(name).first() {
            Some(d) => *d,
            None => {
                self.diags.emit(
                    ErrorCodeDefinition::undeclared_identifier(name)
                        .at(span)
                        .build(),
                );
                return None;
            }
        };
        Some(self.decl_ref(decl, span))
    }

    /// Reference to a known declaration
    pub fn decl_ref(
        &self,
        decl: DeclId,
        span: Span,
    ) -> Expr {
        let ty = if self.is_placeholder(decl) {
            Type::Dependent
        } else {
            self.ast.decl_type(decl)
        };
        let implicit_member = match self.ast.kind(decl) {
            DeclKind::Field(_) => true,
            DeclKind::Method(m) => !m.is_static(),
            _ => false,
        };
        if implicit_member {
            if let Some(this) = self.this_expr(span) {
                return Expr::new(
                    ExprKind::Member {
                        base: Box::new(this),
                        member: decl,
                    },
                    ty,
                    span,
                );
            }
        }
        Expr::new(ExprKind::DeclRef(decl), ty, span)
    }

    /// `this`, when the current context is inside a class
    pub fn this_expr(
        &self,
        span: Span,
    ) -> Option<Expr> {
        let record = self
            .this_override
            .or_else(|| self.ast.enclosing_record(self.cur_context))?;
        Some(Expr::new(
            ExprKind::This,
            Type::Record(record).pointer_to(),
            span,
        ))
    }

    /// `base->name` / `base.name`
    ///
    /// In a fragment or template the member may not exist yet and the
    /// access stays dependent until injection.
    pub fn member(
        &mut self,
        base: Expr,
        name: &str,
        span: Span,
    ) -> Option<Expr> {
        let record = base.ty.as_record();
        let found = record.and_then(|r| self.ast.lookup_member(r, name));
        if let Some(member) = found {
            let ty = self.ast.decl_type(member);
            return Some(Expr::new(
                ExprKind::Member {
                    base: Box::new(base),
                    member,
                },
                ty,
                span,
            ));
        }

        let dependent = base.is_dependent()
            || self.ast.is_dependent_context(self.cur_context)
            || record
                .map(|r| self.ast.is_dependent_context(r))
                .unwrap_or(false);
        if dependent {
            return Some(Expr::new(
                ExprKind::DependentMember {
                    base: Box::new(base),
                    name: name.to_string(),
                },
                Type::Dependent,
                span,
            ));
        }

        let class = match record {
            Some(r) => self.ast.qualified_name(r),
            None => self.ast.type_name(&base.ty),
        };
        self.diags.emit(
            ErrorCodeDefinition::no_member_named(name, &class)
                .at(span)
                .build(),
        );
        None
    }

    /// Call through a function reference or member access
    pub fn call(
        &self,
        callee: Expr,
        args: Vec<Expr>,
        span: Span,
    ) -> Expr {
        let ty = match callee.ty.unqualified() {
            Type::Function { ret, .. } => (**ret).clone(),
            _ => Type::Dependent,
        };
        Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            ty,
            span,
        )
    }

    /// `T(args...)`
    ///
    /// The constructor whose arity matches is selected; a class without
    /// one is aggregate-initialized.
    pub fn construct(
        &self,
        record: DeclId,
        args: Vec<Expr>,
        span: Span,
    ) -> Expr {
        let ctor = self.ast.constructors(record).into_iter().find(|c| {
            self.ast
                .kind(*c)
                .function()
                .map(|f| f.params.len() == args.len())
                .unwrap_or(false)
        });
        Expr::new(
            ExprKind::Construct { record, ctor, args },
            Type::Record(record),
            span,
        )
    }

    /// Type named by `name`
    pub fn lookup_type(
        &mut self,
        name: &str,
        span: Span,
    ) -> Type {
        let found = self.lookup_name(name).into_iter().find(|d| {
            matches!(
                self.ast.kind(*d),
                DeclKind::Record(_) | DeclKind::Typedef { .. } | DeclKind::TemplateTypeParam(_)
            )
        });
        match found {
            Some(decl) => self.ast.decl_type(decl),
            None => {
                self.diags.emit(
                    ErrorCodeDefinition::undeclared_identifier(name)
                        .at(span)
                        .build(),
                );
                Type::Error
            }
        }
    }
}
