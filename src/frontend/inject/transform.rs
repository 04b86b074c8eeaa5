//! Substitution over types, names, expressions and statements
//!
//! Every transform returns the rebuilt node, or `None` after emitting a
//! diagnostic. Types use [`Type::Error`] for failure instead.

use super::Injector;
use crate::frontend::ast::{
    DeclId, DeclKind, DeclName, Expr, ExprKind, FragmentExpr, Stmt, StmtKind, Type,
};
use crate::frontend::const_eval::ConstValue;
use crate::frontend::reflect::{reify_expr, reify_identifier, reify_type, Reflectee, Reflection};
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;

impl Injector<'_> {
    /// Map a referenced declaration into the injectee
    ///
    /// A declaration is found through the substitution map first, then by
    /// name in the replacement of its parent. A reference to a fragment
    /// declaration that has no counterpart is an error; anything else is
    /// declared outside the injected content and kept.
    pub(crate) fn resolve_decl(
        &mut self,
        decl: DeclId,
        span: Span,
    ) -> Option<DeclId> {
        if let Some(new) = self.cx.get_decl_replacement(decl) {
            return Some(new);
        }
        let ast = &self.sema.ast;
        let source = ast.decl(decl);
        if let (Some(parent), Some(name)) = (source.parent, source.name.as_str()) {
            if let Some(new_parent) = self.cx.get_decl_replacement(parent) {
                if let Some(found) = ast.lookup_member(new_parent, name) {
                    return Some(found);
                }
            }
        }
        if ast.is_in_fragment(decl) {
            let name = source.name.to_string();
            self.sema.diags.emit(
                ErrorCodeDefinition::unresolved_injected_reference(&name)
                    .at(span)
                    .build(),
            );
            return None;
        }
        Some(decl)
    }

    pub(crate) fn transform_type(
        &mut self,
        ty: &Type,
        span: Span,
    ) -> Type {
        match ty {
            Type::Record(d) => self.transform_type_decl(*d, span, Type::Record),
            Type::Typedef(d) => self.transform_type_decl(*d, span, Type::Typedef),
            Type::TemplateParam(d) => self.transform_type_decl(*d, span, Type::TemplateParam),
            Type::Pointer(inner) => self.wrap_type(inner, span, Type::pointer_to),
            Type::LValueRef(inner) => self.wrap_type(inner, span, Type::lvalue_ref),
            Type::Const(inner) => self.wrap_type(inner, span, Type::const_of),
            Type::Function { ret, params } => {
                let ret = self.transform_type(ret, span);
                let params: Vec<Type> = params
                    .iter()
                    .map(|p| self.transform_type(p, span))
                    .collect();
                if ret.is_error() || params.iter().any(Type::is_error) {
                    return Type::Error;
                }
                Type::Function {
                    ret: Box::new(ret),
                    params,
                }
            }
            Type::Splice(operand) => self.transform_type_splice(operand, span),
            other => other.clone(),
        }
    }

    fn transform_type_decl(
        &mut self,
        decl: DeclId,
        span: Span,
        make: fn(DeclId) -> Type,
    ) -> Type {
        match self.resolve_decl(decl, span) {
            Some(new) => make(new),
            None => Type::Error,
        }
    }

    fn wrap_type(
        &mut self,
        inner: &Type,
        span: Span,
        wrap: fn(Type) -> Type,
    ) -> Type {
        match self.transform_type(inner, span) {
            Type::Error => Type::Error,
            ty => wrap(ty),
        }
    }

    fn transform_type_splice(
        &mut self,
        operand: &Expr,
        span: Span,
    ) -> Type {
        let operand = match self.transform_expr(operand) {
            Some(e) => e,
            None => return Type::Error,
        };
        if operand.is_dependent() {
            return Type::Splice(Box::new(operand));
        }
        let reflection = match self.evaluate_reflection(&operand) {
            Some(r) => r,
            None => return Type::Error,
        };
        match reify_type(&self.sema.ast, &reflection) {
            Ok(ty) => ty,
            Err(err) => {
                self.sema.diags.emit(err.to_diagnostic(span));
                Type::Error
            }
        }
    }

    /// Evaluate a splice operand down to a reflection
    fn evaluate_reflection(
        &mut self,
        operand: &Expr,
    ) -> Option<Reflection> {
        match self.sema.evaluate_constant(operand)? {
            ConstValue::Reflection(r) => Some(r),
            other => {
                self.sema.diags.emit(
                    ErrorCodeDefinition::reflection_not_designating(other.type_name(), "a reflection")
                        .at(operand.span)
                        .build(),
                );
                None
            }
        }
    }

    /// Rebuild a declaration name; the flag reports a failed splice
    pub(crate) fn transform_name(
        &mut self,
        name: &DeclName,
        span: Span,
    ) -> (DeclName, bool) {
        let parts = match name {
            DeclName::Splice(parts) => parts,
            other => return (other.clone(), false),
        };
        let mut new_parts = Vec::with_capacity(parts.len());
        for part in parts {
            match self.transform_expr(part) {
                Some(p) => new_parts.push(p),
                None => return (name.clone(), true),
            }
        }
        if new_parts.iter().any(Expr::is_dependent) {
            return (DeclName::Splice(new_parts), false);
        }
        let mut values = Vec::with_capacity(new_parts.len());
        for part in &new_parts {
            match self.sema.evaluate_constant(part) {
                Some(v) => values.push(v),
                None => return (name.clone(), true),
            }
        }
        match reify_identifier(&self.sema.ast, &values) {
            Ok(ident) => (DeclName::ident(ident), false),
            Err(err) => {
                self.sema.diags.emit(err.to_diagnostic(span));
                (name.clone(), true)
            }
        }
    }

    /// Enclosing class `this` refers to in the current context
    fn this_record(&self) -> Option<DeclId> {
        self.sema
            .this_override
            .or_else(|| self.sema.ast.enclosing_record(self.sema.cur_context))
    }

    pub(crate) fn transform_expr(
        &mut self,
        expr: &Expr,
    ) -> Option<Expr> {
        let span = expr.span;
        let new = match &expr.kind {
            ExprKind::IntLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::StrLit(_)
            | ExprKind::Constant(_) => expr.clone(),
            ExprKind::DeclRef(d) => {
                if let Some(subst) = self.cx.placeholder_replacement(*d) {
                    return Some(Expr::constant(subst.value.clone(), subst.ty.clone(), span));
                }
                let new = self.resolve_decl(*d, span)?;
                let ty = if new == *d {
                    expr.ty.clone()
                } else {
                    self.sema.ast.decl_type(new)
                };
                Expr::new(ExprKind::DeclRef(new), ty, span)
            }
            ExprKind::This => match self.this_record() {
                Some(record) => Expr::new(ExprKind::This, Type::Record(record).pointer_to(), span),
                None => {
                    self.sema.diags.emit(
                        ErrorCodeDefinition::undeclared_identifier("this")
                            .at(span)
                            .build(),
                    );
                    return None;
                }
            },
            ExprKind::Member { base, member } => {
                let base = self.transform_expr(base)?;
                let member = self.resolve_decl(*member, span)?;
                let ty = self.sema.ast.decl_type(member);
                Expr::new(
                    ExprKind::Member {
                        base: Box::new(base),
                        member,
                    },
                    ty,
                    span,
                )
            }
            ExprKind::DependentMember { base, name } => {
                let base = self.transform_expr(base)?;
                return self.resolve_dependent_member(base, name, span);
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.transform_expr(operand)?;
                Expr::unary(*op, operand)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.transform_expr(lhs)?;
                let rhs = self.transform_expr(rhs)?;
                Expr::binary(*op, lhs, rhs)
            }
            ExprKind::Assign { target, value } => {
                let target = self.transform_expr(target)?;
                let value = self.transform_expr(value)?;
                Expr::assign(target, value)
            }
            ExprKind::Call { callee, args } => {
                let callee = self.transform_expr(callee)?;
                let args = self.transform_exprs(args)?;
                let ty = match callee.ty.unqualified() {
                    Type::Function { ret, .. } => (**ret).clone(),
                    _ if callee.is_dependent() => Type::Dependent,
                    _ => expr.ty.clone(),
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
            ExprKind::Construct { record, ctor, args } => {
                let record = self.resolve_decl(*record, span)?;
                let ctor = match ctor {
                    Some(c) => Some(self.resolve_decl(*c, span)?),
                    None => None,
                };
                let args = self.transform_exprs(args)?;
                Expr::new(
                    ExprKind::Construct { record, ctor, args },
                    Type::Record(record),
                    span,
                )
            }
            ExprKind::LValueToRValue(inner) => self.transform_expr(inner)?.rvalue(),
            ExprKind::Reflect(reflection) => {
                let reflection = self.transform_reflection(reflection, span)?;
                Expr::new(ExprKind::Reflect(Box::new(reflection)), Type::Reflection, span)
            }
            ExprKind::InvalidReflection(message) => {
                let message = self.transform_expr(message)?;
                Expr::new(
                    ExprKind::InvalidReflection(Box::new(message)),
                    Type::Reflection,
                    span,
                )
            }
            ExprKind::CompilerError(message) => {
                let message = self.transform_expr(message)?;
                Expr::new(ExprKind::CompilerError(Box::new(message)), Type::Void, span)
            }
            ExprKind::Concatenate(parts) => {
                let parts = self.transform_exprs(parts)?;
                Expr::new(ExprKind::Concatenate(parts), Type::Str, span)
            }
            ExprKind::Query { query, operand } => {
                let operand = self.transform_expr(operand)?;
                Expr::new(
                    ExprKind::Query {
                        query: *query,
                        operand: Box::new(operand),
                    },
                    query.result_type(),
                    span,
                )
            }
            ExprKind::Splice(operand) => {
                let operand = self.transform_expr(operand)?;
                if operand.is_dependent() {
                    return Some(Expr::new(
                        ExprKind::Splice(Box::new(operand)),
                        Type::Dependent,
                        span,
                    ));
                }
                let reflection = self.evaluate_reflection(&operand)?;
                match reify_expr(&self.sema.ast, &reflection, span) {
                    Ok(e) => return self.transform_expr(&e),
                    Err(err) => {
                        self.sema.diags.emit(err.to_diagnostic(span));
                        return None;
                    }
                }
            }
            ExprKind::Fragment(fragment) => self.transform_fragment_expr(fragment, span)?,
        };
        Some(new)
    }

    fn transform_exprs(
        &mut self,
        exprs: &[Expr],
    ) -> Option<Vec<Expr>> {
        exprs.iter().map(|e| self.transform_expr(e)).collect()
    }

    /// `base->name` once `base` has a concrete class
    fn resolve_dependent_member(
        &mut self,
        base: Expr,
        name: &str,
        span: Span,
    ) -> Option<Expr> {
        let ast = &self.sema.ast;
        let record = match base.ty.as_record() {
            Some(r) if !base.is_dependent() => r,
            _ => {
                return Some(Expr::new(
                    ExprKind::DependentMember {
                        base: Box::new(base),
                        name: name.to_string(),
                    },
                    Type::Dependent,
                    span,
                ))
            }
        };
        match ast.lookup_member(record, name) {
            Some(member) => {
                let ty = ast.decl_type(member);
                Some(Expr::new(
                    ExprKind::Member {
                        base: Box::new(base),
                        member,
                    },
                    ty,
                    span,
                ))
            }
            None if ast.is_dependent_context(record) => Some(Expr::new(
                ExprKind::DependentMember {
                    base: Box::new(base),
                    name: name.to_string(),
                },
                Type::Dependent,
                span,
            )),
            None => {
                let class = ast.qualified_name(record);
                self.sema.diags.emit(
                    ErrorCodeDefinition::no_member_named(name, &class)
                        .at(span)
                        .build(),
                );
                None
            }
        }
    }

    fn transform_reflection(
        &mut self,
        reflection: &Reflection,
        span: Span,
    ) -> Option<Reflection> {
        let reflectee = match &reflection.reflectee {
            Reflectee::Type(ty) => match self.transform_type(ty, span) {
                Type::Error => return None,
                ty => Reflectee::Type(ty),
            },
            Reflectee::Template(d) => Reflectee::Template(self.resolve_decl(*d, span)?),
            Reflectee::Namespace(d) => Reflectee::Namespace(self.resolve_decl(*d, span)?),
            Reflectee::Declaration(d) => Reflectee::Declaration(self.resolve_decl(*d, span)?),
            Reflectee::Expression(e) => Reflectee::Expression(Box::new(self.transform_expr(e)?)),
            Reflectee::BaseSpecifier { class, index } => Reflectee::BaseSpecifier {
                class: self.resolve_decl(*class, span)?,
                index: *index,
            },
            Reflectee::Invalid(message) => Reflectee::Invalid(message.clone()),
        };
        Some(Reflection {
            reflectee,
            modifiers: reflection.modifiers,
        })
    }

    /// A nested fragment keeps its content; its captures are rebuilt and the
    /// closure is synthesized once the context is no longer dependent.
    fn transform_fragment_expr(
        &mut self,
        fragment: &FragmentExpr,
        span: Span,
    ) -> Option<Expr> {
        let captures = self.transform_exprs(&fragment.captures)?;
        if self.sema.ast.is_dependent_context(self.sema.cur_context) {
            return Some(Expr::new(
                ExprKind::Fragment(Box::new(FragmentExpr {
                    fragment: fragment.fragment,
                    captures,
                    init: None,
                })),
                Type::Dependent,
                span,
            ));
        }
        Some(
            self.sema
                .build_fragment_closure(fragment.fragment, captures, span),
        )
    }

    pub(crate) fn transform_stmt(
        &mut self,
        stmt: &Stmt,
    ) -> Option<Stmt> {
        let span = stmt.span;
        let kind = match &stmt.kind {
            StmtKind::Compound(stmts) => {
                let mut out = Vec::with_capacity(stmts.len());
                for s in stmts {
                    out.push(self.transform_stmt(s)?);
                }
                StmtKind::Compound(out)
            }
            StmtKind::Expr(e) => StmtKind::Expr(self.transform_expr(e)?),
            StmtKind::Decl(d) => {
                let is_metaprogram = matches!(self.sema.ast.kind(*d), DeclKind::Metaprogram(_));
                let new = self.inject_decl(*d)?;
                if is_metaprogram {
                    StmtKind::Null
                } else {
                    StmtKind::Decl(new)
                }
            }
            StmtKind::Return(value) => match value {
                Some(v) => StmtKind::Return(Some(self.transform_expr(v)?)),
                None => StmtKind::Return(None),
            },
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.transform_expr(cond)?;
                let then_branch = self.transform_stmt(then_branch)?;
                let else_branch = match else_branch {
                    Some(e) => Some(Box::new(self.transform_stmt(e)?)),
                    None => None,
                };
                StmtKind::If {
                    cond,
                    then_branch: Box::new(then_branch),
                    else_branch,
                }
            }
            StmtKind::While { cond, body } => {
                let cond = self.transform_expr(cond)?;
                let body = self.transform_stmt(body)?;
                StmtKind::While {
                    cond,
                    body: Box::new(body),
                }
            }
            StmtKind::Inject(operand) => {
                let operand = self.transform_expr(operand)?;
                let checked = self.sema.injection_stmt(operand, span);
                if matches!(checked.kind, StmtKind::Null) {
                    return None;
                }
                return Some(checked);
            }
            StmtKind::Null => StmtKind::Null,
        };
        Some(Stmt::new(kind, span))
    }
}
