//! Reflection and splice expressions

use super::Session;
use crate::frontend::ast::{DeclName, Expr, ExprKind, Type};
use crate::frontend::const_eval::ConstValue;
use crate::frontend::reflect::{
    reify_expr, reify_identifier, reify_type, Reflection, ReflectionOperand, ReflectionQuery,
};
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;
use tracing::trace;

impl Session {
    fn reflection_expr(
        reflection: Reflection,
        span: Span,
    ) -> Expr {
        Expr::new(ExprKind::Reflect(Box::new(reflection)), Type::Reflection, span)
    }

    /// `reflexpr(name)`
    pub fn reflect(
        &mut self,
        name: &str,
        span: Span,
    ) -> Option<Expr> {
        let operand = match ReflectionOperand::builtin_type(name) {
            Some(ty) => Ok(ReflectionOperand::Type(ty)),
            None => {
                let found = self.lookup_name(name);
                ReflectionOperand::from_lookup(&self.ast, name, &found)
            }
        };
        match operand {
            Ok(operand) => {
                trace!(name, kind = operand.kind_name(), "reflecting name");
                Some(Self::reflection_expr(operand.into_reflection(), span))
            }
            Err(reason) => {
                self.diags.emit(
                    ErrorCodeDefinition::invalid_reflection_operand(&reason)
                        .at(span)
                        .build(),
                );
                None
            }
        }
    }

    /// `reflexpr(type-id)`
    pub fn reflect_type(
        &self,
        ty: Type,
        span: Span,
    ) -> Expr {
        Self::reflection_expr(Reflection::of_type(ty), span)
    }

    /// `reflexpr(expression)`
    pub fn reflect_expr(
        &self,
        expr: Expr,
        span: Span,
    ) -> Expr {
        let reflection = ReflectionOperand::from_expr(expr).into_reflection();
        Self::reflection_expr(reflection, span)
    }

    /// `__invalid_reflection(message)`
    pub fn invalid_reflection(
        &self,
        message: Expr,
        span: Span,
    ) -> Expr {
        Expr::new(
            ExprKind::InvalidReflection(Box::new(message)),
            Type::Reflection,
            span,
        )
    }

    /// `__compiler_error(message)`
    pub fn compiler_error(
        &self,
        message: Expr,
        span: Span,
    ) -> Expr {
        Expr::new(ExprKind::CompilerError(Box::new(message)), Type::Void, span)
    }

    /// `__concatenate(parts...)`
    pub fn concatenate(
        &self,
        parts: Vec<Expr>,
        span: Span,
    ) -> Expr {
        Expr::new(ExprKind::Concatenate(parts), Type::Str, span)
    }

    /// `__reflect(query, operand)`
    pub fn query(
        &self,
        query: ReflectionQuery,
        operand: Expr,
        span: Span,
    ) -> Expr {
        Expr::new(
            ExprKind::Query {
                query,
                operand: Box::new(operand),
            },
            query.result_type(),
            span,
        )
    }

    /// Evaluate a splice operand to the reflection it holds
    fn splice_operand(
        &mut self,
        operand: &Expr,
    ) -> Option<Reflection> {
        match self.evaluate_constant(operand)? {
            ConstValue::Reflection(r) => Some(r),
            other => {
                self.diags.emit(
                    ErrorCodeDefinition::reflection_not_designating(other.type_name(), "a reflection")
                        .at(operand.span)
                        .build(),
                );
                None
            }
        }
    }

    /// `[< operand >]`
    pub fn splice_expr(
        &mut self,
        operand: Expr,
        span: Span,
    ) -> Option<Expr> {
        if operand.is_dependent() || self.ast.is_dependent_context(self.cur_context) {
            return Some(Expr::new(
                ExprKind::Splice(Box::new(operand)),
                Type::Dependent,
                span,
            ));
        }
        let reflection = self.splice_operand(&operand)?;
        match reify_expr(&self.ast, &reflection, span) {
            Ok(expr) => Some(expr),
            Err(err) => {
                self.diags.emit(err.to_diagnostic(span));
                None
            }
        }
    }

    /// `typename(operand)`
    pub fn splice_type(
        &mut self,
        operand: Expr,
        span: Span,
    ) -> Type {
        if operand.is_dependent() || self.ast.is_dependent_context(self.cur_context) {
            return Type::Splice(Box::new(operand));
        }
        let reflection = match self.splice_operand(&operand) {
            Some(r) => r,
            None => return Type::Error,
        };
        match reify_type(&self.ast, &reflection) {
            Ok(ty) => ty,
            Err(err) => {
                self.diags.emit(err.to_diagnostic(span));
                Type::Error
            }
        }
    }

    /// `[# parts... #]` used as a declaration name
    pub fn splice_name(
        &mut self,
        parts: Vec<Expr>,
        span: Span,
    ) -> Option<DeclName> {
        if parts.iter().any(Expr::is_dependent) || self.ast.is_dependent_context(self.cur_context) {
            return Some(DeclName::Splice(parts));
        }
        let mut values = Vec::with_capacity(parts.len());
        for part in &parts {
            values.push(self.evaluate_constant(part)?);
        }
        match reify_identifier(&self.ast, &values) {
            Ok(ident) => Some(DeclName::ident(ident)),
            Err(err) => {
                self.diags.emit(err.to_diagnostic(span));
                None
            }
        }
    }
}
