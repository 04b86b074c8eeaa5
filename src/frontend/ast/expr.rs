//! Expressions

use super::{DeclId, Type};
use crate::frontend::const_eval::ConstValue;
use crate::frontend::reflect::{Reflection, ReflectionQuery};
use crate::util::span::Span;

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Fragment expression: a fragment plus the values it captures
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentExpr {
    pub fragment: DeclId,
    /// Rvalue reads of the captured variables, in placeholder order
    pub captures: Vec<Expr>,
    /// Closure construction; `None` in a dependent context
    pub init: Option<Box<Expr>>,
}

/// Expression kind
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLit(i64),
    BoolLit(bool),
    StrLit(String),
    DeclRef(DeclId),
    This,
    Member {
        base: Box<Expr>,
        member: DeclId,
    },
    /// Member access whose target is only known after injection
    DependentMember {
        base: Box<Expr>,
        name: String,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Construct {
        record: DeclId,
        ctor: Option<DeclId>,
        args: Vec<Expr>,
    },
    LValueToRValue(Box<Expr>),
    /// `reflexpr(operand)`
    Reflect(Box<Reflection>),
    /// `__invalid_reflection(message)`
    InvalidReflection(Box<Expr>),
    /// `__compiler_error(message)`
    CompilerError(Box<Expr>),
    /// `__concatenate(parts...)`
    Concatenate(Vec<Expr>),
    /// `__reflect(query, operand)`
    Query {
        query: ReflectionQuery,
        operand: Box<Expr>,
    },
    /// `[< r >]` not yet evaluated
    Splice(Box<Expr>),
    Fragment(Box<FragmentExpr>),
    /// Value substituted for a placeholder
    Constant(Box<ConstValue>),
}

/// An expression with its type and location
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub span: Span,
}

impl Expr {
    pub fn new(
        kind: ExprKind,
        ty: Type,
        span: Span,
    ) -> Self {
        Self { kind, ty, span }
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::IntLit(value), Type::Int, Span::dummy())
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::BoolLit(value), Type::Bool, Span::dummy())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::StrLit(value.into()), Type::Str, Span::dummy())
    }

    /// Error placeholder for a construct that failed to build
    pub fn error(span: Span) -> Self {
        Self::new(ExprKind::IntLit(0), Type::Error, span)
    }

    /// Wrap in an lvalue-to-rvalue conversion
    pub fn rvalue(self) -> Self {
        let ty = self.ty.unqualified().clone();
        let span = self.span;
        Self::new(ExprKind::LValueToRValue(Box::new(self)), ty, span)
    }

    pub fn constant(
        value: ConstValue,
        ty: Type,
        span: Span,
    ) -> Self {
        Self::new(ExprKind::Constant(Box::new(value)), ty, span)
    }

    pub fn unary(
        op: UnaryOp,
        operand: Expr,
    ) -> Self {
        let ty = match op {
            UnaryOp::Neg => Type::Int,
            UnaryOp::Not => Type::Bool,
        };
        let span = operand.span;
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
            span,
        )
    }

    pub fn binary(
        op: BinaryOp,
        lhs: Expr,
        rhs: Expr,
    ) -> Self {
        let ty = if op.is_comparison() || op.is_logical() {
            Type::Bool
        } else if lhs.ty.is_dependent() || rhs.ty.is_dependent() {
            Type::Dependent
        } else {
            Type::Int
        };
        let span = lhs.span.merge(rhs.span);
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
            span,
        )
    }

    pub fn assign(
        target: Expr,
        value: Expr,
    ) -> Self {
        let ty = target.ty.clone();
        let span = target.span.merge(value.span);
        Self::new(
            ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
            span,
        )
    }

    pub fn is_error(&self) -> bool {
        self.ty.is_error()
    }

    /// Cannot be evaluated until placeholders are substituted
    pub fn is_dependent(&self) -> bool {
        if self.ty.is_dependent() {
            return true;
        }
        match &self.kind {
            ExprKind::DependentMember { .. } | ExprKind::Splice(_) => true,
            ExprKind::Member { base, .. } => base.is_dependent(),
            ExprKind::Unary { operand, .. } => operand.is_dependent(),
            ExprKind::Binary { lhs, rhs, .. } => lhs.is_dependent() || rhs.is_dependent(),
            ExprKind::Assign { target, value } => target.is_dependent() || value.is_dependent(),
            ExprKind::Call { callee, args } => {
                callee.is_dependent() || args.iter().any(Expr::is_dependent)
            }
            ExprKind::Construct { args, .. } | ExprKind::Concatenate(args) => {
                args.iter().any(Expr::is_dependent)
            }
            ExprKind::LValueToRValue(inner)
            | ExprKind::InvalidReflection(inner)
            | ExprKind::CompilerError(inner) => inner.is_dependent(),
            ExprKind::Query { operand, .. } => operand.is_dependent(),
            ExprKind::Fragment(fragment) => fragment.init.is_none(),
            _ => false,
        }
    }
}
