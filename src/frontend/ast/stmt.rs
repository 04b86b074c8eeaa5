//! Statements

use super::{DeclId, Expr};
use crate::util::span::Span;

/// Statement kind
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Compound(Vec<Stmt>),
    Expr(Expr),
    /// Local declaration
    Decl(DeclId),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// `-> operand;`
    Inject(Expr),
    Null,
}

/// A statement with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(
        kind: StmtKind,
        span: Span,
    ) -> Self {
        Self { kind, span }
    }

    pub fn compound(stmts: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Compound(stmts), Span::dummy())
    }

    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(StmtKind::Expr(expr), span)
    }

    pub fn decl(decl: DeclId) -> Self {
        Self::new(StmtKind::Decl(decl), Span::dummy())
    }

    pub fn ret(value: Option<Expr>) -> Self {
        let span = value.as_ref().map(|v| v.span).unwrap_or_default();
        Self::new(StmtKind::Return(value), span)
    }

    pub fn if_then(
        cond: Expr,
        then_branch: Stmt,
        else_branch: Option<Stmt>,
    ) -> Self {
        let span = cond.span;
        Self::new(
            StmtKind::If {
                cond,
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
            span,
        )
    }

    pub fn while_loop(
        cond: Expr,
        body: Stmt,
    ) -> Self {
        let span = cond.span;
        Self::new(
            StmtKind::While {
                cond,
                body: Box::new(body),
            },
            span,
        )
    }
}
