//! Constant evaluator interface
//!
//! The injection engine needs three things from constant evaluation: the
//! value of an expression, the notes explaining a failure, and the ordered
//! list of injection effects recorded by `-> operand;` statements executed
//! along the way.

use super::ConstValue;
use crate::frontend::ast::{AstContext, Expr, Type};
use crate::frontend::reflect::QueryError;
use crate::util::span::Span;
use thiserror::Error;

/// One executed injection statement: the operand's static type and value
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionEffect {
    pub ty: Type,
    pub value: ConstValue,
    pub span: Span,
}

/// Explanation attached to a failed evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum EvalNote {
    /// `__compiler_error(message)` was executed
    UserError { message: String, span: Span },
    /// Read of an object that was never initialized
    Uninitialized { span: Span },
    Other { message: String, span: Span },
}

impl EvalNote {
    pub fn message(&self) -> String {
        match self {
            EvalNote::UserError { message, .. } | EvalNote::Other { message, .. } => {
                message.clone()
            }
            EvalNote::Uninitialized { .. } => "read of uninitialized object".to_string(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            EvalNote::UserError { span, .. }
            | EvalNote::Uninitialized { span }
            | EvalNote::Other { span, .. } => *span,
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(self, EvalNote::UserError { .. })
    }
}

/// Result of evaluating one expression
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalOutcome {
    /// `None` when evaluation failed
    pub value: Option<ConstValue>,
    pub notes: Vec<EvalNote>,
    pub effects: Vec<InjectionEffect>,
}

impl EvalOutcome {
    pub fn succeeded(&self) -> bool {
        self.value.is_some()
    }
}

/// Constant evaluation
pub trait ConstantEvaluator {
    fn evaluate(
        &self,
        ast: &AstContext,
        expr: &Expr,
    ) -> EvalOutcome;
}

/// Evaluation errors of the reference interpreter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("recursion depth {depth} exceeds the maximum of {max_depth}")]
    RecursionTooDeep {
        depth: usize,
        max_depth: usize,
        span: Span,
    },

    #[error("evaluation exceeded the step limit of {limit}")]
    StepLimit { limit: u64, span: Span },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("integer overflow in {op}")]
    Overflow { op: String, span: Span },

    #[error("{what} is not usable in a constant expression")]
    NotConstant { what: String, span: Span },

    #[error("{message}")]
    UserError { message: String, span: Span },

    #[error("read of uninitialized object")]
    Uninitialized { span: Span },

    #[error("{source}")]
    Query {
        #[source]
        source: QueryError,
        span: Span,
    },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::RecursionTooDeep { span, .. }
            | EvalError::StepLimit { span, .. }
            | EvalError::TypeMismatch { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::Overflow { span, .. }
            | EvalError::NotConstant { span, .. }
            | EvalError::UserError { span, .. }
            | EvalError::Uninitialized { span }
            | EvalError::Query { span, .. } => *span,
        }
    }

    pub fn into_note(self) -> EvalNote {
        match self {
            EvalError::UserError { message, span } => EvalNote::UserError { message, span },
            EvalError::Uninitialized { span } => EvalNote::Uninitialized { span },
            other => EvalNote::Other {
                message: other.to_string(),
                span: other.span(),
            },
        }
    }
}
