//! Constant evaluation
//!
//! Metaprograms, splice operands and fragment closures are evaluated through
//! the [`ConstantEvaluator`] trait. [`Interpreter`] is the evaluator the
//! session uses unless another one is plugged in.

pub mod const_evaluator;
mod evaluator;
mod value;


pub use const_evaluator::{ConstEvalEnv, Interpreter};
pub use evaluator::{ConstantEvaluator, EvalError, EvalNote, EvalOutcome, InjectionEffect};
pub use value::{ConstValue, StructValue};
