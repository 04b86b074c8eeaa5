//! Reflections
//!
//! A reflection is an opaque compile-time handle to a type, template,
//! namespace, declaration, expression or base specifier. Reflections are
//! plain values: they are created by `reflexpr`, inspected by queries and
//! turned back into program constructs by splices and injection.

mod operand;
mod query;
mod reflection;
mod reify;


pub use operand::ReflectionOperand;
pub use query::{
    access_traits, decl_traits, evaluate_query, linkage_traits, type_traits, QueryError,
    ReflectionQuery,
};
pub use reflection::{AccessModifier, Reflectee, Reflection, ReflectionKind, ReflectionModifiers};
pub use reify::{reify_expr, reify_identifier, reify_type, ReifyError};
