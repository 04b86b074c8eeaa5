//! Declaration, type, expression and statement model
//!
//! The injection engine clones declarations from one context into another,
//! so it needs a concrete model to clone. It is a small C++
//! subset: enough to express fragments, metaprograms and the members they
//! inject.

mod context;
mod decl;
mod expr;
mod stmt;
mod ty;


pub use context::{Ancestors, AstContext, ContextKind};
pub use decl::{
    Access, BaseSpec, CtorInit, Decl, DeclId, DeclKind, DeclName, FieldData, FragmentData,
    FunctionData, MetaprogramData, MethodData, MethodKind, ParamData, RecordData, StorageClass,
    TagKind, TemplateData, TemplateTypeParamData, VarData,
};
pub use expr::{BinaryOp, Expr, ExprKind, FragmentExpr, UnaryOp};
pub use stmt::{Stmt, StmtKind};
pub use ty::Type;
