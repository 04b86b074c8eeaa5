//! Types

use super::{DeclId, Expr};

/// A type
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Bool,
    Int,
    /// Character string literal
    Str,
    /// `meta::info`
    Reflection,
    Record(DeclId),
    Typedef(DeclId),
    TemplateParam(DeclId),
    Pointer(Box<Type>),
    LValueRef(Box<Type>),
    Const(Box<Type>),
    Function { ret: Box<Type>, params: Vec<Type> },
    /// Depends on a fragment placeholder or template parameter
    Dependent,
    /// `auto` before deduction
    Undeduced,
    /// `typename(r)` not yet evaluated
    Splice(Box<Expr>),
    Error,
}

impl Type {
    pub fn pointer_to(self) -> Type {
        Type::Pointer(Box::new(self))
    }

    pub fn const_of(self) -> Type {
        match self {
            Type::Const(_) => self,
            other => Type::Const(Box::new(other)),
        }
    }

    pub fn lvalue_ref(self) -> Type {
        Type::LValueRef(Box::new(self))
    }

    /// Strip top-level const and references
    pub fn unqualified(&self) -> &Type {
        match self {
            Type::Const(inner) | Type::LValueRef(inner) => inner.unqualified(),
            other => other,
        }
    }

    /// Record named by this type, looking through const, references and
    /// pointers
    pub fn as_record(&self) -> Option<DeclId> {
        match self.unqualified() {
            Type::Record(id) => Some(*id),
            Type::Pointer(inner) => inner.as_record(),
            _ => None,
        }
    }

    pub fn is_reflection(&self) -> bool {
        matches!(self.unqualified(), Type::Reflection)
    }

    pub fn is_void(&self) -> bool {
        matches!(self.unqualified(), Type::Void)
    }

    pub fn is_integral(&self) -> bool {
        matches!(self.unqualified(), Type::Int | Type::Bool)
    }

    pub fn is_undeduced(&self) -> bool {
        matches!(self.unqualified(), Type::Undeduced)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Contains anything that must wait for substitution
    pub fn is_dependent(&self) -> bool {
        match self {
            Type::Dependent | Type::TemplateParam(_) | Type::Splice(_) => true,
            Type::Pointer(inner) | Type::LValueRef(inner) | Type::Const(inner) => {
                inner.is_dependent()
            }
            Type::Function { ret, params } => {
                ret.is_dependent() || params.iter().any(Type::is_dependent)
            }
            _ => false,
        }
    }
}
