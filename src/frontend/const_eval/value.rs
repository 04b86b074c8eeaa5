//! Compile-time values

use crate::frontend::ast::{AstContext, DeclId};
use crate::frontend::reflect::Reflection;
use std::fmt;

/// Object of class type: field values in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub record: DeclId,
    pub fields: Vec<ConstValue>,
}

/// A value produced by constant evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Void,
    Int(i64),
    Bool(bool),
    Str(String),
    Reflection(Reflection),
    Struct(StructValue),
    /// Storage that was never initialized
    Uninit,
}

impl ConstValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstValue::Int(v) => Some(*v),
            ConstValue::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            ConstValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reflection(&self) -> Option<&Reflection> {
        match self {
            ConstValue::Reflection(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            ConstValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Field `index` of an object
    pub fn field(
        &self,
        index: usize,
    ) -> Option<&ConstValue> {
        self.as_struct().and_then(|s| s.fields.get(index))
    }

    pub fn is_uninit(&self) -> bool {
        matches!(self, ConstValue::Uninit)
    }

    /// Short name of the value category, for mismatch errors
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstValue::Void => "void",
            ConstValue::Int(_) => "int",
            ConstValue::Bool(_) => "bool",
            ConstValue::Str(_) => "string",
            ConstValue::Reflection(_) => "meta::info",
            ConstValue::Struct(_) => "object",
            ConstValue::Uninit => "uninitialized",
        }
    }

    /// Equality as `==` sees it; reflections compare by identity
    pub fn equals(
        &self,
        other: &ConstValue,
        ast: &AstContext,
    ) -> bool {
        match (self, other) {
            (ConstValue::Reflection(a), ConstValue::Reflection(b)) => a.equal(b, ast),
            (ConstValue::Int(_) | ConstValue::Bool(_), ConstValue::Int(_) | ConstValue::Bool(_)) => {
                self.as_int() == other.as_int()
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConstValue::Void => write!(f, "void"),
            ConstValue::Int(v) => write!(f, "{}", v),
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Str(s) => write!(f, "{}", s),
            ConstValue::Reflection(r) => write!(f, "{}", r),
            ConstValue::Struct(s) => {
                write!(f, "{{")?;
                for (i, field) in s.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, "}}")
            }
            ConstValue::Uninit => write!(f, "<uninitialized>"),
        }
    }
}
