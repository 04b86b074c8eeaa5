//! Reflection operands
//!
//! `reflexpr(x)` resolves its operand when it is written. A name is tried as
//! a template name, then a namespace name, then a type, and finally as an
//! id-expression naming a declaration. Any other expression is reflected as
//! an expression.

use super::{Reflectee, Reflection};
use crate::frontend::ast::{AstContext, DeclId, DeclKind, Expr, ExprKind, Type};

/// Resolved operand of `reflexpr`
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectionOperand {
    Type(Type),
    Template(DeclId),
    Namespace(DeclId),
    Expression(Expr),
    Declaration(DeclId),
    BaseSpecifier { class: DeclId, index: usize },
    Invalid(String),
}

impl ReflectionOperand {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ReflectionOperand::Type(_) => "type",
            ReflectionOperand::Template(_) => "template",
            ReflectionOperand::Namespace(_) => "namespace",
            ReflectionOperand::Expression(_) => "expression",
            ReflectionOperand::Declaration(_) => "declaration",
            ReflectionOperand::BaseSpecifier { .. } => "base specifier",
            ReflectionOperand::Invalid(_) => "invalid",
        }
    }

    /// Classify an expression operand
    ///
    /// References to declarations are reflected as those declarations.
    pub fn from_expr(expr: Expr) -> Self {
        match &expr.kind {
            ExprKind::DeclRef(d) => ReflectionOperand::Declaration(*d),
            ExprKind::LValueToRValue(inner) => match &inner.kind {
                ExprKind::DeclRef(d) => ReflectionOperand::Declaration(*d),
                _ => ReflectionOperand::Expression(expr),
            },
            ExprKind::Member { member, .. } => ReflectionOperand::Declaration(*member),
            _ => ReflectionOperand::Expression(expr),
        }
    }

    /// Classify the declarations a name lookup produced
    pub fn from_lookup(
        ast: &AstContext,
        name: &str,
        found: &[DeclId],
    ) -> Result<Self, String> {
        let first = match found {
            [] => {
                return Err(format!(
                    "'{}' does not name a type, template, namespace or declaration",
                    name
                ))
            }
            [single] => *single,
            [first, ..] => {
                let overloaded = found
                    .iter()
                    .all(|d| matches!(ast.kind(*d), DeclKind::Function(_) | DeclKind::Method(_)));
                if overloaded {
                    return Err(format!("reference to overloaded function '{}' is ambiguous", name));
                }
                *first
            }
        };

        Ok(match ast.kind(first) {
            DeclKind::FunctionTemplate(_) | DeclKind::ClassTemplate(_) => {
                ReflectionOperand::Template(first)
            }
            DeclKind::TranslationUnit { .. } | DeclKind::Namespace { .. } => {
                ReflectionOperand::Namespace(first)
            }
            DeclKind::Record(_) | DeclKind::Typedef { .. } | DeclKind::TemplateTypeParam(_) => {
                ReflectionOperand::Type(ast.decl_type(first))
            }
            _ => ReflectionOperand::Declaration(first),
        })
    }

    /// Builtin type keywords accepted as operands
    pub fn builtin_type(name: &str) -> Option<Type> {
        match name {
            "void" => Some(Type::Void),
            "bool" => Some(Type::Bool),
            "int" => Some(Type::Int),
            "meta::info" => Some(Type::Reflection),
            _ => None,
        }
    }

    pub fn into_reflection(self) -> Reflection {
        let reflectee = match self {
            ReflectionOperand::Type(ty) => Reflectee::Type(ty),
            ReflectionOperand::Template(d) => Reflectee::Template(d),
            ReflectionOperand::Namespace(d) => Reflectee::Namespace(d),
            ReflectionOperand::Expression(e) => Reflectee::Expression(Box::new(e)),
            ReflectionOperand::Declaration(d) => Reflectee::Declaration(d),
            ReflectionOperand::BaseSpecifier { class, index } => {
                Reflectee::BaseSpecifier { class, index }
            }
            ReflectionOperand::Invalid(message) => Reflectee::Invalid(message),
        };
        Reflection::new(reflectee)
    }
}
