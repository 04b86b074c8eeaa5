//! Reification: turning reflections back into program constructs
//!
//! - `[< r >]` splices an expression
//! - `typename(r)` splices a type
//! - `[# p1, p2, ... #]` splices an identifier from strings, integers and
//!   the names of reflected entities

use super::{Reflectee, Reflection};
use crate::frontend::ast::{AstContext, DeclKind, Expr, ExprKind, Type};
use crate::frontend::const_eval::ConstValue;
use crate::util::diagnostic::{Diagnostic, ErrorCodeDefinition};
use crate::util::span::Span;
use thiserror::Error;

/// Reification failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReifyError {
    #[error("cannot reify invalid reflection")]
    Invalid { message: String },

    #[error("reflection of {kind} does not designate {expected}")]
    NotDesignating {
        kind: String,
        expected: &'static str,
    },

    #[error("'{0}' is not a valid identifier")]
    BadIdentifier(String),
}

impl ReifyError {
    fn not_designating(
        reflection: &Reflection,
        expected: &'static str,
    ) -> Self {
        ReifyError::NotDesignating {
            kind: reflection.kind().to_string(),
            expected,
        }
    }

    /// Diagnostic for this failure
    ///
    /// An invalid reflection carries its user message as the only note.
    pub fn to_diagnostic(
        &self,
        span: Span,
    ) -> Diagnostic {
        match self {
            ReifyError::Invalid { message } => {
                let builder = ErrorCodeDefinition::invalid_reification().at(span);
                if message.is_empty() {
                    builder.build()
                } else {
                    builder.note(message.clone(), Some(span)).build()
                }
            }
            ReifyError::NotDesignating { kind, expected } => {
                ErrorCodeDefinition::reflection_not_designating(kind, expected)
                    .at(span)
                    .build()
            }
            ReifyError::BadIdentifier(text) => ErrorCodeDefinition::invalid_identifier_splice(text)
                .at(span)
                .build(),
        }
    }
}

fn reject_invalid(reflection: &Reflection) -> Result<(), ReifyError> {
    match reflection.invalid_message() {
        Some(message) => Err(ReifyError::Invalid {
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}

/// Expression designated by a reflection
pub fn reify_expr(
    ast: &AstContext,
    reflection: &Reflection,
    span: Span,
) -> Result<Expr, ReifyError> {
    reject_invalid(reflection)?;
    match &reflection.reflectee {
        Reflectee::Expression(e) => Ok((**e).clone()),
        Reflectee::Declaration(d) => match ast.kind(*d) {
            DeclKind::Field(f) => {
                let record = ast
                    .parent(*d)
                    .ok_or_else(|| ReifyError::not_designating(reflection, "an expression"))?;
                let this = Expr::new(ExprKind::This, Type::Record(record).pointer_to(), span);
                Ok(Expr::new(
                    ExprKind::Member {
                        base: Box::new(this),
                        member: *d,
                    },
                    f.ty.clone(),
                    span,
                ))
            }
            DeclKind::Var(_) | DeclKind::Param(_) | DeclKind::Function(_) | DeclKind::Method(_) => {
                Ok(Expr::new(ExprKind::DeclRef(*d), ast.decl_type(*d), span))
            }
            _ => Err(ReifyError::not_designating(reflection, "an expression")),
        },
        _ => Err(ReifyError::not_designating(reflection, "an expression")),
    }
}

/// Type designated by a reflection
pub fn reify_type(
    ast: &AstContext,
    reflection: &Reflection,
) -> Result<Type, ReifyError> {
    reject_invalid(reflection)?;
    match &reflection.reflectee {
        Reflectee::Type(ty) => Ok(ty.clone()),
        Reflectee::Declaration(d) => match ast.kind(*d) {
            DeclKind::Record(_) | DeclKind::Typedef { .. } | DeclKind::TemplateTypeParam(_) => {
                Ok(ast.decl_type(*d))
            }
            _ => Err(ReifyError::not_designating(reflection, "a type")),
        },
        _ => Err(ReifyError::not_designating(reflection, "a type")),
    }
}

/// Identifier built from the evaluated parts of an identifier splice
pub fn reify_identifier(
    ast: &AstContext,
    parts: &[ConstValue],
) -> Result<String, ReifyError> {
    let mut text = String::new();
    for part in parts {
        match part {
            ConstValue::Str(s) => text.push_str(s),
            ConstValue::Int(i) => text.push_str(&i.to_string()),
            ConstValue::Reflection(r) => {
                reject_invalid(r)?;
                let name = match &r.reflectee {
                    Reflectee::Declaration(d) | Reflectee::Template(d) | Reflectee::Namespace(d) => {
                        ast.decl(*d).name_str().to_string()
                    }
                    Reflectee::Type(ty) => match r.reachable_declaration(ast) {
                        Some(d) => ast.decl(d).name_str().to_string(),
                        None => ast.type_name(ty),
                    },
                    _ => return Err(ReifyError::not_designating(r, "a named entity")),
                };
                text.push_str(&name);
            }
            other => {
                return Err(ReifyError::BadIdentifier(format!("{}{}", text, other)));
            }
        }
    }
    if is_identifier(&text) {
        Ok(text)
    } else {
        Err(ReifyError::BadIdentifier(text))
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
