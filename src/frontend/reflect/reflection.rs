//! Reflection values

use crate::frontend::ast::{Access, AstContext, DeclId, DeclKind, Expr, ExprKind, Type};
use std::fmt;

/// Access override carried by a reflection into a copied declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessModifier {
    #[default]
    NotModified,
    /// The default access of the receiving class
    Default,
    Public,
    Protected,
    Private,
}

impl AccessModifier {
    /// Access to give a declaration whose source access was `original`,
    /// injected into a class with default access `default`
    pub fn apply(
        self,
        original: Access,
        default: Access,
    ) -> Access {
        match self {
            AccessModifier::NotModified => original,
            AccessModifier::Default => default,
            AccessModifier::Public => Access::Public,
            AccessModifier::Protected => Access::Protected,
            AccessModifier::Private => Access::Private,
        }
    }
}

/// Modifiers applied when a reflected declaration is copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReflectionModifiers {
    pub access: AccessModifier,
}

impl ReflectionModifiers {
    pub fn has_modifications(&self) -> bool {
        self.access != AccessModifier::NotModified
    }
}

/// Kind of a reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflectionKind {
    Invalid,
    Type,
    Template,
    Namespace,
    Declaration,
    Expression,
    BaseSpecifier,
}

impl fmt::Display for ReflectionKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            ReflectionKind::Invalid => "an invalid entity",
            ReflectionKind::Type => "a type",
            ReflectionKind::Template => "a template",
            ReflectionKind::Namespace => "a namespace",
            ReflectionKind::Declaration => "a declaration",
            ReflectionKind::Expression => "an expression",
            ReflectionKind::BaseSpecifier => "a base specifier",
        };
        write!(f, "{}", text)
    }
}

/// The entity a reflection designates
#[derive(Debug, Clone, PartialEq)]
pub enum Reflectee {
    Type(Type),
    Template(DeclId),
    Namespace(DeclId),
    Declaration(DeclId),
    Expression(Box<Expr>),
    BaseSpecifier { class: DeclId, index: usize },
    /// Explicitly invalid, with a user message
    Invalid(String),
}

/// A compile-time handle to a program entity
#[derive(Debug, Clone, PartialEq)]
pub struct Reflection {
    pub reflectee: Reflectee,
    pub modifiers: ReflectionModifiers,
}

impl Reflection {
    pub fn new(reflectee: Reflectee) -> Self {
        Self {
            reflectee,
            modifiers: ReflectionModifiers::default(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(Reflectee::Invalid(message.into()))
    }

    pub fn of_type(ty: Type) -> Self {
        Self::new(Reflectee::Type(ty))
    }

    pub fn of_expr(expr: Expr) -> Self {
        Self::new(Reflectee::Expression(Box::new(expr)))
    }

    /// Reflect a declaration with the kind its declaration form implies
    pub fn of_decl(
        ast: &AstContext,
        decl: DeclId,
    ) -> Self {
        let reflectee = match &ast.decl(decl).kind {
            DeclKind::TranslationUnit { .. } | DeclKind::Namespace { .. } => {
                Reflectee::Namespace(decl)
            }
            DeclKind::FunctionTemplate(_) | DeclKind::ClassTemplate(_) => Reflectee::Template(decl),
            _ => Reflectee::Declaration(decl),
        };
        Self::new(reflectee)
    }

    pub fn with_access(
        mut self,
        access: AccessModifier,
    ) -> Self {
        self.modifiers.access = access;
        self
    }

    pub fn kind(&self) -> ReflectionKind {
        match &self.reflectee {
            Reflectee::Type(_) => ReflectionKind::Type,
            Reflectee::Template(_) => ReflectionKind::Template,
            Reflectee::Namespace(_) => ReflectionKind::Namespace,
            Reflectee::Declaration(_) => ReflectionKind::Declaration,
            Reflectee::Expression(_) => ReflectionKind::Expression,
            Reflectee::BaseSpecifier { .. } => ReflectionKind::BaseSpecifier,
            Reflectee::Invalid(_) => ReflectionKind::Invalid,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.reflectee, Reflectee::Invalid(_))
    }

    /// User message of an invalid reflection
    pub fn invalid_message(&self) -> Option<&str> {
        match &self.reflectee {
            Reflectee::Invalid(message) => Some(message),
            _ => None,
        }
    }

    /// Declaration this reflection resolves to, if any
    ///
    /// Types resolve through their declaring class, alias or template
    /// parameter. Expressions and base specifiers never resolve.
    pub fn reachable_declaration(
        &self,
        ast: &AstContext,
    ) -> Option<DeclId> {
        match &self.reflectee {
            Reflectee::Declaration(d) | Reflectee::Template(d) | Reflectee::Namespace(d) => Some(*d),
            Reflectee::Type(ty) => match ty.unqualified() {
                Type::Record(d) | Type::Typedef(d) | Type::TemplateParam(d) => {
                    ast.get(*d).map(|_| *d)
                }
                _ => None,
            },
            Reflectee::Expression(_) | Reflectee::BaseSpecifier { .. } | Reflectee::Invalid(_) => {
                None
            }
        }
    }

    /// Identity comparison used by `==` in metaprograms
    pub fn equal(
        &self,
        other: &Reflection,
        ast: &AstContext,
    ) -> bool {
        match (&self.reflectee, &other.reflectee) {
            (Reflectee::Type(a), Reflectee::Type(b)) => {
                ast.canonical_type(a) == ast.canonical_type(b)
            }
            (Reflectee::Expression(a), Reflectee::Expression(b)) => match (&a.kind, &b.kind) {
                (ExprKind::DeclRef(x), ExprKind::DeclRef(y)) => x == y,
                _ => a == b,
            },
            (Reflectee::Invalid(_), Reflectee::Invalid(_)) => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Reflection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.reflectee {
            Reflectee::Invalid(message) if message.is_empty() => write!(f, "reflexpr(<invalid>)"),
            Reflectee::Invalid(message) => write!(f, "reflexpr(<invalid: {}>)", message),
            Reflectee::Type(ty) => write!(f, "reflexpr({:?})", ty),
            Reflectee::Template(d) | Reflectee::Namespace(d) | Reflectee::Declaration(d) => {
                write!(f, "reflexpr({})", d)
            }
            Reflectee::Expression(_) => write!(f, "reflexpr(<expression>)"),
            Reflectee::BaseSpecifier { class, index } => {
                write!(f, "reflexpr(base {} of {})", index, class)
            }
        }
    }
}
