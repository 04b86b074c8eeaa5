//! Reflection queries (`__reflect(query, r)`)
//!
//! Queries fall into four contiguous ranges: predicates yield `bool`,
//! traits yield an integer bitmask, associated queries yield another
//! reflection and name queries yield a string.

use super::{Reflectee, Reflection, ReflectionKind};
use crate::frontend::ast::{
    Access, AstContext, DeclId, DeclKind, ExprKind, MethodKind, StorageClass, TagKind, Type,
};
use crate::frontend::const_eval::ConstValue;
use thiserror::Error;

/// Query selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum ReflectionQuery {
    // predicates
    IsInvalid,
    IsEntity,
    IsUnnamed,
    IsVariable,
    IsFunction,
    IsClass,
    IsUnion,
    IsStaticDataMember,
    IsNonstaticDataMember,
    IsStaticMemberFunction,
    IsNonstaticMemberFunction,
    IsConstructor,
    IsDestructor,
    IsType,
    IsFunctionType,
    IsClassType,
    IsUnionType,
    IsVoidType,
    IsIntegralType,
    IsPointerType,
    IsLvalueReferenceType,
    IsNamespace,
    IsTypeAlias,
    IsTemplate,
    IsFunctionTemplate,
    IsClassTemplate,
    IsDirectBase,
    IsVirtualBase,
    IsFunctionParameter,
    IsTemplateParameter,
    IsTypeTemplateParameter,
    IsExpression,
    IsLvalue,
    IsRvalue,
    IsLocal,
    IsClassMember,
    HasDefaultAccess,

    // traits
    GetDeclTraits,
    GetLinkageTraits,
    GetAccessTraits,
    GetTypeTraits,

    // associated reflections
    GetEntity,
    GetParent,
    GetType,
    GetThisRefType,
    GetBegin,
    GetNext,

    // names
    GetName,
    GetDisplayName,
}

const FIRST_PREDICATE: ReflectionQuery = ReflectionQuery::IsInvalid;
const LAST_PREDICATE: ReflectionQuery = ReflectionQuery::HasDefaultAccess;
const FIRST_TRAIT: ReflectionQuery = ReflectionQuery::GetDeclTraits;
const LAST_TRAIT: ReflectionQuery = ReflectionQuery::GetTypeTraits;
const FIRST_ASSOC: ReflectionQuery = ReflectionQuery::GetEntity;
const LAST_ASSOC: ReflectionQuery = ReflectionQuery::GetNext;
const FIRST_NAME: ReflectionQuery = ReflectionQuery::GetName;
const LAST_NAME: ReflectionQuery = ReflectionQuery::GetDisplayName;

const ALL_QUERIES: &[(ReflectionQuery, &str)] = &[
    (ReflectionQuery::IsInvalid, "is_invalid"),
    (ReflectionQuery::IsEntity, "is_entity"),
    (ReflectionQuery::IsUnnamed, "is_unnamed"),
    (ReflectionQuery::IsVariable, "is_variable"),
    (ReflectionQuery::IsFunction, "is_function"),
    (ReflectionQuery::IsClass, "is_class"),
    (ReflectionQuery::IsUnion, "is_union"),
    (ReflectionQuery::IsStaticDataMember, "is_static_data_member"),
    (ReflectionQuery::IsNonstaticDataMember, "is_nonstatic_data_member"),
    (ReflectionQuery::IsStaticMemberFunction, "is_static_member_function"),
    (ReflectionQuery::IsNonstaticMemberFunction, "is_nonstatic_member_function"),
    (ReflectionQuery::IsConstructor, "is_constructor"),
    (ReflectionQuery::IsDestructor, "is_destructor"),
    (ReflectionQuery::IsType, "is_type"),
    (ReflectionQuery::IsFunctionType, "is_function_type"),
    (ReflectionQuery::IsClassType, "is_class_type"),
    (ReflectionQuery::IsUnionType, "is_union_type"),
    (ReflectionQuery::IsVoidType, "is_void_type"),
    (ReflectionQuery::IsIntegralType, "is_integral_type"),
    (ReflectionQuery::IsPointerType, "is_pointer_type"),
    (ReflectionQuery::IsLvalueReferenceType, "is_lvalue_reference_type"),
    (ReflectionQuery::IsNamespace, "is_namespace"),
    (ReflectionQuery::IsTypeAlias, "is_type_alias"),
    (ReflectionQuery::IsTemplate, "is_template"),
    (ReflectionQuery::IsFunctionTemplate, "is_function_template"),
    (ReflectionQuery::IsClassTemplate, "is_class_template"),
    (ReflectionQuery::IsDirectBase, "is_direct_base"),
    (ReflectionQuery::IsVirtualBase, "is_virtual_base"),
    (ReflectionQuery::IsFunctionParameter, "is_function_parameter"),
    (ReflectionQuery::IsTemplateParameter, "is_template_parameter"),
    (ReflectionQuery::IsTypeTemplateParameter, "is_type_template_parameter"),
    (ReflectionQuery::IsExpression, "is_expression"),
    (ReflectionQuery::IsLvalue, "is_lvalue"),
    (ReflectionQuery::IsRvalue, "is_rvalue"),
    (ReflectionQuery::IsLocal, "is_local"),
    (ReflectionQuery::IsClassMember, "is_class_member"),
    (ReflectionQuery::HasDefaultAccess, "has_default_access"),
    (ReflectionQuery::GetDeclTraits, "get_decl_traits"),
    (ReflectionQuery::GetLinkageTraits, "get_linkage_traits"),
    (ReflectionQuery::GetAccessTraits, "get_access_traits"),
    (ReflectionQuery::GetTypeTraits, "get_type_traits"),
    (ReflectionQuery::GetEntity, "get_entity"),
    (ReflectionQuery::GetParent, "get_parent"),
    (ReflectionQuery::GetType, "get_type"),
    (ReflectionQuery::GetThisRefType, "get_this_ref_type"),
    (ReflectionQuery::GetBegin, "get_begin"),
    (ReflectionQuery::GetNext, "get_next"),
    (ReflectionQuery::GetName, "get_name"),
    (ReflectionQuery::GetDisplayName, "get_display_name"),
];

/// Declaration trait bits
pub mod decl_traits {
    pub const CONSTEXPR: i64 = 1 << 0;
    pub const STATIC_STORAGE: i64 = 1 << 1;
    pub const INLINE: i64 = 1 << 2;
    pub const VIRTUAL: i64 = 1 << 3;
    pub const PURE: i64 = 1 << 4;
    pub const DELETED: i64 = 1 << 5;
    pub const DEFAULTED: i64 = 1 << 6;
    pub const EXPLICIT: i64 = 1 << 7;
    pub const MUTABLE: i64 = 1 << 8;
    pub const IMPLICIT: i64 = 1 << 9;
    pub const DEFINED: i64 = 1 << 10;
}

/// Linkage trait values
pub mod linkage_traits {
    pub const NONE: i64 = 0;
    pub const INTERNAL: i64 = 1;
    pub const EXTERNAL: i64 = 2;
}

/// Access trait values
pub mod access_traits {
    pub const NONE: i64 = 0;
    pub const PUBLIC: i64 = 1;
    pub const PROTECTED: i64 = 2;
    pub const PRIVATE: i64 = 3;
}

/// Class type trait bits
pub mod type_traits {
    pub const COMPLETE: i64 = 1 << 0;
    pub const POLYMORPHIC: i64 = 1 << 1;
    pub const ABSTRACT: i64 = 1 << 2;
    pub const EMPTY: i64 = 1 << 3;
    pub const UNION: i64 = 1 << 4;
    pub const CLASS_KEY: i64 = 1 << 5;
}

impl ReflectionQuery {
    /// Parse a selector name (`is_invalid`, `get_next`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_QUERIES.iter().find(|(_, n)| *n == name).map(|(q, _)| *q)
    }

    pub fn name(self) -> &'static str {
        ALL_QUERIES
            .iter()
            .find(|(q, _)| *q == self)
            .map(|(_, n)| *n)
            .unwrap_or("unknown")
    }

    pub fn is_predicate(self) -> bool {
        (FIRST_PREDICATE..=LAST_PREDICATE).contains(&self)
    }

    pub fn is_trait(self) -> bool {
        (FIRST_TRAIT..=LAST_TRAIT).contains(&self)
    }

    pub fn is_associated(self) -> bool {
        (FIRST_ASSOC..=LAST_ASSOC).contains(&self)
    }

    pub fn is_name(self) -> bool {
        (FIRST_NAME..=LAST_NAME).contains(&self)
    }

    /// Type of the query result
    pub fn result_type(self) -> Type {
        if self.is_predicate() {
            Type::Bool
        } else if self.is_trait() {
            Type::Int
        } else if self.is_associated() {
            Type::Reflection
        } else {
            Type::Str
        }
    }
}

/// Query cannot be answered for the given reflection
#[derive(Debug, Clone, PartialEq, Error)]
#[error("query '{query}' cannot be applied to a reflection of {kind}")]
pub struct QueryError {
    pub query: &'static str,
    pub kind: String,
}

impl QueryError {
    fn new(
        query: ReflectionQuery,
        reflection: &Reflection,
    ) -> Self {
        Self {
            query: query.name(),
            kind: reflection.kind().to_string(),
        }
    }
}

/// Answer a query about a reflection
pub fn evaluate_query(
    ast: &AstContext,
    query: ReflectionQuery,
    reflection: &Reflection,
) -> Result<ConstValue, QueryError> {
    if query.is_predicate() {
        return Ok(ConstValue::Bool(evaluate_predicate(ast, query, reflection)));
    }
    let answer = if query.is_trait() {
        evaluate_trait(ast, query, reflection).map(ConstValue::Int)
    } else if query.is_associated() {
        evaluate_associated(ast, query, reflection).map(ConstValue::Reflection)
    } else {
        evaluate_name(ast, query, reflection).map(ConstValue::Str)
    };
    answer.ok_or_else(|| QueryError::new(query, reflection))
}

/// Declaration designated by a reflection (types through their declaration)
fn designated_decl(
    ast: &AstContext,
    reflection: &Reflection,
) -> Option<DeclId> {
    match &reflection.reflectee {
        Reflectee::Declaration(d) | Reflectee::Template(d) | Reflectee::Namespace(d) => Some(*d),
        Reflectee::Type(_) => reflection.reachable_declaration(ast),
        _ => None,
    }
}

fn reflected_type(
    ast: &AstContext,
    reflection: &Reflection,
) -> Option<Type> {
    match &reflection.reflectee {
        Reflectee::Type(ty) => Some(ast.canonical_type(ty)),
        _ => None,
    }
}

fn record_tag(
    ast: &AstContext,
    decl: DeclId,
) -> Option<TagKind> {
    ast.kind(decl).record().map(|r| r.tag)
}

fn evaluate_predicate(
    ast: &AstContext,
    query: ReflectionQuery,
    reflection: &Reflection,
) -> bool {
    use ReflectionQuery::*;

    let decl = match &reflection.reflectee {
        Reflectee::Declaration(d) | Reflectee::Template(d) | Reflectee::Namespace(d) => Some(*d),
        _ => None,
    };
    let decl_kind = decl.map(|d| ast.kind(d));
    let parent_is_record = decl
        .and_then(|d| ast.parent(d))
        .map(|p| ast.is_record(p))
        .unwrap_or(false);
    let ty = reflected_type(ast, reflection);

    match query {
        IsInvalid => reflection.is_invalid(),
        IsEntity => matches!(
            reflection.kind(),
            ReflectionKind::Type
                | ReflectionKind::Template
                | ReflectionKind::Namespace
                | ReflectionKind::Declaration
        ),
        IsUnnamed => match designated_decl(ast, reflection) {
            Some(d) => ast.decl(d).name.is_empty(),
            None => reflection.kind() == ReflectionKind::Type,
        },
        IsVariable => matches!(decl_kind, Some(DeclKind::Var(_))),
        IsFunction => matches!(decl_kind, Some(DeclKind::Function(_) | DeclKind::Method(_))),
        IsClass => designated_decl(ast, reflection)
            .and_then(|d| record_tag(ast, d))
            .map(|tag| tag != TagKind::Union)
            .unwrap_or(false),
        IsUnion => designated_decl(ast, reflection)
            .and_then(|d| record_tag(ast, d))
            .map(|tag| tag == TagKind::Union)
            .unwrap_or(false),
        IsStaticDataMember => matches!(decl_kind, Some(DeclKind::Var(_))) && parent_is_record,
        IsNonstaticDataMember => matches!(decl_kind, Some(DeclKind::Field(_))),
        IsStaticMemberFunction => matches!(decl_kind, Some(DeclKind::Method(m)) if m.is_static()),
        IsNonstaticMemberFunction => {
            matches!(decl_kind, Some(DeclKind::Method(m)) if !m.is_static())
        }
        IsConstructor => {
            matches!(decl_kind, Some(DeclKind::Method(m)) if m.kind == MethodKind::Constructor)
        }
        IsDestructor => {
            matches!(decl_kind, Some(DeclKind::Method(m)) if m.kind == MethodKind::Destructor)
        }
        IsType => ty.is_some(),
        IsFunctionType => matches!(ty, Some(Type::Function { .. })),
        IsClassType => ty
            .as_ref()
            .and_then(|t| match t.unqualified() {
                Type::Record(d) => record_tag(ast, *d),
                _ => None,
            })
            .map(|tag| tag != TagKind::Union)
            .unwrap_or(false),
        IsUnionType => ty
            .as_ref()
            .and_then(|t| match t.unqualified() {
                Type::Record(d) => record_tag(ast, *d),
                _ => None,
            })
            .map(|tag| tag == TagKind::Union)
            .unwrap_or(false),
        IsVoidType => ty.map(|t| t.is_void()).unwrap_or(false),
        IsIntegralType => ty.map(|t| t.is_integral()).unwrap_or(false),
        IsPointerType => matches!(ty.as_ref().map(Type::unqualified), Some(Type::Pointer(_))),
        IsLvalueReferenceType => matches!(ty, Some(Type::LValueRef(_))),
        IsNamespace => reflection.kind() == ReflectionKind::Namespace,
        IsTypeAlias => match &reflection.reflectee {
            Reflectee::Type(Type::Typedef(_)) => true,
            _ => matches!(decl_kind, Some(DeclKind::Typedef { .. })),
        },
        IsTemplate => reflection.kind() == ReflectionKind::Template,
        IsFunctionTemplate => matches!(decl_kind, Some(DeclKind::FunctionTemplate(_))),
        IsClassTemplate => matches!(decl_kind, Some(DeclKind::ClassTemplate(_))),
        IsDirectBase => base_spec(ast, reflection)
            .map(|b| !b.is_virtual)
            .unwrap_or(false),
        IsVirtualBase => base_spec(ast, reflection)
            .map(|b| b.is_virtual)
            .unwrap_or(false),
        IsFunctionParameter => matches!(decl_kind, Some(DeclKind::Param(_))),
        IsTemplateParameter | IsTypeTemplateParameter => {
            matches!(decl_kind, Some(DeclKind::TemplateTypeParam(_)))
                || matches!(&reflection.reflectee, Reflectee::Type(Type::TemplateParam(_)))
        }
        IsExpression => reflection.kind() == ReflectionKind::Expression,
        IsLvalue => is_lvalue_expression(reflection) == Some(true),
        IsRvalue => is_lvalue_expression(reflection) == Some(false),
        IsLocal => {
            matches!(decl_kind, Some(DeclKind::Var(_) | DeclKind::Param(_)))
                && decl
                    .and_then(|d| ast.parent(d))
                    .map(|p| ast.is_function(p))
                    .unwrap_or(false)
        }
        IsClassMember => parent_is_record,
        HasDefaultAccess => decl
            .and_then(|d| {
                let parent = ast.parent(d)?;
                let tag = record_tag(ast, parent)?;
                Some(ast.decl(d).access == tag.default_access())
            })
            .unwrap_or(false),
        _ => false,
    }
}

fn base_spec<'a>(
    ast: &'a AstContext,
    reflection: &Reflection,
) -> Option<&'a crate::frontend::ast::BaseSpec> {
    match &reflection.reflectee {
        Reflectee::BaseSpecifier { class, index } => ast.kind(*class).record()?.bases.get(*index),
        _ => None,
    }
}

fn is_lvalue_expression(reflection: &Reflection) -> Option<bool> {
    match &reflection.reflectee {
        Reflectee::Expression(e) => Some(matches!(
            e.kind,
            ExprKind::DeclRef(_) | ExprKind::Member { .. } | ExprKind::Assign { .. }
        )),
        _ => None,
    }
}

fn evaluate_trait(
    ast: &AstContext,
    query: ReflectionQuery,
    reflection: &Reflection,
) -> Option<i64> {
    match query {
        ReflectionQuery::GetDeclTraits => {
            let d = match &reflection.reflectee {
                Reflectee::Declaration(d) => *d,
                _ => return None,
            };
            Some(decl_trait_bits(ast, d))
        }
        ReflectionQuery::GetLinkageTraits => {
            let d = designated_decl(ast, reflection)?;
            Some(linkage_of(ast, d))
        }
        ReflectionQuery::GetAccessTraits => {
            let access = match &reflection.reflectee {
                Reflectee::BaseSpecifier { .. } => base_spec(ast, reflection)?.access,
                _ => ast.decl(designated_decl(ast, reflection)?).access,
            };
            Some(match access {
                Access::None => access_traits::NONE,
                Access::Public => access_traits::PUBLIC,
                Access::Protected => access_traits::PROTECTED,
                Access::Private => access_traits::PRIVATE,
            })
        }
        ReflectionQuery::GetTypeTraits => {
            let ty = reflected_type(ast, reflection)?;
            let record = match ty.unqualified() {
                Type::Record(d) => *d,
                _ => return Some(0),
            };
            Some(type_trait_bits(ast, record))
        }
        _ => None,
    }
}

fn decl_trait_bits(
    ast: &AstContext,
    d: DeclId,
) -> i64 {
    use decl_traits::*;

    let decl = ast.decl(d);
    let mut bits = 0;
    if decl.implicit {
        bits |= IMPLICIT;
    }
    match &decl.kind {
        DeclKind::Var(v) => {
            if v.constexpr {
                bits |= CONSTEXPR;
            }
            if v.storage == StorageClass::Static
                || decl.parent.map(|p| ast.is_file_context(p)).unwrap_or(false)
            {
                bits |= STATIC_STORAGE;
            }
            if v.inline {
                bits |= INLINE;
            }
            if v.init.is_some() {
                bits |= DEFINED;
            }
        }
        DeclKind::Field(f) => {
            if f.mutable {
                bits |= MUTABLE;
            }
        }
        DeclKind::Function(f) => {
            if f.constexpr {
                bits |= CONSTEXPR;
            }
            if f.inline {
                bits |= INLINE;
            }
            if f.body.is_some() {
                bits |= DEFINED;
            }
        }
        DeclKind::Method(m) => {
            if m.function.constexpr {
                bits |= CONSTEXPR;
            }
            if m.function.inline || m.function.body.is_some() {
                bits |= INLINE;
            }
            if m.is_virtual {
                bits |= VIRTUAL;
            }
            if m.is_pure {
                bits |= PURE;
            }
            if m.is_deleted {
                bits |= DELETED;
            }
            if m.is_defaulted {
                bits |= DEFAULTED;
            }
            if m.is_explicit {
                bits |= EXPLICIT;
            }
            if m.function.body.is_some() || m.is_defaulted || m.is_deleted {
                bits |= DEFINED;
            }
        }
        DeclKind::Record(r) => {
            if r.complete {
                bits |= DEFINED;
            }
        }
        _ => {}
    }
    bits
}

fn linkage_of(
    ast: &AstContext,
    d: DeclId,
) -> i64 {
    let decl = ast.decl(d);
    if decl.name.is_empty() {
        return linkage_traits::NONE;
    }
    let parent = match decl.parent {
        Some(p) => p,
        None => return linkage_traits::EXTERNAL,
    };
    if ast.is_function(parent) {
        return linkage_traits::NONE;
    }
    if ast.is_record(parent) {
        return linkage_of(ast, parent);
    }
    match &decl.kind {
        DeclKind::Var(v) if v.storage == StorageClass::Static => linkage_traits::INTERNAL,
        DeclKind::Function(f) if f.storage == StorageClass::Static => linkage_traits::INTERNAL,
        DeclKind::Namespace { .. } | DeclKind::TranslationUnit { .. } => linkage_traits::EXTERNAL,
        _ if ast.decl(parent).name.is_empty() && parent != ast.translation_unit() => {
            linkage_traits::INTERNAL
        }
        _ => linkage_traits::EXTERNAL,
    }
}

fn type_trait_bits(
    ast: &AstContext,
    record: DeclId,
) -> i64 {
    use type_traits::*;

    let data = match ast.kind(record).record() {
        Some(r) => r,
        None => return 0,
    };
    let mut bits = 0;
    if data.complete {
        bits |= COMPLETE;
    }
    match data.tag {
        TagKind::Union => bits |= UNION,
        TagKind::Class => bits |= CLASS_KEY,
        TagKind::Struct => {}
    }
    let methods = data
        .members
        .iter()
        .filter_map(|m| match ast.kind(*m) {
            DeclKind::Method(md) => Some(md),
            _ => None,
        });
    for method in methods {
        if method.is_virtual {
            bits |= POLYMORPHIC;
        }
        if method.is_pure {
            bits |= ABSTRACT;
        }
    }
    if ast.fields(record).is_empty() && data.bases.is_empty() {
        bits |= EMPTY;
    }
    bits
}

/// Members visited by `get_begin` / `get_next`
fn is_iterable_member(
    ast: &AstContext,
    d: DeclId,
) -> bool {
    let decl = ast.decl(d);
    !decl.implicit && !decl.is_injected_class_name()
}

fn first_member(
    ast: &AstContext,
    context: DeclId,
) -> Reflection {
    ast.members(context)
        .iter()
        .copied()
        .find(|m| is_iterable_member(ast, *m))
        .map(|m| Reflection::of_decl(ast, m))
        .unwrap_or_else(|| Reflection::invalid(""))
}

fn next_member(
    ast: &AstContext,
    d: DeclId,
) -> Reflection {
    let parent = match ast.parent(d) {
        Some(p) => p,
        None => return Reflection::invalid(""),
    };
    ast.members(parent)
        .iter()
        .copied()
        .skip_while(|m| *m != d)
        .skip(1)
        .find(|m| is_iterable_member(ast, *m))
        .map(|m| Reflection::of_decl(ast, m))
        .unwrap_or_else(|| Reflection::invalid(""))
}

fn evaluate_associated(
    ast: &AstContext,
    query: ReflectionQuery,
    reflection: &Reflection,
) -> Option<Reflection> {
    match query {
        ReflectionQuery::GetEntity => match &reflection.reflectee {
            Reflectee::Expression(e) => match &e.kind {
                ExprKind::DeclRef(d) => Some(Reflection::of_decl(ast, *d)),
                ExprKind::Member { member, .. } => Some(Reflection::of_decl(ast, *member)),
                _ => None,
            },
            _ => designated_decl(ast, reflection).map(|d| Reflection::of_decl(ast, d)),
        },
        ReflectionQuery::GetParent => {
            let d = match &reflection.reflectee {
                Reflectee::BaseSpecifier { class, .. } => {
                    return Some(Reflection::of_type(Type::Record(*class)))
                }
                _ => designated_decl(ast, reflection)?,
            };
            Some(match ast.parent(d) {
                Some(p) if ast.is_record(p) => Reflection::of_type(Type::Record(p)),
                Some(p) => Reflection::of_decl(ast, p),
                None => Reflection::invalid("the translation unit has no parent"),
            })
        }
        ReflectionQuery::GetType => match &reflection.reflectee {
            Reflectee::Declaration(d) => match ast.kind(*d) {
                DeclKind::Typedef { underlying, .. } => {
                    Some(Reflection::of_type(underlying.clone()))
                }
                DeclKind::Var(_)
                | DeclKind::Param(_)
                | DeclKind::Field(_)
                | DeclKind::Function(_)
                | DeclKind::Method(_) => Some(Reflection::of_type(ast.decl_type(*d))),
                _ => None,
            },
            Reflectee::Expression(e) => Some(Reflection::of_type(e.ty.clone())),
            Reflectee::Type(Type::Typedef(d)) => match ast.kind(*d) {
                DeclKind::Typedef { underlying, .. } => {
                    Some(Reflection::of_type(underlying.clone()))
                }
                _ => None,
            },
            Reflectee::BaseSpecifier { .. } => {
                base_spec(ast, reflection).map(|b| Reflection::of_type(b.ty.clone()))
            }
            _ => None,
        },
        ReflectionQuery::GetThisRefType => {
            let d = match &reflection.reflectee {
                Reflectee::Declaration(d) => *d,
                _ => return None,
            };
            match ast.kind(d) {
                DeclKind::Method(m) if !m.is_static() => {
                    let class = Type::Record(ast.parent(d)?);
                    let class = if m.is_const { class.const_of() } else { class };
                    Some(Reflection::of_type(class.lvalue_ref()))
                }
                _ => None,
            }
        }
        ReflectionQuery::GetBegin => {
            let d = designated_decl(ast, reflection)?;
            if ast.kind(d).members().is_none() {
                return None;
            }
            Some(first_member(ast, d))
        }
        ReflectionQuery::GetNext => match &reflection.reflectee {
            Reflectee::Declaration(d) | Reflectee::Template(d) | Reflectee::Namespace(d) => {
                Some(next_member(ast, *d))
            }
            Reflectee::Type(ty) => match ty.unqualified() {
                Type::Record(d) | Type::Typedef(d) => Some(next_member(ast, *d)),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn evaluate_name(
    ast: &AstContext,
    query: ReflectionQuery,
    reflection: &Reflection,
) -> Option<String> {
    match &reflection.reflectee {
        Reflectee::Type(ty) => match designated_decl(ast, reflection) {
            Some(d) if query == ReflectionQuery::GetName => Some(ast.decl(d).name_str().to_string()),
            _ => Some(ast.type_name(ty)),
        },
        Reflectee::Declaration(d) | Reflectee::Template(d) | Reflectee::Namespace(d) => {
            Some(match query {
                ReflectionQuery::GetDisplayName => ast.qualified_name(*d),
                _ => ast.decl(*d).name_str().to_string(),
            })
        }
        Reflectee::BaseSpecifier { .. } => base_spec(ast, reflection).map(|b| ast.type_name(&b.ty)),
        Reflectee::Expression(_) | Reflectee::Invalid(_) => None,
    }
}
