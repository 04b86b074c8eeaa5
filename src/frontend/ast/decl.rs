//! Declarations
//!
//! A declaration is a node in the [`AstContext`](super::AstContext) arena,
//! addressed by a [`DeclId`]. Context declarations (translation unit,
//! namespaces, records) own an ordered member list; every other declaration
//! only points at its semantic parent.

use super::{Expr, Stmt, Type};
use crate::util::span::Span;
use std::fmt;

/// Stable handle of a declaration in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub(crate) u32);

impl DeclId {
    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declaration name
#[derive(Debug, Clone, PartialEq)]
pub enum DeclName {
    /// Plain identifier
    Ident(String),
    /// Anonymous
    Empty,
    /// Identifier splice `[# parts... #]` not yet evaluated
    Splice(Vec<Expr>),
}

impl DeclName {
    /// Identifier name
    pub fn ident(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            DeclName::Empty
        } else {
            DeclName::Ident(name)
        }
    }

    /// No name at all
    pub fn is_empty(&self) -> bool {
        matches!(self, DeclName::Empty)
    }

    /// The identifier, if resolved
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DeclName::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Still waiting on a splice
    pub fn is_dependent(&self) -> bool {
        matches!(self, DeclName::Splice(_))
    }
}

impl From<&str> for DeclName {
    fn from(name: &str) -> Self {
        DeclName::ident(name)
    }
}

impl From<String> for DeclName {
    fn from(name: String) -> Self {
        DeclName::ident(name)
    }
}

impl fmt::Display for DeclName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            DeclName::Ident(name) => write!(f, "{}", name),
            DeclName::Empty => write!(f, "(anonymous)"),
            DeclName::Splice(_) => write!(f, "[# ... #]"),
        }
    }
}

/// Member access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    /// Not a class member
    #[default]
    None,
    Public,
    Protected,
    Private,
}

impl fmt::Display for Access {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Access::None => write!(f, "none"),
            Access::Public => write!(f, "public"),
            Access::Protected => write!(f, "protected"),
            Access::Private => write!(f, "private"),
        }
    }
}

/// Class key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Struct,
    Class,
    Union,
}

impl TagKind {
    /// Access of members declared before any access specifier
    pub fn default_access(self) -> Access {
        match self {
            TagKind::Struct | TagKind::Union => Access::Public,
            TagKind::Class => Access::Private,
        }
    }
}

/// Special member kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MethodKind {
    #[default]
    Ordinary,
    Constructor,
    Destructor,
    Conversion,
}

/// Storage class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageClass {
    #[default]
    None,
    Static,
    Extern,
}

/// Function (also the function part of a method)
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionData {
    pub params: Vec<DeclId>,
    pub return_type: Type,
    pub body: Option<Stmt>,
    pub constexpr: bool,
    pub inline: bool,
    pub storage: StorageClass,
    /// Template this function is the pattern of
    pub described_template: Option<DeclId>,
}

impl FunctionData {
    pub fn new(return_type: Type) -> Self {
        Self {
            params: Vec::new(),
            return_type,
            body: None,
            constexpr: false,
            inline: false,
            storage: StorageClass::None,
            described_template: None,
        }
    }
}

/// Constructor member initializer
#[derive(Debug, Clone, PartialEq)]
pub struct CtorInit {
    pub field: DeclId,
    pub init: Expr,
    pub span: Span,
}

/// Method of a class
#[derive(Debug, Clone, PartialEq)]
pub struct MethodData {
    pub function: FunctionData,
    pub kind: MethodKind,
    pub is_virtual: bool,
    pub is_pure: bool,
    pub is_deleted: bool,
    pub is_defaulted: bool,
    pub is_const: bool,
    pub is_explicit: bool,
    pub ctor_inits: Vec<CtorInit>,
}

impl MethodData {
    pub fn new(
        kind: MethodKind,
        return_type: Type,
    ) -> Self {
        Self {
            function: FunctionData::new(return_type),
            kind,
            is_virtual: false,
            is_pure: false,
            is_deleted: false,
            is_defaulted: false,
            is_const: false,
            is_explicit: false,
            ctor_inits: Vec::new(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.function.storage == StorageClass::Static
    }
}

/// Variable
#[derive(Debug, Clone, PartialEq)]
pub struct VarData {
    pub ty: Type,
    pub init: Option<Expr>,
    pub storage: StorageClass,
    pub constexpr: bool,
    pub inline: bool,
    pub nrvo: bool,
    /// Loop variable of a range-based for
    pub for_range: bool,
    /// Out-of-line definition of a static data member
    pub out_of_line: bool,
}

impl VarData {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            init: None,
            storage: StorageClass::None,
            constexpr: false,
            inline: false,
            nrvo: false,
            for_range: false,
            out_of_line: false,
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamData {
    pub ty: Type,
    pub index: usize,
    pub default: Option<Expr>,
}

/// Base class specifier
#[derive(Debug, Clone, PartialEq)]
pub struct BaseSpec {
    pub ty: Type,
    pub is_virtual: bool,
    pub access: Access,
    pub span: Span,
}

/// Class, struct or union
#[derive(Debug, Clone, PartialEq)]
pub struct RecordData {
    pub tag: TagKind,
    pub bases: Vec<BaseSpec>,
    pub members: Vec<DeclId>,
    pub has_definition: bool,
    pub complete: bool,
    /// Implicit self-reference member of a class
    pub injected_class_name: bool,
    /// Fragment-flagged class (metaclass prototype)
    pub fragment: bool,
    /// Synthesized fragment closure type
    pub closure: bool,
    pub described_template: Option<DeclId>,
    /// Generator of a metaclass definition
    pub metafunction: Option<Expr>,
}

impl RecordData {
    pub fn new(tag: TagKind) -> Self {
        Self {
            tag,
            bases: Vec::new(),
            members: Vec::new(),
            has_definition: false,
            complete: false,
            injected_class_name: false,
            fragment: false,
            closure: false,
            described_template: None,
            metafunction: None,
        }
    }
}

/// Non-static data member
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData {
    pub ty: Type,
    pub init: Option<Expr>,
    pub mutable: bool,
}

/// Function or class template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateData {
    pub params: Vec<DeclId>,
    pub pattern: DeclId,
}

/// Template type parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTypeParamData {
    pub depth: u32,
    pub index: u32,
    pub default: Option<Type>,
}

/// Fragment: placeholders for captured values plus the content declaration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FragmentData {
    pub placeholders: Vec<DeclId>,
    pub content: Option<DeclId>,
}

/// Metaprogram or injection declaration
///
/// The body lives on `callee`: a synthetic `__constexpr_decl` function at
/// file and class scope, or the call operator of a closure in function scope.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaprogramData {
    pub callee: DeclId,
    /// Closure record when `callee` is a call operator
    pub closure: Option<DeclId>,
    /// Written as `consteval -> operand;`
    pub injection: bool,
}

/// Declaration kind
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    TranslationUnit { members: Vec<DeclId> },
    Namespace { members: Vec<DeclId>, inline: bool },
    Typedef { underlying: Type, alias: bool },
    Function(FunctionData),
    Method(MethodData),
    Var(VarData),
    Param(ParamData),
    Record(RecordData),
    Field(FieldData),
    AccessSpec,
    FunctionTemplate(TemplateData),
    ClassTemplate(TemplateData),
    TemplateTypeParam(TemplateTypeParamData),
    Fragment(FragmentData),
    Metaprogram(MetaprogramData),
}

impl DeclKind {
    /// Kind name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            DeclKind::TranslationUnit { .. } => "translation unit",
            DeclKind::Namespace { .. } => "namespace",
            DeclKind::Typedef { .. } => "typedef",
            DeclKind::Function(_) => "function",
            DeclKind::Method(m) => match m.kind {
                MethodKind::Ordinary => "method",
                MethodKind::Constructor => "constructor",
                MethodKind::Destructor => "destructor",
                MethodKind::Conversion => "conversion function",
            },
            DeclKind::Var(_) => "variable",
            DeclKind::Param(_) => "parameter",
            DeclKind::Record(_) => "class",
            DeclKind::Field(_) => "field",
            DeclKind::AccessSpec => "access specifier",
            DeclKind::FunctionTemplate(_) => "function template",
            DeclKind::ClassTemplate(_) => "class template",
            DeclKind::TemplateTypeParam(_) => "template type parameter",
            DeclKind::Fragment(_) => "fragment",
            DeclKind::Metaprogram(_) => "metaprogram",
        }
    }

    /// Function data of a function or method
    pub fn function(&self) -> Option<&FunctionData> {
        match self {
            DeclKind::Function(f) => Some(f),
            DeclKind::Method(m) => Some(&m.function),
            _ => None,
        }
    }

    pub fn function_mut(&mut self) -> Option<&mut FunctionData> {
        match self {
            DeclKind::Function(f) => Some(f),
            DeclKind::Method(m) => Some(&mut m.function),
            _ => None,
        }
    }

    pub fn record(&self) -> Option<&RecordData> {
        match self {
            DeclKind::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut RecordData> {
        match self {
            DeclKind::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Ordered member list of a context declaration
    pub fn members(&self) -> Option<&Vec<DeclId>> {
        match self {
            DeclKind::TranslationUnit { members } | DeclKind::Namespace { members, .. } => {
                Some(members)
            }
            DeclKind::Record(r) => Some(&r.members),
            _ => None,
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut Vec<DeclId>> {
        match self {
            DeclKind::TranslationUnit { members } | DeclKind::Namespace { members, .. } => {
                Some(members)
            }
            DeclKind::Record(r) => Some(&mut r.members),
            _ => None,
        }
    }
}

/// A declaration node
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub name: DeclName,
    /// Semantic parent (None only for the translation unit)
    pub parent: Option<DeclId>,
    pub access: Access,
    pub span: Span,
    pub invalid: bool,
    /// Synthesized by the compiler
    pub implicit: bool,
}

impl Decl {
    pub fn new(
        kind: DeclKind,
        name: DeclName,
        parent: Option<DeclId>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            name,
            parent,
            access: Access::None,
            span,
            invalid: false,
            implicit: false,
        }
    }

    /// Builder-style implicit flag
    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    /// Identifier, or the empty string
    pub fn name_str(&self) -> &str {
        self.name.as_str().unwrap_or("")
    }

    pub fn is_injected_class_name(&self) -> bool {
        matches!(&self.kind, DeclKind::Record(r) if r.injected_class_name)
    }
}
