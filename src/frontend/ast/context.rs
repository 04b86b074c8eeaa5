//! Declaration arena
//!
//! Declarations are never freed. A declaration removed from its owner (an
//! evaluated metaprogram) stays addressable, it is only unlinked from the
//! member list.

use super::{Decl, DeclId, DeclKind, DeclName, Type};
use crate::util::span::Span;

/// What kind of declaration context a declaration is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    TranslationUnit,
    Namespace,
    Record,
    Function,
    Other,
}

impl ContextKind {
    /// Description used in injection diagnostics
    pub fn describe(self) -> &'static str {
        match self {
            ContextKind::TranslationUnit => "the translation unit",
            ContextKind::Namespace => "a namespace",
            ContextKind::Record => "a class",
            ContextKind::Function => "a function body",
            ContextKind::Other => "this context",
        }
    }
}

/// Arena of declarations
#[derive(Debug, Clone)]
pub struct AstContext {
    decls: Vec<Decl>,
}

impl Default for AstContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AstContext {
    /// Create an arena holding an empty translation unit
    pub fn new() -> Self {
        let tu = Decl::new(
            DeclKind::TranslationUnit {
                members: Vec::new(),
            },
            DeclName::Empty,
            None,
            Span::dummy(),
        );
        Self { decls: vec![tu] }
    }

    #[inline]
    pub fn translation_unit(&self) -> DeclId {
        DeclId(0)
    }

    /// Allocate a declaration without linking it into its parent
    pub fn alloc(
        &mut self,
        decl: Decl,
    ) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    #[inline]
    pub fn decl(
        &self,
        id: DeclId,
    ) -> &Decl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn decl_mut(
        &mut self,
        id: DeclId,
    ) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    pub fn get(
        &self,
        id: DeclId,
    ) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    /// Number of allocated declarations
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn parent(
        &self,
        id: DeclId,
    ) -> Option<DeclId> {
        self.decl(id).parent
    }

    pub fn kind(
        &self,
        id: DeclId,
    ) -> &DeclKind {
        &self.decl(id).kind
    }

    /// Members of a context declaration (empty for anything else)
    pub fn members(
        &self,
        id: DeclId,
    ) -> &[DeclId] {
        self.decl(id)
            .kind
            .members()
            .map(|m| m.as_slice())
            .unwrap_or(&[])
    }

    /// Append `member` to the member list of `owner`
    ///
    /// Returns false when `owner` does not hold members.
    pub fn add_member(
        &mut self,
        owner: DeclId,
        member: DeclId,
    ) -> bool {
        match self.decl_mut(owner).kind.members_mut() {
            Some(members) => {
                members.push(member);
                true
            }
            None => false,
        }
    }

    /// Unlink `member` from `owner`
    pub fn remove_member(
        &mut self,
        owner: DeclId,
        member: DeclId,
    ) {
        if let Some(members) = self.decl_mut(owner).kind.members_mut() {
            members.retain(|m| *m != member);
        }
    }

    pub fn mark_invalid(
        &mut self,
        id: DeclId,
    ) {
        self.decl_mut(id).invalid = true;
    }

    pub fn is_invalid(
        &self,
        id: DeclId,
    ) -> bool {
        self.decl(id).invalid
    }

    pub fn context_kind(
        &self,
        id: DeclId,
    ) -> ContextKind {
        match &self.decl(id).kind {
            DeclKind::TranslationUnit { .. } => ContextKind::TranslationUnit,
            DeclKind::Namespace { .. } => ContextKind::Namespace,
            DeclKind::Record(_) => ContextKind::Record,
            DeclKind::Function(_) | DeclKind::Method(_) => ContextKind::Function,
            _ => ContextKind::Other,
        }
    }

    pub fn is_record(
        &self,
        id: DeclId,
    ) -> bool {
        self.context_kind(id) == ContextKind::Record
    }

    /// Translation unit or namespace
    pub fn is_file_context(
        &self,
        id: DeclId,
    ) -> bool {
        matches!(
            self.context_kind(id),
            ContextKind::TranslationUnit | ContextKind::Namespace
        )
    }

    pub fn is_function(
        &self,
        id: DeclId,
    ) -> bool {
        self.context_kind(id) == ContextKind::Function
    }

    /// Ancestors of `id`, innermost first, excluding `id` itself
    pub fn ancestors(
        &self,
        id: DeclId,
    ) -> Ancestors<'_> {
        Ancestors {
            ast: self,
            next: self.parent(id),
        }
    }

    /// Declared inside a fragment (or a fragment-flagged class)
    pub fn is_in_fragment(
        &self,
        id: DeclId,
    ) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .any(|d| match &self.decl(d).kind {
                DeclKind::Fragment(_) => true,
                DeclKind::Record(r) => r.fragment,
                _ => false,
            })
    }

    /// Names and values in this context wait for substitution
    pub fn is_dependent_context(
        &self,
        id: DeclId,
    ) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .any(|d| match &self.decl(d).kind {
                DeclKind::Fragment(_) => true,
                DeclKind::Record(r) => r.fragment || r.described_template.is_some(),
                DeclKind::Function(f) => f.described_template.is_some(),
                DeclKind::Method(m) => m.function.described_template.is_some(),
                _ => false,
            })
    }

    /// Nearest record at or above `id`
    pub fn enclosing_record(
        &self,
        id: DeclId,
    ) -> Option<DeclId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|d| self.is_record(*d))
    }

    /// Nearest file context at or above `id`
    pub fn enclosing_file_context(
        &self,
        id: DeclId,
    ) -> DeclId {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|d| self.is_file_context(*d))
            .unwrap_or_else(|| self.translation_unit())
    }

    /// Non-static data members of a record, in declaration order
    pub fn fields(
        &self,
        record: DeclId,
    ) -> Vec<DeclId> {
        self.members(record)
            .iter()
            .copied()
            .filter(|m| matches!(self.decl(*m).kind, DeclKind::Field(_)))
            .collect()
    }

    /// Position of `field` among the fields of its record
    pub fn field_index(
        &self,
        field: DeclId,
    ) -> Option<usize> {
        let record = self.parent(field)?;
        self.fields(record).iter().position(|f| *f == field)
    }

    /// Constructors of a record
    pub fn constructors(
        &self,
        record: DeclId,
    ) -> Vec<DeclId> {
        self.members(record)
            .iter()
            .copied()
            .filter(|m| {
                matches!(&self.decl(*m).kind,
                    DeclKind::Method(md) if md.kind == super::MethodKind::Constructor)
            })
            .collect()
    }

    /// Find a member by name, searching base classes after the record itself
    pub fn lookup_member(
        &self,
        context: DeclId,
        name: &str,
    ) -> Option<DeclId> {
        let found = self.members(context).iter().copied().find(|m| {
            let decl = self.decl(*m);
            decl.name.as_str() == Some(name)
                && !decl.is_injected_class_name()
                && !matches!(decl.kind, DeclKind::AccessSpec | DeclKind::Metaprogram(_))
        });
        if found.is_some() {
            return found;
        }
        let record = self.decl(context).kind.record()?;
        record
            .bases
            .iter()
            .filter_map(|b| b.ty.as_record())
            .find_map(|base| self.lookup_member(base, name))
    }

    /// Type of a value declaration, or the type a type declaration names
    pub fn decl_type(
        &self,
        id: DeclId,
    ) -> Type {
        match &self.decl(id).kind {
            DeclKind::Var(v) => v.ty.clone(),
            DeclKind::Param(p) => p.ty.clone(),
            DeclKind::Field(f) => f.ty.clone(),
            DeclKind::Function(f) => self.function_type(f),
            DeclKind::Method(m) => self.function_type(&m.function),
            DeclKind::Record(_) => Type::Record(id),
            DeclKind::Typedef { .. } => Type::Typedef(id),
            DeclKind::TemplateTypeParam(_) => Type::TemplateParam(id),
            _ => Type::Void,
        }
    }

    fn function_type(
        &self,
        f: &super::FunctionData,
    ) -> Type {
        Type::Function {
            ret: Box::new(f.return_type.clone()),
            params: f.params.iter().map(|p| self.decl_type(*p)).collect(),
        }
    }

    /// Resolve typedefs
    pub fn canonical_type(
        &self,
        ty: &Type,
    ) -> Type {
        match ty {
            Type::Typedef(id) => match &self.decl(*id).kind {
                DeclKind::Typedef { underlying, .. } => self.canonical_type(underlying),
                _ => Type::Error,
            },
            Type::Const(inner) => self.canonical_type(inner).const_of(),
            Type::Pointer(inner) => self.canonical_type(inner).pointer_to(),
            Type::LValueRef(inner) => self.canonical_type(inner).lvalue_ref(),
            other => other.clone(),
        }
    }

    /// `a::b::c`
    pub fn qualified_name(
        &self,
        id: DeclId,
    ) -> String {
        let mut parts: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|d| self.decl(d).name.as_str())
            .collect();
        parts.reverse();
        parts.join("::")
    }

    /// Printable type
    pub fn type_name(
        &self,
        ty: &Type,
    ) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Int => "int".to_string(),
            Type::Str => "const char *".to_string(),
            Type::Reflection => "meta::info".to_string(),
            Type::Record(id) | Type::Typedef(id) | Type::TemplateParam(id) => {
                let name = self.qualified_name(*id);
                if name.is_empty() {
                    "(anonymous)".to_string()
                } else {
                    name
                }
            }
            Type::Pointer(inner) => format!("{} *", self.type_name(inner)),
            Type::LValueRef(inner) => format!("{} &", self.type_name(inner)),
            Type::Const(inner) => format!("const {}", self.type_name(inner)),
            Type::Function { ret, params } => {
                let params: Vec<String> = params.iter().map(|p| self.type_name(p)).collect();
                format!("{} ({})", self.type_name(ret), params.join(", "))
            }
            Type::Dependent => "<dependent type>".to_string(),
            Type::Undeduced => "auto".to_string(),
            Type::Splice(_) => "typename(...)".to_string(),
            Type::Error => "<error type>".to_string(),
        }
    }
}

/// Iterator over semantic parents
pub struct Ancestors<'a> {
    ast: &'a AstContext,
    next: Option<DeclId>,
}

impl Iterator for Ancestors<'_> {
    type Item = DeclId;

    fn next(&mut self) -> Option<DeclId> {
        let current = self.next?;
        self.next = self.ast.parent(current);
        Some(current)
    }
}
