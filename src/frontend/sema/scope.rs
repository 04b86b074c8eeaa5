//! Lexical scopes
//!
//! The scope stack mirrors what a parser would have open: the translation
//! unit, namespaces, classes, function bodies, blocks, template parameter
//! lists and fragments. It answers unqualified name lookup and collects the
//! captures of a fragment.

use crate::frontend::ast::{Access, AstContext, DeclId, DeclKind};

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    TranslationUnit,
    Namespace,
    Class,
    Function,
    Block,
    Fragment,
    Template,
}

/// One open scope
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Declaration context the scope belongs to
    pub entity: DeclId,
    /// Declarations found by lookup in this scope that are not members of
    /// `entity`: locals, parameters, placeholders, template parameters
    pub decls: Vec<DeclId>,
    /// Current access in a class scope
    pub access: Access,
    /// Variables a fragment scope captured, in placeholder order
    pub captures: Vec<DeclId>,
}

impl Scope {
    pub fn new(
        kind: ScopeKind,
        entity: DeclId,
    ) -> Self {
        Self {
            kind,
            entity,
            decls: Vec::new(),
            access: Access::None,
            captures: Vec::new(),
        }
    }

    fn holds_locals(&self) -> bool {
        matches!(
            self.kind,
            ScopeKind::Function | ScopeKind::Block | ScopeKind::Fragment
        )
    }
}

/// Stack of open scopes, outermost first
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new(translation_unit: DeclId) -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::TranslationUnit, translation_unit)],
        }
    }

    pub fn push(
        &mut self,
        scope: Scope,
    ) {
        self.scopes.push(scope);
    }

    /// Pop the innermost scope; the translation unit scope stays
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn current(&self) -> &Scope {
        // the translation unit scope is never popped
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Make `decl` visible in the innermost scope
    pub fn declare(
        &mut self,
        decl: DeclId,
    ) {
        self.current_mut().decls.push(decl);
    }

    /// Innermost first
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter().rev()
    }

    /// Local variables a fragment opened here would capture
    ///
    /// Scopes are walked from the innermost outwards up to the enclosing
    /// function. A variable whose type is still undeduced and that has no
    /// initializer is skipped: the fragment sits inside its initializer.
    pub fn find_captures(
        &self,
        ast: &AstContext,
    ) -> Vec<DeclId> {
        let mut captures = Vec::new();
        for scope in self.iter() {
            if !scope.holds_locals() {
                break;
            }
            for decl in &scope.decls {
                let capturable = match ast.kind(*decl) {
                    DeclKind::Param(_) => true,
                    DeclKind::Var(v) => v.init.is_some() || !v.ty.is_undeduced(),
                    _ => false,
                };
                if capturable {
                    captures.push(*decl);
                }
            }
            if scope.kind == ScopeKind::Function {
                break;
            }
        }
        captures
    }

    /// Unqualified lookup; every declaration of the innermost scope that
    /// declares `name`
    pub fn lookup(
        &self,
        ast: &AstContext,
        name: &str,
    ) -> Vec<DeclId> {
        for scope in self.iter() {
            let mut found: Vec<DeclId> = scope
                .decls
                .iter()
                .rev()
                .copied()
                .filter(|d| ast.decl(*d).name.as_str() == Some(name))
                .collect();
            if !found.is_empty() {
                found.truncate(1);
                return found;
            }

            if matches!(
                scope.kind,
                ScopeKind::TranslationUnit | ScopeKind::Namespace | ScopeKind::Class
            ) {
                found = ast
                    .members(scope.entity)
                    .iter()
                    .copied()
                    .filter(|m| {
                        let decl = ast.decl(*m);
                        decl.name.as_str() == Some(name)
                            && !decl.is_injected_class_name()
                            && !matches!(decl.kind, DeclKind::AccessSpec | DeclKind::Metaprogram(_))
                    })
                    .collect();
                if found.is_empty() && scope.kind == ScopeKind::Class {
                    found.extend(ast.lookup_member(scope.entity, name));
                }
                if !found.is_empty() {
                    return found;
                }
            }
        }
        Vec::new()
    }
}
