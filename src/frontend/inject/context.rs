//! Injection context state
//!
//! One [`InjectionContext`] exists per top-level injection. It records which
//! new declaration replaced which source declaration, the values substituted
//! for fragment placeholders, and the field initializers and method bodies
//! whose transformation waits for the owning class to be complete.

use crate::frontend::ast::{AstContext, DeclId, DeclKind, Type};
use crate::frontend::const_eval::ConstValue;
use crate::frontend::reflect::ReflectionModifiers;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::HashMap;

/// A compile-time value along with its type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub ty: Type,
    pub value: ConstValue,
}

/// What a deferred definition fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedDefKind {
    /// In-class field initializer
    Field,
    /// Method body and constructor initializers
    Method,
}

/// A definition inside the injected content that is transformed later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedDef {
    pub kind: InjectedDefKind,
    /// Declaration within the fragment or the copied source
    pub fragment: DeclId,
    /// The injected declaration
    pub injected: DeclId,
}

/// One captured value of a fragment closure
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionCapture {
    /// Capture field of the closure type
    pub decl: DeclId,
    pub value: ConstValue,
}

/// Captures in closure field order
pub type Captures = SmallVec<[InjectionCapture; 8]>;

/// Lifecycle of a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Cloning declarations and accepting deferred definitions
    Open,
    /// Replaying deferred definitions
    Draining,
}

/// Substitution state of one injection
#[derive(Debug)]
pub struct InjectionContext {
    /// Source declaration -> injected declaration, in registration order
    transformed: IndexMap<DeclId, DeclId>,
    /// Fragment placeholder -> captured value
    placeholders: HashMap<DeclId, TypedValue>,
    /// Deferred definitions in insertion order
    definitions: Vec<InjectedDef>,
    modifiers: ReflectionModifiers,
    state: ContextState,
    injectee: DeclId,
}

impl InjectionContext {
    pub fn new(injectee: DeclId) -> Self {
        Self {
            transformed: IndexMap::new(),
            placeholders: HashMap::new(),
            definitions: Vec::new(),
            modifiers: ReflectionModifiers::default(),
            state: ContextState::Open,
            injectee,
        }
    }

    /// Target of the injection
    pub fn injectee(&self) -> DeclId {
        self.injectee
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Still accepting deferred definitions
    pub fn is_open(&self) -> bool {
        self.state == ContextState::Open
    }

    /// Register `new` as the replacement of `old`
    ///
    /// A declaration is injected at most once per context.
    pub fn add_decl_substitution(
        &mut self,
        old: DeclId,
        new: DeclId,
    ) {
        debug_assert!(
            !self.transformed.contains_key(&old),
            "overwriting substitution for {}",
            old
        );
        self.transformed.insert(old, new);
    }

    /// Register the value of one placeholder
    pub fn add_placeholder_substitution(
        &mut self,
        placeholder: DeclId,
        ty: Type,
        value: ConstValue,
    ) {
        debug_assert!(
            !self.placeholders.contains_key(&placeholder),
            "overwriting placeholder {}",
            placeholder
        );
        self.placeholders
            .insert(placeholder, TypedValue { ty, value });
    }

    /// Pair the placeholders of `fragment` with `captures`, positionally
    ///
    /// The type of each substitution is the type of the closure field that
    /// held the value.
    pub fn add_placeholder_substitutions(
        &mut self,
        ast: &AstContext,
        fragment: DeclId,
        captures: &[InjectionCapture],
    ) {
        let placeholders = match ast.kind(fragment) {
            DeclKind::Fragment(f) => f.placeholders.clone(),
            _ => {
                debug_assert!(false, "{} is not a fragment", fragment);
                return;
            }
        };
        for (placeholder, capture) in placeholders.into_iter().zip(captures) {
            let ty = ast.decl_type(capture.decl);
            self.add_placeholder_substitution(placeholder, ty, capture.value.clone());
        }
    }

    /// Replacement registered for `decl`
    pub fn get_decl_replacement(
        &self,
        decl: DeclId,
    ) -> Option<DeclId> {
        self.transformed.get(&decl).copied()
    }

    /// Value substituted for a placeholder
    pub fn placeholder_replacement(
        &self,
        decl: DeclId,
    ) -> Option<&TypedValue> {
        self.placeholders.get(&decl)
    }

    /// Every substitution made so far
    pub fn substitutions(&self) -> impl Iterator<Item = (DeclId, DeclId)> + '_ {
        self.transformed.iter().map(|(old, new)| (*old, *new))
    }

    pub fn modifiers(&self) -> &ReflectionModifiers {
        &self.modifiers
    }

    pub fn set_modifiers(
        &mut self,
        modifiers: ReflectionModifiers,
    ) {
        self.modifiers = modifiers;
    }

    /// Prepare for the deferred phase
    ///
    /// Modifiers only applied to the declaration named by the injection,
    /// never to definitions drained later.
    pub fn detach(&mut self) {
        self.modifiers = ReflectionModifiers::default();
    }

    /// Switch to [`ContextState::Draining`]; returns false if already there
    pub fn begin_draining(&mut self) -> bool {
        match self.state {
            ContextState::Open => {
                self.state = ContextState::Draining;
                true
            }
            ContextState::Draining => false,
        }
    }

    pub fn push_definition(
        &mut self,
        def: InjectedDef,
    ) {
        debug_assert_eq!(self.state, ContextState::Open);
        self.definitions.push(def);
    }

    pub fn has_definitions(&self) -> bool {
        !self.definitions.is_empty()
    }

    pub fn definitions(&self) -> &[InjectedDef] {
        &self.definitions
    }

    /// Deferred definitions of one kind, in insertion order
    pub fn definitions_of(
        &self,
        kind: InjectedDefKind,
    ) -> Vec<InjectedDef> {
        self.definitions
            .iter()
            .filter(|d| d.kind == kind)
            .copied()
            .collect()
    }
}
