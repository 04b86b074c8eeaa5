//! Semantic session
//!
//! [`Session`] owns everything one translation unit needs: the declaration
//! arena, the scope stack, diagnostics, the constant evaluator and the
//! queue of injection contexts waiting for their classes to complete. Its
//! builder methods play the part of the parser actions that open and close
//! classes, namespaces, functions, fragments and metaprograms.

mod consumer;
mod fragment;
mod inject_stmt;
mod lookup;
mod metaclass;
mod metaprogram;
mod reflection;
mod scope;


pub use consumer::{AstConsumer, NullConsumer, RecordingConsumer};
pub use scope::{Scope, ScopeKind, ScopeStack};

use crate::frontend::ast::{
    Access, AstContext, BaseSpec, CtorInit, Decl, DeclId, DeclKind, DeclName, Expr, FieldData,
    FunctionData, MethodData, MethodKind, ParamData, RecordData, StorageClass, Stmt, TagKind,
    TemplateData, TemplateTypeParamData, Type, VarData,
};
use crate::frontend::const_eval::{ConstValue, ConstantEvaluator, EvalOutcome, Interpreter};
use crate::frontend::inject::InjectionContext;
use crate::util::config::EngineConfig;
use crate::util::diagnostic::{Diagnostic, DiagnosticSink, ErrorCodeDefinition};
use crate::util::span::Span;
use tracing::debug;

/// Current context saved by [`Session::switch_context`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedContext {
    context: DeclId,
    this_override: Option<DeclId>,
}

/// Compilation session of one translation unit
pub struct Session {
    pub(crate) ast: AstContext,
    pub(crate) diags: DiagnosticSink,
    config: EngineConfig,
    /// Semantic context new declarations are created in
    pub(crate) cur_context: DeclId,
    /// Class `this` refers to while a field initializer is transformed
    pub(crate) this_override: Option<DeclId>,
    pub(crate) scopes: ScopeStack,
    /// Contexts entered by the builder, restored when the scope closes
    entered: Vec<SavedContext>,
    pub(crate) consumer: Box<dyn AstConsumer>,
    evaluator: Box<dyn ConstantEvaluator>,
    pub(crate) pending_injections: Vec<InjectionContext>,
    /// Template parameters waiting for the templated declaration
    pending_template: Option<Vec<DeclId>>,
    /// Template created for the last pattern
    last_template: Option<DeclId>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("decls", &self.ast.len())
            .field("diagnostics", &self.diags.len())
            .field("cur_context", &self.cur_context)
            .field("pending_injections", &self.pending_injections.len())
            .finish()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let ast = AstContext::new();
        let tu = ast.translation_unit();
        let evaluator = Interpreter::from_config(&config.eval);
        Self {
            ast,
            diags: DiagnosticSink::new(),
            config,
            cur_context: tu,
            this_override: None,
            scopes: ScopeStack::new(tu),
            entered: Vec::new(),
            consumer: Box::new(NullConsumer),
            evaluator: Box::new(evaluator),
            pending_injections: Vec::new(),
            pending_template: None,
            last_template: None,
        }
    }

    /// Replace the constant evaluator
    pub fn with_evaluator(
        mut self,
        evaluator: Box<dyn ConstantEvaluator>,
    ) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Replace the top-level declaration consumer
    pub fn with_consumer(
        mut self,
        consumer: Box<dyn AstConsumer>,
    ) -> Self {
        self.consumer = consumer;
        self
    }

    pub fn ast(&self) -> &AstContext {
        &self.ast
    }

    pub fn ast_mut(&mut self) -> &mut AstContext {
        &mut self.ast
    }

    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.diags
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diags.take()
    }

    pub fn emit(
        &mut self,
        diagnostic: Diagnostic,
    ) {
        self.diags.emit(diagnostic);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_context(&self) -> DeclId {
        self.cur_context
    }

    pub fn translation_unit(&self) -> DeclId {
        self.ast.translation_unit()
    }

    /// Method data of `decl`, for setting specifiers
    pub fn method_mut(
        &mut self,
        decl: DeclId,
    ) -> Option<&mut MethodData> {
        match &mut self.ast.decl_mut(decl).kind {
            DeclKind::Method(m) => Some(m),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // context switching

    /// Make `context` current; `this` follows the context
    pub fn switch_context(
        &mut self,
        context: DeclId,
    ) -> SavedContext {
        self.switch_context_with_this(context, None)
    }

    /// Make `context` current with `this` bound to `this_record`
    pub fn switch_context_with_this(
        &mut self,
        context: DeclId,
        this_record: Option<DeclId>,
    ) -> SavedContext {
        let saved = SavedContext {
            context: self.cur_context,
            this_override: self.this_override,
        };
        self.cur_context = context;
        self.this_override = this_record;
        saved
    }

    pub fn restore_context(
        &mut self,
        saved: SavedContext,
    ) {
        self.cur_context = saved.context;
        self.this_override = saved.this_override;
    }

    /// Enter the scope of a declaration being defined
    fn enter(
        &mut self,
        entity: DeclId,
        scope: Scope,
    ) {
        let saved = self.switch_context(entity);
        self.entered.push(saved);
        self.scopes.push(scope);
    }

    /// Leave the scope opened by the matching [`Session::enter`]
    fn leave(&mut self) -> Option<Scope> {
        if let Some(saved) = self.entered.pop() {
            self.restore_context(saved);
        }
        self.scopes.pop()
    }

    /// Access of a member declared now
    fn member_access(&self) -> Access {
        if self.ast.is_record(self.cur_context) {
            self.scopes.current().access
        } else {
            Access::None
        }
    }

    /// Allocate a declaration in the current context and link it
    fn declare(
        &mut self,
        kind: DeclKind,
        name: DeclName,
        span: Span,
    ) -> DeclId {
        let owner = self.cur_context;
        let mut decl = Decl::new(kind, name, Some(owner), span);
        decl.access = self.member_access();
        let id = self.ast.alloc(decl);
        self.ast.add_member(owner, id);
        id
    }

    // ------------------------------------------------------------------
    // namespaces and classes

    pub fn start_namespace(
        &mut self,
        name: impl Into<DeclName>,
        span: Span,
    ) -> DeclId {
        let ns = self.declare(
            DeclKind::Namespace {
                members: Vec::new(),
                inline: false,
            },
            name.into(),
            span,
        );
        self.enter(ns, Scope::new(ScopeKind::Namespace, ns));
        ns
    }

    pub fn finish_namespace(
        &mut self,
        ns: DeclId,
    ) {
        debug_assert_eq!(self.cur_context, ns);
        self.leave();
    }

    /// Open a class definition
    pub fn start_class(
        &mut self,
        tag: TagKind,
        name: impl Into<DeclName>,
        span: Span,
    ) -> DeclId {
        let mut data = RecordData::new(tag);
        data.has_definition = true;
        let template = self.pending_template.take();
        let record = match template {
            Some(params) => {
                let record = self.declare_pattern(DeclKind::Record(data), name.into(), span);
                self.attach_template(record, params, true);
                record
            }
            None => self.declare(DeclKind::Record(data), name.into(), span),
        };
        self.add_injected_class_name(record, span);
        let mut scope = Scope::new(ScopeKind::Class, record);
        scope.access = tag.default_access();
        self.enter(record, scope);
        record
    }

    /// Implicit member naming the class itself
    pub(crate) fn add_injected_class_name(
        &mut self,
        record: DeclId,
        span: Span,
    ) -> DeclId {
        let (tag, name) = {
            let decl = self.ast.decl(record);
            let tag = decl.kind.record().map(|r| r.tag).unwrap_or(TagKind::Class);
            (tag, decl.name.clone())
        };
        let mut data = RecordData::new(tag);
        data.injected_class_name = true;
        let mut decl = Decl::new(DeclKind::Record(data), name, Some(record), span).implicit();
        decl.access = Access::Public;
        let id = self.ast.alloc(decl);
        self.ast.add_member(record, id);
        id
    }

    pub fn add_base(
        &mut self,
        ty: Type,
        access: Access,
        is_virtual: bool,
        span: Span,
    ) {
        let record = self.cur_context;
        if let Some(r) = self.ast.decl_mut(record).kind.record_mut() {
            r.bases.push(BaseSpec {
                ty,
                is_virtual,
                access,
                span,
            });
        }
    }

    /// Close a class definition
    ///
    /// Completing a class that is not nested in another class replays the
    /// definitions injected into it.
    pub fn finish_class(
        &mut self,
        record: DeclId,
    ) {
        debug_assert_eq!(self.cur_context, record);
        if let Some(r) = self.ast.decl_mut(record).kind.record_mut() {
            r.complete = true;
        }
        self.leave();
        let nested = self
            .ast
            .parent(record)
            .map(|p| self.ast.is_record(p))
            .unwrap_or(false);
        if !nested && self.has_pending_injections(record) {
            debug!(record = %record, "class complete, draining injected definitions");
            self.drain_pending_injections();
        }
    }

    pub fn add_access_spec(
        &mut self,
        access: Access,
        span: Span,
    ) -> DeclId {
        let id = self.declare(DeclKind::AccessSpec, DeclName::Empty, span);
        self.ast.decl_mut(id).access = access;
        self.scopes.current_mut().access = access;
        id
    }

    pub fn add_field(
        &mut self,
        name: impl Into<DeclName>,
        ty: Type,
        init: Option<Expr>,
        span: Span,
    ) -> DeclId {
        self.declare(
            DeclKind::Field(FieldData {
                ty,
                init,
                mutable: false,
            }),
            name.into(),
            span,
        )
    }

    pub fn add_typedef(
        &mut self,
        name: impl Into<DeclName>,
        underlying: Type,
        span: Span,
    ) -> DeclId {
        self.declare(
            DeclKind::Typedef {
                underlying,
                alias: true,
            },
            name.into(),
            span,
        )
    }

    // ------------------------------------------------------------------
    // variables

    /// Declare a variable without an initializer yet
    ///
    /// Inside a function the variable is a local visible in the current
    /// scope; inside a class it is a static data member.
    pub fn declare_var(
        &mut self,
        name: impl Into<DeclName>,
        ty: Type,
        span: Span,
    ) -> DeclId {
        let mut data = VarData::new(ty);
        if self.ast.is_record(self.cur_context) {
            data.storage = StorageClass::Static;
        }
        let local = !self.ast.is_file_context(self.cur_context) && !self.ast.is_record(self.cur_context);
        let var = self.declare(DeclKind::Var(data), name.into(), span);
        if local {
            self.scopes.declare(var);
        }
        var
    }

    /// Attach an initializer, deducing an `auto` type from it
    pub fn set_var_init(
        &mut self,
        var: DeclId,
        init: Expr,
    ) {
        if let DeclKind::Var(v) = &mut self.ast.decl_mut(var).kind {
            if v.ty.is_undeduced() {
                v.ty = init.ty.unqualified().clone();
            }
            v.init = Some(init);
        }
    }

    pub fn add_var(
        &mut self,
        name: impl Into<DeclName>,
        ty: Type,
        init: Option<Expr>,
        span: Span,
    ) -> DeclId {
        let var = self.declare_var(name, ty, span);
        if let Some(init) = init {
            self.set_var_init(var, init);
        }
        var
    }

    /// `constexpr` variable; its initializer must be a constant expression
    pub fn add_constexpr_var(
        &mut self,
        name: impl Into<DeclName>,
        ty: Type,
        init: Expr,
        span: Span,
    ) -> DeclId {
        let var = self.add_var(name, ty, Some(init.clone()), span);
        if let DeclKind::Var(v) = &mut self.ast.decl_mut(var).kind {
            v.constexpr = true;
        }
        if self.ast.is_dependent_context(var) || init.is_dependent() {
            return var;
        }
        let outcome = self.evaluate(&init);
        if !outcome.succeeded() {
            let mut builder = ErrorCodeDefinition::expr_not_constant().at(init.span);
            for note in &outcome.notes {
                builder = builder.note(note.message(), Some(note.span()));
            }
            self.diags.emit(builder.build());
            self.ast.mark_invalid(var);
        }
        var
    }

    // ------------------------------------------------------------------
    // functions

    /// Allocate a template pattern; it is reached through its template
    fn declare_pattern(
        &mut self,
        kind: DeclKind,
        name: DeclName,
        span: Span,
    ) -> DeclId {
        let mut decl = Decl::new(kind, name, Some(self.cur_context), span);
        decl.access = self.member_access();
        self.ast.alloc(decl)
    }

    /// Create the template for `pattern` and link both ways
    fn attach_template(
        &mut self,
        pattern: DeclId,
        params: Vec<DeclId>,
        is_class: bool,
    ) -> DeclId {
        let data = TemplateData {
            params: params.clone(),
            pattern,
        };
        let kind = if is_class {
            DeclKind::ClassTemplate(data)
        } else {
            DeclKind::FunctionTemplate(data)
        };
        let (name, span) = {
            let decl = self.ast.decl(pattern);
            (decl.name.clone(), decl.span)
        };
        let template = self.declare(kind, name, span);
        for param in params {
            self.ast.decl_mut(param).parent = Some(template);
        }
        match &mut self.ast.decl_mut(pattern).kind {
            DeclKind::Record(r) => r.described_template = Some(template),
            other => {
                if let Some(f) = other.function_mut() {
                    f.described_template = Some(template);
                }
            }
        }
        self.last_template = Some(template);
        template
    }

    fn start_callable(
        &mut self,
        kind: DeclKind,
        name: DeclName,
        params: &[(&str, Type)],
        span: Span,
    ) -> DeclId {
        let template = self.pending_template.take();
        let function = match template {
            Some(template_params) => {
                let f = self.declare_pattern(kind, name, span);
                self.attach_template(f, template_params, false);
                f
            }
            None => self.declare(kind, name, span),
        };

        let mut scope = Scope::new(ScopeKind::Function, function);
        let mut ids = Vec::with_capacity(params.len());
        for (index, (param_name, ty)) in params.iter().enumerate() {
            let decl = Decl::new(
                DeclKind::Param(ParamData {
                    ty: ty.clone(),
                    index,
                    default: None,
                }),
                DeclName::ident(*param_name),
                Some(function),
                span,
            );
            let id = self.ast.alloc(decl);
            ids.push(id);
            scope.decls.push(id);
        }
        if let Some(f) = self.ast.decl_mut(function).kind.function_mut() {
            f.params = ids;
        }
        self.enter(function, scope);
        function
    }

    /// Open a free function definition
    pub fn start_function(
        &mut self,
        name: impl Into<DeclName>,
        return_type: Type,
        params: &[(&str, Type)],
        span: Span,
    ) -> DeclId {
        let mut data = FunctionData::new(return_type);
        data.constexpr = true;
        self.start_callable(DeclKind::Function(data), name.into(), params, span)
    }

    /// Open a method of the current class
    pub fn start_method(
        &mut self,
        kind: MethodKind,
        name: impl Into<DeclName>,
        return_type: Type,
        params: &[(&str, Type)],
        span: Span,
    ) -> DeclId {
        let mut data = MethodData::new(kind, return_type);
        data.function.constexpr = true;
        self.start_callable(DeclKind::Method(data), name.into(), params, span)
    }

    /// Default argument of a parameter
    pub fn set_param_default(
        &mut self,
        param: DeclId,
        default: Expr,
    ) {
        if let DeclKind::Param(p) = &mut self.ast.decl_mut(param).kind {
            p.default = Some(default);
        }
    }

    /// Parameters of a function or method
    pub fn params(
        &self,
        function: DeclId,
    ) -> Vec<DeclId> {
        self.ast
            .kind(function)
            .function()
            .map(|f| f.params.clone())
            .unwrap_or_default()
    }

    /// Close a function; `None` leaves it a declaration only
    pub fn finish_function(
        &mut self,
        function: DeclId,
        body: Option<Stmt>,
    ) {
        debug_assert_eq!(self.cur_context, function);
        if let Some(f) = self.ast.decl_mut(function).kind.function_mut() {
            f.body = body;
        }
        self.leave();
    }

    /// `field(init)` in the constructor being defined
    pub fn member_init(
        &mut self,
        name: &str,
        init: Expr,
        span: Span,
    ) -> Option<CtorInit> {
        let record = self.ast.enclosing_record(self.cur_context)?;
        let field = self
            .ast
            .lookup_member(record, name)
            .filter(|f| matches!(self.ast.kind(*f), DeclKind::Field(_)));
        match field {
            Some(field) => Some(CtorInit { field, init, span }),
            None => {
                let class = self.ast.qualified_name(record);
                self.diags.emit(
                    ErrorCodeDefinition::no_member_named(name, &class)
                        .at(span)
                        .build(),
                );
                None
            }
        }
    }

    pub fn set_ctor_inits(
        &mut self,
        ctor: DeclId,
        inits: Vec<CtorInit>,
    ) {
        if let Some(m) = self.method_mut(ctor) {
            m.ctor_inits = inits;
        }
    }

    /// Open a nested block in the current function
    pub fn push_block(&mut self) {
        let scope = Scope::new(ScopeKind::Block, self.cur_context);
        self.scopes.push(scope);
    }

    pub fn pop_block(&mut self) {
        let popped = self.scopes.pop();
        debug_assert!(matches!(popped, Some(Scope { kind: ScopeKind::Block, .. })));
    }

    // ------------------------------------------------------------------
    // templates

    /// Open a template parameter list of type parameters
    ///
    /// The next function or class started becomes the pattern of the
    /// template.
    pub fn begin_template(
        &mut self,
        names: &[&str],
        span: Span,
    ) -> Vec<DeclId> {
        let depth = self
            .scopes
            .iter()
            .filter(|s| s.kind == ScopeKind::Template)
            .count() as u32;
        let mut scope = Scope::new(ScopeKind::Template, self.cur_context);
        let mut params = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let decl = Decl::new(
                DeclKind::TemplateTypeParam(TemplateTypeParamData {
                    depth,
                    index: index as u32,
                    default: None,
                }),
                DeclName::ident(*name),
                Some(self.cur_context),
                span,
            );
            let id = self.ast.alloc(decl);
            scope.decls.push(id);
            params.push(id);
        }
        self.scopes.push(scope);
        self.pending_template = Some(params.clone());
        self.last_template = None;
        params
    }

    /// Close the parameter list; returns the template created for it
    pub fn end_template(&mut self) -> Option<DeclId> {
        let popped = self.scopes.pop();
        debug_assert!(matches!(popped, Some(Scope { kind: ScopeKind::Template, .. })));
        self.pending_template = None;
        self.last_template.take()
    }

    // ------------------------------------------------------------------
    // evaluation

    /// Constant-evaluate `expr`
    pub fn evaluate(
        &self,
        expr: &Expr,
    ) -> EvalOutcome {
        self.evaluator.evaluate(&self.ast, expr)
    }

    /// Evaluate an operand that must be constant; failure is diagnosed
    pub fn evaluate_constant(
        &mut self,
        expr: &Expr,
    ) -> Option<ConstValue> {
        let outcome = self.evaluate(expr);
        if let Some(value) = outcome.value {
            return Some(value);
        }
        let mut builder = ErrorCodeDefinition::splice_not_constant().at(expr.span);
        for note in &outcome.notes {
            builder = builder.note(note.message(), Some(note.span()));
        }
        self.diags.emit(builder.build());
        None
    }

    /// End of the translation unit: replay everything still pending
    pub fn end_translation_unit(&mut self) {
        self.drain_pending_injections();
    }
}
