//! Declaration cloning
//!
//! `inject_decl` dispatches on the declaration kind. Each clone is allocated
//! in the current context of the session, registered in the substitution
//! map before its children are visited, and linked into its owner.

use super::{InjectedDef, InjectedDefKind, Injector};
use crate::frontend::ast::{
    Access, BaseSpec, CtorInit, Decl, DeclId, DeclKind, FieldData, FunctionData, MethodData,
    ParamData, RecordData, TemplateData, TemplateTypeParamData, Type, VarData,
};
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;
use tracing::{debug, trace};

impl Injector<'_> {
    /// Clone `decl` into the current context
    ///
    /// Returns `None` only when no declaration could be created at all. A
    /// clone that failed part of its rebuild is returned marked invalid.
    pub fn inject_decl(
        &mut self,
        decl: DeclId,
    ) -> Option<DeclId> {
        debug_assert!(
            self.cx.get_decl_replacement(decl).is_none(),
            "{} injected twice in one context",
            decl
        );
        self.depth += 1;
        let kind = self.sema.ast.kind(decl).clone();
        let kind_name = kind.name();
        let result = match kind {
            DeclKind::Namespace { inline, .. } => Some(self.inject_namespace(decl, inline)),
            DeclKind::Typedef { underlying, alias } => {
                Some(self.inject_typedef(decl, &underlying, alias))
            }
            DeclKind::Function(data) => Some(self.inject_function(decl, &data)),
            DeclKind::Method(data) => Some(self.inject_method(decl, &data)),
            DeclKind::Var(data) => Some(self.inject_var(decl, &data)),
            DeclKind::Record(data) => Some(self.inject_record(decl, &data)),
            DeclKind::Field(data) => Some(self.inject_field(decl, &data)),
            DeclKind::AccessSpec => Some(self.inject_access_spec(decl)),
            DeclKind::FunctionTemplate(data) => Some(self.inject_template(decl, &data, false)),
            DeclKind::ClassTemplate(data) => Some(self.inject_template(decl, &data, true)),
            DeclKind::TemplateTypeParam(data) => Some(self.inject_template_type_param(decl, &data)),
            DeclKind::Metaprogram(_) => self.inject_metaprogram(decl),
            DeclKind::TranslationUnit { .. } | DeclKind::Param(_) | DeclKind::Fragment(_) => {
                let span = self.sema.ast.decl(decl).span;
                self.sema.diags.emit(
                    ErrorCodeDefinition::unsupported_injection_kind(kind_name)
                        .at(span)
                        .build(),
                );
                None
            }
        };
        self.depth -= 1;

        if let Some(new) = result {
            let ast = &self.sema.ast;
            let created = ast.decl(new);
            debug!(
                kind = created.kind.name(),
                name = %created.name,
                from = %decl,
                to = %new,
                invalid = created.invalid,
                "declaration injected"
            );
            // template parameters and patterns name the unit as parent
            // without being its members
            let top_level = ast.members(ast.translation_unit()).contains(&new);
            if top_level && !matches!(created.kind, DeclKind::Metaprogram(_)) {
                self.sema.consumer.handle_top_level_decl(&self.sema.ast, new);
            }
        }
        result
    }

    /// Allocate the clone of `old` with `kind` in the current context and
    /// register the substitution
    fn create_decl(
        &mut self,
        old: DeclId,
        kind: DeclKind,
    ) -> DeclId {
        let source = self.sema.ast.decl(old).clone();
        let (name, name_failed) = self.transform_name(&source.name, source.span);
        let owner = self.sema.cur_context;

        let mut decl = Decl::new(kind, name, Some(owner), source.span);
        decl.access = self.injected_access(owner, source.access);
        decl.implicit = source.implicit;
        decl.invalid = source.invalid || name_failed;
        if source.name.is_empty() != decl.name.is_empty() {
            self.sema.diags.emit(
                ErrorCodeDefinition::injected_name_mismatch(&source.name.to_string())
                    .at(source.span)
                    .build(),
            );
            decl.invalid = true;
        }

        let new = self.sema.ast.alloc(decl);
        self.cx.add_decl_substitution(old, new);
        new
    }

    /// Access of a clone in `owner`; modifiers only touch the declaration
    /// the injection names
    fn injected_access(
        &self,
        owner: DeclId,
        original: Access,
    ) -> Access {
        let tag = match self.sema.ast.kind(owner).record() {
            Some(r) => r.tag,
            None => return Access::None,
        };
        let modifiers = self.cx.modifiers();
        if self.depth == 1 && modifiers.has_modifications() {
            return modifiers.access.apply(original, tag.default_access());
        }
        match original {
            Access::None => tag.default_access(),
            access => access,
        }
    }

    fn link(
        &mut self,
        new: DeclId,
    ) {
        if let Some(owner) = self.sema.ast.parent(new) {
            self.sema.ast.add_member(owner, new);
        }
    }

    fn mark_invalid(
        &mut self,
        decl: DeclId,
    ) {
        self.sema.ast.mark_invalid(decl);
    }

    /// Inject every member of `source` into `target`; false if any failed
    fn inject_members(
        &mut self,
        source: DeclId,
        target: DeclId,
    ) -> bool {
        let members = self.sema.ast.members(source).to_vec();
        let saved = self.sema.switch_context(target);
        let mut ok = true;
        for member in members {
            if self.sema.ast.decl(member).is_injected_class_name() {
                continue;
            }
            match self.inject_decl(member) {
                Some(new) if !self.sema.ast.is_invalid(new) => {}
                _ => ok = false,
            }
        }
        self.sema.restore_context(saved);
        ok
    }

    fn inject_namespace(
        &mut self,
        decl: DeclId,
        inline: bool,
    ) -> DeclId {
        let new = self.create_decl(
            decl,
            DeclKind::Namespace {
                members: Vec::new(),
                inline,
            },
        );
        self.link(new);
        if !self.inject_members(decl, new) {
            self.mark_invalid(new);
        }
        new
    }

    fn inject_typedef(
        &mut self,
        decl: DeclId,
        underlying: &Type,
        alias: bool,
    ) -> DeclId {
        let span = self.sema.ast.decl(decl).span;
        let ty = self.transform_type(underlying, span);
        let failed = ty.is_error();
        let underlying = if failed { underlying.clone() } else { ty };
        let new = self.create_decl(decl, DeclKind::Typedef { underlying, alias });
        if failed {
            self.mark_invalid(new);
        }
        self.link(new);
        new
    }

    /// Clone the parameters of `old` into `new`; false if a type failed
    fn inject_params(
        &mut self,
        params: &[DeclId],
        new: DeclId,
    ) -> bool {
        let saved = self.sema.switch_context(new);
        let mut ok = true;
        let mut new_params = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let (ty, default) = match self.sema.ast.kind(*param) {
                DeclKind::Param(p) => (p.ty.clone(), p.default.clone()),
                _ => continue,
            };
            let span = self.sema.ast.decl(*param).span;
            let ty = self.transform_type(&ty, span);
            let default = match default {
                Some(d) => {
                    let transformed = self.transform_expr(&d);
                    ok &= transformed.is_some();
                    transformed
                }
                None => None,
            };
            ok &= !ty.is_error();
            let new_param = self.create_decl(*param, DeclKind::Param(ParamData { ty, index, default }));
            new_params.push(new_param);
        }
        self.sema.restore_context(saved);
        if let Some(f) = self.sema.ast.decl_mut(new).kind.function_mut() {
            f.params = new_params;
        }
        ok
    }

    /// Signature of a function clone: everything but parameters and body
    fn clone_signature(
        &mut self,
        data: &FunctionData,
        span: Span,
    ) -> (FunctionData, bool) {
        let return_type = self.transform_type(&data.return_type, span);
        let failed = return_type.is_error();
        let mut new = FunctionData::new(if failed {
            data.return_type.clone()
        } else {
            return_type
        });
        new.constexpr = data.constexpr;
        new.inline = data.inline;
        new.storage = data.storage;
        new.described_template = data.described_template;
        (new, failed)
    }

    /// Free functions are never deferred: their bodies are transformed now.
    fn inject_function(
        &mut self,
        decl: DeclId,
        data: &FunctionData,
    ) -> DeclId {
        let span = self.sema.ast.decl(decl).span;
        let (signature, failed) = self.clone_signature(data, span);
        let new = self.create_decl(decl, DeclKind::Function(signature));
        if data.described_template.is_none() {
            self.link(new);
        }
        let mut ok = !failed && self.inject_params(&data.params, new);

        if let Some(body) = &data.body {
            let saved = self.sema.switch_context(new);
            let body = self.transform_stmt(body);
            self.sema.restore_context(saved);
            ok &= body.is_some();
            if let Some(f) = self.sema.ast.decl_mut(new).kind.function_mut() {
                f.body = body;
            }
        }
        if !ok {
            self.mark_invalid(new);
        }
        new
    }

    fn inject_method(
        &mut self,
        decl: DeclId,
        data: &MethodData,
    ) -> DeclId {
        let span = self.sema.ast.decl(decl).span;
        let (signature, failed) = self.clone_signature(&data.function, span);
        let method = MethodData {
            function: signature,
            kind: data.kind,
            is_virtual: data.is_virtual,
            is_pure: data.is_pure,
            is_deleted: data.is_deleted,
            is_defaulted: data.is_defaulted,
            is_const: data.is_const,
            is_explicit: data.is_explicit,
            ctor_inits: Vec::new(),
        };
        let new = self.create_decl(decl, DeclKind::Method(method));
        if data.function.described_template.is_none() {
            self.link(new);
        }
        let mut ok = !failed && self.inject_params(&data.function.params, new);

        if data.is_pure && !data.is_virtual {
            let name = self.sema.ast.decl(new).name.to_string();
            self.sema.diags.emit(
                ErrorCodeDefinition::pure_non_virtual(&name)
                    .at(span)
                    .build(),
            );
            ok = false;
        }
        if !ok {
            self.mark_invalid(new);
        }

        let has_definition = data.function.body.is_some() || !data.ctor_inits.is_empty();
        if has_definition && !data.is_pure {
            self.defer(InjectedDef {
                kind: InjectedDefKind::Method,
                fragment: decl,
                injected: new,
            });
        }
        new
    }

    fn inject_var(
        &mut self,
        decl: DeclId,
        data: &VarData,
    ) -> DeclId {
        let span = self.sema.ast.decl(decl).span;
        let ty = self.transform_type(&data.ty, span);
        let mut ok = !ty.is_error();
        let mut var = VarData::new(if ok { ty } else { data.ty.clone() });
        var.storage = data.storage;
        var.constexpr = data.constexpr;
        var.inline = data.inline;
        var.nrvo = data.nrvo;
        var.for_range = data.for_range;
        var.out_of_line = data.out_of_line;
        let new = self.create_decl(decl, DeclKind::Var(var));
        self.link(new);

        if let Some(init) = data.init.as_ref().filter(|_| !data.for_range) {
            match self.transform_expr(init) {
                Some(init) => {
                    let init_ty = init.ty.clone();
                    if let DeclKind::Var(v) = &mut self.sema.ast.decl_mut(new).kind {
                        if v.ty.is_undeduced() || v.ty.is_dependent() {
                            v.ty = init_ty;
                        }
                        v.init = Some(init);
                    }
                    if data.constexpr {
                        ok &= self.check_constant_initializer(new);
                    }
                }
                None => ok = false,
            }
        }
        if !ok {
            self.mark_invalid(new);
        }
        new
    }

    /// Constant-evaluate the initializer of a compile-time variable
    fn check_constant_initializer(
        &mut self,
        var: DeclId,
    ) -> bool {
        let ast = &self.sema.ast;
        if ast.is_dependent_context(var) {
            return true;
        }
        let init = match ast.kind(var) {
            DeclKind::Var(VarData {
                init: Some(init), ..
            }) if !init.is_dependent() => init.clone(),
            _ => return true,
        };
        let outcome = self.sema.evaluate(&init);
        if outcome.succeeded() {
            return true;
        }
        let mut builder = ErrorCodeDefinition::expr_not_constant().at(init.span);
        for note in &outcome.notes {
            builder = builder.note(note.message(), Some(note.span()));
        }
        self.sema.diags.emit(builder.build());
        false
    }

    fn inject_record(
        &mut self,
        decl: DeclId,
        data: &RecordData,
    ) -> DeclId {
        let mut record = RecordData::new(data.tag);
        record.closure = data.closure;
        record.described_template = data.described_template;
        let new = self.create_decl(decl, DeclKind::Record(record));
        if data.described_template.is_none() {
            self.link(new);
        }
        if !data.has_definition {
            return new;
        }

        let span = self.sema.ast.decl(decl).span;
        self.sema.add_injected_class_name(new, span);
        let mut ok = true;
        let mut bases = Vec::with_capacity(data.bases.len());
        let saved = self.sema.switch_context(new);
        for base in &data.bases {
            let ty = self.transform_type(&base.ty, base.span);
            ok &= !ty.is_error();
            bases.push(BaseSpec { ty, ..base.clone() });
        }
        self.sema.restore_context(saved);
        ok &= self.inject_members(decl, new);

        if let Some(r) = self.sema.ast.decl_mut(new).kind.record_mut() {
            r.bases = bases;
            r.has_definition = true;
            r.complete = true;
        }
        if !ok {
            self.mark_invalid(new);
        }
        new
    }

    fn inject_field(
        &mut self,
        decl: DeclId,
        data: &FieldData,
    ) -> DeclId {
        let span = self.sema.ast.decl(decl).span;
        let ty = self.transform_type(&data.ty, span);
        let mut ok = !ty.is_error();
        let field = FieldData {
            ty: if ok { ty.clone() } else { data.ty.clone() },
            init: None,
            mutable: data.mutable,
        };
        let new = self.create_decl(decl, DeclKind::Field(field));
        self.link(new);

        if ok && !self.is_complete_object_type(&ty) {
            let ast = &self.sema.ast;
            let name = ast.decl(new).name.to_string();
            let ty_name = ast.type_name(&ty);
            self.sema.diags.emit(
                ErrorCodeDefinition::incomplete_field_type(&name, &ty_name)
                    .at(span)
                    .build(),
            );
            ok = false;
        }
        if !ok {
            self.mark_invalid(new);
        }
        if data.init.is_some() {
            self.defer(InjectedDef {
                kind: InjectedDefKind::Field,
                fragment: decl,
                injected: new,
            });
        }
        new
    }

    fn is_complete_object_type(
        &self,
        ty: &Type,
    ) -> bool {
        let ast = &self.sema.ast;
        match ast.canonical_type(ty) {
            Type::Void => false,
            Type::Record(r) => ast
                .kind(r)
                .record()
                .map(|data| data.complete || ast.is_dependent_context(r))
                .unwrap_or(false),
            Type::Const(inner) => self.is_complete_object_type(&inner),
            _ => true,
        }
    }

    fn inject_access_spec(
        &mut self,
        decl: DeclId,
    ) -> DeclId {
        let new = self.create_decl(decl, DeclKind::AccessSpec);
        self.link(new);
        new
    }

    fn inject_template_type_param(
        &mut self,
        decl: DeclId,
        data: &TemplateTypeParamData,
    ) -> DeclId {
        let span = self.sema.ast.decl(decl).span;
        let default = data.default.as_ref().map(|d| self.transform_type(d, span));
        let new = self.create_decl(
            decl,
            DeclKind::TemplateTypeParam(TemplateTypeParamData {
                depth: data.depth,
                index: data.index,
                default: default.clone(),
            }),
        );
        if matches!(default, Some(Type::Error)) {
            self.mark_invalid(new);
        }
        new
    }

    /// Parameters first, then the pattern, then the template itself
    fn inject_template(
        &mut self,
        decl: DeclId,
        data: &TemplateData,
        is_class: bool,
    ) -> DeclId {
        let mut ok = true;
        let mut params = Vec::with_capacity(data.params.len());
        for param in &data.params {
            match self.inject_decl(*param) {
                Some(p) => {
                    ok &= !self.sema.ast.is_invalid(p);
                    params.push(p);
                }
                None => ok = false,
            }
        }
        let make = |data: TemplateData| {
            if is_class {
                DeclKind::ClassTemplate(data)
            } else {
                DeclKind::FunctionTemplate(data)
            }
        };
        let pattern = match self.inject_decl(data.pattern) {
            Some(p) => p,
            None => {
                // keep the template addressable even without a pattern
                let template = self.create_decl(
                    decl,
                    make(TemplateData {
                        params,
                        pattern: data.pattern,
                    }),
                );
                self.mark_invalid(template);
                self.link(template);
                return template;
            }
        };
        ok &= !self.sema.ast.is_invalid(pattern);

        let template = self.create_decl(
            decl,
            make(TemplateData {
                params: params.clone(),
                pattern,
            }),
        );
        self.link(template);

        for param in &params {
            self.sema.ast.decl_mut(*param).parent = Some(template);
        }
        match &mut self.sema.ast.decl_mut(pattern).kind {
            DeclKind::Record(r) => r.described_template = Some(template),
            other => {
                if let Some(f) = other.function_mut() {
                    f.described_template = Some(template);
                }
            }
        }
        if !ok {
            self.mark_invalid(template);
        }
        trace!(%template, %pattern, "template injected");
        template
    }

    /// A metaprogram clone is evaluated as soon as it is built, so its
    /// effects land in the new owner.
    fn inject_metaprogram(
        &mut self,
        decl: DeclId,
    ) -> Option<DeclId> {
        let (data, span) = match &self.sema.ast.decl(decl).kind {
            DeclKind::Metaprogram(m) => (m.clone(), self.sema.ast.decl(decl).span),
            _ => return None,
        };
        let body = self
            .sema
            .ast
            .kind(data.callee)
            .function()
            .and_then(|f| f.body.clone());

        let owner = self.sema.cur_context;
        let meta = self.sema.create_metaprogram(owner, data.injection, span);
        self.cx.add_decl_substitution(decl, meta);
        let callee = match self.sema.ast.kind(meta) {
            DeclKind::Metaprogram(m) => m.callee,
            _ => return None,
        };

        let body = match body {
            Some(body) => {
                let saved = self.sema.switch_context(callee);
                let body = self.transform_stmt(&body);
                self.sema.restore_context(saved);
                body
            }
            None => None,
        };
        match body {
            Some(body) => self.sema.complete_metaprogram(meta, body),
            None => self.mark_invalid(meta),
        }
        Some(meta)
    }

    /// Queue a definition, or run it now if this context is already
    /// replaying its queue
    fn defer(
        &mut self,
        def: InjectedDef,
    ) {
        if self.cx.is_open() {
            trace!(kind = ?def.kind, injected = %def.injected, "definition deferred");
            self.cx.push_definition(def);
            return;
        }
        match def.kind {
            InjectedDefKind::Field => self.inject_field_definition(def),
            InjectedDefKind::Method => self.inject_method_definition(def),
        }
    }

    /// Rebuild a constructor's member initializers against the new class
    pub(crate) fn transform_ctor_inits(
        &mut self,
        inits: &[CtorInit],
        record: Option<DeclId>,
    ) -> Option<Vec<CtorInit>> {
        let mut out = Vec::with_capacity(inits.len());
        for init in inits {
            let field = match self.cx.get_decl_replacement(init.field) {
                Some(f) => f,
                None => {
                    let name = self.sema.ast.decl(init.field).name_str().to_string();
                    match record.and_then(|r| self.sema.ast.lookup_member(r, &name)) {
                        Some(f) => f,
                        None => {
                            let class = record
                                .map(|r| self.sema.ast.qualified_name(r))
                                .unwrap_or_default();
                            self.sema.diags.emit(
                                ErrorCodeDefinition::no_member_named(&name, &class)
                                    .at(init.span)
                                    .build(),
                            );
                            return None;
                        }
                    }
                }
            };
            let value = self.transform_expr(&init.init)?;
            out.push(CtorInit {
                field,
                init: value,
                span: init.span,
            });
        }
        Some(out)
    }
}
