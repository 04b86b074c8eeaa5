//! Injection engine tests

use super::*;
use crate::frontend::ast::{Access, DeclKind, Expr, MethodKind, Stmt, TagKind, Type};
use crate::frontend::const_eval::ConstValue;
use crate::frontend::reflect::{AccessModifier, ReflectionModifiers};
use crate::frontend::sema::RecordingConsumer;
use crate::util::span::Span;

fn sp() -> Span {
    Span::dummy()
}

fn codes(session: &Session) -> Vec<&str> {
    session
        .diagnostics()
        .diagnostics()
        .iter()
        .map(|d| d.code.as_str())
        .collect()
}

fn modifiers(access: AccessModifier) -> ReflectionModifiers {
    ReflectionModifiers { access }
}

mod context_tests {
    use super::*;

    #[test]
    fn test_substitutions_keep_registration_order() {
        let mut s = Session::new();
        let tu = s.translation_unit();
        let a = s.add_var("a", Type::Int, None, sp());
        let b = s.add_var("b", Type::Int, None, sp());
        let c = s.add_var("c", Type::Int, None, sp());

        let mut cx = InjectionContext::new(tu);
        cx.add_decl_substitution(c, a);
        cx.add_decl_substitution(a, b);
        assert_eq!(cx.get_decl_replacement(c), Some(a));
        assert_eq!(cx.get_decl_replacement(b), None);
        let order: Vec<DeclId> = cx.substitutions().map(|(old, _)| old).collect();
        assert_eq!(order, vec![c, a]);
    }

    #[test]
    fn test_placeholder_values() {
        let mut s = Session::new();
        let tu = s.translation_unit();
        let p = s.add_var("p", Type::Dependent, None, sp());

        let mut cx = InjectionContext::new(tu);
        assert!(cx.placeholder_replacement(p).is_none());
        cx.add_placeholder_substitution(p, Type::Int, ConstValue::Int(11));
        let value = cx.placeholder_replacement(p).unwrap();
        assert_eq!(value.ty, Type::Int);
        assert_eq!(value.value, ConstValue::Int(11));
    }

    #[test]
    fn test_draining_starts_once() {
        let s = Session::new();
        let mut cx = InjectionContext::new(s.translation_unit());
        assert!(cx.is_open());
        assert!(cx.begin_draining());
        assert_eq!(cx.state(), ContextState::Draining);
        assert!(!cx.begin_draining());
    }

    #[test]
    fn test_definitions_by_kind_keep_order() {
        let mut s = Session::new();
        let tu = s.translation_unit();
        let ids: Vec<DeclId> = (0..4)
            .map(|i| s.add_var(format!("v{}", i), Type::Int, None, sp()))
            .collect();

        let mut cx = InjectionContext::new(tu);
        assert!(!cx.has_definitions());
        cx.push_definition(InjectedDef {
            kind: InjectedDefKind::Method,
            fragment: ids[0],
            injected: ids[1],
        });
        cx.push_definition(InjectedDef {
            kind: InjectedDefKind::Field,
            fragment: ids[2],
            injected: ids[3],
        });
        cx.push_definition(InjectedDef {
            kind: InjectedDefKind::Method,
            fragment: ids[1],
            injected: ids[2],
        });
        assert!(cx.has_definitions());
        let methods: Vec<DeclId> = cx
            .definitions_of(InjectedDefKind::Method)
            .iter()
            .map(|d| d.injected)
            .collect();
        assert_eq!(methods, vec![ids[1], ids[2]]);
        assert_eq!(cx.definitions_of(InjectedDefKind::Field).len(), 1);
    }

    #[test]
    fn test_detach_clears_modifiers() {
        let s = Session::new();
        let mut cx = InjectionContext::new(s.translation_unit());
        cx.set_modifiers(modifiers(AccessModifier::Private));
        assert!(cx.modifiers().has_modifications());
        cx.detach();
        assert!(!cx.modifiers().has_modifications());
    }
}

mod copy_tests {
    use super::*;

    /// `class A { int a; };` returning (A, a)
    fn class_with_field(s: &mut Session) -> (DeclId, DeclId) {
        let a_class = s.start_class(TagKind::Class, "A", sp());
        let a = s.add_field("a", Type::Int, None, sp());
        s.finish_class(a_class);
        (a_class, a)
    }

    #[test]
    fn test_copy_field_with_access_modifier() {
        let mut s = Session::new();
        let (_, a) = class_with_field(&mut s);
        let b = s.start_class(TagKind::Struct, "B", sp());
        assert!(s.copy_declaration(b, a, modifiers(AccessModifier::Protected), sp()));
        s.finish_class(b);

        let copy = s.ast().lookup_member(b, "a").unwrap();
        assert_ne!(copy, a);
        assert_eq!(s.ast().decl(copy).access, Access::Protected);
        assert_eq!(s.ast().decl(a).access, Access::Private);
        assert_eq!(s.ast().fields(b), vec![copy]);
    }

    #[test]
    fn test_default_access_of_receiving_class() {
        let mut s = Session::new();
        let (_, a) = class_with_field(&mut s);
        let b = s.start_class(TagKind::Struct, "B", sp());
        assert!(s.copy_declaration(b, a, modifiers(AccessModifier::Default), sp()));
        s.finish_class(b);
        let copy = s.ast().lookup_member(b, "a").unwrap();
        assert_eq!(s.ast().decl(copy).access, Access::Public);
    }

    #[test]
    fn test_unmodified_copy_keeps_access() {
        let mut s = Session::new();
        let (_, a) = class_with_field(&mut s);
        let b = s.start_class(TagKind::Struct, "B", sp());
        assert!(s.copy_declaration(b, a, ReflectionModifiers::default(), sp()));
        s.finish_class(b);
        let copy = s.ast().lookup_member(b, "a").unwrap();
        assert_eq!(s.ast().decl(copy).access, Access::Private);
    }

    #[test]
    fn test_class_member_into_namespace_is_rejected() {
        let mut s = Session::new();
        let (_, a) = class_with_field(&mut s);
        let ns = s.start_namespace("N", sp());
        assert!(!s.copy_declaration(ns, a, ReflectionModifiers::default(), sp()));
        s.finish_namespace(ns);

        assert_eq!(codes(&s), vec!["E2202"]);
        let message = &s.diagnostics().diagnostics()[0].message;
        assert_eq!(message, "cannot inject a class member into a namespace");
        assert!(s.ast().is_invalid(ns));
        assert!(s.ast().members(ns).is_empty());
    }

    #[test]
    fn test_namespace_member_into_class_is_rejected() {
        let mut s = Session::new();
        let v = s.add_var("v", Type::Int, Some(Expr::int(1)), sp());
        let c = s.start_class(TagKind::Struct, "C", sp());
        assert!(!s.copy_declaration(c, v, ReflectionModifiers::default(), sp()));
        s.finish_class(c);
        let message = &s.diagnostics().diagnostics()[0].message;
        assert_eq!(message, "cannot inject a namespace member into a class");
    }

    #[test]
    fn test_copied_function_is_reported_to_consumer() {
        let consumer = RecordingConsumer::new();
        let mut s = Session::new().with_consumer(Box::new(consumer.clone()));
        let ns = s.start_namespace("lib", sp());
        let f = s.start_function("seven", Type::Int, &[], sp());
        s.finish_function(f, Some(Stmt::ret(Some(Expr::int(7)))));
        s.finish_namespace(ns);
        assert!(consumer.decls().is_empty());

        let tu = s.translation_unit();
        assert!(s.copy_declaration(tu, f, ReflectionModifiers::default(), sp()));
        let copy = s.lookup_name("seven")[0];
        assert_ne!(copy, f);
        assert_eq!(consumer.decls(), vec![copy]);

        let call = s.call(s.decl_ref(copy, sp()), Vec::new(), sp());
        assert_eq!(s.evaluate(&call).value, Some(ConstValue::Int(7)));
    }

    /// `namespace lib { template<typename T> T id(T x) { return x; } }`
    fn function_template(s: &mut Session) -> (DeclId, DeclId) {
        let ns = s.start_namespace("lib", sp());
        let params = s.begin_template(&["T"], sp());
        let t = Type::TemplateParam(params[0]);
        let f = s.start_function("id", t.clone(), &[("x", t)], sp());
        let x = s.id_expr("x", sp()).unwrap().rvalue();
        s.finish_function(f, Some(Stmt::ret(Some(x))));
        let template = s.end_template().unwrap();
        s.finish_namespace(ns);
        (template, f)
    }

    #[test]
    fn test_function_template_injected_with_params() {
        let consumer = RecordingConsumer::new();
        let mut s = Session::new().with_consumer(Box::new(consumer.clone()));
        let (template, pattern) = function_template(&mut s);
        let tu = s.translation_unit();
        assert!(s.copy_declaration(tu, template, ReflectionModifiers::default(), sp()));
        assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));

        let ast = s.ast();
        let copy = ast.lookup_member(tu, "id").unwrap();
        assert_ne!(copy, template);
        // only the template itself reaches the consumer
        assert_eq!(consumer.decls(), vec![copy]);

        let (params, new_pattern) = match ast.kind(copy) {
            DeclKind::FunctionTemplate(t) => (t.params.clone(), t.pattern),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(params.len(), 1);
        assert_eq!(ast.parent(params[0]), Some(copy));
        assert_ne!(new_pattern, pattern);
        assert!(!ast.members(tu).contains(&new_pattern));

        let f = ast.kind(new_pattern).function().unwrap();
        assert_eq!(f.described_template, Some(copy));
        assert_eq!(f.return_type, Type::TemplateParam(params[0]));
        assert_eq!(ast.decl_type(f.params[0]), Type::TemplateParam(params[0]));
        assert!(f.body.is_some());
    }

    #[test]
    fn test_class_template_pattern_uses_new_params() {
        let mut s = Session::new();
        let ns = s.start_namespace("lib", sp());
        let params = s.begin_template(&["T"], sp());
        let pattern = s.start_class(TagKind::Struct, "Box", sp());
        let t = s.lookup_type("T", sp());
        s.add_field("value", t, None, sp());
        s.finish_class(pattern);
        let template = s.end_template().unwrap();
        s.finish_namespace(ns);

        let tu = s.translation_unit();
        assert!(s.copy_declaration(tu, template, ReflectionModifiers::default(), sp()));
        assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));

        let ast = s.ast();
        let copy = ast.lookup_member(tu, "Box").unwrap();
        let (new_params, new_pattern) = match ast.kind(copy) {
            DeclKind::ClassTemplate(t) => (t.params.clone(), t.pattern),
            other => panic!("unexpected {:?}", other),
        };
        assert_ne!(new_params[0], params[0]);
        assert_eq!(ast.parent(new_params[0]), Some(copy));
        assert_eq!(
            ast.kind(new_pattern).record().and_then(|r| r.described_template),
            Some(copy)
        );
        let fields = ast.fields(new_pattern);
        assert_eq!(fields.len(), 1);
        match ast.kind(fields[0]) {
            DeclKind::Field(f) => assert_eq!(f.ty, Type::TemplateParam(new_params[0])),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_destructor_keeps_its_kind() {
        let mut s = Session::new();
        let a = s.start_class(TagKind::Struct, "A", sp());
        let dtor = s.start_method(MethodKind::Destructor, "", Type::Void, &[], sp());
        if let Some(data) = s.method_mut(dtor) {
            data.is_virtual = true;
        }
        s.finish_function(dtor, Some(Stmt::compound(Vec::new())));
        s.finish_class(a);

        let b = s.start_class(TagKind::Struct, "B", sp());
        assert!(s.copy_declaration(b, dtor, ReflectionModifiers::default(), sp()));
        assert_eq!(s.pending_injection_count(), 1);
        s.finish_class(b);
        assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));

        let ast = s.ast();
        let copies: Vec<DeclId> = ast
            .members(b)
            .iter()
            .copied()
            .filter(|m| matches!(ast.kind(*m), DeclKind::Method(d) if d.kind == MethodKind::Destructor))
            .collect();
        assert_eq!(copies.len(), 1);
        match ast.kind(copies[0]) {
            DeclKind::Method(m) => {
                assert!(m.is_virtual);
                assert!(m.function.body.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_conversion_function_reads_new_field() {
        let mut s = Session::new();
        let a = s.start_class(TagKind::Struct, "A", sp());
        let v = s.add_field("v", Type::Int, Some(Expr::int(5)), sp());
        let conv = s.start_method(MethodKind::Conversion, "operator int", Type::Int, &[], sp());
        if let Some(data) = s.method_mut(conv) {
            data.is_explicit = true;
            data.is_const = true;
        }
        let read = s.id_expr("v", sp()).unwrap().rvalue();
        s.finish_function(conv, Some(Stmt::ret(Some(read))));
        s.finish_class(a);

        let b = s.start_class(TagKind::Struct, "B", sp());
        assert!(s.copy_declaration(b, v, ReflectionModifiers::default(), sp()));
        assert!(s.copy_declaration(b, conv, ReflectionModifiers::default(), sp()));
        s.finish_class(b);
        assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));

        let copy = s.ast().lookup_member(b, "operator int").unwrap();
        match s.ast().kind(copy) {
            DeclKind::Method(m) => {
                assert_eq!(m.kind, MethodKind::Conversion);
                assert!(m.is_explicit);
            }
            other => panic!("unexpected {:?}", other),
        }
        let object = s.construct(b, Vec::new(), sp());
        let callee = s.member(object, "operator int", sp()).unwrap();
        let call = s.call(callee, Vec::new(), sp());
        assert_eq!(s.evaluate(&call).value, Some(ConstValue::Int(5)));
    }

    #[test]
    fn test_pure_method_must_be_virtual() {
        let mut s = Session::new();
        let a = s.start_class(TagKind::Struct, "A", sp());
        let m = s.start_method(MethodKind::Ordinary, "m", Type::Void, &[], sp());
        if let Some(data) = s.method_mut(m) {
            data.is_pure = true;
        }
        s.finish_function(m, None);
        s.finish_class(a);

        let b = s.start_class(TagKind::Struct, "B", sp());
        assert!(!s.copy_declaration(b, m, ReflectionModifiers::default(), sp()));
        s.finish_class(b);
        assert_eq!(codes(&s), vec!["E2208"]);
        assert!(s.ast().is_invalid(b));
    }

    #[test]
    fn test_parameters_cannot_be_injected_alone() {
        let mut s = Session::new();
        let f = s.start_function("f", Type::Void, &[("x", Type::Int)], sp());
        s.finish_function(f, None);
        let param = s.params(f)[0];

        let tu = s.translation_unit();
        let mut cx = InjectionContext::new(tu);
        let mut injector = Injector::new(&mut s, &mut cx);
        assert!(injector.inject_decl(param).is_none());
        assert_eq!(codes(&s), vec!["E8101"]);
    }
}

mod deferred_tests {
    use super::*;

    #[test]
    fn test_method_body_waits_for_class_completion() {
        let mut s = Session::new();
        let a = s.start_class(TagKind::Struct, "A", sp());
        let x = s.add_field("x", Type::Int, Some(Expr::int(2)), sp());
        let get = s.start_method(MethodKind::Ordinary, "get", Type::Int, &[], sp());
        let read = s.id_expr("x", sp()).unwrap().rvalue();
        s.finish_function(get, Some(Stmt::ret(Some(read))));
        s.finish_class(a);

        let b = s.start_class(TagKind::Struct, "B", sp());
        assert!(s.copy_declaration(b, x, ReflectionModifiers::default(), sp()));
        assert!(s.copy_declaration(b, get, ReflectionModifiers::default(), sp()));
        let new_x = s.ast().lookup_member(b, "x").unwrap();
        let new_get = s.ast().lookup_member(b, "get").unwrap();

        // nothing is transformed while B is still open
        assert_eq!(s.pending_injection_count(), 2);
        assert!(s.has_pending_injections(b));
        assert!(!s.has_pending_injections(a));
        match s.ast().kind(new_x) {
            DeclKind::Field(f) => assert!(f.init.is_none()),
            other => panic!("unexpected {:?}", other),
        }
        assert!(s.ast().kind(new_get).function().unwrap().body.is_none());

        s.finish_class(b);
        assert_eq!(s.pending_injection_count(), 0);
        match s.ast().kind(new_x) {
            DeclKind::Field(f) => assert_eq!(f.init, Some(Expr::int(2))),
            other => panic!("unexpected {:?}", other),
        }
        assert!(s.ast().kind(new_get).function().unwrap().body.is_some());
        assert!(s.diagnostics().is_empty());

        // the copied body reads B's field
        let object = s.construct(b, Vec::new(), sp());
        let callee = s.member(object, "get", sp()).unwrap();
        let call = s.call(callee, Vec::new(), sp());
        assert_eq!(s.evaluate(&call).value, Some(ConstValue::Int(2)));
    }

    #[test]
    fn test_nested_class_does_not_drain() {
        let mut s = Session::new();
        let a = s.start_class(TagKind::Struct, "A", sp());
        let x = s.add_field("x", Type::Int, Some(Expr::int(1)), sp());
        s.finish_class(a);

        let outer = s.start_class(TagKind::Struct, "Outer", sp());
        let inner = s.start_class(TagKind::Struct, "Inner", sp());
        assert!(s.copy_declaration(inner, x, ReflectionModifiers::default(), sp()));
        s.finish_class(inner);
        assert_eq!(s.pending_injection_count(), 1);
        assert!(s.has_pending_injections(outer));
        s.finish_class(outer);
        assert_eq!(s.pending_injection_count(), 0);
    }

    #[test]
    fn test_injection_into_namespace_drains_immediately() {
        let mut s = Session::new();
        let f = s.start_function("f", Type::Int, &[], sp());
        s.finish_function(f, Some(Stmt::ret(Some(Expr::int(3)))));
        let ns = s.start_namespace("N", sp());
        assert!(s.copy_declaration(ns, f, ReflectionModifiers::default(), sp()));
        assert_eq!(s.pending_injection_count(), 0);
        s.finish_namespace(ns);
    }

    #[test]
    fn test_end_of_translation_unit_drains() {
        let mut s = Session::new();
        let a = s.start_class(TagKind::Struct, "A", sp());
        let x = s.add_field("x", Type::Int, Some(Expr::int(4)), sp());
        s.finish_class(a);

        let b = s.start_class(TagKind::Struct, "B", sp());
        assert!(s.copy_declaration(b, x, ReflectionModifiers::default(), sp()));
        // B is left open on purpose
        s.end_translation_unit();
        assert_eq!(s.pending_injection_count(), 0);
        let new_x = s.ast().lookup_member(b, "x").unwrap();
        assert!(matches!(s.ast().kind(new_x), DeclKind::Field(f) if f.init.is_some()));
    }
}
