//! Injecting class fragments into classes

use super::common::*;
use metacxx::frontend::ast::{Access, MethodKind, Stmt, TagKind, Type};
use metacxx::frontend::ast::Expr;
use metacxx::frontend::const_eval::ConstValue;
use metacxx::Session;

#[test]
fn test_fragment_members_land_in_class() {
    let mut s = Session::new();
    let foo = s.start_class(TagKind::Struct, "Foo", sp());
    let fragment = class_fragment(&mut s, |s| {
        s.add_field("n", Type::Int, Some(Expr::int(10)), sp());
        let f = s.start_method(MethodKind::Ordinary, "f", Type::Int, &[], sp());
        let n = s.id_expr("n", sp()).unwrap().rvalue();
        s.finish_function(f, Some(Stmt::compound(vec![Stmt::ret(Some(n))])));
    });
    s.injection_decl(fragment, sp());
    s.finish_class(foo);

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    assert_eq!(s.ast().fields(foo).len(), 1);
    assert!(s.ast().lookup_member(foo, "f").is_some());
    assert_eq!(read_field(&mut s, foo, "n"), Some(ConstValue::Int(10)));
    assert_eq!(call_method(&mut s, foo, "f"), Some(ConstValue::Int(10)));
}

#[test]
fn test_this_member_access_is_rebound() {
    let mut s = Session::new();
    let target = s.start_class(TagKind::Struct, "S", sp());
    let fragment = class_fragment(&mut s, |s| {
        s.add_field("y", Type::Int, Some(Expr::int(3)), sp());
        let get = s.start_method(MethodKind::Ordinary, "get", Type::Int, &[], sp());
        let this = s.this_expr(sp()).unwrap();
        let y = s.member(this, "y", sp()).unwrap().rvalue();
        s.finish_function(get, Some(Stmt::ret(Some(y))));
    });
    s.injection_decl(fragment, sp());

    // nothing is transformed until S is complete
    assert!(s.has_pending_injections(target));
    s.finish_class(target);
    assert_eq!(s.pending_injection_count(), 0);
    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    assert_eq!(call_method(&mut s, target, "get"), Some(ConstValue::Int(3)));
}

#[test]
fn test_nested_fragment_injects_into_final_class() {
    let mut s = Session::new();
    let target = s.start_class(TagKind::Struct, "S", sp());
    let outer = class_fragment(&mut s, |s| {
        s.add_field("a", Type::Int, Some(Expr::int(1)), sp());
        let inner = class_fragment(s, |s| {
            s.add_field("b", Type::Int, Some(Expr::int(2)), sp());
        });
        s.injection_decl(inner, sp());
    });
    s.injection_decl(outer, sp());
    s.finish_class(target);

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    let names: Vec<String> = s
        .ast()
        .fields(target)
        .iter()
        .map(|f| s.ast().decl(*f).name_str().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(read_field(&mut s, target, "b"), Some(ConstValue::Int(2)));
}

#[test]
fn test_access_specifiers_are_copied() {
    let mut s = Session::new();
    let target = s.start_class(TagKind::Struct, "S", sp());
    let fragment = class_fragment(&mut s, |s| {
        s.add_access_spec(Access::Private, sp());
        s.add_field("hidden", Type::Int, None, sp());
    });
    s.injection_decl(fragment, sp());
    s.finish_class(target);

    let hidden = s.ast().lookup_member(target, "hidden").unwrap();
    assert_eq!(s.ast().decl(hidden).access, Access::Private);
}

#[test]
fn test_injected_class_name_is_not_copied() {
    let mut s = Session::new();
    let target = s.start_class(TagKind::Struct, "S", sp());
    let fragment = class_fragment(&mut s, |s| {
        s.add_field("x", Type::Int, None, sp());
    });
    s.injection_decl(fragment, sp());
    s.finish_class(target);

    let injected_names = s
        .ast()
        .members(target)
        .iter()
        .filter(|m| s.ast().decl(**m).is_injected_class_name())
        .count();
    assert_eq!(injected_names, 1);
}

#[test]
fn test_constructor_initializers_follow_fields() {
    let mut s = Session::new();
    let target = s.start_class(TagKind::Struct, "S", sp());
    let fragment = class_fragment(&mut s, |s| {
        s.add_field("v", Type::Int, None, sp());
        let ctor = s.start_method(MethodKind::Constructor, "", Type::Void, &[], sp());
        let init = s.member_init("v", Expr::int(42), sp()).unwrap();
        s.set_ctor_inits(ctor, vec![init]);
        s.finish_function(ctor, Some(Stmt::compound(Vec::new())));
    });
    s.injection_decl(fragment, sp());
    s.finish_class(target);

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    assert_eq!(s.ast().constructors(target).len(), 1);
    assert_eq!(read_field(&mut s, target, "v"), Some(ConstValue::Int(42)));
}
