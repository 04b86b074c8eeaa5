//! Field initializers are transformed before method bodies

use super::common::*;
use metacxx::frontend::ast::{BinaryOp, Expr, MethodKind, Stmt, TagKind, Type};
use metacxx::frontend::const_eval::ConstValue;
use metacxx::frontend::reflect::ReflectionModifiers;
use metacxx::Session;

#[test]
fn test_initializer_sees_sibling_field() {
    let mut s = Session::new();
    let target = s.start_class(TagKind::Struct, "S", sp());
    let fragment = class_fragment(&mut s, |s| {
        s.add_field("x", Type::Int, Some(Expr::int(1)), sp());
        let x = s.id_expr("x", sp()).unwrap().rvalue();
        let init = Expr::binary(BinaryOp::Add, x, Expr::int(1));
        s.add_field("y", Type::Int, Some(init), sp());
    });
    s.injection_decl(fragment, sp());
    s.finish_class(target);

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    assert_eq!(read_field(&mut s, target, "y"), Some(ConstValue::Int(2)));
}

#[test]
fn test_method_reads_field_injected_after_it() {
    let mut s = Session::new();
    let target = s.start_class(TagKind::Struct, "S", sp());
    let meta = s.start_metaprogram(sp());
    let methods = class_fragment(&mut s, |s| {
        let get = s.start_method(MethodKind::Ordinary, "get", Type::Int, &[], sp());
        let this = s.this_expr(sp()).unwrap();
        let value = s.member(this, "value", sp()).unwrap().rvalue();
        s.finish_function(get, Some(Stmt::ret(Some(value))));
    });
    let fields = class_fragment(&mut s, |s| {
        s.add_field("value", Type::Int, Some(Expr::int(8)), sp());
    });
    let first = s.injection_stmt(methods, sp());
    let second = s.injection_stmt(fields, sp());
    s.finish_metaprogram(meta, Stmt::compound(vec![first, second]));
    s.finish_class(target);

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    assert_eq!(call_method(&mut s, target, "get"), Some(ConstValue::Int(8)));
}

#[test]
fn test_field_pass_runs_before_method_pass() {
    let mut s = Session::new();
    // fragment struct F { int q1; int q2; int m() { return q1; } int f = q2; };
    let frag = s.start_fragment(sp());
    let content = s.start_class(TagKind::Struct, "F", sp());
    s.add_field("q1", Type::Int, None, sp());
    s.add_field("q2", Type::Int, None, sp());
    let m = s.start_method(MethodKind::Ordinary, "m", Type::Int, &[], sp());
    let q1 = s.id_expr("q1", sp()).unwrap().rvalue();
    s.finish_function(m, Some(Stmt::ret(Some(q1))));
    let q2 = s.id_expr("q2", sp()).unwrap().rvalue();
    let f = s.add_field("f", Type::Int, Some(q2), sp());
    s.finish_class(content);
    s.finish_fragment(frag, content, sp());

    // copy only m and f; their references have nothing to resolve to
    let target = s.start_class(TagKind::Struct, "B", sp());
    assert!(s.copy_declaration(target, m, ReflectionModifiers::default(), sp()));
    assert!(s.copy_declaration(target, f, ReflectionModifiers::default(), sp()));
    assert!(s.diagnostics().is_empty());
    s.finish_class(target);

    let messages: Vec<&str> = s
        .diagnostics()
        .with_code("E2204")
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "reference to 'q2' cannot be resolved at the point of injection",
            "reference to 'q1' cannot be resolved at the point of injection",
        ]
    );
    let new_f = s.ast().lookup_member(target, "f").unwrap();
    let new_m = s.ast().lookup_member(target, "m").unwrap();
    assert!(s.ast().is_invalid(new_f));
    assert!(s.ast().is_invalid(new_m));
}

#[test]
fn test_nested_class_waits_for_outer_class() {
    let mut s = Session::new();
    let outer = s.start_class(TagKind::Struct, "Outer", sp());
    let inner = s.start_class(TagKind::Struct, "Inner", sp());
    let fragment = class_fragment(&mut s, |s| {
        s.add_field("z", Type::Int, Some(Expr::int(5)), sp());
    });
    s.injection_decl(fragment, sp());
    s.finish_class(inner);
    assert_eq!(s.pending_injection_count(), 1);
    s.finish_class(outer);
    assert_eq!(s.pending_injection_count(), 0);
    assert_eq!(read_field(&mut s, inner, "z"), Some(ConstValue::Int(5)));
}
