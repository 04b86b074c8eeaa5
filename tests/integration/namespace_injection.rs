//! Injecting namespace fragments

use super::common::*;
use metacxx::frontend::ast::{Expr, Stmt, Type};
use metacxx::frontend::const_eval::ConstValue;
use metacxx::frontend::sema::RecordingConsumer;
use metacxx::Session;

/// `constexpr auto frag = fragment namespace { int four() { return 4; } };`
fn shared_fragment(s: &mut Session) {
    let fragment = namespace_fragment(s, |s| {
        let f = s.start_function("four", Type::Int, &[], sp());
        s.finish_function(f, Some(Stmt::ret(Some(Expr::int(4)))));
    });
    s.add_constexpr_var("frag", Type::Undeduced, fragment, sp());
}

#[test]
fn test_same_fragment_into_two_namespaces() {
    let mut s = Session::new();
    shared_fragment(&mut s);

    let mut targets = Vec::new();
    for name in ["first", "second"] {
        let ns = s.start_namespace(name, sp());
        let operand = s.id_expr("frag", sp()).unwrap();
        s.injection_decl(operand, sp());
        s.finish_namespace(ns);
        targets.push(ns);
    }
    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));

    let first = s.ast().lookup_member(targets[0], "four").unwrap();
    let second = s.ast().lookup_member(targets[1], "four").unwrap();
    assert_ne!(first, second);
    assert_eq!(s.ast().parent(first), Some(targets[0]));
    assert_eq!(s.ast().parent(second), Some(targets[1]));
    assert_eq!(s.ast().members(targets[0]).len(), 1);
    assert_eq!(s.ast().members(targets[1]).len(), 1);

    assert_eq!(call_function(&mut s, targets[0], "four"), Some(ConstValue::Int(4)));
    assert_eq!(call_function(&mut s, targets[1], "four"), Some(ConstValue::Int(4)));
}

#[test]
fn test_top_level_injection_notifies_consumer() {
    let consumer = RecordingConsumer::new();
    let mut s = Session::new().with_consumer(Box::new(consumer.clone()));
    shared_fragment(&mut s);

    let ns = s.start_namespace("inner", sp());
    let operand = s.id_expr("frag", sp()).unwrap();
    s.injection_decl(operand, sp());
    s.finish_namespace(ns);
    assert!(consumer.decls().is_empty());

    let operand = s.id_expr("frag", sp()).unwrap();
    s.injection_decl(operand, sp());
    let tu = s.translation_unit();
    let four = s.ast().lookup_member(tu, "four").unwrap();
    assert_eq!(consumer.decls(), vec![four]);
}

#[test]
fn test_namespace_reflection_copies_members() {
    let mut s = Session::new();
    let lib = s.start_namespace("lib", sp());
    let f = s.start_function("one", Type::Int, &[], sp());
    s.finish_function(f, Some(Stmt::ret(Some(Expr::int(1)))));
    s.finish_namespace(lib);

    let copy = s.start_namespace("copy", sp());
    let operand = s.reflect("lib", sp()).unwrap();
    s.injection_decl(operand, sp());
    s.finish_namespace(copy);

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    let nested = s.ast().lookup_member(copy, "lib").unwrap();
    assert_ne!(nested, lib);
    assert_eq!(call_function(&mut s, nested, "one"), Some(ConstValue::Int(1)));
}
