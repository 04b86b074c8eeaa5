//! Invalid reflections carry their message to every use

use super::common::*;
use metacxx::frontend::ast::{Expr, Stmt, TagKind, Type};
use metacxx::Session;

const MESSAGE: &str = "custom error message";

fn assert_reported(s: &Session) {
    assert_eq!(codes(s), vec!["E2101"]);
    let diagnostic = &s.diagnostics().diagnostics()[0];
    assert_eq!(diagnostic.message, "cannot reify invalid reflection");
    let notes: Vec<&str> = diagnostic.notes().collect();
    assert_eq!(notes, vec![MESSAGE]);
}

/// `constexpr meta::info bad = __invalid_reflection(MESSAGE);`
fn declare_invalid(s: &mut Session) {
    let init = s.invalid_reflection(Expr::string(MESSAGE), sp());
    s.add_constexpr_var("bad", Type::Reflection, init, sp());
}

#[test]
fn test_injecting_invalid_reflection() {
    let mut s = Session::new();
    declare_invalid(&mut s);
    let class = s.start_class(TagKind::Struct, "C", sp());
    let operand = s.id_expr("bad", sp()).unwrap();
    s.injection_decl(operand, sp());
    s.finish_class(class);

    assert_reported(&s);
    assert!(s.ast().is_invalid(class));
}

#[test]
fn test_invalid_reflection_through_function_calls() {
    let mut s = Session::new();
    declare_invalid(&mut s);
    // constexpr meta::info pass(meta::info r) { return r; }
    let pass = s.start_function("pass", Type::Reflection, &[("r", Type::Reflection)], sp());
    let r = s.id_expr("r", sp()).unwrap().rvalue();
    s.finish_function(pass, Some(Stmt::ret(Some(r))));

    let class = s.start_class(TagKind::Struct, "C", sp());
    let bad = s.id_expr("bad", sp()).unwrap().rvalue();
    let once = s.call(s.decl_ref(pass, sp()), vec![bad], sp());
    let twice = s.call(s.decl_ref(pass, sp()), vec![once], sp());
    s.injection_decl(twice, sp());
    s.finish_class(class);

    assert_reported(&s);
}

#[test]
fn test_splicing_invalid_reflection() {
    let mut s = Session::new();
    declare_invalid(&mut s);
    let operand = s.id_expr("bad", sp()).unwrap();
    assert!(s.splice_expr(operand, sp()).is_none());
    assert_reported(&s);
}

#[test]
fn test_splicing_invalid_reflection_as_type() {
    let mut s = Session::new();
    declare_invalid(&mut s);
    let operand = s.id_expr("bad", sp()).unwrap();
    assert!(s.splice_type(operand, sp()).is_error());
    assert_reported(&s);
}

#[test]
fn test_invalid_reflection_captured_by_fragment() {
    let mut s = Session::new();
    let class = s.start_class(TagKind::Struct, "C", sp());
    let meta = s.start_metaprogram(sp());
    let init = s.invalid_reflection(Expr::string(MESSAGE), sp());
    let r = s.add_var("r", Type::Reflection, Some(init), sp());
    // fragment struct { consteval -> r; }
    let fragment = class_fragment(&mut s, |s| {
        let operand = s.id_expr("r", sp()).unwrap();
        s.injection_decl(operand, sp());
    });
    assert!(s.diagnostics().is_empty());
    let inject = s.injection_stmt(fragment, sp());
    s.finish_metaprogram(meta, Stmt::compound(vec![Stmt::decl(r), inject]));
    s.finish_class(class);

    assert_reported(&s);
}
