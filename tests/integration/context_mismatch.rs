//! Injection targets that cannot receive the injected content

use super::common::*;
use metacxx::frontend::ast::{Expr, TagKind, Type};
use metacxx::Session;

#[test]
fn test_class_fragment_into_namespace_fails() {
    let mut s = Session::new();
    let ns = s.start_namespace("N", sp());
    let existing = s.add_var("existing", Type::Int, Some(Expr::int(0)), sp());
    let fragment = class_fragment(&mut s, |s| {
        s.add_field("x", Type::Int, None, sp());
    });
    s.injection_decl(fragment, sp());
    s.finish_namespace(ns);

    assert_eq!(codes(&s), vec!["E2202"]);
    assert_eq!(
        s.diagnostics().diagnostics()[0].message,
        "cannot inject a class member into a namespace"
    );
    assert_eq!(s.ast().members(ns).to_vec(), vec![existing]);
    assert!(s.ast().is_invalid(ns));
}

#[test]
fn test_namespace_fragment_into_class_fails() {
    let mut s = Session::new();
    let class = s.start_class(TagKind::Class, "C", sp());
    let fragment = namespace_fragment(&mut s, |s| {
        s.add_var("v", Type::Int, Some(Expr::int(1)), sp());
    });
    s.injection_decl(fragment, sp());
    s.finish_class(class);

    assert_eq!(codes(&s), vec!["E2202"]);
    assert_eq!(
        s.diagnostics().diagnostics()[0].message,
        "cannot inject a namespace member into a class"
    );
    assert!(s.ast().lookup_member(class, "v").is_none());
    assert!(s.ast().fields(class).is_empty());
}

#[test]
fn test_later_effects_still_apply() {
    let mut s = Session::new();
    let class = s.start_class(TagKind::Struct, "C", sp());
    let meta = s.start_metaprogram(sp());
    let bad = namespace_fragment(&mut s, |s| {
        s.add_var("v", Type::Int, Some(Expr::int(1)), sp());
    });
    let good = class_fragment(&mut s, |s| {
        s.add_field("f", Type::Int, None, sp());
    });
    let first = s.injection_stmt(bad, sp());
    let second = s.injection_stmt(good, sp());
    s.finish_metaprogram(
        meta,
        metacxx::frontend::ast::Stmt::compound(vec![first, second]),
    );
    s.finish_class(class);

    assert_eq!(codes(&s), vec!["E2202"]);
    assert!(s.ast().lookup_member(class, "f").is_some());
    assert!(s.ast().is_invalid(class));
}

#[test]
fn test_expression_reflection_is_not_injectable() {
    let mut s = Session::new();
    let class = s.start_class(TagKind::Struct, "C", sp());
    let operand = s.reflect_expr(Expr::int(1), sp());
    s.injection_decl(operand, sp());
    s.finish_class(class);

    assert_eq!(codes(&s), vec!["E2201"]);
    assert!(s.diagnostics().diagnostics()[0]
        .message
        .starts_with("invalid injection operand"));
    assert!(s.ast().fields(class).is_empty());
}

#[test]
fn test_non_reflection_operand_is_rejected() {
    let mut s = Session::new();
    let ns = s.start_namespace("N", sp());
    let meta = s.injection_decl(Expr::int(3), sp());
    s.finish_namespace(ns);

    assert_eq!(codes(&s), vec!["E2201"]);
    assert_eq!(
        s.diagnostics().diagnostics()[0].message,
        "invalid injection operand of type 'int'"
    );
    assert!(s.ast().is_invalid(meta));
    assert!(s.ast().members(ns).is_empty());
}
