//! Metaclasses generate a class from a prototype

use super::common::*;
use metacxx::frontend::ast::{BinaryOp, Expr, MethodKind, Stmt, TagKind, Type, UnaryOp};
use metacxx::frontend::const_eval::ConstValue;
use metacxx::frontend::reflect::ReflectionQuery;
use metacxx::Session;

/// ```text
/// constexpr void copy_all(meta::info p) {
///     meta::info m = get_begin(p);
///     while (!is_invalid(m)) {
///         -> m;
///         m = get_next(m);
///     }
/// }
/// ```
fn declare_copy_all(s: &mut Session) {
    let f = s.start_function("copy_all", Type::Void, &[("p", Type::Reflection)], sp());
    let p = s.id_expr("p", sp()).unwrap().rvalue();
    let begin = s.query(ReflectionQuery::GetBegin, p, sp());
    let m = s.add_var("m", Type::Reflection, Some(begin), sp());

    let current = s.id_expr("m", sp()).unwrap().rvalue();
    let invalid = s.query(ReflectionQuery::IsInvalid, current, sp());
    let cond = Expr::unary(UnaryOp::Not, invalid);

    let current = s.id_expr("m", sp()).unwrap().rvalue();
    let inject = s.injection_stmt(current, sp());
    let current = s.id_expr("m", sp()).unwrap().rvalue();
    let next = s.query(ReflectionQuery::GetNext, current, sp());
    let target = s.id_expr("m", sp()).unwrap();
    let advance = Stmt::expr(Expr::assign(target, next));

    let body = Stmt::compound(vec![
        Stmt::decl(m),
        Stmt::while_loop(cond, Stmt::compound(vec![inject, advance])),
    ]);
    s.finish_function(f, Some(body));
}

#[test]
fn test_generator_copies_prototype_members() {
    let mut s = Session::new();
    declare_copy_all(&mut s);

    let generator = s.id_expr("copy_all", sp()).unwrap();
    let proto = s.start_metaclass(TagKind::Struct, "Point", generator, sp());
    s.add_field("x", Type::Int, Some(Expr::int(1)), sp());
    s.add_field("y", Type::Int, Some(Expr::int(2)), sp());
    let sum = s.start_method(MethodKind::Ordinary, "sum", Type::Int, &[], sp());
    let x = s.id_expr("x", sp()).unwrap().rvalue();
    let y = s.id_expr("y", sp()).unwrap().rvalue();
    s.finish_function(sum, Some(Stmt::ret(Some(Expr::binary(BinaryOp::Add, x, y)))));
    let point = s.finish_metaclass(proto, sp());

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    assert!(!s.ast().is_invalid(point));
    assert_eq!(s.ast().fields(point).len(), 2);
    assert_ne!(s.ast().lookup_member(point, "x"), s.ast().lookup_member(proto, "x"));
    assert_eq!(call_method(&mut s, point, "sum"), Some(ConstValue::Int(3)));
    assert_eq!(s.pending_injection_count(), 0);
}

#[test]
fn test_generator_with_wrong_signature_is_rejected() {
    let mut s = Session::new();
    let f = s.start_function("nothing", Type::Void, &[], sp());
    s.finish_function(f, Some(Stmt::compound(Vec::new())));

    let generator = s.id_expr("nothing", sp()).unwrap();
    let proto = s.start_metaclass(TagKind::Class, "Widget", generator, sp());
    s.add_field("w", Type::Int, None, sp());
    let widget = s.finish_metaclass(proto, sp());

    assert_eq!(codes(&s), vec!["E2303"]);
    assert!(s.ast().is_invalid(widget));
    assert!(s.ast().fields(widget).is_empty());
}

#[test]
fn test_generator_failure_invalidates_class() {
    let mut s = Session::new();
    // constexpr void reject(meta::info p) { __compiler_error("no members allowed"); }
    let f = s.start_function("reject", Type::Void, &[("p", Type::Reflection)], sp());
    let err = s.compiler_error(Expr::string("no members allowed"), sp());
    s.finish_function(f, Some(Stmt::compound(vec![Stmt::expr(err)])));

    let generator = s.id_expr("reject", sp()).unwrap();
    let proto = s.start_metaclass(TagKind::Struct, "Empty", generator, sp());
    let empty = s.finish_metaclass(proto, sp());

    assert_eq!(codes(&s), vec!["E2302"]);
    assert_eq!(s.diagnostics().diagnostics()[0].message, "no members allowed");
    assert!(s.ast().is_invalid(empty));
}
