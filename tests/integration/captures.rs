//! Captured locals and placeholder substitution

use super::common::*;
use metacxx::frontend::ast::{BinaryOp, Expr, MethodKind, Stmt, TagKind, Type};
use metacxx::frontend::const_eval::ConstValue;
use metacxx::Session;
use proptest::prelude::*;

fn closure_field_names(
    s: &Session,
    fragment: &Expr,
) -> Vec<String> {
    let closure = fragment.ty.as_record().unwrap();
    s.ast()
        .fields(closure)
        .iter()
        .map(|f| s.ast().decl(*f).name_str().to_string())
        .collect()
}

#[test]
fn test_injected_method_returns_captured_value() {
    let mut s = Session::new();
    let foo = s.start_class(TagKind::Struct, "Foo", sp());
    let meta = s.start_metaprogram(sp());
    let k = s.add_var("k", Type::Int, Some(Expr::int(5)), sp());
    let bump = {
        let target = s.id_expr("k", sp()).unwrap();
        let value = s.id_expr("k", sp()).unwrap().rvalue();
        Stmt::expr(Expr::assign(target, Expr::binary(BinaryOp::Add, value, Expr::int(1))))
    };
    let fragment = class_fragment(&mut s, |s| {
        let g = s.start_method(MethodKind::Ordinary, "g", Type::Int, &[], sp());
        let k = s.id_expr("k", sp()).unwrap().rvalue();
        s.finish_function(g, Some(Stmt::ret(Some(k))));
    });
    let inject = s.injection_stmt(fragment, sp());
    // changing k after the injection statement does not reach the copy
    let later = {
        let target = s.id_expr("k", sp()).unwrap();
        Stmt::expr(Expr::assign(target, Expr::int(100)))
    };
    s.finish_metaprogram(meta, Stmt::compound(vec![Stmt::decl(k), bump, inject, later]));
    s.finish_class(foo);

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    assert_eq!(call_method(&mut s, foo, "g"), Some(ConstValue::Int(6)));
}

#[test]
fn test_every_capture_use_is_substituted() {
    let mut s = Session::new();
    let tu = s.translation_unit();
    let meta = s.start_metaprogram(sp());
    let a = s.add_var("a", Type::Int, Some(Expr::int(3)), sp());
    let b = s.add_var("b", Type::Int, Some(Expr::int(4)), sp());
    let fragment = namespace_fragment(&mut s, |s| {
        let f = s.start_function("weighted", Type::Int, &[], sp());
        let a1 = s.id_expr("a", sp()).unwrap().rvalue();
        let a2 = s.id_expr("a", sp()).unwrap().rvalue();
        let b1 = s.id_expr("b", sp()).unwrap().rvalue();
        let sum = Expr::binary(
            BinaryOp::Add,
            Expr::binary(BinaryOp::Mul, a1, a2),
            b1,
        );
        s.finish_function(f, Some(Stmt::ret(Some(sum))));
    });
    assert_eq!(
        closure_field_names(&s, &fragment),
        vec!["fragment_reflection", "__captured_a", "__captured_b"]
    );
    let inject = s.injection_stmt(fragment, sp());
    s.finish_metaprogram(meta, Stmt::compound(vec![Stmt::decl(a), Stmt::decl(b), inject]));

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    assert_eq!(call_function(&mut s, tu, "weighted"), Some(ConstValue::Int(13)));
}

#[test]
fn test_variable_in_its_own_initializer_is_not_captured() {
    let mut s = Session::new();
    let f = s.start_function("f", Type::Void, &[], sp());
    s.add_var("a", Type::Int, Some(Expr::int(1)), sp());
    // auto x = fragment namespace { };
    let x = s.declare_var("x", Type::Undeduced, sp());
    let fragment = namespace_fragment(&mut s, |_| {});
    assert_eq!(
        closure_field_names(&s, &fragment),
        vec!["fragment_reflection", "__captured_a"]
    );
    let closure = fragment.ty.clone();
    s.set_var_init(x, fragment);
    s.finish_function(f, None);

    assert_eq!(s.ast().decl_type(x), closure);
}

#[test]
fn test_parameters_are_captured() {
    let mut s = Session::new();
    let f = s.start_function("f", Type::Void, &[("p", Type::Int)], sp());
    let fragment = namespace_fragment(&mut s, |_| {});
    s.finish_function(f, None);
    assert_eq!(
        closure_field_names(&s, &fragment),
        vec!["fragment_reflection", "__captured_p"]
    );
}

proptest! {
    #[test]
    fn prop_closure_round_trips_captures(values in prop::collection::vec(any::<i64>(), 0..6)) {
        let mut s = Session::new();
        let f = s.start_function("f", Type::Void, &[], sp());
        for (i, v) in values.iter().enumerate() {
            s.add_var(format!("v{}", i), Type::Int, Some(Expr::int(*v)), sp());
        }
        let fragment = namespace_fragment(&mut s, |_| {});
        s.finish_function(f, None);

        let names = closure_field_names(&s, &fragment);
        prop_assert_eq!(names.len(), values.len() + 1);
        prop_assert_eq!(names[0].as_str(), "fragment_reflection");
        for (i, name) in names.iter().skip(1).enumerate() {
            prop_assert_eq!(name.clone(), format!("__captured_v{}", i));
        }

        let object = s.evaluate(&fragment).value.unwrap();
        prop_assert!(object.field(0).and_then(|r| r.as_reflection()).is_some());
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(object.field(i + 1), Some(&ConstValue::Int(*v)));
        }
    }
}
