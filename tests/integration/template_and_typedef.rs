//! Injecting templates and typedefs out of fragments

use super::common::*;
use metacxx::frontend::ast::{DeclKind, DeclName, Stmt, TagKind, Type};
use metacxx::frontend::ast::Expr;
use metacxx::frontend::sema::RecordingConsumer;
use metacxx::Session;

#[test]
fn test_function_template_from_fragment_reported_once() {
    let consumer = RecordingConsumer::new();
    let mut s = Session::new().with_consumer(Box::new(consumer.clone()));
    // fragment namespace { template<typename T> T id(T x) { return x; } }
    let fragment = namespace_fragment(&mut s, |s| {
        let params = s.begin_template(&["T"], sp());
        let t = Type::TemplateParam(params[0]);
        let f = s.start_function("id", t.clone(), &[("x", t)], sp());
        let x = s.id_expr("x", sp()).unwrap().rvalue();
        s.finish_function(f, Some(Stmt::ret(Some(x))));
        s.end_template().unwrap();
    });
    s.injection_decl(fragment, sp());
    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));

    let tu = s.translation_unit();
    let template = s.ast().lookup_member(tu, "id").unwrap();
    assert!(matches!(s.ast().kind(template), DeclKind::FunctionTemplate(_)));
    assert_eq!(consumer.decls(), vec![template]);
    for reported in consumer.decls() {
        assert!(s.ast().members(tu).contains(&reported));
    }
}

#[test]
fn test_typedef_to_fragment_content_maps_to_injectee() {
    let mut s = Session::new();
    let class = s.start_class(TagKind::Struct, "C", sp());
    // fragment struct { typedef <this fragment> self_t; }
    let fragment = s.start_fragment(sp());
    let content = s.start_class(TagKind::Struct, DeclName::Empty, sp());
    s.add_typedef("self_t", Type::Record(content), sp());
    s.finish_class(content);
    let fragment = s.finish_fragment(fragment, content, sp());
    s.injection_decl(fragment, sp());
    s.finish_class(class);

    assert!(s.diagnostics().is_empty(), "{:?}", codes(&s));
    let alias = s.ast().lookup_member(class, "self_t").unwrap();
    assert!(!s.ast().is_invalid(alias));
    match s.ast().kind(alias) {
        DeclKind::Typedef { underlying, .. } => assert_eq!(*underlying, Type::Record(class)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_typedef_keeps_original_type_when_splice_fails() {
    let mut s = Session::new();
    let class = s.start_class(TagKind::Struct, "C", sp());
    let meta = s.start_metaprogram(sp());
    let init = s.reflect_expr(Expr::int(1), sp());
    let r = s.add_var("r", Type::Reflection, Some(init), sp());
    // fragment struct { typedef typename(r) bad_t; }
    let fragment = class_fragment(&mut s, |s| {
        let operand = s.id_expr("r", sp()).unwrap().rvalue();
        let ty = s.splice_type(operand, sp());
        s.add_typedef("bad_t", ty, sp());
    });
    let inject = s.injection_stmt(fragment, sp());
    s.finish_metaprogram(meta, Stmt::compound(vec![Stmt::decl(r), inject]));
    s.finish_class(class);

    assert!(codes(&s).contains(&"E2104".to_string()), "{:?}", codes(&s));
    let alias = s.ast().lookup_member(class, "bad_t").unwrap();
    assert!(s.ast().is_invalid(alias));
    assert!(matches!(
        s.ast().kind(alias),
        DeclKind::Typedef {
            underlying: Type::Splice(_),
            ..
        }
    ));
    assert!(s.ast().is_invalid(class));
}
