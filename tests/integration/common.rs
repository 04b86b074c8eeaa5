//! Shared builders for the integration tests

#![allow(dead_code)]

use metacxx::frontend::ast::{DeclId, DeclName, Expr, TagKind};
use metacxx::frontend::const_eval::ConstValue;
use metacxx::util::span::Span;
use metacxx::Session;

pub fn sp() -> Span {
    Span::dummy()
}

pub fn codes(session: &Session) -> Vec<String> {
    session
        .diagnostics()
        .diagnostics()
        .iter()
        .map(|d| d.code.clone())
        .collect()
}

/// `fragment struct { ... }`, with `body` adding the members
pub fn class_fragment(
    session: &mut Session,
    body: impl FnOnce(&mut Session),
) -> Expr {
    let fragment = session.start_fragment(sp());
    let content = session.start_class(TagKind::Struct, DeclName::Empty, sp());
    body(session);
    session.finish_class(content);
    session.finish_fragment(fragment, content, sp())
}

/// `fragment namespace { ... }`
pub fn namespace_fragment(
    session: &mut Session,
    body: impl FnOnce(&mut Session),
) -> Expr {
    let fragment = session.start_fragment(sp());
    let content = session.start_namespace(DeclName::Empty, sp());
    body(session);
    session.finish_namespace(content);
    session.finish_fragment(fragment, content, sp())
}

/// `record{}.name()`
pub fn call_method(
    session: &mut Session,
    record: DeclId,
    name: &str,
) -> Option<ConstValue> {
    let object = session.construct(record, Vec::new(), sp());
    let callee = session.member(object, name, sp())?;
    let call = session.call(callee, Vec::new(), sp());
    session.evaluate(&call).value
}

/// `name()` for a function found by unqualified lookup in `context`
pub fn call_function(
    session: &mut Session,
    context: DeclId,
    name: &str,
) -> Option<ConstValue> {
    let function = session.ast().lookup_member(context, name)?;
    let callee = session.decl_ref(function, sp());
    let call = session.call(callee, Vec::new(), sp());
    session.evaluate(&call).value
}

/// `record{}.name`
pub fn read_field(
    session: &mut Session,
    record: DeclId,
    name: &str,
) -> Option<ConstValue> {
    let object = session.construct(record, Vec::new(), sp());
    let field = session.member(object, name, sp())?;
    session.evaluate(&field.rvalue()).value
}
