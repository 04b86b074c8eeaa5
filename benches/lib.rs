//! # metacxx benchmarks
//!
//! Uses Criterion.rs.
//!
//! ## Groups
//! - `inject`: fragment injection into classes and namespaces
//! - `capture`: closure synthesis for fragments with captured locals
//!
//! ## Usage
//! ```bash
//! cargo bench          # everything
//! cargo bench inject   # injection only
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use metacxx::frontend::ast::{DeclName, Expr, MethodKind, Stmt, TagKind, Type};
use metacxx::util::span::Span;
use metacxx::Session;
use std::hint::black_box;

fn sp() -> Span {
    Span::dummy()
}

/// A class fragment with `fields` initialized fields and one getter per
/// field, injected into a fresh class
fn inject_class_fragment(fields: usize) -> Session {
    let mut s = Session::new();
    let target = s.start_class(TagKind::Struct, "Target", sp());
    let fragment = s.start_fragment(sp());
    let content = s.start_class(TagKind::Struct, DeclName::Empty, sp());
    for i in 0..fields {
        s.add_field(format!("f{}", i), Type::Int, Some(Expr::int(i as i64)), sp());
        let getter = s.start_method(MethodKind::Ordinary, format!("get{}", i), Type::Int, &[], sp());
        let value = s.id_expr(&format!("f{}", i), sp()).map(Expr::rvalue);
        s.finish_function(getter, Some(Stmt::ret(value)));
    }
    s.finish_class(content);
    let operand = s.finish_fragment(fragment, content, sp());
    s.injection_decl(operand, sp());
    s.finish_class(target);
    s
}

/// A namespace fragment capturing `locals` variables, built and injected
/// by one metaprogram
fn inject_with_captures(locals: usize) -> Session {
    let mut s = Session::new();
    let meta = s.start_metaprogram(sp());
    let mut body = Vec::with_capacity(locals + 1);
    for i in 0..locals {
        let var = s.add_var(format!("v{}", i), Type::Int, Some(Expr::int(i as i64)), sp());
        body.push(Stmt::decl(var));
    }
    let fragment = s.start_fragment(sp());
    let content = s.start_namespace(DeclName::Empty, sp());
    let f = s.start_function("last", Type::Int, &[], sp());
    let value = match locals {
        0 => Some(Expr::int(0)),
        n => s.id_expr(&format!("v{}", n - 1), sp()).map(Expr::rvalue),
    };
    s.finish_function(f, Some(Stmt::ret(value)));
    s.finish_namespace(content);
    let operand = s.finish_fragment(fragment, content, sp());
    body.push(s.injection_stmt(operand, sp()));
    s.finish_metaprogram(meta, Stmt::compound(body));
    s
}

fn bench_inject(c: &mut Criterion) {
    let mut group = c.benchmark_group("inject");
    for fields in [1usize, 8, 32] {
        group.bench_with_input(BenchmarkId::new("class_fragment", fields), &fields, |b, &n| {
            b.iter(|| black_box(inject_class_fragment(n)))
        });
    }
    group.finish();
}

fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");
    for locals in [0usize, 4, 16] {
        group.bench_with_input(BenchmarkId::new("namespace_fragment", locals), &locals, |b, &n| {
            b.iter(|| black_box(inject_with_captures(n)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_inject, bench_capture);
criterion_main!(benches);
