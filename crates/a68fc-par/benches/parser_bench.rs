//! Parser benchmarks: end-to-end pipeline cost over a handful of representative
//! programs. Run with `cargo bench --package a68fc-par`.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use a68fc_par::pipeline::{compile, NoIncludes};
use a68fc_util::diagnostic::Handler;
use a68fc_util::CompileOptions;

fn compile_source(source: &str) {
    let handler = Handler::new();
    let options = CompileOptions::default();
    let _ = compile(source, &options, &handler, &NoIncludes);
}

fn bench_skip(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_skip");
    let source = "SKIP";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("skip", |b| b.iter(|| compile_source(black_box(source))));
    group.finish();
}

fn bench_declarations(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_declarations");
    let source = "BEGIN INT x = 1; INT y = 2; REAL z := 3.5; x + y END";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("declarations", |b| b.iter(|| compile_source(black_box(source))));
    group.finish();
}

fn bench_conditional(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_conditional");
    let source = "BEGIN INT n = 5; IF n < 0 THEN -1 ELIF n = 0 THEN 0 ELSE 1 FI END";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("conditional", |b| b.iter(|| compile_source(black_box(source))));
    group.finish();
}

fn bench_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_loop");
    let source = "BEGIN INT sum := 0; FOR i FROM 1 TO 100 DO sum := sum + i OD; sum END";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("loop", |b| b.iter(|| compile_source(black_box(source))));
    group.finish();
}

fn bench_formula_priority(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_formula");
    let source = "BEGIN PRIO MAX = 9; OP MAX = (INT a, INT b) INT: (a > b | a | b); 1 MAX 2 MAX 3 END";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("formula_priority", |b| b.iter(|| compile_source(black_box(source))));
    group.finish();
}

fn bench_case_clause(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_case");
    let source = "BEGIN INT n = 2; CASE n IN 1, 2, 3 OUT 0 ESAC END";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("case_clause", |b| b.iter(|| compile_source(black_box(source))));
    group.finish();
}

criterion_group!(
    benches,
    bench_skip,
    bench_declarations,
    bench_conditional,
    bench_loop,
    bench_formula_priority,
    bench_case_clause
);
criterion_main!(benches);
