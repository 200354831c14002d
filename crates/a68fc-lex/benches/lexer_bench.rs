//! Scanner benchmarks.
//!
//! Run with: `cargo bench --package a68fc-lex`

use a68fc_util::diagnostic::Handler;
use a68fc_util::options::StroppingMode;
use a68fc_util::CompileOptions;
use a68fc_lex::Lexer;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn token_count(source: &str, options: &CompileOptions) -> usize {
    let handler = Handler::new();
    let mut lexer = Lexer::new(source, options, &handler);
    lexer.tokenize_all().len()
}

fn bench_lexer_keywords(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_keywords");
    let options = CompileOptions::default();

    let source = "BEGIN INT x = 42; PROC add = (INT a, INT b) INT: a + b; print(add(x, 1)) END";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("closed_clause", |b| {
        b.iter(|| token_count(black_box("BEGIN SKIP END"), &options))
    });

    group.bench_function("routine_text", |b| {
        b.iter(|| token_count(black_box(source), &options))
    });

    group.finish();
}

fn bench_lexer_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_complex");
    let options = CompileOptions::default();

    let source = r#"
        PROC fib = (INT n) INT:
            IF n <= 1 THEN n
            ELSE fib(n - 1) + fib(n - 2)
            FI;

        MODE POINT = STRUCT(INT x, INT y);

        [1:10]INT a;
        FOR i FROM 1 TO 10 DO a[i] := i * i OD;

        print(("fib(10) = ", fib(10), new line))
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("complex_source", |b| {
        b.iter(|| token_count(black_box(source), &options))
    });

    group.finish();
}

fn bench_lexer_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_strings");
    let options = CompileOptions::default();

    group.bench_function("short_string", |b| {
        b.iter(|| token_count(black_box("\"hello\""), &options))
    });

    group.bench_function("doubled_quote_escaping", |b| {
        let source = "\"this string has \"\"embedded\"\" quotes, repeated a few times, \"\"again\"\" and \"\"again\"\"\"";
        b.iter(|| token_count(black_box(source), &options))
    });

    group.finish();
}

fn bench_lexer_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_numbers");
    let options = CompileOptions::default();

    group.bench_function("integer", |b| {
        b.iter(|| token_count(black_box("123456"), &options))
    });

    group.bench_function("real_with_exponent", |b| {
        b.iter(|| token_count(black_box("3.14159e10"), &options))
    });

    group.bench_function("bits_denotation", |b| {
        b.iter(|| token_count(black_box("16r1F2A3B4C"), &options))
    });

    group.finish();
}

fn bench_lexer_stropping_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_stropping");
    let upper = CompileOptions::default();
    let quote = CompileOptions::with_stropping(StroppingMode::Quote);

    group.bench_function("upper_stropping", |b| {
        b.iter(|| token_count(black_box("BEGIN INT x = 1; x := x + 1 END"), &upper))
    });

    group.bench_function("quote_stropping", |b| {
        b.iter(|| {
            token_count(
                black_box("'BEGIN' 'INT' X = 1; X := X + 1 'END'"),
                &quote,
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_keywords,
    bench_lexer_complex,
    bench_lexer_strings,
    bench_lexer_numbers,
    bench_lexer_stropping_modes
);
criterion_main!(benches);
