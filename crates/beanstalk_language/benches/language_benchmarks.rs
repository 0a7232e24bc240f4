//! Benchmarks for the rule pipeline.
//!
//! Run with: `cargo bench --package beanstalk_language`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use beanstalk_language::{AllTrue, Lexer, MemoryHost, Session, Source, StaticSettings, Vm, parse};

const RULES: [(&str, &str); 3] = [
    ("simple", "Kokiri_Sword"),
    ("sword", "Kokiri_Sword or (is_adult and Master_Sword)"),
    (
        "nested",
        "(Bottle or Bottle_with_Milk) and (is_adult or Sticks) and not (Kokiri_Sword and has(Sticks, 3)) and has_medallions(2)",
    ),
];

fn session() -> Session<StaticSettings> {
    let mut session = Session::new(StaticSettings::new()).expect("fixed declarations");
    session
        .declare_tokens(["Kokiri Sword", "Master Sword", "Bottle", "Bottle with Milk", "Sticks"])
        .expect("tokens");
    session
}

// =============================================================================
// Front End
// =============================================================================

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    for (name, rule) in RULES {
        group.throughput(Throughput::Bytes(rule.len() as u64));
        group.bench_with_input(BenchmarkId::new(name, rule.len()), rule, |b, s| {
            b.iter(|| Lexer::tokenize_all(black_box(s)));
        });
    }
    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    for (name, rule) in RULES {
        group.bench_with_input(BenchmarkId::new(name, rule.len()), rule, |b, s| {
            b.iter(|| parse(black_box(s)));
        });
    }
    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for (name, rule) in RULES {
        let source = Source::check("Kokiri Forest", "Bench", rule);
        group.bench_function(name, |b| {
            let mut session = session();
            b.iter(|| session.compile(black_box(&source)));
        });
    }
    group.finish();
}

// =============================================================================
// VM
// =============================================================================

fn bench_vm(c: &mut Criterion) {
    let mut group = c.benchmark_group("vm");
    for (name, rule) in RULES {
        let mut session = session();
        let compiled = session
            .compile(&Source::check("Kokiri Forest", "Bench", rule))
            .expect("bench rule compiles");
        let sword = session.symbols().lookup("Kokiri Sword").expect("declared").id;
        let host = MemoryHost::new().with(sword, 1).with_medallions(3);
        let mut vm = Vm::new();

        group.bench_function(BenchmarkId::new("memory_host", name), |b| {
            b.iter(|| vm.evaluate(black_box(&compiled.tape), session.objects(), &host));
        });
        group.bench_function(BenchmarkId::new("all_true", name), |b| {
            b.iter(|| vm.evaluate(black_box(&compiled.tape), session.objects(), &AllTrue));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parser, bench_compile, bench_vm);
criterion_main!(benches);
