use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mish::script::expand;
use mish::var::Environment;

fn make_literal(repeats: usize) -> String {
    let chunk = "give @p minecraft:stone 64 ";
    chunk.repeat(repeats)
}

/// `${${${…k…}}}` with each level resolving to `k`.
fn make_nested(depth: usize) -> String {
    format!("{}k{}", "${".repeat(depth), "}".repeat(depth))
}

fn make_many_blocks(count: usize) -> String {
    (0..count).map(|i| format!("${{v{i}=x}}${{v{i}}} ")).collect()
}

fn bench_expand(c: &mut Criterion) {
    let literal = make_literal(1000);
    let nested = make_nested(256);
    let many = make_many_blocks(500);

    let mut g = c.benchmark_group("expand");

    g.bench_function("literal_27k", |b| {
        let mut env = Environment::new();
        b.iter(|| expand(black_box(&literal), &mut env).unwrap())
    });

    g.bench_function("nested_256", |b| {
        let mut env: Environment = [("k", "k")].into_iter().collect();
        b.iter(|| expand(black_box(&nested), &mut env).unwrap())
    });

    g.bench_function("assign_lookup_500", |b| {
        let mut env = Environment::new();
        b.iter(|| expand(black_box(&many), &mut env).unwrap())
    });

    g.finish();
}

criterion_group!(benches, bench_expand);
criterion_main!(benches);
