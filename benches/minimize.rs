use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use moore_dfa::{prelude::*, random::generate_random_dfa};

fn minimize(c: &mut Criterion) {
    fastrand::seed(42);
    let mut group = c.benchmark_group("minimize");
    for size in [16, 64, 256] {
        let dfa = generate_random_dfa(4, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &dfa, |b, dfa| {
            b.iter(|| black_box(dfa.minimize().unwrap().size()))
        });
    }
    group.finish();
}

fn refine(c: &mut Criterion) {
    fastrand::seed(42);
    let mut dfa = generate_random_dfa(2, 128);
    dfa.remove_unreachable();
    c.bench_function("refine to fixpoint", |b| {
        b.iter(|| black_box(PartitionRefiner::new(&dfa).converge().size()))
    });
}

criterion_group!(benches, minimize, refine);
criterion_main!(benches);
