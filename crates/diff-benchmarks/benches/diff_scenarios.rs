//! Benchmarks for initialization and full diffs over growing trees.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use diff_benchmarks::{statement_list, with_literal_edit, with_reorder};
use treediff_core::{compare_to, initialize, DiffHeapStore};
use treediff_tree::{NodeSpec, SubtreePool, Tree};

struct Fixture {
    pool: SubtreePool,
    heaps: DiffHeapStore,
    old_tree: Tree,
    new_tree: Tree,
    old_code: String,
    new_code: String,
    literal_map: treediff_tree::LiteralMap,
}

fn fixture(old_spec: &NodeSpec, new_spec: &NodeSpec) -> Fixture {
    let arith = treediff_testkit::arith().unwrap();
    let mut pool = SubtreePool::new();
    let mut heaps = DiffHeapStore::new();
    let (old_tree, old_code) = treediff_testkit::build(&mut pool, &arith.language, old_spec);
    let (new_tree, new_code) = treediff_testkit::build(&mut pool, &arith.language, new_spec);
    initialize(&mut pool, &mut heaps, &old_tree, &old_code, &arith.literal_map).unwrap();
    initialize(&mut pool, &mut heaps, &new_tree, &new_code, &arith.literal_map).unwrap();
    Fixture {
        pool,
        heaps,
        old_tree,
        new_tree,
        old_code,
        new_code,
        literal_map: arith.literal_map,
    }
}

fn bench_initialize(c: &mut Criterion) {
    let arith = treediff_testkit::arith().unwrap();
    let mut group = c.benchmark_group("initialize");
    for n in [16usize, 64, 256] {
        let spec = statement_list(&arith, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &spec, |b, spec| {
            b.iter_batched(
                || {
                    let mut pool = SubtreePool::new();
                    let (tree, code) = treediff_testkit::build(&mut pool, &arith.language, spec);
                    (pool, DiffHeapStore::new(), tree, code)
                },
                |(mut pool, mut heaps, tree, code)| {
                    initialize(&mut pool, &mut heaps, &tree, &code, &arith.literal_map).unwrap();
                    (pool, heaps)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let arith = treediff_testkit::arith().unwrap();
    let mut group = c.benchmark_group("compare_to");
    for n in [16usize, 64, 256] {
        for (label, new_spec) in
            [("literal_edit", with_literal_edit(&arith, n)), ("reorder", with_reorder(&arith, n))]
        {
            let old_spec = statement_list(&arith, n);
            group.bench_function(BenchmarkId::new(label, n), |b| {
                b.iter_batched(
                    || fixture(&old_spec, &new_spec),
                    |mut fx| {
                        compare_to(
                            &mut fx.pool,
                            &mut fx.heaps,
                            &fx.old_tree,
                            &fx.new_tree,
                            &fx.old_code,
                            &fx.new_code,
                            &fx.literal_map,
                        )
                        .unwrap()
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_initialize, bench_compare);
criterion_main!(benches);
