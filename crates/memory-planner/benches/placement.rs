// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for buffer placement.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use memory_planner::{BufferId, GreedyFirstFit, LifetimeInterval, Linear, PlacementStrategy};

/// A chain of `n` ops where every op also keeps one earlier output alive.
fn chain(n: usize) -> Vec<LifetimeInterval> {
    (0..n)
        .map(|i| {
            let last = (i + 1 + i % 3).min(n);
            LifetimeInterval::new(BufferId::Tensor(i), i, last, 64 + (i * 37) % 512)
        })
        .collect()
}

fn bench_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_first_fit");
    for n in [16usize, 64, 256] {
        let intervals = chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &intervals, |b, iv| {
            b.iter(|| GreedyFirstFit::new().place(black_box(iv), 16, usize::MAX))
        });
    }
    group.finish();
}

fn bench_linear(c: &mut Criterion) {
    let intervals = chain(256);
    c.bench_function("linear_256", |b| {
        b.iter(|| Linear::new().place(black_box(&intervals), 16, usize::MAX))
    });
}

criterion_group!(benches, bench_greedy, bench_linear);
criterion_main!(benches);
