//! Criterion benchmarks for u-tour.
//!
//! Uses the procedural grid store and synthetic Euclidean matrices so the
//! numbers reflect search, cache and annealing overhead only.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_tour::cache::CacheKind;
use u_tour::graph::{CachedGraph, GraphConfig, GridStore};
use u_tour::matrix::CostMatrix;
use u_tour::search::{one_to_many, FrontierKind, SearchConfig};
use u_tour::tour::{AnnealingConfig, TourSolver};

fn euclidean(n: usize, seed: u64) -> CostMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
        .collect();
    let rows = points
        .iter()
        .map(|p| {
            points
                .iter()
                .map(|q| ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt())
                .collect()
        })
        .collect();
    CostMatrix::from_rows(rows).expect("square matrix")
}

fn bench_tour_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("tour_solve");
    group.sample_size(10);

    for &n in &[4, 10, 25] {
        let matrix = euclidean(n, 42);
        let solver = TourSolver::new(AnnealingConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(n), &(matrix, solver), |b, (m, s)| {
            b.iter(|| {
                let result = s.solve(black_box(m), 0, None);
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_one_to_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_to_many_grid");
    group.sample_size(10);

    let side = 60u64;
    let targets = [side * side - 1, side - 1, side * (side - 1), side * side / 2];
    for frontier in [FrontierKind::BinaryHeap, FrontierKind::PriorityQueue] {
        for cache in [CacheKind::Linked, CacheKind::Stamp] {
            let config = SearchConfig::default().with_frontier(frontier);
            let graph_config = GraphConfig::default().with_cache(cache).with_capacity(2_000);
            group.bench_with_input(
                BenchmarkId::new(frontier.to_string(), cache),
                &(config, graph_config),
                |b, (sc, gc)| {
                    b.iter(|| {
                        let store = Box::new(GridStore::new(side, GridStore::DEFAULT_SEED));
                        let mut graph = CachedGraph::open(store, gc).expect("valid config");
                        let result = one_to_many(&mut graph, 0, black_box(&targets), sc);
                        black_box(result)
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_tour_solve, bench_one_to_many);
criterion_main!(benches);
