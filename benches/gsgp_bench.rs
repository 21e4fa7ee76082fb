//! Criterion benchmarks for u-gsgp.
//!
//! Measures full evolution runs on small synthetic targets and repeated
//! evaluation of deeply nested offspring.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_gsgp::domain::{ArithmeticDomain, BooleanDomain, ClassifierDomain, Domain};
use u_gsgp::gsgp::{GsgpConfig, GsgpRunner, Target};
use u_gsgp::random::create_rng;

fn parity(x: &[bool]) -> bool {
    x.iter().filter(|&&b| b).count() % 2 == 1
}

// ===========================================================================
// Evolution runs
// ===========================================================================

fn bench_boolean_parity(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_parity");
    group.sample_size(10);

    for &n in &[3usize, 5, 7] {
        let domain = BooleanDomain::new(n, 3);
        let target = Target::new(n, parity);
        let config = GsgpConfig::default()
            .with_population_size(20)
            .with_generations(20)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(domain, target), |b, (d, t)| {
            b.iter(|| {
                let result = GsgpRunner::population_evolution(black_box(d), black_box(t), &config);
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_arithmetic_hill_climbing(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic_hill_climbing");
    group.sample_size(10);

    for &steps in &[50usize, 200] {
        let domain = ArithmeticDomain::new(3);
        let target = Target::new(1, |x: &[f64]| x[0] * x[0] + 1.0);
        let config = GsgpConfig::default().with_generations(steps).with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(steps),
            &(domain, target),
            |b, (d, t)| {
                b.iter(|| {
                    let result = GsgpRunner::hill_climbing(black_box(d), black_box(t), &config);
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_classifier_population(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier_population");
    group.sample_size(10);

    let domain = ClassifierDomain::new(3, 3, 2);
    let target = Target::new(3, |x: &[i64]| ((x[0] + x[1]) % 2) + 1);
    let config = GsgpConfig::default()
        .with_population_size(20)
        .with_generations(20)
        .with_seed(42);
    group.bench_function("nc3_nv3_ncl2", |b| {
        b.iter(|| {
            let result = GsgpRunner::population_evolution(black_box(&domain), &target, &config);
            black_box(result)
        })
    });
    group.finish();
}

// ===========================================================================
// Nested evaluation
// ===========================================================================

fn bench_nested_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_evaluation");
    let domain = BooleanDomain::new(6, 3);
    let rows = domain.truth_table();

    for &depth in &[10usize, 40] {
        let mut rng = create_rng(7);
        let mut program = domain.random_program(&mut rng).shared();
        for _ in 0..depth {
            let other = domain.random_program(&mut rng).shared();
            let child = domain.crossover(&program, &other, &mut rng).shared();
            program = domain.mutate(&child, &mut rng).shared();
        }

        group.bench_with_input(BenchmarkId::new("warm", depth), &program, |b, p| {
            b.iter(|| {
                for row in &rows {
                    black_box(p.evaluate(black_box(row)).ok());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_boolean_parity,
    bench_arithmetic_hill_climbing,
    bench_classifier_population,
    bench_nested_evaluation
);
criterion_main!(benches);
