//! Truncation selection.
//!
//! The population is sorted by fitness (ascending), the best
//! `ceil(trunc * n)` individuals form the breeding pool, and each offspring
//! is bred from two distinct pool members drawn uniformly without
//! replacement.
//!
//! # References
//!
//! - Mühlenbein & Schlierkamp-Voosen (1993), "Predictive Models for the
//!   Breeder Genetic Algorithm"
//! - Moraglio, Krawiec & Johnson (2012), "Geometric Semantic Genetic
//!   Programming"

use super::types::{Fitness, Individual};
use crate::program::Value;
use rand::Rng;

/// Slack absorbed before rounding up, so that e.g. `0.3 * 10` keeps 3.
const RATIO_TOLERANCE: f64 = 1e-9;

/// Number of individuals kept by truncation: `ceil(ratio * n)`, at most `n`.
pub fn truncation_size(ratio: f64, n: usize) -> usize {
    let kept = (ratio * n as f64 - RATIO_TOLERANCE).ceil();
    if kept.is_nan() || kept <= 0.0 {
        0
    } else {
        (kept as usize).min(n)
    }
}

/// Sorts the population best-first. Ties keep no particular order.
pub fn sort_by_fitness<V: Value, F: Fitness>(population: &mut [Individual<V, F>]) {
    population.sort_unstable_by(|a, b| {
        a.fitness
            .partial_cmp(&b.fitness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Returns the breeding pool: the best `ceil(ratio * n)` of a population
/// already sorted by [`sort_by_fitness`].
pub fn truncate<V: Value, F: Fitness>(
    sorted: &[Individual<V, F>],
    ratio: f64,
) -> &[Individual<V, F>] {
    &sorted[..truncation_size(ratio, sorted.len())]
}

/// Draws two distinct pool indices uniformly without replacement.
///
/// # Panics
/// Panics if the pool holds fewer than two individuals; configuration
/// validation rules this out before a run starts.
pub fn sample_parents<R: Rng>(pool_size: usize, rng: &mut R) -> (usize, usize) {
    assert!(
        pool_size >= 2,
        "breeding pool must hold at least two individuals"
    );
    let picked = rand::seq::index::sample(rng, pool_size, 2);
    (picked.index(0), picked.index(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Expr, Program};
    use crate::random::create_rng;
    use proptest::prelude::*;

    fn make_population(fitnesses: &[usize]) -> Vec<Individual<bool, usize>> {
        let program = Program::new(Expr::var(0), 1).shared();
        fitnesses
            .iter()
            .map(|&fitness| Individual {
                program: program.clone(),
                fitness,
            })
            .collect()
    }

    #[test]
    fn test_truncation_size() {
        assert_eq!(truncation_size(0.5, 10), 5);
        assert_eq!(truncation_size(0.5, 11), 6);
        assert_eq!(truncation_size(0.3, 10), 3);
        assert_eq!(truncation_size(1.0, 7), 7);
        assert_eq!(truncation_size(0.01, 10), 1);
        assert_eq!(truncation_size(0.0, 10), 0);
    }

    #[test]
    fn test_truncate_keeps_best() {
        let mut pop = make_population(&[5, 1, 8, 3, 0, 7]);
        sort_by_fitness(&mut pop);
        let pool = truncate(&pop, 0.5);
        let kept: Vec<usize> = pool.iter().map(|i| i.fitness).collect();
        assert_eq!(kept, vec![0, 1, 3]);
    }

    #[test]
    fn test_sample_parents_distinct() {
        let mut rng = create_rng(42);
        let mut counts = [0u32; 4];
        for _ in 0..4000 {
            let (a, b) = sample_parents(4, &mut rng);
            assert_ne!(a, b);
            counts[a] += 1;
            counts[b] += 1;
        }
        for &c in &counts {
            assert!(c > 1600, "expected uniform sampling, got {counts:?}");
        }
    }

    #[test]
    #[should_panic(expected = "breeding pool must hold at least two individuals")]
    fn test_sample_parents_small_pool_panics() {
        let mut rng = create_rng(42);
        sample_parents(1, &mut rng);
    }

    proptest! {
        #[test]
        fn prop_pool_dominates_rest(
            fitnesses in prop::collection::vec(0usize..50, 2..40),
            ratio in 0.05f64..=1.0,
        ) {
            let mut pop = make_population(&fitnesses);
            sort_by_fitness(&mut pop);
            let pool_len = truncate(&pop, ratio).len();

            let expected = (ratio * fitnesses.len() as f64 - RATIO_TOLERANCE).ceil() as usize;
            prop_assert_eq!(pool_len, expected.min(fitnesses.len()));

            let worst_kept = pop[..pool_len].iter().map(|i| i.fitness).max();
            let best_dropped = pop[pool_len..].iter().map(|i| i.fitness).min();
            if let (Some(w), Some(b)) = (worst_kept, best_dropped) {
                prop_assert!(w <= b);
            }
        }
    }
}
