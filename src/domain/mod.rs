//! Problem domains.
//!
//! A [`Domain`] is the descriptor the engines in [`crate::gsgp`] are generic
//! over. It bundles the domain's random program generator, its geometric
//! crossover and mutation, and its fitness metric.
//!
//! # Domains
//!
//! - [`BooleanDomain`]: Boolean functions of `n` inputs; mask crossover,
//!   minterm mutation, Hamming distance over the full truth table
//! - [`ArithmeticDomain`]: univariate real polynomials; convex-combination
//!   crossover, small-step additive mutation, Euclidean distance on a
//!   sample of `[-1, 1]`
//! - [`ClassifierDomain`]: conditional classifiers over discrete inputs;
//!   whole-parent coin-flip crossover, single-point mutation, Hamming
//!   distance on a sampled grid
//!
//! Every operator builds a fresh [`Program`] that embeds its parents (and
//! masks) by reference, so parents are never mutated and offspring always
//! start with an empty cache.

mod arithmetic;
mod boolean;
mod classifier;

pub use arithmetic::ArithmeticDomain;
pub use boolean::BooleanDomain;
pub use classifier::{ClassifierDomain, ConditionPolicy};

use crate::error::Result;
use crate::gsgp::Fitness;
use crate::program::{Program, Value};
use crate::random::create_rng;
use rand::Rng;
use std::sync::Arc;

/// Defines a GSGP problem domain.
///
/// # Implementing
///
/// The operators must respect the geometric contracts of their domain:
/// offspring semantics are a fixed function of the parents' semantics and
/// of randomly drawn auxiliary programs, and are built by structural
/// composition of the parents' trees, never by re-deriving them.
///
/// # Thread Safety
///
/// `Domain` must be `Send + Sync` because fitness evaluation may run in
/// parallel with the `parallel` feature.
pub trait Domain: Send + Sync {
    /// The scalar type of inputs and outputs.
    type Value: Value;

    /// The fitness type. Lower is better.
    type Fitness: Fitness;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Number of program inputs.
    fn arity(&self) -> usize;

    /// Checks the domain parameters.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Creates one random program.
    fn random_program<R: Rng>(&self, rng: &mut R) -> Program<Self::Value>;

    /// Creates `size` random programs.
    ///
    /// Each program is drawn from its own generator, seeded from `rng`.
    /// No deduplication is performed.
    fn random_population<R: Rng>(
        &self,
        size: usize,
        rng: &mut R,
    ) -> Vec<Arc<Program<Self::Value>>> {
        (0..size)
            .map(|_| {
                let mut own = create_rng(rng.random());
                self.random_program(&mut own).shared()
            })
            .collect()
    }

    /// Geometric crossover of two parents.
    fn crossover<R: Rng>(
        &self,
        parent1: &Arc<Program<Self::Value>>,
        parent2: &Arc<Program<Self::Value>>,
        rng: &mut R,
    ) -> Program<Self::Value>;

    /// Geometric mutation of a parent.
    fn mutate<R: Rng>(&self, parent: &Arc<Program<Self::Value>>, rng: &mut R) -> Program<Self::Value>;

    /// Input rows fitness is measured on.
    ///
    /// `rng` is seeded from the run's fitness seed; deterministic domains
    /// ignore it.
    fn fitness_cases<R: Rng>(&self, rng: &mut R) -> Vec<Vec<Self::Value>>;

    /// Distance between a program's outputs and the target's outputs on
    /// the fitness cases.
    fn distance(&self, produced: &[Self::Value], expected: &[Self::Value]) -> Self::Fitness;

    /// Whether the engines stop as soon as a perfect match appears.
    fn stops_at_zero(&self) -> bool {
        false
    }
}

/// Leaf decision shared by the recursive generators: always a leaf at
/// depth 1, otherwise a leaf with probability `1 / (2^depth - 1)`.
pub(crate) fn is_leaf<R: Rng>(depth: usize, rng: &mut R) -> bool {
    if depth <= 1 {
        return true;
    }
    let nodes = 2f64.powi(depth.min(1023) as i32) - 1.0;
    rng.random::<f64>() < 1.0 / nodes
}

/// Number of positions where two output vectors differ.
pub(crate) fn hamming<V: Value>(produced: &[V], expected: &[V]) -> usize {
    produced
        .iter()
        .zip(expected)
        .filter(|(p, e)| p != e)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_leaf_at_depth_one() {
        let mut rng = create_rng(1);
        assert!((0..100).all(|_| is_leaf(1, &mut rng)));
        assert!(is_leaf(0, &mut rng));
    }

    #[test]
    fn test_is_leaf_probability() {
        let mut rng = create_rng(2);
        // depth 2 → 1/3
        let leaves = (0..30_000).filter(|_| is_leaf(2, &mut rng)).count();
        assert!((9_000..11_000).contains(&leaves), "got {leaves}");
    }

    #[test]
    fn test_hamming() {
        assert_eq!(hamming(&[1i64, 2, 3], &[1, 0, 0]), 2);
        assert_eq!(hamming::<bool>(&[], &[]), 0);
    }
}
