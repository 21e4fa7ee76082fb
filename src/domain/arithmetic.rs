//! Arithmetic domain: univariate real polynomials over `x0`.
//!
//! Crossover is a convex combination at the mask probe inputs; elsewhere it
//! is convex only where the mask happens to stay in `[0, 1]`.

use super::{is_leaf, Domain};
use crate::error::{GsgpError, Result};
use crate::program::{BinaryOp, Expr, Program};
use rand::Rng;
use std::sync::Arc;

/// Operators of the recursive tree generator.
const TREE_OPS: [BinaryOp; 4] = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Div, BinaryOp::Mul];

/// Constant mask used when no in-range mask is found.
const FALLBACK_MASK: f64 = 0.5;

/// Arithmetic GSGP domain.
///
/// Initial programs and mutation terms are fixed-form polynomials
/// `c0 * x0**0 ± c1 * x0**1 ± ... ± c(d-1) * x0**(d-1)` with coefficients
/// uniform in `[-1, 1]`. Crossover masks are recursive trees over `x0`
/// whose values at every probe input lie in `[0, 1]`.
///
/// Fitness is the Euclidean distance to the target over `sample_size`
/// points drawn uniformly from `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArithmeticDomain {
    /// Number of polynomial terms (`x0**0` through `x0**(degree-1)`).
    pub degree: usize,

    /// Maximum depth of crossover mask trees.
    pub mask_depth: usize,

    /// Mutation step size.
    pub mutation_step: f64,

    /// Number of fitness cases.
    pub sample_size: usize,

    /// Inputs masks and tree nodes are checked on.
    pub mask_probes: Vec<f64>,

    /// Regeneration budget for trees and masks.
    pub max_attempts: usize,
}

impl ArithmeticDomain {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            mask_depth: 3,
            mutation_step: 0.001,
            sample_size: 20,
            mask_probes: vec![-1.0, -0.5, 0.0, 0.5, 1.0],
            max_attempts: 100,
        }
    }

    pub fn with_mask_depth(mut self, depth: usize) -> Self {
        self.mask_depth = depth;
        self
    }

    pub fn with_mutation_step(mut self, step: f64) -> Self {
        self.mutation_step = step;
        self
    }

    pub fn with_sample_size(mut self, n: usize) -> Self {
        self.sample_size = n;
        self
    }

    pub fn with_mask_probes(mut self, probes: Vec<f64>) -> Self {
        self.mask_probes = probes;
        self
    }

    pub fn with_max_attempts(mut self, n: usize) -> Self {
        self.max_attempts = n;
        self
    }

    /// Random fixed-form polynomial.
    pub fn random_polynomial<R: Rng>(&self, rng: &mut R) -> Expr<f64> {
        let mut terms = Vec::with_capacity(self.degree);
        for k in 0..self.degree {
            let c: f64 = rng.random_range(-1.0..=1.0);
            terms.push(Expr::binary(
                BinaryOp::Mul,
                Expr::constant(c),
                Expr::binary(BinaryOp::Pow, Expr::var(0), Expr::constant(k as f64)),
            ));
        }
        let mut terms = terms.into_iter();
        let Some(first) = terms.next() else {
            return Expr::constant(0.0);
        };
        terms.fold(first, |acc, term| {
            let op = if rng.random_bool(0.5) {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            Expr::binary(op, acc, term)
        })
    }

    /// Random `(sub op sub)` tree over `x0` of at most `depth` levels.
    ///
    /// Nodes that fail on any probe input are regenerated up to
    /// `max_attempts` times, after which the node collapses to `x0`.
    pub fn random_tree<R: Rng>(&self, depth: usize, rng: &mut R) -> Expr<f64> {
        if is_leaf(depth, rng) {
            return Expr::var(0);
        }
        for attempt in 0..self.max_attempts {
            let op = TREE_OPS[rng.random_range(0..TREE_OPS.len())];
            let lhs = self.random_tree(depth - 1, rng);
            let rhs = self.random_tree(depth - 1, rng);
            let node = Expr::binary(op, lhs, rhs);
            if self.probes_ok(&node) {
                return node;
            }
            log::trace!("tree node rejected at depth {depth} (attempt {attempt})");
        }
        Expr::var(0)
    }

    /// Random crossover mask: a tree whose value at every probe input is
    /// in `[0, 1]`. Falls back to the constant `0.5` when none is found
    /// within `max_attempts` draws.
    ///
    /// The range is only checked at `mask_probes`. Between probes, and
    /// more often at larger `mask_depth`, the mask may leave `[0, 1]`.
    pub fn random_mask<R: Rng>(&self, rng: &mut R) -> Program<f64> {
        for _ in 0..self.max_attempts {
            let candidate = self.random_tree(self.mask_depth, rng);
            let in_range = self.mask_probes.iter().all(|&x| {
                matches!(candidate.interpret(&[x]), Ok(v) if (0.0..=1.0).contains(&v))
            });
            if in_range {
                return Program::new(candidate, 1);
            }
        }
        log::warn!(
            "no mask within [0, 1] after {} attempts; using constant {FALLBACK_MASK}",
            self.max_attempts
        );
        Program::new(Expr::constant(FALLBACK_MASK), 1)
    }

    fn probes_ok(&self, expr: &Expr<f64>) -> bool {
        self.mask_probes.iter().all(|&x| expr.interpret(&[x]).is_ok())
    }
}

impl Domain for ArithmeticDomain {
    type Value = f64;
    type Fitness = f64;

    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn arity(&self) -> usize {
        1
    }

    fn validate(&self) -> Result<()> {
        if self.degree == 0 {
            return Err(GsgpError::InvalidConfig("degree must be at least 1".into()));
        }
        if self.mask_depth == 0 {
            return Err(GsgpError::InvalidConfig(
                "mask_depth must be at least 1".into(),
            ));
        }
        if self.sample_size == 0 {
            return Err(GsgpError::InvalidConfig(
                "sample_size must be at least 1".into(),
            ));
        }
        if !self.mutation_step.is_finite() {
            return Err(GsgpError::InvalidConfig(format!(
                "mutation_step must be finite, got {}",
                self.mutation_step
            )));
        }
        if self.mask_probes.is_empty() || self.mask_probes.iter().any(|p| !p.is_finite()) {
            return Err(GsgpError::InvalidConfig(
                "mask_probes must be a non-empty list of finite values".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(GsgpError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn random_program<R: Rng>(&self, rng: &mut R) -> Program<f64> {
        Program::new(self.random_polynomial(rng), 1)
    }

    /// `((f1 * m) + (f2 * (1 - m)))`, pointwise between `f1` and `f2` at the
    /// probe inputs, where the mask is known to lie in `[0, 1]`.
    fn crossover<R: Rng>(
        &self,
        parent1: &Arc<Program<f64>>,
        parent2: &Arc<Program<f64>>,
        rng: &mut R,
    ) -> Program<f64> {
        let mask = self.random_mask(rng).shared();
        let complement = Expr::binary(BinaryOp::Sub, Expr::constant(1.0), Expr::call(&mask));
        let root = Expr::binary(
            BinaryOp::Add,
            Expr::binary(BinaryOp::Mul, Expr::call(parent1), Expr::call(&mask)),
            Expr::binary(BinaryOp::Mul, Expr::call(parent2), complement),
        );
        Program::new(root, 1)
    }

    fn mutate<R: Rng>(&self, parent: &Arc<Program<f64>>, rng: &mut R) -> Program<f64> {
        let r1 = self.random_program(rng).shared();
        let r2 = self.random_program(rng).shared();
        let perturbation = Expr::binary(
            BinaryOp::Mul,
            Expr::constant(self.mutation_step),
            Expr::binary(BinaryOp::Sub, Expr::call(&r1), Expr::call(&r2)),
        );
        Program::new(
            Expr::binary(BinaryOp::Add, Expr::call(parent), perturbation),
            1,
        )
    }

    fn fitness_cases<R: Rng>(&self, rng: &mut R) -> Vec<Vec<f64>> {
        (0..self.sample_size)
            .map(|_| vec![rng.random_range(-1.0..=1.0)])
            .collect()
    }

    fn distance(&self, produced: &[f64], expected: &[f64]) -> f64 {
        let d = produced
            .iter()
            .zip(expected)
            .map(|(p, e)| (p - e) * (p - e))
            .sum::<f64>()
            .sqrt();
        if d.is_finite() {
            d
        } else {
            f64::INFINITY
        }
    }
}
