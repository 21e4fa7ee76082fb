//! Boolean domain.
//!
//! Programs are Boolean functions of `num_vars` inputs built from `and`,
//! `or` and `not`.
//!
//! # Operators
//!
//! - Crossover: `((f1 and m) or (f2 and not m))` for a random mask `m`.
//!   The offspring agrees with `f1` wherever `m` holds and with `f2`
//!   elsewhere, so on every row it matches one of its parents.
//! - Mutation: for a random minterm `t`, either `(f or t)` or
//!   `(f and not t)`. A minterm is satisfied by exactly one row, so the
//!   offspring differs from `f` on at most that row.
//!
//! Fitness is the Hamming distance to the target over all `2^num_vars`
//! rows.

use super::{hamming, is_leaf, Domain};
use crate::error::{GsgpError, Result};
use crate::program::{BinaryOp, Expr, Program, Value};
use rand::Rng;
use std::sync::Arc;

/// Largest arity for which the full truth table is enumerated.
const MAX_VARS: usize = 24;

/// Boolean GSGP domain.
///
/// # Examples
///
/// ```
/// use u_gsgp::domain::{BooleanDomain, Domain};
/// use u_gsgp::random::create_rng;
///
/// let domain = BooleanDomain::new(3, 4);
/// let mut rng = create_rng(42);
/// let f = domain.random_program(&mut rng).shared();
/// let child = domain.mutate(&f, &mut rng);
/// assert!(child.genotype().starts_with('('));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BooleanDomain {
    /// Number of inputs (`numvars`).
    pub num_vars: usize,

    /// Maximum depth of random programs and crossover masks.
    pub depth: usize,
}

impl BooleanDomain {
    pub fn new(num_vars: usize, depth: usize) -> Self {
        Self { num_vars, depth }
    }

    /// Sets the generator depth.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Random expression of at most `depth` levels.
    pub fn random_expr<R: Rng>(&self, depth: usize, rng: &mut R) -> Expr<bool> {
        let vars = self.num_vars;
        logic_tree(depth, rng, &mut |rng: &mut R| Expr::var(rng.random_range(0..vars)))
    }

    /// Random crossover mask of the configured depth.
    pub fn random_mask<R: Rng>(&self, rng: &mut R) -> Program<bool> {
        Program::new(self.random_expr(self.depth, rng), self.num_vars)
    }

    /// Random minterm over all inputs and the single row satisfying it.
    pub fn random_minterm<R: Rng>(&self, rng: &mut R) -> (Expr<bool>, Vec<bool>) {
        let row: Vec<bool> = (0..self.num_vars).map(|_| rng.random_bool(0.5)).collect();
        let literals = row.iter().enumerate().map(|(i, &positive)| {
            if positive {
                Expr::var(i)
            } else {
                Expr::not(Expr::var(i))
            }
        });
        let minterm = Expr::fold(BinaryOp::And, literals).unwrap_or(Expr::constant(true));
        (minterm, row)
    }

    /// Mutation that also reports the row it may have changed.
    pub fn mutate_at<R: Rng>(
        &self,
        parent: &Arc<Program<bool>>,
        rng: &mut R,
    ) -> (Program<bool>, Vec<bool>) {
        let (minterm, row) = self.random_minterm(rng);
        let root = if rng.random_bool(0.5) {
            Expr::or(Expr::call(parent), minterm)
        } else {
            Expr::and(Expr::call(parent), Expr::not(minterm))
        };
        (Program::new(root, self.num_vars), row)
    }

    /// Every input row, in binary counting order with `x0` as the low bit.
    pub fn truth_table(&self) -> Vec<Vec<bool>> {
        (0..1usize << self.num_vars)
            .map(|bits| (0..self.num_vars).map(|i| (bits >> i) & 1 == 1).collect())
            .collect()
    }
}

impl Domain for BooleanDomain {
    type Value = bool;
    type Fitness = usize;

    fn name(&self) -> &'static str {
        "boolean"
    }

    fn arity(&self) -> usize {
        self.num_vars
    }

    fn validate(&self) -> Result<()> {
        if self.num_vars == 0 || self.num_vars > MAX_VARS {
            return Err(GsgpError::InvalidConfig(format!(
                "num_vars must be in 1..={MAX_VARS}, got {}",
                self.num_vars
            )));
        }
        if self.depth == 0 {
            return Err(GsgpError::InvalidConfig("depth must be at least 1".into()));
        }
        Ok(())
    }

    fn random_program<R: Rng>(&self, rng: &mut R) -> Program<bool> {
        Program::new(self.random_expr(self.depth, rng), self.num_vars)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &Arc<Program<bool>>,
        parent2: &Arc<Program<bool>>,
        rng: &mut R,
    ) -> Program<bool> {
        let mask = self.random_mask(rng).shared();
        let root = Expr::or(
            Expr::and(Expr::call(parent1), Expr::call(&mask)),
            Expr::and(Expr::call(parent2), Expr::not(Expr::call(&mask))),
        );
        Program::new(root, self.num_vars)
    }

    fn mutate<R: Rng>(&self, parent: &Arc<Program<bool>>, rng: &mut R) -> Program<bool> {
        self.mutate_at(parent, rng).0
    }

    fn fitness_cases<R: Rng>(&self, _rng: &mut R) -> Vec<Vec<bool>> {
        self.truth_table()
    }

    fn distance(&self, produced: &[bool], expected: &[bool]) -> usize {
        hamming(produced, expected)
    }

    fn stops_at_zero(&self) -> bool {
        true
    }
}

/// Recursive `and`/`or`/`not` tree over caller-supplied terminals.
///
/// At each node: a terminal if [`is_leaf`]; otherwise `not <sub>` with
/// probability 1/3, else `(<sub> and|or <sub>)`, subtrees one level
/// shallower.
pub(crate) fn logic_tree<V, R, T>(depth: usize, rng: &mut R, terminal: &mut T) -> Expr<V>
where
    V: Value,
    R: Rng,
    T: FnMut(&mut R) -> Expr<V>,
{
    if is_leaf(depth, rng) {
        return terminal(rng);
    }
    if rng.random::<f64>() < 1.0 / 3.0 {
        return Expr::not(logic_tree(depth - 1, rng, terminal));
    }
    let op = if rng.random_bool(0.5) {
        BinaryOp::And
    } else {
        BinaryOp::Or
    };
    let lhs = logic_tree(depth - 1, rng, terminal);
    let rhs = logic_tree(depth - 1, rng, terminal);
    Expr::binary(op, lhs, rhs)
}
