//! Classifier domain: conditional programs over discrete inputs.
//!
//! Inputs are `nv` variables valued in `1..=nc`; outputs are classes in
//! `1..=ncl`. Programs are nested `(a if cond else b)` expressions.
//!
//! Crossover picks one whole parent with a fair coin, embedded as
//! `(f1 if c else f2)` with `c` a literal `0` or `1`. This is a
//! per-individual selection rather than a per-input blend.
//!
//! Mutation overrides a single input point:
//! `(o if ((x0 == p0) and ... ) else f)`.

use super::boolean::logic_tree;
use super::{hamming, is_leaf, Domain};
use crate::error::{GsgpError, Result};
use crate::program::{BinaryOp, Expr, Program};
use rand::Rng;
use std::sync::Arc;

/// Largest number of fitness cases the sampled grid may hold.
const MAX_CASES: usize = 1 << 24;

/// How conditions inside random programs are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionPolicy {
    /// A literal `0` or `1`.
    #[default]
    Constant,

    /// An `and`/`or`/`not` tree over equality atoms `(xi == c)`.
    Recursive,
}

/// Classifier GSGP domain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifierDomain {
    /// Number of values each input takes (`1..=nc`).
    pub nc: usize,

    /// Number of inputs.
    pub nv: usize,

    /// Number of output classes (`1..=ncl`).
    pub ncl: usize,

    /// Maximum depth of random programs and recursive conditions.
    pub depth: usize,

    pub condition: ConditionPolicy,

    /// Values sampled per input when building the fitness grid.
    pub samples_per_variable: usize,
}

impl ClassifierDomain {
    pub fn new(nc: usize, nv: usize, ncl: usize) -> Self {
        Self {
            nc,
            nv,
            ncl,
            depth: 3,
            condition: ConditionPolicy::default(),
            samples_per_variable: 3,
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_condition(mut self, condition: ConditionPolicy) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_samples_per_variable(mut self, n: usize) -> Self {
        self.samples_per_variable = n;
        self
    }

    /// Random leaf.
    ///
    /// A variable when every input value is also a valid class, otherwise
    /// a class literal, so that outputs never leave `1..=ncl`.
    fn terminal<R: Rng>(&self, rng: &mut R) -> Expr<i64> {
        if self.nc <= self.ncl {
            Expr::var(rng.random_range(0..self.nv))
        } else {
            Expr::constant(self.random_class(rng))
        }
    }

    fn random_class<R: Rng>(&self, rng: &mut R) -> i64 {
        rng.random_range(1..=self.ncl as i64)
    }

    fn random_value<R: Rng>(&self, rng: &mut R) -> i64 {
        rng.random_range(1..=self.nc as i64)
    }

    /// Random condition according to the configured policy.
    pub fn random_condition<R: Rng>(&self, rng: &mut R) -> Expr<i64> {
        match self.condition {
            ConditionPolicy::Constant => Expr::constant(rng.random_range(0..=1)),
            ConditionPolicy::Recursive => {
                let nv = self.nv;
                let nc = self.nc as i64;
                logic_tree(self.depth, rng, &mut |rng: &mut R| {
                    Expr::binary(
                        BinaryOp::Eq,
                        Expr::var(rng.random_range(0..nv)),
                        Expr::constant(rng.random_range(1..=nc)),
                    )
                })
            }
        }
    }

    /// Random `(sub if cond else sub)` tree of at most `depth` levels.
    pub fn random_expr<R: Rng>(&self, depth: usize, rng: &mut R) -> Expr<i64> {
        if is_leaf(depth, rng) {
            return self.terminal(rng);
        }
        let test = self.random_condition(rng);
        let then = self.random_expr(depth - 1, rng);
        let otherwise = self.random_expr(depth - 1, rng);
        Expr::cond(test, then, otherwise)
    }

    /// Mutation that also reports the overridden point.
    pub fn mutate_at<R: Rng>(
        &self,
        parent: &Arc<Program<i64>>,
        rng: &mut R,
    ) -> (Program<i64>, Vec<i64>) {
        let point: Vec<i64> = (0..self.nv).map(|_| self.random_value(rng)).collect();
        let class = self.random_class(rng);
        let atoms = point.iter().enumerate().map(|(i, &v)| {
            Expr::binary(BinaryOp::Eq, Expr::var(i), Expr::constant(v))
        });
        let test = Expr::fold(BinaryOp::And, atoms).unwrap_or(Expr::constant(1));
        let root = Expr::cond(test, Expr::constant(class), Expr::call(parent));
        (Program::new(root, self.nv), point)
    }

    /// Per-input value lists the fitness grid is built from.
    pub fn sample_lists<R: Rng>(&self, rng: &mut R) -> Vec<Vec<i64>> {
        (0..self.nv)
            .map(|_| {
                (0..self.samples_per_variable)
                    .map(|_| self.random_value(rng))
                    .collect()
            })
            .collect()
    }

    /// Number of fitness cases, or `None` on overflow.
    fn case_count(&self) -> Option<usize> {
        u32::try_from(self.nv)
            .ok()
            .and_then(|nv| self.samples_per_variable.checked_pow(nv))
    }
}

impl Domain for ClassifierDomain {
    type Value = i64;
    type Fitness = usize;

    fn name(&self) -> &'static str {
        "classifier"
    }

    fn arity(&self) -> usize {
        self.nv
    }

    fn validate(&self) -> Result<()> {
        if self.nc == 0 || self.nv == 0 || self.ncl == 0 {
            return Err(GsgpError::InvalidConfig(format!(
                "nc, nv and ncl must be at least 1, got nc={} nv={} ncl={}",
                self.nc, self.nv, self.ncl
            )));
        }
        if self.depth == 0 {
            return Err(GsgpError::InvalidConfig("depth must be at least 1".into()));
        }
        if self.samples_per_variable == 0 {
            return Err(GsgpError::InvalidConfig(
                "samples_per_variable must be at least 1".into(),
            ));
        }
        match self.case_count() {
            Some(n) if n <= MAX_CASES => Ok(()),
            _ => Err(GsgpError::InvalidConfig(format!(
                "{}^{} fitness cases exceed the limit of {MAX_CASES}",
                self.samples_per_variable, self.nv
            ))),
        }
    }

    fn random_program<R: Rng>(&self, rng: &mut R) -> Program<i64> {
        Program::new(self.random_expr(self.depth, rng), self.nv)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &Arc<Program<i64>>,
        parent2: &Arc<Program<i64>>,
        rng: &mut R,
    ) -> Program<i64> {
        let coin = Expr::constant(rng.random_range(0..=1));
        Program::new(
            Expr::cond(coin, Expr::call(parent1), Expr::call(parent2)),
            self.nv,
        )
    }

    fn mutate<R: Rng>(&self, parent: &Arc<Program<i64>>, rng: &mut R) -> Program<i64> {
        self.mutate_at(parent, rng).0
    }

    fn fitness_cases<R: Rng>(&self, rng: &mut R) -> Vec<Vec<i64>> {
        let lists = self.sample_lists(rng);
        lists.iter().fold(vec![Vec::new()], |rows, values| {
            rows.iter()
                .flat_map(|row| {
                    values.iter().map(move |&v| {
                        let mut next = row.clone();
                        next.push(v);
                        next
                    })
                })
                .collect()
        })
    }

    fn distance(&self, produced: &[i64], expected: &[i64]) -> usize {
        hamming(produced, expected)
    }
}
