//! Fitness evaluation against a target.

use super::types::{Fitness, Individual, Target};
use crate::domain::Domain;
use crate::error::{GsgpError, Result};
use crate::program::Program;
use crate::random::create_rng;
use std::sync::Arc;

/// Scores programs against a target on a fixed set of fitness cases.
///
/// The cases are drawn once from `seed` when the evaluator is built, and
/// the target is evaluated on them once. Every program scored by the same
/// evaluator is therefore compared on identical inputs, which is what makes
/// fitness values comparable within and across generations of a run.
pub struct Evaluator<'a, D: Domain> {
    domain: &'a D,
    seed: u64,
    cases: Vec<Vec<D::Value>>,
    expected: Vec<D::Value>,
}

impl<'a, D: Domain> Evaluator<'a, D> {
    /// Builds the evaluator, checking the target's arity against the
    /// domain.
    pub fn new(domain: &'a D, target: &Target<D::Value>, seed: u64) -> Result<Self> {
        if target.arity() != domain.arity() {
            return Err(GsgpError::ArityMismatch {
                expected: domain.arity(),
                actual: target.arity(),
            });
        }

        let mut rng = create_rng(seed);
        let cases = domain.fitness_cases(&mut rng);
        let expected = cases.iter().map(|row| target.call(row)).collect();

        Ok(Self {
            domain,
            seed,
            cases,
            expected,
        })
    }

    /// Seed the fitness cases were drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The input rows every program is evaluated on.
    pub fn cases(&self) -> &[Vec<D::Value>] {
        &self.cases
    }

    /// Distance between `program` and the target. Lower is better.
    ///
    /// A program that fails on any case gets [`Fitness::worst`] instead of
    /// aborting the run.
    pub fn fitness(&self, program: &Program<D::Value>) -> D::Fitness {
        let produced: std::result::Result<Vec<_>, _> =
            self.cases.iter().map(|row| program.evaluate(row)).collect();
        match produced {
            Ok(produced) => self.domain.distance(&produced, &self.expected),
            Err(err) => {
                log::warn!("program evaluation failed ({err}); assigning worst fitness");
                D::Fitness::worst()
            }
        }
    }

    /// Evaluates `program` and pairs it with its fitness.
    pub fn score(&self, program: Arc<Program<D::Value>>) -> Individual<D::Value, D::Fitness> {
        let fitness = self.fitness(&program);
        Individual { program, fitness }
    }

    /// Scores a whole population, in parallel when requested and the
    /// `parallel` feature is enabled.
    pub fn score_all(
        &self,
        programs: Vec<Arc<Program<D::Value>>>,
        parallel: bool,
    ) -> Vec<Individual<D::Value, D::Fitness>> {
        if parallel {
            return self.score_all_parallel(programs);
        }
        programs.into_iter().map(|p| self.score(p)).collect()
    }

    #[cfg(feature = "parallel")]
    fn score_all_parallel(
        &self,
        programs: Vec<Arc<Program<D::Value>>>,
    ) -> Vec<Individual<D::Value, D::Fitness>> {
        use rayon::prelude::*;
        programs.into_par_iter().map(|p| self.score(p)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn score_all_parallel(
        &self,
        programs: Vec<Arc<Program<D::Value>>>,
    ) -> Vec<Individual<D::Value, D::Fitness>> {
        programs.into_iter().map(|p| self.score(p)).collect()
    }
}
