//! Evolution loops.
//!
//! [`GsgpRunner`] drives two engines over any [`Domain`]:
//!
//! - **Population evolution**: initialization → evaluation → truncation
//!   selection → `mutate(crossover(a, b))` for every slot → repeat.
//! - **Hill climbing**: one incumbent, repeatedly mutated; a mutant replaces
//!   it only on strict improvement.

use super::config::GsgpConfig;
use super::fitness::Evaluator;
use super::selection::{sample_parents, sort_by_fitness, truncate};
use super::types::{Fitness, Individual, Target};
use crate::domain::Domain;
use crate::error::Result;
use crate::program::{Program, Value};
use crate::random::{create_rng, resolve_seed};
use rand::Rng;
use std::sync::Arc;

/// Result of an evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionResult<V: Value, F: Fitness> {
    /// Best program of the final generation (or the final incumbent).
    pub best: Arc<Program<V>>,

    /// Fitness of `best`.
    pub best_fitness: F,

    /// Evaluation passes (population) or mutate/accept steps (hill
    /// climbing) actually executed.
    pub generations: usize,

    /// Whether the run stopped early on a perfect match.
    pub solved: bool,

    /// Seed the fitness cases were drawn from.
    pub fitness_seed: u64,

    /// Best fitness after each generation, or incumbent fitness after
    /// initialization and after each hill-climbing step.
    pub fitness_history: Vec<f64>,
}

impl<V: Value, F: Fitness> EvolutionResult<V, F> {
    /// The `(fitness, program)` pair.
    pub fn into_pair(self) -> (F, Arc<Program<V>>) {
        (self.best_fitness, self.best)
    }
}

/// Executes GSGP runs.
///
/// # Usage
///
/// ```
/// use u_gsgp::domain::BooleanDomain;
/// use u_gsgp::gsgp::{GsgpConfig, GsgpRunner, Target};
///
/// let domain = BooleanDomain::new(3, 3);
/// let parity = Target::new(3, |x: &[bool]| x.iter().filter(|&&b| b).count() % 2 == 1);
/// let config = GsgpConfig::default()
///     .with_population_size(10)
///     .with_generations(30)
///     .with_seed(7);
///
/// let result = GsgpRunner::population_evolution(&domain, &parity, &config).unwrap();
/// assert!(result.best_fitness <= 8);
/// let answer = result.best.evaluate(&[true, true, true]).unwrap();
/// # let _ = answer;
/// ```
pub struct GsgpRunner;

impl GsgpRunner {
    /// Runs generational evolution with truncation selection.
    ///
    /// Performs `config.generations` evaluation passes and one fewer
    /// recombination. Domains with [`Domain::stops_at_zero`] end as soon as
    /// a generation's best fitness is zero.
    ///
    /// # Errors
    /// Invalid configuration, invalid domain parameters, or a target whose
    /// arity differs from the domain's. All are reported before any program
    /// is generated.
    pub fn population_evolution<D: Domain>(
        domain: &D,
        target: &Target<D::Value>,
        config: &GsgpConfig,
    ) -> Result<EvolutionResult<D::Value, D::Fitness>> {
        config.validate()?;
        domain.validate()?;

        let seed = resolve_seed(config.seed);
        let mut rng = create_rng(seed);
        let fitness_seed = config.fitness_seed.unwrap_or_else(|| rng.random());
        let evaluator = Evaluator::new(domain, target, fitness_seed)?;

        log::info!(
            "population evolution: domain={} pop={} generations={} truncation={} seed={} fitness_seed={}",
            domain.name(),
            config.population_size,
            config.generations,
            config.truncation,
            seed,
            fitness_seed
        );

        let mut programs = domain.random_population(config.population_size, &mut rng);
        let mut fitness_history = Vec::with_capacity(config.generations);
        let mut generation = 0usize;

        loop {
            generation += 1;

            let mut scored = evaluator.score_all(programs, config.parallel);
            sort_by_fitness(&mut scored);
            let best = &scored[0];
            fitness_history.push(best.fitness.to_f64());

            let pool = truncate(&scored, config.truncation);
            log::debug!(
                "generation {generation}: best={:?} mean={:.4} pool={}",
                best.fitness,
                mean_fitness(&scored),
                pool.len()
            );

            let solved = domain.stops_at_zero() && best.fitness.is_zero();
            if solved || generation >= config.generations {
                log::info!(
                    "population evolution finished after {generation} generations: best={:?} solved={solved}",
                    best.fitness
                );
                return Ok(EvolutionResult {
                    best: Arc::clone(&best.program),
                    best_fitness: best.fitness,
                    generations: generation,
                    solved,
                    fitness_seed,
                    fitness_history,
                });
            }

            programs = (0..config.population_size)
                .map(|_| {
                    let (a, b) = sample_parents(pool.len(), &mut rng);
                    let child = domain
                        .crossover(&pool[a].program, &pool[b].program, &mut rng)
                        .shared();
                    domain.mutate(&child, &mut rng).shared()
                })
                .collect();
        }
    }

    /// Runs single-lineage hill climbing.
    ///
    /// Performs `config.generations + 1` mutate/accept steps; ties are
    /// rejected. Only `generations`, `seed` and `fitness_seed` of the
    /// configuration are used, but the whole configuration is validated.
    ///
    /// # Errors
    /// Same as [`population_evolution`](Self::population_evolution).
    pub fn hill_climbing<D: Domain>(
        domain: &D,
        target: &Target<D::Value>,
        config: &GsgpConfig,
    ) -> Result<EvolutionResult<D::Value, D::Fitness>> {
        config.validate()?;
        domain.validate()?;

        let seed = resolve_seed(config.seed);
        let mut rng = create_rng(seed);
        let fitness_seed = config.fitness_seed.unwrap_or_else(|| rng.random());
        let evaluator = Evaluator::new(domain, target, fitness_seed)?;

        log::info!(
            "hill climbing: domain={} steps={} seed={} fitness_seed={}",
            domain.name(),
            config.generations + 1,
            seed,
            fitness_seed
        );

        let mut current: Individual<D::Value, D::Fitness> =
            evaluator.score(domain.random_program(&mut rng).shared());
        let mut fitness_history = Vec::with_capacity(config.generations + 2);
        fitness_history.push(current.fitness.to_f64());

        let mut steps = 0usize;
        let mut solved = false;

        for step in 0..=config.generations {
            steps += 1;
            let offspring = evaluator.score(domain.mutate(&current.program, &mut rng).shared());
            if offspring.fitness < current.fitness {
                log::debug!(
                    "step {step}: {:?} -> {:?}",
                    current.fitness,
                    offspring.fitness
                );
                current = offspring;
            }
            fitness_history.push(current.fitness.to_f64());

            if domain.stops_at_zero() && current.fitness.is_zero() {
                solved = true;
                break;
            }
        }

        log::info!(
            "hill climbing finished after {steps} steps: fitness={:?} solved={solved}",
            current.fitness
        );

        Ok(EvolutionResult {
            best: current.program,
            best_fitness: current.fitness,
            generations: steps,
            solved,
            fitness_seed,
            fitness_history,
        })
    }
}

/// Mean of the finite fitness values, for logging.
fn mean_fitness<V: Value, F: Fitness>(population: &[Individual<V, F>]) -> f64 {
    let finite: Vec<f64> = population
        .iter()
        .map(|ind| ind.fitness.to_f64())
        .filter(|f| f.is_finite() && *f < usize::MAX as f64)
        .collect();
    if finite.is_empty() {
        f64::NAN
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    }
}

// ============================================================================
// Tests
// ============================================================================
