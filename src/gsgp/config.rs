//! GSGP run configuration.
//!
//! [`GsgpConfig`] holds the domain-independent parameters of a run.
//! Domain parameters (arity, depth, mutation step, ...) live on the domain
//! types in [`crate::domain`].

use super::selection::truncation_size;
use crate::error::{GsgpError, Result};

/// Configuration for both evolution engines.
///
/// # Defaults
///
/// ```
/// use u_gsgp::gsgp::GsgpConfig;
///
/// let config = GsgpConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.generations, 30);
/// assert_eq!(config.truncation, 0.5);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_gsgp::gsgp::GsgpConfig;
///
/// let config = GsgpConfig::default()
///     .with_population_size(20)
///     .with_generations(50)
///     .with_truncation(0.25)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GsgpConfig {
    /// Number of individuals in the population (`pop_size`).
    ///
    /// Unused by hill climbing.
    pub population_size: usize,

    /// Iteration budget.
    ///
    /// Population evolution runs this many evaluate/select passes; hill
    /// climbing runs `generations + 1` mutate/accept steps.
    pub generations: usize,

    /// Fraction of the sorted population kept as breeding parents
    /// (`trunc`), in `(0, 1]`.
    pub truncation: f64,

    /// Whether to evaluate fitness in parallel. Only honored with the
    /// `parallel` feature.
    pub parallel: bool,

    /// Seed for the structural RNG (initial programs, masks, operators).
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Seed for fitness-case sampling, fixed for the whole run.
    ///
    /// `None` draws it from the structural RNG once at run start.
    pub fitness_seed: Option<u64>,
}

impl Default for GsgpConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 30,
            truncation: 0.5,
            parallel: false,
            seed: None,
            fitness_seed: None,
        }
    }
}

impl GsgpConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the truncation ratio. Not clamped; see [`validate`](Self::validate).
    pub fn with_truncation(mut self, ratio: f64) -> Self {
        self.truncation = ratio;
        self
    }

    /// Enables or disables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the structural random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the fitness-sampling seed.
    pub fn with_fitness_seed(mut self, seed: u64) -> Self {
        self.fitness_seed = Some(seed);
        self
    }

    /// Number of parents kept by truncation selection.
    pub fn breeding_pool_size(&self) -> usize {
        truncation_size(self.truncation, self.population_size)
    }

    /// Validates the configuration.
    ///
    /// Checked before any program is generated.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(GsgpError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if self.generations == 0 {
            return Err(GsgpError::InvalidConfig(
                "generations must be at least 1".into(),
            ));
        }
        if !(self.truncation > 0.0 && self.truncation <= 1.0) {
            return Err(GsgpError::InvalidConfig(format!(
                "truncation must be in (0, 1], got {}",
                self.truncation
            )));
        }
        if self.breeding_pool_size() < 2 {
            return Err(GsgpError::InvalidConfig(format!(
                "truncation {} keeps {} of {} individuals; two distinct parents are required",
                self.truncation,
                self.breeding_pool_size(),
                self.population_size
            )));
        }
        Ok(())
    }
}
