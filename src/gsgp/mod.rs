//! Geometric Semantic Genetic Programming engines.
//!
//! Domain-independent machinery shared by every [`Domain`](crate::domain::Domain):
//! fitness evaluation on a fixed sample, truncation selection, and the two
//! evolution loops.
//!
//! # Key Types
//!
//! - [`GsgpConfig`]: population size, generation budget, truncation, seeds
//! - [`GsgpRunner`]: population evolution and hill climbing
//! - [`EvolutionResult`]: best program, its fitness, and run statistics
//! - [`Evaluator`]: scores programs against a [`Target`]
//!
//! # References
//!
//! - Moraglio, Krawiec & Johnson (2012), "Geometric Semantic Genetic Programming"
//! - Vanneschi et al. (2013), "A New Implementation of Geometric Semantic GP
//!   Applied to Predicting Pharmacokinetic Parameters"

mod config;
mod fitness;
mod runner;
pub mod selection;
mod types;

pub use config::GsgpConfig;
pub use fitness::Evaluator;
pub use runner::{EvolutionResult, GsgpRunner};
pub use types::{Fitness, Individual, Target};
