//! Geometric Semantic Genetic Programming.
//!
//! Evolves programs toward a target function with crossover and mutation
//! operators defined on program *semantics* (output vectors) instead of
//! syntax trees, so that offspring fitness is bounded by parent fitness
//! under each domain's distance.
//!
//! - **Program**: an expression tree plus a private memo table; offspring
//!   embed their parents by reference and render a genotype that spells
//!   out the full structural provenance.
//! - **Domains**: Boolean functions (mask crossover, minterm mutation),
//!   univariate polynomials (convex crossover, small-step mutation) and
//!   conditional classifiers over discrete inputs (coin-flip crossover,
//!   single-point mutation).
//! - **Engines**: generational evolution with truncation selection, and
//!   single-lineage hill climbing.
//!
//! # Architecture
//!
//! [`gsgp::GsgpRunner`] is generic over [`domain::Domain`], which bundles a
//! domain's generators, operators and metric. All randomness flows from
//! one seeded generator per run; fitness cases come from a separate
//! per-run fitness seed.

pub mod domain;
pub mod error;
pub mod gsgp;
pub mod program;
pub mod random;
