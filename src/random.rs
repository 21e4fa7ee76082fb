//! Seeded random number generation.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a deterministic RNG from a seed.
///
/// Every run threads one of these through all generators and operators,
/// so a fixed seed reproduces the run exactly.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Resolves an optional seed, drawing one from OS entropy when absent.
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}
