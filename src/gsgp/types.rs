//! Core types shared by the evolution engines.
//!
//! - [`Fitness`]: lower-is-better scalar
//! - [`Target`]: the externally supplied function being approximated
//! - [`Individual`]: a program paired with its evaluated fitness

use crate::program::{Program, Value};
use std::fmt;
use std::sync::Arc;

/// Marker trait for fitness values.
///
/// Fitness must support comparison and be cheaply copyable.
/// Lower fitness is considered better (an error or distance, never a reward).
///
/// Built-in implementations exist for `f64`, `f32` and `usize`.
pub trait Fitness: PartialOrd + Copy + Send + Sync + fmt::Debug + 'static {
    /// Returns a value representing the worst possible fitness.
    ///
    /// Assigned to programs whose evaluation fails.
    fn worst() -> Self;

    /// Converts the fitness to `f64` for logging and statistics.
    fn to_f64(self) -> f64;

    /// Whether this fitness is a perfect match (zero error).
    fn is_zero(self) -> bool {
        self.to_f64() == 0.0
    }
}

impl Fitness for f64 {
    fn worst() -> Self {
        f64::INFINITY
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl Fitness for f32 {
    fn worst() -> Self {
        f32::INFINITY
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Fitness for usize {
    fn worst() -> Self {
        usize::MAX
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn is_zero(self) -> bool {
        self == 0
    }
}

/// The function evolution tries to approximate.
///
/// Closures carry no arity, so the caller declares it; the engines check it
/// against the domain before any work begins.
///
/// ```
/// use u_gsgp::gsgp::Target;
///
/// let parity = Target::new(3, |x: &[bool]| x.iter().filter(|&&b| b).count() % 2 == 1);
/// assert_eq!(parity.arity(), 3);
/// assert!(parity.call(&[true, false, false]));
/// ```
#[derive(Clone)]
pub struct Target<V: Value> {
    arity: usize,
    func: Arc<dyn Fn(&[V]) -> V + Send + Sync>,
}

impl<V: Value> Target<V> {
    /// Wraps a pure function of `arity` inputs.
    pub fn new<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&[V]) -> V + Send + Sync + 'static,
    {
        Self {
            arity,
            func: Arc::new(func),
        }
    }

    /// Declared number of inputs.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Calls the target on one input row.
    pub fn call(&self, inputs: &[V]) -> V {
        (self.func)(inputs)
    }
}

impl<V: Value> fmt::Debug for Target<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A population member: a shared program and its fitness.
#[derive(Debug)]
pub struct Individual<V: Value, F: Fitness> {
    pub program: Arc<Program<V>>,
    pub fitness: F,
}

impl<V: Value, F: Fitness> Clone for Individual<V, F> {
    fn clone(&self) -> Self {
        Self {
            program: Arc::clone(&self.program),
            fitness: self.fitness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usize_fitness() {
        assert_eq!(usize::worst(), usize::MAX);
        assert!(0usize.is_zero());
        assert!(!3usize.is_zero());
        assert_eq!(3usize.to_f64(), 3.0);
    }

    #[test]
    fn test_float_fitness() {
        assert!(f64::worst().is_infinite());
        assert!(0.0f64.is_zero());
        assert!((f32::worst() as f64).is_infinite());
    }

    #[test]
    fn test_target_call() {
        let t = Target::new(1, |x: &[f64]| x[0] * x[0] + 1.0);
        assert_eq!(t.call(&[2.0]), 5.0);
        assert_eq!(format!("{t:?}"), "Target { arity: 1, .. }");
    }
}
