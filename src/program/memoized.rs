//! Memoized programs.

use super::expr::Expr;
use super::value::Value;
use crate::error::EvalError;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A candidate program: an expression tree plus a private memo table.
///
/// The tree is the genotype; [`evaluate`](Program::evaluate) is the
/// phenotype. Results are cached per input row, and the cache belongs to
/// this instance alone: offspring built from a program embed it through
/// [`Expr::Call`] (and so reuse *its* cache when they evaluate it) but
/// always start with an empty cache of their own.
///
/// Programs are shared as `Arc<Program<V>>` and never mutated after
/// construction, apart from cache fills.
///
/// Ancestry chains grow with every generation, so neither evaluation nor
/// drop recurses through embedded programs.
pub struct Program<V: Value> {
    root: Expr<V>,
    arity: usize,
    cache: Mutex<HashMap<Box<[u64]>, Outcome<V>>>,
    misses: AtomicUsize,
}

type Outcome<V> = Result<V, EvalError>;

impl<V: Value> Program<V> {
    /// Wraps an expression over `arity` inputs.
    pub fn new(root: Expr<V>, arity: usize) -> Self {
        debug_assert!(
            root.local_arity() <= arity,
            "expression references x{} but arity is {arity}",
            root.local_arity().saturating_sub(1)
        );
        Self {
            root,
            arity,
            cache: Mutex::new(HashMap::new()),
            misses: AtomicUsize::new(0),
        }
    }

    /// Wraps this program in an `Arc` for embedding and population storage.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of inputs.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The expression tree.
    pub fn root(&self) -> &Expr<V> {
        &self.root
    }

    /// Evaluates the program on one input row.
    ///
    /// The first call for a given row interprets the tree and stores the
    /// outcome, error or not; later calls return the stored outcome.
    ///
    /// Embedded programs missing the row are filled bottom-up first, so
    /// interpreting any tree only ever reads its callees' caches.
    pub fn evaluate(&self, inputs: &[V]) -> Result<V, EvalError> {
        if inputs.len() != self.arity {
            return Err(EvalError::Arity {
                expected: self.arity,
                actual: inputs.len(),
            });
        }

        let key: Box<[u64]> = inputs.iter().map(|v| v.cache_key()).collect();
        if let Some(outcome) = self.cached(&key) {
            return outcome;
        }

        self.fill_embedded(&key, inputs);
        self.compute(key, inputs)
    }

    /// Post-order walk over the embedded programs that lack `key`.
    fn fill_embedded(&self, key: &[u64], inputs: &[V]) {
        let mut pending: Vec<(&Program<V>, bool)> = self
            .root
            .embedded_programs()
            .into_iter()
            .map(|p| (p, false))
            .collect();

        while let Some((program, expanded)) = pending.pop() {
            // A callee of another arity reports the mismatch itself when
            // its caller is interpreted.
            if program.arity != inputs.len() || program.cached(key).is_some() {
                continue;
            }
            if expanded {
                let _ = program.compute(key.into(), inputs);
            } else {
                pending.push((program, true));
                pending.extend(program.root.embedded_programs().into_iter().map(|p| (p, false)));
            }
        }
    }

    fn compute(&self, key: Box<[u64]>, inputs: &[V]) -> Outcome<V> {
        // The lock is released while interpreting: embedded programs take
        // their own locks.
        self.misses.fetch_add(1, Ordering::Relaxed);
        let outcome = self.root.interpret(inputs);
        self.lock_cache().insert(key, outcome.clone());
        outcome
    }

    fn cached(&self, key: &[u64]) -> Option<Outcome<V>> {
        self.lock_cache().get(key).cloned()
    }

    /// Reconstructs the genotype text.
    ///
    /// Length grows geometrically with the number of operator
    /// applications behind this program.
    pub fn genotype(&self) -> String {
        self.root.to_genotype()
    }

    /// Number of memoized input rows.
    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Number of times the tree has actually been interpreted.
    pub fn cache_misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<Box<[u64]>, Outcome<V>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Value> Drop for Program<V> {
    fn drop(&mut self) {
        // Dismantle the tree with a worklist, descending only into embedded
        // programs this was the last owner of.
        let mut pending = vec![std::mem::replace(&mut self.root, Expr::Var(0))];
        while let Some(expr) = pending.pop() {
            match expr {
                Expr::Var(_) | Expr::Const(_) => {}
                Expr::Unary(_, operand) => pending.push(*operand),
                Expr::Binary(_, lhs, rhs) => {
                    pending.push(*lhs);
                    pending.push(*rhs);
                }
                Expr::Cond {
                    test,
                    then,
                    otherwise,
                } => {
                    pending.push(*test);
                    pending.push(*then);
                    pending.push(*otherwise);
                }
                Expr::Call(program) => {
                    if let Some(mut program) = Arc::into_inner(program) {
                        pending.push(std::mem::replace(&mut program.root, Expr::Var(0)));
                    }
                }
            }
        }
    }
}

impl<V: Value> fmt::Debug for Program<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("arity", &self.arity)
            .field("cached_rows", &self.cache_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::BinaryOp;

    fn square_plus_one() -> Program<f64> {
        Program::new(
            Expr::binary(
                BinaryOp::Add,
                Expr::binary(BinaryOp::Mul, Expr::var(0), Expr::var(0)),
                Expr::constant(1.0),
            ),
            1,
        )
    }

    #[test]
    fn test_memoization_skips_reinterpretation() {
        let p = square_plus_one();
        let first = p.evaluate(&[0.5]).expect("evaluates");
        let second = p.evaluate(&[0.5]).expect("evaluates");
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(p.cache_misses(), 1);
        assert_eq!(p.cache_len(), 1);

        p.evaluate(&[0.25]).expect("evaluates");
        assert_eq!(p.cache_misses(), 2);
    }

    #[test]
    fn test_arity_checked() {
        let p = square_plus_one();
        assert_eq!(
            p.evaluate(&[1.0, 2.0]),
            Err(EvalError::Arity {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_errors_cached() {
        let p = Program::new(
            Expr::binary(BinaryOp::Div, Expr::constant(1.0), Expr::var(0)),
            1,
        );
        assert_eq!(p.evaluate(&[0.0]), Err(EvalError::DivisionByZero));
        assert_eq!(p.evaluate(&[0.0]), Err(EvalError::DivisionByZero));
        assert_eq!(p.cache_len(), 1);
        assert_eq!(p.cache_misses(), 1);
    }

    /// `base`, then `len` programs each adding 1.0 to the previous one.
    fn increment_chain(base: Program<f64>, len: usize) -> Arc<Program<f64>> {
        let mut p = base.shared();
        for _ in 0..len {
            p = Program::new(
                Expr::binary(BinaryOp::Add, Expr::call(&p), Expr::constant(1.0)),
                1,
            )
            .shared();
        }
        p
    }

    #[test]
    fn test_deep_ancestry_evaluates_on_unseen_row() {
        let top = increment_chain(Program::new(Expr::var(0), 1), 100_000);
        assert_eq!(top.evaluate(&[0.5]), Ok(100_000.5));
        assert_eq!(top.cache_misses(), 1);
        assert_eq!(top.evaluate(&[0.5]), Ok(100_000.5));
        assert_eq!(top.cache_misses(), 1);
        assert_eq!(top.evaluate(&[-2.0]), Ok(99_998.0));
    }

    #[test]
    fn test_deep_ancestry_failure_propagates() {
        let base = Program::new(
            Expr::binary(BinaryOp::Div, Expr::constant(1.0), Expr::var(0)),
            1,
        );
        let top = increment_chain(base, 50_000);
        assert_eq!(top.evaluate(&[0.0]), Err(EvalError::DivisionByZero));
        assert_eq!(top.cache_misses(), 1);
        assert_eq!(top.evaluate(&[2.0]), Ok(50_000.5));
    }

    #[test]
    fn test_deep_ancestry_drops() {
        let top = increment_chain(Program::new(Expr::var(0), 1), 200_000);
        let weak = Arc::downgrade(&top);
        drop(top);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_drop_keeps_shared_ancestors() {
        let shared = square_plus_one().shared();
        let child = Program::new(Expr::call(&shared), 1);
        drop(child);
        assert_eq!(Arc::strong_count(&shared), 1);
        assert_eq!(shared.evaluate(&[2.0]), Ok(5.0));
    }

    #[test]
    fn test_embedded_program_uses_own_cache() {
        let parent = square_plus_one().shared();
        let child = Program::new(
            Expr::binary(BinaryOp::Mul, Expr::call(&parent), Expr::constant(2.0)),
            1,
        );

        assert_eq!(child.evaluate(&[1.0]), Ok(4.0));
        assert_eq!(parent.cache_misses(), 1);
        assert_eq!(child.cache_misses(), 1);

        // A second offspring of the same parent starts empty but hits the
        // parent's table.
        let sibling = Program::new(Expr::call(&parent), 1);
        assert_eq!(sibling.cache_len(), 0);
        assert_eq!(sibling.evaluate(&[1.0]), Ok(2.0));
        assert_eq!(parent.cache_misses(), 1);
    }

    #[test]
    fn test_genotype_expands_embedded_programs() {
        let parent = square_plus_one().shared();
        let child = Program::new(
            Expr::binary(BinaryOp::Sub, Expr::call(&parent), Expr::call(&parent)),
            1,
        );
        assert_eq!(
            child.genotype(),
            "(((x0 * x0) + 1.0) - ((x0 * x0) + 1.0))"
        );
    }
}
