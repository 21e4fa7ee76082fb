//! Expression trees: the genotype of a program.
//!
//! An [`Expr`] is walked by [`Expr::interpret`] to produce a value and by
//! [`Expr::render`] to produce the textual genotype. Offspring built by the
//! geometric operators embed their parents as [`Expr::Call`] nodes, so the
//! in-memory tree stays linear in the number of operator applications while
//! the rendered genotype grows geometrically.

use super::memoized::Program;
use super::value::{BinaryOp, UnaryOp, Value};
use crate::error::EvalError;
use std::sync::Arc;

/// A node of a program's expression tree.
#[derive(Debug, Clone)]
pub enum Expr<V: Value> {
    /// Reference to input `x{index}`.
    Var(usize),

    /// A literal.
    Const(V),

    /// `not <operand>`.
    Unary(UnaryOp, Box<Expr<V>>),

    /// `(<lhs> <op> <rhs>)`.
    Binary(BinaryOp, Box<Expr<V>>, Box<Expr<V>>),

    /// `(<then> if <test> else <otherwise>)`.
    Cond {
        test: Box<Expr<V>>,
        then: Box<Expr<V>>,
        otherwise: Box<Expr<V>>,
    },

    /// An existing program, evaluated through its own memo table.
    Call(Arc<Program<V>>),
}

impl<V: Value> Expr<V> {
    pub fn var(index: usize) -> Self {
        Expr::Var(index)
    }

    pub fn constant(value: V) -> Self {
        Expr::Const(value)
    }

    pub fn not(operand: Expr<V>) -> Self {
        Expr::Unary(UnaryOp::Not, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, lhs: Expr<V>, rhs: Expr<V>) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: Expr<V>, rhs: Expr<V>) -> Self {
        Self::binary(BinaryOp::And, lhs, rhs)
    }

    pub fn or(lhs: Expr<V>, rhs: Expr<V>) -> Self {
        Self::binary(BinaryOp::Or, lhs, rhs)
    }

    pub fn cond(test: Expr<V>, then: Expr<V>, otherwise: Expr<V>) -> Self {
        Expr::Cond {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn call(program: &Arc<Program<V>>) -> Self {
        Expr::Call(Arc::clone(program))
    }

    /// Folds `terms` left to right with `op`. Returns `None` when empty.
    pub fn fold(op: BinaryOp, terms: impl IntoIterator<Item = Expr<V>>) -> Option<Self> {
        terms
            .into_iter()
            .reduce(|acc, term| Self::binary(op, acc, term))
    }

    /// Evaluates the tree on one input row.
    ///
    /// `and`, `or` and conditionals are lazy: the untaken operand is never
    /// evaluated.
    pub fn interpret(&self, inputs: &[V]) -> Result<V, EvalError> {
        match self {
            Expr::Var(i) => inputs.get(*i).copied().ok_or(EvalError::UnknownVariable(*i)),
            Expr::Const(v) => Ok(*v),
            Expr::Unary(UnaryOp::Not, operand) => {
                Ok(V::from_bool(!operand.interpret(inputs)?.truthy()))
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = lhs.interpret(inputs)?;
                match op {
                    BinaryOp::And => {
                        if !l.truthy() {
                            return Ok(V::from_bool(false));
                        }
                        Ok(V::from_bool(rhs.interpret(inputs)?.truthy()))
                    }
                    BinaryOp::Or => {
                        if l.truthy() {
                            return Ok(V::from_bool(true));
                        }
                        Ok(V::from_bool(rhs.interpret(inputs)?.truthy()))
                    }
                    BinaryOp::Eq => Ok(V::from_bool(l == rhs.interpret(inputs)?)),
                    _ => V::arithmetic(*op, l, rhs.interpret(inputs)?),
                }
            }
            Expr::Cond {
                test,
                then,
                otherwise,
            } => {
                if test.interpret(inputs)?.truthy() {
                    then.interpret(inputs)
                } else {
                    otherwise.interpret(inputs)
                }
            }
            Expr::Call(program) => program.evaluate(inputs),
        }
    }

    /// Renders the genotype into `out`.
    ///
    /// Embedded programs are expanded in place; nothing is simplified or
    /// shared, so the text is the exact structural provenance.
    pub fn render(&self, out: &mut String) {
        match self {
            Expr::Var(i) => {
                out.push('x');
                out.push_str(&i.to_string());
            }
            Expr::Const(v) => out.push_str(&v.render()),
            Expr::Unary(UnaryOp::Not, operand) => {
                out.push_str("not ");
                operand.render(out);
            }
            Expr::Binary(op, lhs, rhs) => {
                out.push('(');
                lhs.render(out);
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                rhs.render(out);
                out.push(')');
            }
            Expr::Cond {
                test,
                then,
                otherwise,
            } => {
                out.push('(');
                then.render(out);
                out.push_str(" if ");
                test.render(out);
                out.push_str(" else ");
                otherwise.render(out);
                out.push(')');
            }
            Expr::Call(program) => program.root().render(out),
        }
    }

    /// Renders the genotype as a fresh string.
    pub fn to_genotype(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    /// Programs embedded directly in this tree, not looking into them.
    pub(crate) fn embedded_programs(&self) -> Vec<&Program<V>> {
        let mut found = Vec::new();
        let mut pending = vec![self];
        while let Some(expr) = pending.pop() {
            match expr {
                Expr::Var(_) | Expr::Const(_) => {}
                Expr::Unary(_, operand) => pending.push(operand),
                Expr::Binary(_, lhs, rhs) => {
                    pending.push(rhs);
                    pending.push(lhs);
                }
                Expr::Cond {
                    test,
                    then,
                    otherwise,
                } => {
                    pending.push(otherwise);
                    pending.push(then);
                    pending.push(test);
                }
                Expr::Call(program) => found.push(program.as_ref()),
            }
        }
        found
    }

    /// Highest variable index referenced plus one, not looking into
    /// embedded programs.
    pub(crate) fn local_arity(&self) -> usize {
        match self {
            Expr::Var(i) => i + 1,
            Expr::Const(_) | Expr::Call(_) => 0,
            Expr::Unary(_, operand) => operand.local_arity(),
            Expr::Binary(_, lhs, rhs) => lhs.local_arity().max(rhs.local_arity()),
            Expr::Cond {
                test,
                then,
                otherwise,
            } => test
                .local_arity()
                .max(then.local_arity())
                .max(otherwise.local_arity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_boolean() {
        let e: Expr<bool> = Expr::or(
            Expr::and(Expr::var(0), Expr::not(Expr::var(1))),
            Expr::var(2),
        );
        assert_eq!(e.to_genotype(), "((x0 and not x1) or x2)");
    }

    #[test]
    fn test_render_conditional() {
        let e: Expr<i64> = Expr::cond(Expr::constant(1), Expr::var(0), Expr::constant(2));
        assert_eq!(e.to_genotype(), "(x0 if 1 else 2)");
    }

    #[test]
    fn test_interpret_arithmetic() {
        // (x0 * x0) + 1
        let e: Expr<f64> = Expr::binary(
            BinaryOp::Add,
            Expr::binary(BinaryOp::Mul, Expr::var(0), Expr::var(0)),
            Expr::constant(1.0),
        );
        assert_eq!(e.interpret(&[3.0]), Ok(10.0));
        assert_eq!(e.to_genotype(), "((x0 * x0) + 1.0)");
    }

    #[test]
    fn test_logical_ops_short_circuit() {
        // The right operand would fail if evaluated.
        let failing: Expr<f64> = Expr::binary(BinaryOp::Div, Expr::var(0), Expr::constant(0.0));
        let e = Expr::and(Expr::constant(0.0), failing.clone());
        assert_eq!(e.interpret(&[1.0]), Ok(0.0));
        let e = Expr::cond(Expr::constant(0.0), failing, Expr::constant(2.0));
        assert_eq!(e.interpret(&[1.0]), Ok(2.0));
    }

    #[test]
    fn test_unknown_variable() {
        let e: Expr<bool> = Expr::var(3);
        assert_eq!(e.interpret(&[true]), Err(EvalError::UnknownVariable(3)));
    }

    #[test]
    fn test_fold() {
        let e: Expr<bool> =
            Expr::fold(BinaryOp::And, (0..3).map(Expr::var)).expect("non-empty");
        assert_eq!(e.to_genotype(), "((x0 and x1) and x2)");
        assert!(Expr::<bool>::fold(BinaryOp::And, std::iter::empty()).is_none());
    }

    #[test]
    fn test_embedded_programs_in_order() {
        let a = Program::new(Expr::var(0), 1).shared();
        let b = Program::new(Expr::constant(2.0), 1).shared();
        let e: Expr<f64> = Expr::binary(
            BinaryOp::Add,
            Expr::call(&a),
            Expr::binary(BinaryOp::Mul, Expr::var(0), Expr::call(&b)),
        );
        let found = e.embedded_programs();
        assert_eq!(found.len(), 2);
        assert!(std::ptr::eq(found[0], a.as_ref()));
        assert!(std::ptr::eq(found[1], b.as_ref()));
        assert!(Expr::<f64>::var(0).embedded_programs().is_empty());
    }

    #[test]
    fn test_equality_yields_domain_bool() {
        let e: Expr<i64> = Expr::binary(BinaryOp::Eq, Expr::var(0), Expr::constant(2));
        assert_eq!(e.interpret(&[2]), Ok(1));
        assert_eq!(e.interpret(&[3]), Ok(0));
    }
}
