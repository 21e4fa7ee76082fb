//! Program representation.
//!
//! A [`Program`] pairs an expression tree (the genotype) with a private
//! memo table, and exposes exactly two operations to callers:
//! [`Program::evaluate`] and [`Program::genotype`].
//!
//! # Key Types
//!
//! - [`Expr`]: tagged expression tree (variables, literals, unary and
//!   binary operators, conditionals, embedded programs)
//! - [`Value`]: scalar type a domain computes over (`bool`, `f64`, `i64`)
//! - [`Program`]: memoized, shareable program
//!
//! Genotype text round-trips through [`Expr::parse`].

mod expr;
mod memoized;
mod parse;
mod value;

pub use expr::Expr;
pub use memoized::Program;
pub use value::{BinaryOp, UnaryOp, Value};
