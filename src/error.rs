//! Error types.
//!
//! Two layers of failure exist:
//!
//! - [`EvalError`]: a program could not be evaluated on a given input
//!   (wrong arity, division by zero, an operator the value type does not
//!   support). Generators recover from these locally by regenerating;
//!   the fitness evaluator maps them to the worst fitness.
//! - [`GsgpError`]: the caller handed the engine an unusable
//!   configuration. Reported before any evolutionary work begins.

use thiserror::Error;

/// Failure while interpreting a program on one input row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("expected {expected} inputs, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("operator `{op}` is not defined for {ty}")]
    Unsupported { op: &'static str, ty: &'static str },

    #[error("non-finite result")]
    NonFinite,

    #[error("variable x{0} is out of range")]
    UnknownVariable(usize),
}

/// Errors reported to callers of the evolution engines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GsgpError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("target arity {actual} does not match domain arity {expected}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },
}

pub type Result<T> = std::result::Result<T, GsgpError>;
