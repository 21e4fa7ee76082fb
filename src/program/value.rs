//! Scalar value types that programs compute over.

use crate::error::EvalError;
use std::fmt;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// Logical negation of the operand's truthiness.
    Not,
}

/// Binary operators.
///
/// `And`, `Or` and `Eq` are defined for every value type through
/// [`Value::truthy`] and [`Value::from_bool`]. The arithmetic operators are
/// delegated to [`Value::arithmetic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
}

impl BinaryOp {
    /// Surface syntax used by genotype rendering.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
        }
    }

    /// Whether the operator is logical (short-circuiting on truthiness).
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A scalar flowing through a domain's programs.
///
/// Inputs and outputs of a program share one value type: `bool` for the
/// Boolean domain, `f64` for the arithmetic domain, `i64` for the
/// classifier domain.
pub trait Value: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Human-readable type name used in error messages.
    const TYPE_NAME: &'static str;

    /// Bit pattern used as a memoization key.
    fn cache_key(self) -> u64;

    /// Truthiness, as used by `and`, `or`, `not` and conditionals.
    fn truthy(self) -> bool;

    /// Canonical encoding of a Boolean result.
    fn from_bool(b: bool) -> Self;

    /// Renders the value as a genotype literal.
    fn render(self) -> String;

    /// Parses a genotype literal produced by [`render`](Value::render).
    fn parse_literal(token: &str) -> Option<Self>;

    /// Applies an arithmetic operator (`+ - * / **`).
    fn arithmetic(op: BinaryOp, lhs: Self, rhs: Self) -> Result<Self, EvalError>;
}

impl Value for bool {
    const TYPE_NAME: &'static str = "bool";

    fn cache_key(self) -> u64 {
        self as u64
    }

    fn truthy(self) -> bool {
        self
    }

    fn from_bool(b: bool) -> Self {
        b
    }

    fn render(self) -> String {
        let literal = if self { "True" } else { "False" };
        literal.to_string()
    }

    fn parse_literal(token: &str) -> Option<Self> {
        match token {
            "True" => Some(true),
            "False" => Some(false),
            _ => None,
        }
    }

    fn arithmetic(op: BinaryOp, _lhs: Self, _rhs: Self) -> Result<Self, EvalError> {
        Err(EvalError::Unsupported {
            op: op.symbol(),
            ty: Self::TYPE_NAME,
        })
    }
}

impl Value for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn cache_key(self) -> u64 {
        self.to_bits()
    }

    fn truthy(self) -> bool {
        self != 0.0
    }

    fn from_bool(b: bool) -> Self {
        if b {
            1.0
        } else {
            0.0
        }
    }

    fn render(self) -> String {
        // Debug keeps the shortest round-trippable form and always a
        // decimal point or exponent.
        format!("{self:?}")
    }

    fn parse_literal(token: &str) -> Option<Self> {
        let looks_numeric = token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'));
        if !looks_numeric {
            return None;
        }
        token.parse().ok()
    }

    fn arithmetic(op: BinaryOp, lhs: Self, rhs: Self) -> Result<Self, EvalError> {
        let out = match op {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                lhs / rhs
            }
            BinaryOp::Pow => {
                if rhs.fract() == 0.0 && rhs.abs() <= i32::MAX as f64 {
                    if lhs == 0.0 && rhs < 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    lhs.powi(rhs as i32)
                } else {
                    lhs.powf(rhs)
                }
            }
            BinaryOp::And | BinaryOp::Or | BinaryOp::Eq => {
                return Err(EvalError::Unsupported {
                    op: op.symbol(),
                    ty: Self::TYPE_NAME,
                })
            }
        };
        if out.is_finite() {
            Ok(out)
        } else {
            Err(EvalError::NonFinite)
        }
    }
}

impl Value for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn cache_key(self) -> u64 {
        self as u64
    }

    fn truthy(self) -> bool {
        self != 0
    }

    fn from_bool(b: bool) -> Self {
        b as i64
    }

    fn render(self) -> String {
        self.to_string()
    }

    fn parse_literal(token: &str) -> Option<Self> {
        token.parse().ok()
    }

    fn arithmetic(op: BinaryOp, lhs: Self, rhs: Self) -> Result<Self, EvalError> {
        let out = match op {
            BinaryOp::Add => lhs.checked_add(rhs),
            BinaryOp::Sub => lhs.checked_sub(rhs),
            BinaryOp::Mul => lhs.checked_mul(rhs),
            BinaryOp::Div => {
                if rhs == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                lhs.checked_div_euclid(rhs)
            }
            BinaryOp::Pow => u32::try_from(rhs).ok().and_then(|e| lhs.checked_pow(e)),
            BinaryOp::And | BinaryOp::Or | BinaryOp::Eq => {
                return Err(EvalError::Unsupported {
                    op: op.symbol(),
                    ty: Self::TYPE_NAME,
                })
            }
        };
        out.ok_or(EvalError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_has_no_arithmetic() {
        assert!(matches!(
            bool::arithmetic(BinaryOp::Add, true, false),
            Err(EvalError::Unsupported { op: "+", ty: "bool" })
        ));
    }

    #[test]
    fn test_f64_division_by_zero() {
        assert_eq!(
            f64::arithmetic(BinaryOp::Div, 1.0, 0.0),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(f64::arithmetic(BinaryOp::Div, 1.0, 4.0), Ok(0.25));
    }

    #[test]
    fn test_f64_integral_power() {
        assert_eq!(f64::arithmetic(BinaryOp::Pow, -2.0, 3.0), Ok(-8.0));
        assert_eq!(f64::arithmetic(BinaryOp::Pow, 0.0, 0.0), Ok(1.0));
        assert_eq!(
            f64::arithmetic(BinaryOp::Pow, 0.0, -1.0),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_f64_overflow_is_non_finite() {
        assert_eq!(
            f64::arithmetic(BinaryOp::Mul, f64::MAX, 2.0),
            Err(EvalError::NonFinite)
        );
    }

    #[test]
    fn test_literal_round_trip() {
        for v in [0.5, -0.25, 1.0, 1e-7, -3.75e12] {
            assert_eq!(f64::parse_literal(&v.render()), Some(v));
        }
        assert_eq!(bool::parse_literal(&true.render()), Some(true));
        assert_eq!(i64::parse_literal(&(-4i64).render()), Some(-4));
        assert_eq!(f64::parse_literal("inf"), None);
    }

    #[test]
    fn test_i64_checked_ops() {
        assert_eq!(i64::arithmetic(BinaryOp::Add, 2, 3), Ok(5));
        assert_eq!(i64::arithmetic(BinaryOp::Pow, 2, 10), Ok(1024));
        assert_eq!(
            i64::arithmetic(BinaryOp::Pow, 2, -1),
            Err(EvalError::NonFinite)
        );
        assert_eq!(
            i64::arithmetic(BinaryOp::Div, 1, 0),
            Err(EvalError::DivisionByZero)
        );
    }
}
