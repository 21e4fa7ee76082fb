//! Genotype parser.
//!
//! Reads the text produced by [`Expr::render`] back into an equivalent
//! tree. Embedded programs come back inlined, so the parsed tree computes
//! the same outputs without sharing any memo table with the rendered program.
//!
//! Grammar (binary operators and conditionals are always parenthesized):
//!
//! ```text
//! operand := "not" operand | "x" INDEX | LITERAL | "(" inner ")"
//! inner   := operand [ OP operand | "if" operand "else" operand ]
//! OP      := "and" | "or" | "+" | "-" | "*" | "/" | "**" | "=="
//! ```

use super::expr::Expr;
use super::memoized::Program;
use super::value::{BinaryOp, Value};
use crate::error::{GsgpError, Result};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Var(usize),
    Op(BinaryOp),
    Not,
    If,
    Else,
    Literal(String),
}

impl Token {
    /// Whether an operand may follow this token.
    fn expects_operand(&self) -> bool {
        matches!(
            self,
            Token::LParen | Token::Op(_) | Token::Not | Token::If | Token::Else
        )
    }
}

fn error(position: usize, message: impl Into<String>) -> GsgpError {
    GsgpError::Parse {
        position,
        message: message.into(),
    }
}

fn lex(text: &str) -> Result<Vec<(usize, Token)>> {
    let bytes = text.as_bytes();
    let mut tokens: Vec<(usize, Token)> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let operand_position = tokens.last().is_none_or(|(_, t)| t.expects_operand());

        let token = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'(' => {
                i += 1;
                Token::LParen
            }
            b')' => {
                i += 1;
                Token::RParen
            }
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                Token::Op(BinaryOp::Pow)
            }
            b'=' if bytes.get(i + 1) == Some(&b'=') => {
                i += 2;
                Token::Op(BinaryOp::Eq)
            }
            b'*' => {
                i += 1;
                Token::Op(BinaryOp::Mul)
            }
            b'/' => {
                i += 1;
                Token::Op(BinaryOp::Div)
            }
            b'+' => {
                i += 1;
                Token::Op(BinaryOp::Add)
            }
            b'-' if operand_position
                && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()) =>
            {
                i = scan_number(bytes, i + 1);
                Token::Literal(text[start..i].to_string())
            }
            b'-' => {
                i += 1;
                Token::Op(BinaryOp::Sub)
            }
            b'0'..=b'9' => {
                i = scan_number(bytes, i);
                Token::Literal(text[start..i].to_string())
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                word_token(&text[start..i]).ok_or_else(|| {
                    error(start, format!("unknown word `{}`", &text[start..i]))
                })?
            }
            _ => return Err(error(start, format!("unexpected character `{}`", c as char))),
        };
        tokens.push((start, token));
    }

    Ok(tokens)
}

fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        let c = bytes[i];
        let exponent_sign =
            matches!(c, b'+' | b'-') && matches!(bytes.get(i.wrapping_sub(1)), Some(b'e' | b'E'));
        if c.is_ascii_digit() || matches!(c, b'.' | b'e' | b'E') || exponent_sign {
            i += 1;
        } else {
            break;
        }
    }
    i
}

fn word_token(word: &str) -> Option<Token> {
    match word {
        "and" => Some(Token::Op(BinaryOp::And)),
        "or" => Some(Token::Op(BinaryOp::Or)),
        "not" => Some(Token::Not),
        "if" => Some(Token::If),
        "else" => Some(Token::Else),
        "True" | "False" => Some(Token::Literal(word.to_string())),
        _ => word
            .strip_prefix('x')
            .and_then(|digits| digits.parse().ok())
            .map(Token::Var),
    }
}

struct Parser<'a> {
    tokens: &'a [(usize, Token)],
    pos: usize,
    arity: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(at, _)| *at)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        let at = self.offset();
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(error(at, format!("expected {expected:?}, found {t:?}"))),
            None => Err(error(at, format!("expected {expected:?}, found end of input"))),
        }
    }

    fn operand<V: Value>(&mut self) -> Result<Expr<V>> {
        let at = self.offset();
        match self.advance() {
            Some(Token::Not) => Ok(Expr::not(self.operand()?)),
            Some(Token::Var(i)) if *i < self.arity => Ok(Expr::var(*i)),
            Some(Token::Var(i)) => Err(error(
                at,
                format!("x{i} exceeds arity {}", self.arity),
            )),
            Some(Token::Literal(text)) => V::parse_literal(text)
                .map(Expr::constant)
                .ok_or_else(|| error(at, format!("`{text}` is not a {} literal", V::TYPE_NAME))),
            Some(Token::LParen) => {
                let inner = self.inner()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(t) => Err(error(at, format!("expected operand, found {t:?}"))),
            None => Err(error(at, "expected operand, found end of input")),
        }
    }

    fn inner<V: Value>(&mut self) -> Result<Expr<V>> {
        let first = self.operand()?;
        match self.peek() {
            Some(Token::Op(op)) => {
                let op = *op;
                self.pos += 1;
                Ok(Expr::binary(op, first, self.operand()?))
            }
            Some(Token::If) => {
                self.pos += 1;
                let test = self.operand()?;
                self.expect(&Token::Else)?;
                Ok(Expr::cond(test, first, self.operand()?))
            }
            _ => Ok(first),
        }
    }
}

impl<V: Value> Expr<V> {
    /// Parses a rendered genotype over `arity` inputs.
    pub fn parse(text: &str, arity: usize) -> Result<Self> {
        let tokens = lex(text)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            arity,
            end: text.len(),
        };
        let expr = parser.operand()?;
        if parser.pos < tokens.len() {
            return Err(error(parser.offset(), "trailing input"));
        }
        Ok(expr)
    }
}

impl<V: Value> Program<V> {
    /// Builds a fresh program from genotype text.
    pub fn from_genotype(text: &str, arity: usize) -> Result<Self> {
        Ok(Self::new(Expr::parse(text, arity)?, arity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boolean() {
        let e: Expr<bool> = Expr::parse("((x0 and not x1) or not (x2 or x0))", 3).expect("parses");
        assert_eq!(e.to_genotype(), "((x0 and not x1) or not (x2 or x0))");
        assert_eq!(e.interpret(&[true, false, false]), Ok(true));
        assert_eq!(e.interpret(&[false, false, true]), Ok(false));
    }

    #[test]
    fn test_parse_negative_literal_vs_subtraction() {
        let e: Expr<f64> = Expr::parse("((-0.5 * x0) - -2.0)", 1).expect("parses");
        assert_eq!(e.interpret(&[2.0]), Ok(1.0));
        let e: Expr<f64> = Expr::parse("(x0 - 1e-3)", 1).expect("parses");
        assert_eq!(e.interpret(&[0.001]), Ok(0.0));
    }

    #[test]
    fn test_parse_power_and_conditional() {
        let e: Expr<f64> = Expr::parse("((x0 ** 2.0) if x0 else 7.0)", 1).expect("parses");
        assert_eq!(e.interpret(&[3.0]), Ok(9.0));
        assert_eq!(e.interpret(&[0.0]), Ok(7.0));
    }

    #[test]
    fn test_parse_classifier_condition() {
        let e: Expr<i64> =
            Expr::parse("(2 if ((x0 == 1) and (x1 == 3)) else x1)", 2).expect("parses");
        assert_eq!(e.interpret(&[1, 3]), Ok(2));
        assert_eq!(e.interpret(&[1, 2]), Ok(2));
        assert_eq!(e.interpret(&[2, 3]), Ok(3));
    }

    #[test]
    fn test_parse_rejects_out_of_range_variable() {
        let err = Expr::<bool>::parse("(x0 and x4)", 2).unwrap_err();
        assert!(matches!(err, GsgpError::Parse { position: 8, .. }), "{err:?}");
    }

    #[test]
    fn test_parse_rejects_trailing_and_truncated_input() {
        assert!(Expr::<bool>::parse("x0 x1", 2).is_err());
        assert!(Expr::<bool>::parse("(x0 and", 2).is_err());
        assert!(Expr::<bool>::parse("", 2).is_err());
        assert!(Expr::<bool>::parse("(x0 ? x1)", 2).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_literal_type() {
        assert!(Expr::<bool>::parse("1.5", 1).is_err());
        assert!(Expr::<i64>::parse("True", 1).is_err());
    }

    #[test]
    fn test_program_from_genotype() {
        let p = Program::<bool>::from_genotype("(x0 or x1)", 2).expect("parses");
        assert_eq!(p.evaluate(&[false, true]), Ok(true));
        assert_eq!(p.genotype(), "(x0 or x1)");
    }
}
