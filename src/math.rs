// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Arithmetic for {MATH ...} commands

use crate::error::MathError;

/// Parentheses / unary minus nesting limit.
const MAX_DEPTH: usize = 200;

/// Evaluate `expr`, falling back to `0` on any error.
pub fn evaluate(expr: &str) -> f64 {
    match try_evaluate(expr) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(expr, error = %e, "MATH expression fell back to 0");
            0.0
        }
    }
}

/// Evaluate `expr` with `+ - * / %`, parentheses and unary minus.
/// Whitespace anywhere in the expression is ignored.
pub fn try_evaluate(expr: &str) -> Result<f64, MathError> {
    let chars: Vec<char> = expr.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.is_empty() {
        return Err(MathError::Empty);
    }
    let mut parser = Parser {
        chars,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    if let Some(&found) = parser.chars.get(parser.pos) {
        return Err(MathError::Unexpected {
            found,
            offset: parser.pos,
        });
    }
    if !value.is_finite() {
        return Err(MathError::NotFinite);
    }
    Ok(value)
}

/// Integers print without a decimal point, everything else in shortest form.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, MathError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := factor (('*' | '/' | '%') factor)*
    fn term(&mut self) -> Result<f64, MathError> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some(op @ ('/' | '%')) => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(MathError::DivisionByZero);
                    }
                    if op == '/' {
                        value /= rhs;
                    } else {
                        value %= rhs;
                    }
                }
                _ => return Ok(value),
            }
        }
    }

    // factor := '-' factor | '(' expression ')' | number
    fn factor(&mut self) -> Result<f64, MathError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(MathError::TooDeep);
        }
        let result = match self.peek() {
            Some('-') => {
                self.pos += 1;
                self.factor().map(|v| -v)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expression()?;
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(found) => Err(MathError::Unexpected {
                        found,
                        offset: self.pos,
                    }),
                    None => Err(MathError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(found) => Err(MathError::Unexpected {
                found,
                offset: self.pos,
            }),
            None => Err(MathError::UnexpectedEnd),
        };
        self.depth -= 1;
        result
    }

    fn number(&mut self) -> Result<f64, MathError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| MathError::InvalidNumber(literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eval_str(expr: &str) -> String {
        format_number(evaluate(expr))
    }

    #[test]
    fn basic_arithmetic() {
        assert_eq!(eval_str("5 + 8"), "13");
        assert_eq!(eval_str("10 / 4"), "2.5");
        assert_eq!(eval_str("7 % 3"), "1");
        assert_eq!(eval_str("2 * 3 - 4"), "2");
    }

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(eval_str("2 + 3 * 4"), "14");
        assert_eq!(eval_str("(2 + 3) * 4"), "20");
        assert_eq!(eval_str("10 - 4 - 3"), "3");
        assert_eq!(eval_str("100 / 10 / 5"), "2");
    }

    #[test]
    fn unary_minus() {
        assert_eq!(eval_str("-5 + 2"), "-3");
        assert_eq!(eval_str("--4"), "4");
        assert_eq!(eval_str("3 * -(1 + 1)"), "-6");
    }

    #[test]
    fn whitespace_including_newlines_is_ignored() {
        assert_eq!(eval_str(" 1\t+\n2 "), "3");
        assert_eq!(eval_str("1 2 + 1"), "13");
    }

    #[test]
    fn errors_fall_back_to_zero() {
        assert_eq!(eval_str("5 / 0"), "0");
        assert_eq!(eval_str("5 % 0"), "0");
        assert_eq!(eval_str("abc"), "0");
        assert_eq!(eval_str(""), "0");
        assert_eq!(eval_str("(1 + 2"), "0");
        assert_eq!(eval_str("1 +"), "0");
        assert_eq!(eval_str("1.2.3"), "0");
        assert_eq!(eval_str("2 3)"), "0");
    }

    #[test]
    fn reports_why_evaluation_failed() {
        assert_eq!(try_evaluate("   "), Err(MathError::Empty));
        assert_eq!(try_evaluate("4/0"), Err(MathError::DivisionByZero));
        assert_eq!(try_evaluate("1+"), Err(MathError::UnexpectedEnd));
        assert_eq!(
            try_evaluate("1+x"),
            Err(MathError::Unexpected { found: 'x', offset: 2 })
        );
        let deep = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert_eq!(try_evaluate(&deep), Err(MathError::TooDeep));
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(-1.5), "-1.5");
        assert_eq!(format_number(f64::NAN), "0");
    }
}
