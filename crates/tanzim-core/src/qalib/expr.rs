//! Countdown occurrence expressions.
//!
//! A bracketed countdown such as `[7*2]` or `[3*7-1]` is evaluated once at
//! parse time with standard operator precedence over integers; only the
//! resulting integer is stored and decremented thereafter.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("trailing input after expression")]
    TrailingInput,
    #[error("division by zero")]
    DivisionByZero,
    #[error("occurrences must be positive, got {0}")]
    NotPositive(i64),
    #[error("value out of range")]
    Overflow,
}

/// Evaluate an occurrence expression to a positive session count.
pub fn eval_occurrences(raw: &str) -> Result<u32, ExprError> {
    let tokens = tokenize(raw)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ExprError::TrailingInput);
    }
    if value <= 0 {
        return Err(ExprError::NotPositive(value));
    }
    u32::try_from(value).map_err(|_| ExprError::Overflow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(i64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(raw: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' => {
                let mut value: i64 = 0;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i64::from(d)))
                        .ok_or(ExprError::Overflow)?;
                    chars.next();
                }
                tokens.push(Token::Number(value));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<i64, ExprError> {
        let mut acc = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = match op {
                Token::Plus => acc.checked_add(rhs),
                _ => acc.checked_sub(rhs),
            }
            .ok_or(ExprError::Overflow)?;
        }
        Ok(acc)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<i64, ExprError> {
        let mut acc = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            acc = match op {
                Token::Star => acc.checked_mul(rhs).ok_or(ExprError::Overflow)?,
                _ => {
                    if rhs == 0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    acc / rhs
                }
            };
        }
        Ok(acc)
    }

    // factor := number | '-' factor | '(' expr ')'
    fn factor(&mut self) -> Result<i64, ExprError> {
        match self.bump() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.bump() {
                    Some(Token::Close) => Ok(value),
                    Some(_) => Err(ExprError::TrailingInput),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(Token::Plus) => self.factor(),
            Some(_) => Err(ExprError::TrailingInput),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_integer() {
        assert_eq!(eval_occurrences("14"), Ok(14));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(eval_occurrences("7*2"), Ok(14));
        assert_eq!(eval_occurrences("1+2*3"), Ok(7));
        assert_eq!(eval_occurrences("(1+2)*3"), Ok(9));
    }

    #[test]
    fn integer_division() {
        assert_eq!(eval_occurrences("7/2"), Ok(3));
        assert_eq!(eval_occurrences("4/0"), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn rejects_non_positive_results() {
        assert_eq!(eval_occurrences("0"), Err(ExprError::NotPositive(0)));
        assert_eq!(eval_occurrences("2-5"), Err(ExprError::NotPositive(-3)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(eval_occurrences("7*").is_err());
        assert!(eval_occurrences("weekly").is_err());
        assert!(eval_occurrences("2 3").is_err());
    }
}
