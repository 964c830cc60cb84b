//! Sandboxed arithmetic/boolean expression evaluator
//!
//! Evaluates the text left inside `{...}` after all reference substitution.
//! The surface is deliberately small: numbers, `+ - * / %`, comparisons,
//! `&& ||`, unary `-`/`!`, and parentheses. There is no name lookup and no
//! way to execute anything else, which is the whole point of replacing a
//! textual `eval`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// Result of evaluating one expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Number(f64),
    Boolean(bool),
}

impl ExprValue {
    /// Render the way resolved templates display results: whole-number
    /// floats print without a trailing fraction.
    pub fn render(&self) -> String {
        match self {
            ExprValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            ExprValue::Boolean(b) => b.to_string(),
        }
    }

    fn number(&self) -> Result<f64, ExprError> {
        match self {
            ExprValue::Number(n) => Ok(*n),
            ExprValue::Boolean(_) => Err(ExprError::TypeMismatch(
                "expected a number, found a boolean".to_string(),
            )),
        }
    }

    fn boolean(&self) -> Result<bool, ExprError> {
        match self {
            ExprValue::Boolean(b) => Ok(*b),
            ExprValue::Number(_) => Err(ExprError::TypeMismatch(
                "expected a boolean, found a number".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Boolean(bool),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    LParen,
    RParen,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::UnexpectedToken(literal.clone()))?;
                tokens.push(Token::Number(number));
            }
            'a'..='z' => {
                let mut word = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphabetic() {
                        word.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.as_str() {
                    "true" => tokens.push(Token::Boolean(true)),
                    "false" => tokens.push(Token::Boolean(false)),
                    _ => return Err(ExprError::UnexpectedToken(word)),
                }
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
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Eq);
                } else {
                    return Err(ExprError::UnexpectedChar('='));
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    tokens.push(Token::Bang);
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '&' => {
                chars.next();
                if chars.peek() == Some(&'&') {
                    chars.next();
                    tokens.push(Token::AndAnd);
                } else {
                    return Err(ExprError::UnexpectedChar('&'));
                }
            }
            '|' => {
                chars.next();
                if chars.peek() == Some(&'|') {
                    chars.next();
                    tokens.push(Token::OrOr);
                } else {
                    return Err(ExprError::UnexpectedChar('|'));
                }
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<ExprValue, ExprError> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::OrOr) {
            self.next();
            let right = self.and_expr()?;
            left = ExprValue::Boolean(left.boolean()? || right.boolean()?);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<ExprValue, ExprError> {
        let mut left = self.comparison()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.next();
            let right = self.comparison()?;
            left = ExprValue::Boolean(left.boolean()? && right.boolean()?);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<ExprValue, ExprError> {
        let left = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => Token::Eq,
            Some(Token::Ne) => Token::Ne,
            Some(Token::Lt) => Token::Lt,
            Some(Token::Le) => Token::Le,
            Some(Token::Gt) => Token::Gt,
            Some(Token::Ge) => Token::Ge,
            _ => return Ok(left),
        };
        self.next();
        let right = self.additive()?;
        let result = match (&left, &right) {
            (ExprValue::Boolean(a), ExprValue::Boolean(b)) => match op {
                Token::Eq => a == b,
                Token::Ne => a != b,
                _ => {
                    return Err(ExprError::TypeMismatch(
                        "ordering comparison on booleans".to_string(),
                    ));
                }
            },
            _ => {
                let a = left.number()?;
                let b = right.number()?;
                match op {
                    Token::Eq => (a - b).abs() < f64::EPSILON,
                    Token::Ne => (a - b).abs() >= f64::EPSILON,
                    Token::Lt => a < b,
                    Token::Le => a <= b,
                    Token::Gt => a > b,
                    Token::Ge => a >= b,
                    _ => unreachable!(),
                }
            }
        };
        Ok(ExprValue::Boolean(result))
    }

    fn additive(&mut self) -> Result<ExprValue, ExprError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Token::Plus,
                Some(Token::Minus) => Token::Minus,
                _ => break,
            };
            self.next();
            let right = self.multiplicative()?;
            let a = left.number()?;
            let b = right.number()?;
            left = ExprValue::Number(if op == Token::Plus { a + b } else { a - b });
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<ExprValue, ExprError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => Token::Star,
                Some(Token::Slash) => Token::Slash,
                Some(Token::Percent) => Token::Percent,
                _ => break,
            };
            self.next();
            let right = self.unary()?;
            let a = left.number()?;
            let b = right.number()?;
            left = ExprValue::Number(match op {
                Token::Star => a * b,
                Token::Slash => {
                    if b == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    a / b
                }
                Token::Percent => {
                    if b == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    a % b
                }
                _ => unreachable!(),
            });
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<ExprValue, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.next();
                let value = self.unary()?;
                Ok(ExprValue::Number(-value.number()?))
            }
            Some(Token::Bang) => {
                self.next();
                let value = self.unary()?;
                Ok(ExprValue::Boolean(!value.boolean()?))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<ExprValue, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(ExprValue::Number(n)),
            Some(Token::Boolean(b)) => Ok(ExprValue::Boolean(b)),
            Some(Token::LParen) => {
                let value = self.or_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(ExprError::UnexpectedToken(format!("{other:?}"))),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ExprError::UnexpectedToken(format!("{other:?}"))),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Evaluate a fully substituted expression string.
pub fn evaluate(input: &str) -> Result<ExprValue, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::UnexpectedEnd);
    }
    let mut parser = Parser {
        tokens,
        position: 0,
    };
    let value = parser.or_expr()?;
    if parser.position != parser.tokens.len() {
        return Err(ExprError::UnexpectedToken(format!(
            "{:?}",
            parser.tokens[parser.position]
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_with_precedence() {
        assert_eq!(evaluate("1 + 2 * 3").unwrap(), ExprValue::Number(7.0));
        assert_eq!(evaluate("(1 + 2) * 3").unwrap(), ExprValue::Number(9.0));
        assert_eq!(evaluate("10 % 3").unwrap(), ExprValue::Number(1.0));
        assert_eq!(evaluate("-4 + 6").unwrap(), ExprValue::Number(2.0));
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(evaluate("3 >= 2").unwrap(), ExprValue::Boolean(true));
        assert_eq!(
            evaluate("1 < 2 && 2 < 3").unwrap(),
            ExprValue::Boolean(true)
        );
        assert_eq!(
            evaluate("1 == 2 || !false").unwrap(),
            ExprValue::Boolean(true)
        );
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(evaluate("10 / 4").unwrap().render(), "2.5");
        assert_eq!(evaluate("8 / 4").unwrap().render(), "2");
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("strength + 2").is_err());
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("").is_err());
    }
}
