//! Boolean expressions over named variables.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr   := xor ( '|' xor )*
//! xor    := and ( '^' and )*
//! and    := unary ( '&' unary )*
//! unary  := ('~' | '!') unary | atom
//! atom   := IDENT | '(' expr ')'
//! ```
//!
//! Variables are numbered in order of first appearance; variable `k`
//! drives qubit `k` of the oracle.

use std::fmt;
use std::ops::Range;

use logos::Logos;

use crate::error::{OracleError, OracleResult};

/// Largest number of variables whose truth table is enumerated.
pub const MAX_VARIABLES: usize = 20;

/// Tokens of the expression language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("~")]
    #[token("!")]
    Not,

    #[token("&")]
    And,

    #[token("|")]
    Or,

    #[token("^")]
    Xor,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Not => write!(f, "~"),
            Token::And => write!(f, "&"),
            Token::Or => write!(f, "|"),
            Token::Xor => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Identifier(s) => write!(f, "{s}"),
        }
    }
}

/// Expression tree. Variables are indices into [`BooleanExpression::variables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A variable.
    Var(usize),
    /// Logical negation.
    Not(Box<Expr>),
    /// Conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Disjunction.
    Or(Box<Expr>, Box<Expr>),
    /// Exclusive or.
    Xor(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluate with variable `k` taken from bit `k` of `assignment`.
    pub fn evaluate(&self, assignment: u64) -> bool {
        match self {
            Expr::Var(k) => (assignment >> k) & 1 == 1,
            Expr::Not(e) => !e.evaluate(assignment),
            Expr::And(a, b) => a.evaluate(assignment) && b.evaluate(assignment),
            Expr::Or(a, b) => a.evaluate(assignment) || b.evaluate(assignment),
            Expr::Xor(a, b) => a.evaluate(assignment) ^ b.evaluate(assignment),
        }
    }
}

/// A parsed boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanExpression {
    source: String,
    variables: Vec<String>,
    root: Expr,
}

impl BooleanExpression {
    /// Parse an expression such as `"x0 & ~x1"`.
    pub fn parse(source: &str) -> OracleResult<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            end: source.len(),
            variables: Vec::new(),
        };
        let root = parser.parse_or()?;
        if let Some((token, span)) = parser.tokens.get(parser.pos) {
            return Err(OracleError::UnexpectedToken {
                position: span.start,
                expected: "operator or end of input".into(),
                found: token.to_string(),
            });
        }
        if parser.variables.len() > MAX_VARIABLES {
            return Err(OracleError::TooManyVariables {
                found: parser.variables.len(),
                max: MAX_VARIABLES,
            });
        }
        Ok(Self {
            source: source.to_string(),
            variables: parser.variables,
            root,
        })
    }

    /// The expression text as given.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variable names in qubit order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Number of distinct variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// The expression tree.
    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Evaluate under an assignment (bit `k` = variable `k`).
    pub fn evaluate(&self, assignment: u64) -> bool {
        self.root.evaluate(assignment)
    }

    /// All satisfying assignments, ascending.
    pub fn satisfying_assignments(&self) -> Vec<u64> {
        (0..1u64 << self.num_variables())
            .filter(|&a| self.evaluate(a))
            .collect()
    }
}

impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Tokenize an expression, keeping byte spans.
fn tokenize(source: &str) -> OracleResult<Vec<(Token, Range<usize>)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(OracleError::LexerError {
                    position: lexer.span().start,
                    fragment: lexer.slice().to_string(),
                });
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    end: usize,
    variables: Vec<String>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> OracleResult<Expr> {
        let mut left = self.parse_xor()?;
        while self.consume(&Token::Or) {
            let right = self.parse_xor()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_xor(&mut self) -> OracleResult<Expr> {
        let mut left = self.parse_and()?;
        while self.consume(&Token::Xor) {
            let right = self.parse_and()?;
            left = Expr::Xor(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> OracleResult<Expr> {
        let mut left = self.parse_unary()?;
        while self.consume(&Token::And) {
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> OracleResult<Expr> {
        if self.consume(&Token::Not) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> OracleResult<Expr> {
        let Some((token, span)) = self.tokens.get(self.pos).cloned() else {
            return Err(OracleError::UnexpectedEof("variable or '('".into()));
        };
        self.pos += 1;
        match token {
            Token::Identifier(name) => Ok(Expr::Var(self.variable_index(name))),
            Token::LParen => {
                let inner = self.parse_or()?;
                if !self.consume(&Token::RParen) {
                    return match self.tokens.get(self.pos) {
                        Some((found, span)) => Err(OracleError::UnexpectedToken {
                            position: span.start,
                            expected: "')'".into(),
                            found: found.to_string(),
                        }),
                        None => Err(OracleError::UnexpectedEof(format!(
                            "')' at position {}",
                            self.end
                        ))),
                    };
                }
                Ok(inner)
            }
            other => Err(OracleError::UnexpectedToken {
                position: span.start,
                expected: "variable or '('".into(),
                found: other.to_string(),
            }),
        }
    }

    fn variable_index(&mut self, name: String) -> usize {
        if let Some(k) = self.variables.iter().position(|v| *v == name) {
            k
        } else {
            self.variables.push(name);
            self.variables.len() - 1
        }
    }
}

/// Build the conjunction that is true exactly for `secret`.
///
/// Bit `i` of the secret (leftmost first) becomes `x{i}` for `'1'` and
/// `~x{i}` for `'0'`, joined with `" & "`.
pub fn secret_to_expression(secret: &str) -> OracleResult<String> {
    let mut literals = Vec::with_capacity(secret.len());
    for (i, c) in secret.chars().enumerate() {
        match c {
            '1' => literals.push(format!("x{i}")),
            '0' => literals.push(format!("~x{i}")),
            found => return Err(OracleError::InvalidSecretBit { position: i, found }),
        }
    }
    Ok(literals.join(" & "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_to_expression() {
        assert_eq!(secret_to_expression("11").unwrap(), "x0 & x1");
        assert_eq!(secret_to_expression("00").unwrap(), "~x0 & ~x1");
        assert_eq!(secret_to_expression("101").unwrap(), "x0 & ~x1 & x2");
        assert_eq!(secret_to_expression("").unwrap(), "");
        assert!(matches!(
            secret_to_expression("1a0"),
            Err(OracleError::InvalidSecretBit { position: 1, found: 'a' })
        ));
    }

    #[test]
    fn test_parse_conjunction() {
        let expr = BooleanExpression::parse("x0 & ~x1").unwrap();
        assert_eq!(expr.variables(), &["x0".to_string(), "x1".to_string()]);
        // x0 = 1, x1 = 0 -> assignment 0b01.
        assert_eq!(expr.satisfying_assignments(), vec![0b01]);
    }

    #[test]
    fn test_precedence() {
        // & binds tighter than |
        let expr = BooleanExpression::parse("a | b & c").unwrap();
        assert_eq!(
            expr.root(),
            &Expr::Or(
                Box::new(Expr::Var(0)),
                Box::new(Expr::And(Box::new(Expr::Var(1)), Box::new(Expr::Var(2))))
            )
        );
    }

    #[test]
    fn test_parentheses_and_xor() {
        let expr = BooleanExpression::parse("(a ^ b) & !c").unwrap();
        assert_eq!(expr.satisfying_assignments(), vec![0b001, 0b010]);
    }

    #[test]
    fn test_empty_expression() {
        assert!(matches!(
            BooleanExpression::parse(""),
            Err(OracleError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn test_lexer_error() {
        let err = BooleanExpression::parse("x0 & $").unwrap_err();
        assert!(matches!(err, OracleError::LexerError { position: 5, .. }));
    }

    #[test]
    fn test_trailing_tokens() {
        let err = BooleanExpression::parse("x0 x1").unwrap_err();
        assert!(matches!(err, OracleError::UnexpectedToken { position: 3, .. }));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(matches!(
            BooleanExpression::parse("(x0 & x1"),
            Err(OracleError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn test_repeated_variable_keeps_index() {
        let expr = BooleanExpression::parse("x1 & x0 | x1").unwrap();
        assert_eq!(expr.num_variables(), 2);
        assert_eq!(expr.variables()[0], "x1");
    }
}
