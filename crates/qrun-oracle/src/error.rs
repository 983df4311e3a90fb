//! Error types for oracle construction.

use qrun_ir::IrError;
use thiserror::Error;

/// Errors raised while compiling boolean expressions into circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OracleError {
    /// Lexer error (invalid character).
    #[error("Lexer error at position {position}: unexpected '{fragment}'")]
    LexerError {
        /// Byte offset of the bad input.
        position: usize,
        /// The text that could not be tokenized.
        fragment: String,
    },

    /// Unexpected token.
    #[error("Unexpected token at position {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        /// Byte offset of the token.
        position: usize,
        /// What the parser wanted.
        expected: String,
        /// What it got.
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    /// A secret bitstring contains something other than '0' or '1'.
    #[error("Invalid secret bit '{found}' at position {position}: only '0' and '1' are allowed")]
    InvalidSecretBit {
        /// Index of the character in the secret.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// The expression has more variables than can be enumerated.
    #[error("Expression has {found} variables; at most {max} are supported")]
    TooManyVariables {
        /// Number of distinct variables.
        found: usize,
        /// Supported maximum.
        max: usize,
    },

    /// No assignment satisfies the expression, so there is nothing to search for.
    #[error("Expression '{0}' is unsatisfiable")]
    Unsatisfiable(String),

    /// Circuit construction failed.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for oracle operations.
pub type OracleResult<T> = Result<T, OracleError>;
