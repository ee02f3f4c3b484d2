use crate::token::Token;
use accum::EncodeError;
use thiserror::Error;

/// Unified error type for the compilation pipeline. Everything here is
/// fatal: the run stops at the first error raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("syntax error: expected '{expected}' but found {found}")]
    Expected { expected: String, found: Token },

    #[error("syntax error: invalid statement starting with {0}")]
    InvalidStatement(Token),

    #[error("syntax error: unexpected token in expression: {0}")]
    UnexpectedInExpression(Token),

    #[error("syntax error: unexpected tokens after end of program: {0}")]
    TrailingTokens(Token),

    #[error("undefined label: {0}")]
    UndefinedLabel(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
