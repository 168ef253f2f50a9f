//! Statement parser error types.

use crate::lexer::MalformedSqlError;

/// Errors returned while splitting SQL into statements.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Unterminated quote or comment, located at the start of the token.
    #[error(transparent)]
    Malformed(#[from] MalformedSqlError),

    /// The input stream or file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The parser's own bookkeeping was violated.
    #[error("internal parser error: {0}")]
    Internal(String),
}

impl ParseError {
    /// Returns the malformed-SQL details, if this is a syntax problem.
    #[must_use]
    pub const fn as_malformed(&self) -> Option<&MalformedSqlError> {
        match self {
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}
