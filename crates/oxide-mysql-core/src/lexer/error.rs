//! Lexer error types.

use std::fmt;

/// Fatal problem in the SQL text: an unterminated quote or an unterminated
/// `/*` comment.
///
/// The location is that of the start of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MalformedSqlError {
    /// Description of the problem.
    pub message: String,
    /// Path of the file being parsed, empty for in-memory input.
    pub file_path: String,
    /// 1-based line number, or 0 if unknown.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl MalformedSqlError {
    /// Creates an error without location info.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for MalformedSqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.file_path.is_empty() {
            write!(f, "File {}: ", self.file_path)?;
        }
        if self.message.is_empty() {
            f.write_str("Malformed SQL")?;
        } else {
            f.write_str(&self.message)?;
        }
        if self.line > 0 {
            write!(f, " at line {}", self.line)?;
            if self.column > 1 {
                write!(f, ", column {}", self.column)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for MalformedSqlError {}

/// Errors surfaced by [`super::Lexer::scan`].
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    /// The SQL itself is malformed.
    #[error(transparent)]
    Malformed(#[from] MalformedSqlError),

    /// Reading the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
