//! Streaming, delimiter-aware SQL lexer.
//!
//! The lexer does not try to understand SQL. It only splits a byte stream
//! into words, quoted identifiers, strings, numbers, single-rune symbols,
//! runs of whitespace/comments, and delimiters, so that the statement
//! splitter in [`crate::parser`] can find statement boundaries.

mod error;
mod token;
mod tokenizer;

pub use error::{LexError, MalformedSqlError};
pub use token::{is_space, is_word, TokenKind};
pub use tokenizer::{Lexer, DEFAULT_BUFFER_SIZE};
