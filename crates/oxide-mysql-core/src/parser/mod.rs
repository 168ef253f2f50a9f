//! SQL statement splitter.
//!
//! Splits SQL text into [`Statement`] records without building an AST.
//! Whitespace, comments and delimiters are preserved, so the concatenated
//! text of all statements always equals the input.

mod error;
mod splitter;
mod statement;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub use error::ParseError;
pub use splitter::{strip_any_quote, strip_backticks, Splitter};
pub use statement::{Statement, StatementType};

/// Splits everything readable from `reader` into statements. `file_path` is
/// only used for locations and error messages.
///
/// Callers needing the statements that preceded an error should iterate a
/// [`Splitter`] directly.
///
/// # Errors
///
/// Returns the first malformed-SQL or I/O error encountered.
pub fn parse_statements<R: Read>(reader: R, file_path: &str) -> Result<Vec<Statement>, ParseError> {
    Splitter::new(reader, file_path).collect()
}

/// Opens and splits the file at `path`.
///
/// # Errors
///
/// Returns an I/O error if the file can't be opened, otherwise as
/// [`parse_statements`].
pub fn parse_statements_in_file(path: impl AsRef<Path>) -> Result<Vec<Statement>, ParseError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse_statements(BufReader::new(file), &path.to_string_lossy())
}

/// Splits an in-memory string.
///
/// # Errors
///
/// Returns the first malformed-SQL error encountered.
pub fn parse_statements_in_string(sql: &str) -> Result<Vec<Statement>, ParseError> {
    parse_statements(sql.as_bytes(), "")
}

/// Returns the first statement found in `sql`, or a default statement if the
/// input is empty or malformed.
///
/// Leading whitespace or comments form a statement of their own, which masks
/// anything after it. A compound statement gets an empty delimiter, since
/// its body may contain semicolons.
#[must_use]
pub fn parse_statement_in_string(sql: &str) -> Statement {
    match parse_statements_in_string(sql) {
        Ok(statements) => statements
            .into_iter()
            .next()
            .map(|mut stmt| {
                if stmt.compound {
                    stmt.delimiter.clear();
                }
                stmt
            })
            .unwrap_or_default(),
        Err(_) => Statement::default(),
    }
}
