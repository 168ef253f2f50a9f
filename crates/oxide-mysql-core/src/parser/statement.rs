//! Statement records produced by the splitter.

use std::borrow::Cow;
use std::fmt;
use std::str::Utf8Error;

use serde::{Serialize, Serializer};

use crate::object::{ObjectKey, ObjectType};

/// Classification of a parsed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatementType {
    /// A statement this parser does not recognize. Its text is kept verbatim.
    #[default]
    Unknown,
    /// Whitespace and/or comments only.
    Noop,
    /// A client command such as `USE` or `DELIMITER`.
    Command,
    /// A supported `CREATE` statement.
    Create,
    /// A `CREATE` the tooling refuses to handle, e.g. `CREATE TABLE ... SELECT`.
    CreateUnsupported,
    /// An `ALTER` statement.
    Alter,
}

impl StatementType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Noop => "noop",
            Self::Command => "command",
            Self::Create => "create",
            Self::CreateUnsupported => "create-unsupported",
            Self::Alter => "alter",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical SQL statement, client command, or run of filler found in the
/// input.
///
/// `text` holds the exact input bytes of the statement including its
/// delimiter and any trailing newline, so concatenating the text of every
/// statement reproduces the input. It is never decoded: a latin1 dump comes
/// back byte for byte. Use [`Statement::text_lossy`] or
/// [`Statement::text_str`] for a string view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Path of the source file, empty for in-memory input.
    pub file: String,
    /// 1-based line where the statement starts.
    pub line_no: usize,
    /// 1-based column where the statement starts (0 for a leading BOM).
    pub char_no: usize,
    /// Serialized as a string, with invalid UTF-8 replaced.
    #[serde(serialize_with = "serialize_lossy")]
    pub text: Vec<u8>,
    /// Database selected by the most recent `USE` before this statement.
    pub default_database: String,
    #[serde(rename = "type")]
    pub statement_type: StatementType,
    pub object_type: Option<ObjectType>,
    pub object_name: String,
    /// Schema name qualifier, e.g. `db` in `CREATE TABLE db.t`.
    pub object_qualifier: String,
    /// Delimiter in effect when the statement started. Empty for a compound
    /// statement parsed in isolation.
    pub delimiter: String,
    /// True for stored programs whose body is a `BEGIN ... END` block.
    pub compound: bool,
    /// Raw text of the (possibly qualified) object name.
    #[serde(skip)]
    pub(crate) name_clause: String,
}

impl Statement {
    /// Returns `file:line:col`, or an empty string if no location is known.
    #[must_use]
    pub fn location(&self) -> String {
        if self.file.is_empty() && self.line_no == 0 && self.char_no == 0 {
            return String::new();
        }
        format!("{}:{}:{}", self.file, self.line_no, self.char_no)
    }

    /// Returns the key of the object this statement creates, if any.
    #[must_use]
    pub fn object_key(&self) -> Option<ObjectKey> {
        self.object_type
            .map(|object_type| ObjectKey::new(object_type, self.object_name.clone()))
    }

    /// Name of the schema the object belongs to: the explicit qualifier if
    /// present, otherwise the default database.
    #[must_use]
    pub fn schema(&self) -> &str {
        if self.object_qualifier.is_empty() {
            &self.default_database
        } else {
            &self.object_qualifier
        }
    }

    /// Raw text of the object name as written in the statement, including
    /// any quoting and schema qualifier.
    #[must_use]
    pub fn name_clause(&self) -> &str {
        &self.name_clause
    }

    /// The text as UTF-8, if it is valid.
    ///
    /// # Errors
    ///
    /// Returns the UTF-8 error for input in another encoding.
    pub fn text_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.text)
    }

    /// The text with invalid UTF-8 sequences replaced by U+FFFD.
    #[must_use]
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Splits the text into the statement body and its trailer (delimiter
    /// plus surrounding whitespace).
    #[must_use]
    pub fn split_text_body(&self) -> (&[u8], &[u8]) {
        let mut body = trim_trailing_whitespace(&self.text);
        if !self.delimiter.is_empty() {
            body = body.strip_suffix(self.delimiter.as_bytes()).unwrap_or(body);
        }
        let body = trim_trailing_whitespace(body);
        (body, &self.text[body.len()..])
    }

    /// The statement text without its delimiter or trailing whitespace.
    #[must_use]
    pub fn body(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.split_text_body().0)
    }

    /// Returns true for a statement with no content besides filler.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.statement_type == StatementType::Noop
    }
}

fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !matches!(b, b'\n' | b'\r' | b'\t' | b' '))
        .map_or(0, |pos| pos + 1);
    &bytes[..end]
}

fn serialize_lossy<S: Serializer>(text: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(text))
}
