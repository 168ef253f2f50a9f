//! Token kinds produced by the lexer.

/// The category of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    /// Zero value, never emitted.
    #[default]
    None,
    /// Bare word: a keyword or an unquoted identifier.
    Word,
    /// Backtick-wrapped identifier.
    Ident,
    /// String wrapped in single or double quotes.
    String,
    /// Unsigned integer or float. A leading `-` is a separate symbol.
    Numeric,
    /// A single operator or other symbol (always exactly one rune).
    Symbol,
    /// Version-gated comment (`/*!`, `/*M!`, `/*+`). Reserved; currently
    /// lexed as filler.
    ExtComment,
    /// The current delimiter, or a newline ending a client command.
    Delimiter,
    /// A run of whitespace and/or comments.
    Filler,
}

impl TokenKind {
    /// Returns true for whitespace/comment runs.
    #[must_use]
    pub const fn is_filler(self) -> bool {
        matches!(self, Self::Filler)
    }
}

/// Returns true if `b` is in `0-9a-zA-Z$_`.
#[must_use]
pub const fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'$' || b == b'_'
}

/// Returns true if `b` is a single-byte ASCII whitespace character.
#[must_use]
pub const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}
