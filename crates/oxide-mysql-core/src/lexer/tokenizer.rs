//! Streaming tokenizer implementation.

use std::io::{ErrorKind, Read};

use tracing::debug;

use super::{is_space, is_word, LexError, MalformedSqlError, TokenKind};

/// Default number of bytes requested from the reader per refill.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

const NEEDLE_NEWLINE: &[u8] = b"\n";
const NEEDLE_CLOSE_COMMENT: &[u8] = b"*/";
const BOM: &[u8] = "\u{FEFF}".as_bytes();

/// A partial SQL lexer reading from any [`Read`] source.
///
/// Tokens are returned as raw byte slices that stay valid until the next
/// call to [`Lexer::scan`]. Tokens never span a rune boundary, so valid
/// UTF-8 input always yields valid UTF-8 tokens.
pub struct Lexer<R> {
    /// The input stream.
    reader: R,
    /// Bytes read from the stream but not yet consumed start at `pos`.
    buf: Vec<u8>,
    pos: usize,
    chunk_size: usize,
    eof: bool,
    /// Read error to surface once the buffered data runs out.
    read_err: Option<std::io::Error>,
    /// Malformed-SQL error found while scanning the previous token.
    pending: Option<MalformedSqlError>,
    delimiter: String,
    /// First delimiter byte could start an unquoted identifier or number.
    delim_tricky: bool,
    /// A newline ends a client command and is emitted as a delimiter.
    command_mode: bool,
    prev_token_filler: bool,
}

impl<R: Read> Lexer<R> {
    /// Creates a lexer reading from `reader`, starting with `delimiter`.
    #[must_use]
    pub fn new(reader: R, delimiter: &str, buffer_size: usize) -> Self {
        let mut lexer = Self {
            reader,
            buf: Vec::with_capacity(buffer_size),
            pos: 0,
            chunk_size: buffer_size.max(16),
            eof: false,
            read_err: None,
            pending: None,
            delimiter: String::new(),
            delim_tricky: false,
            command_mode: false,
            prev_token_filler: false,
        };
        lexer.change_delimiter(delimiter);
        lexer
    }

    /// The current delimiter string.
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Changes the delimiter for all subsequent tokens.
    pub fn change_delimiter(&mut self, new_delimiter: &str) {
        if self.delimiter != new_delimiter {
            debug!(from = %self.delimiter.escape_debug(), to = %new_delimiter.escape_debug(), "changing delimiter");
        }
        self.delimiter = new_delimiter.to_string();
        self.delim_tricky = new_delimiter
            .as_bytes()
            .first()
            .is_some_and(|&b| b >= 0x80 || is_word(b) || b == b'-' || b == b'.');
    }

    /// Puts the lexer into (or out of) client-command mode, where a bare
    /// LF or CRLF is emitted as a [`TokenKind::Delimiter`].
    pub fn set_command_mode(&mut self, on: bool) {
        self.command_mode = on;
    }

    /// Returns true if scanning the previous token found malformed SQL. The
    /// error itself is returned by the next call to [`Lexer::scan`].
    #[must_use]
    pub const fn has_pending_error(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes a UTF-8 byte-order mark if the input starts with one. Should
    /// only be called before the first [`Lexer::scan`].
    pub fn scan_bom(&mut self) -> bool {
        self.fill_to(BOM.len());
        if self.remaining().starts_with(BOM) {
            self.pos += BOM.len();
            return true;
        }
        false
    }

    /// Returns the next token, or `None` at end of input.
    ///
    /// If a problem is found mid-token, the token is still returned and the
    /// error comes from the following call.
    ///
    /// # Errors
    ///
    /// Returns [`LexError::Malformed`] for an unterminated quote or block
    /// comment, and [`LexError::Io`] if the reader fails.
    pub fn scan(&mut self) -> Result<Option<(TokenKind, &[u8])>, LexError> {
        if let Some(err) = self.pending.take() {
            return Err(err.into());
        }
        self.compact();
        let Some(first) = self.byte_at(0) else {
            return match self.read_err.take() {
                Some(err) => Err(err.into()),
                None => Ok(None),
            };
        };

        if self.command_mode {
            let newline_len = match (first, self.byte_at(1)) {
                (b'\n', _) => 1,
                (b'\r', Some(b'\n')) => 2,
                _ => 0,
            };
            if newline_len > 0 {
                self.command_mode = false;
                self.prev_token_filler = false;
                return Ok(Some(self.emit(newline_len, TokenKind::Delimiter)));
            }
        }

        if !self.prev_token_filler && self.filler_prefix(0).is_some() {
            return Ok(Some(self.scan_filler()));
        }
        self.prev_token_filler = false;

        // The delimiter may be any string, so it wins over every other
        // classification. One trailing LF or CRLF belongs to it.
        if self.delimiter_at(0) {
            let mut n = self.delimiter.len();
            match (self.byte_at(n), self.byte_at(n + 1)) {
                (Some(b'\r'), Some(b'\n')) => n += 2,
                (Some(b'\n'), _) => n += 1,
                _ => {}
            }
            self.command_mode = false;
            return Ok(Some(self.emit(n, TokenKind::Delimiter)));
        }

        let mut saw_decimal_point = false;
        let (mut kind, size) = if first < 0x80 {
            let kind = match first {
                b'\'' | b'"' | b'`' => return Ok(Some(self.scan_string(first))),
                b'0'..=b'9' => TokenKind::Numeric,
                b'.' => {
                    if self.byte_at(1).is_some_and(|b| b.is_ascii_digit()) {
                        saw_decimal_point = true;
                        TokenKind::Numeric
                    } else {
                        TokenKind::Symbol
                    }
                }
                // negative numbers come out as a '-' symbol and a numeric
                b if !is_word(b) => TokenKind::Symbol,
                _ => TokenKind::Word,
            };
            (kind, 1)
        } else {
            let (_, size) = self.decode_at(0);
            // 4-byte runes can't appear in unquoted identifiers
            let kind = if size > 3 {
                TokenKind::Symbol
            } else {
                TokenKind::Word
            };
            (kind, size)
        };

        if kind == TokenKind::Symbol {
            return Ok(Some(self.emit(size, kind)));
        }

        // Words and numerics. Unquoted identifiers may contain digits
        // anywhere, as long as they aren't all digits.
        let mut saw_e = false;
        let mut n = size;
        while let Some(b) = self.byte_at(n) {
            let mut size = 1;
            if b < 0x80 {
                if is_space(b) {
                    break;
                } else if b == b'.' {
                    let digit_follows = self.byte_at(n + 1).is_some_and(|c| c.is_ascii_digit());
                    if kind != TokenKind::Numeric || saw_decimal_point || saw_e || !digit_follows {
                        break;
                    }
                    saw_decimal_point = true;
                } else if !is_word(b) {
                    break;
                } else if kind == TokenKind::Numeric && !b.is_ascii_digit() {
                    let exponent_follows = self
                        .byte_at(n + 1)
                        .is_some_and(|c| c == b'-' || c.is_ascii_digit());
                    if (b == b'e' || b == b'E') && !saw_e && exponent_follows {
                        saw_e = true;
                        size = 2;
                    } else if saw_decimal_point {
                        break;
                    } else {
                        kind = TokenKind::Word;
                    }
                }
            } else {
                let (c, rune_size) = self.decode_at(n);
                size = rune_size;
                if rune_size > 3 || c.is_whitespace() {
                    break;
                }
                if kind == TokenKind::Numeric {
                    if saw_decimal_point {
                        break;
                    }
                    kind = TokenKind::Word;
                }
            }
            if self.delim_tricky && self.delimiter_at(n) {
                break;
            }
            n += size;
        }
        Ok(Some(self.emit(n, kind)))
    }

    // ------------------------------------------------------------
    // Token scanners
    // ------------------------------------------------------------

    /// Merges contiguous whitespace and comments into one token.
    fn scan_filler(&mut self) -> (TokenKind, &[u8]) {
        let mut n = 0;
        let mut needle: Option<&'static [u8]> = None;
        while let Some(b) = self.byte_at(n) {
            // in command mode the newline becomes its own delimiter token
            if needle.is_none()
                && self.command_mode
                && (b == b'\n' || (b == b'\r' && self.byte_at(n + 1) == Some(b'\n')))
            {
                break;
            }
            match needle {
                None => match self.filler_prefix(n) {
                    Some((prefix_len, closer)) => {
                        n += prefix_len;
                        needle = closer;
                    }
                    None => break,
                },
                Some(closer) => match self.find_from(n, closer) {
                    Some(found) => {
                        n = found;
                        if !self.command_mode || self.remaining()[n] != b'\n' {
                            n += closer.len();
                        }
                        needle = None;
                    }
                    None => n = self.remaining().len(),
                },
            }
        }
        if needle == Some(NEEDLE_CLOSE_COMMENT) {
            self.pending = Some(MalformedSqlError::new(
                "Comment starting with /* is never closed",
            ));
        }
        self.prev_token_filler = true;
        self.emit(n, TokenKind::Filler)
    }

    /// Scans a string quoted with `'`, `"` or a backtick. Backslash escapes
    /// apply to the first two only; doubling the quote works for all three.
    fn scan_string(&mut self, quote: u8) -> (TokenKind, &[u8]) {
        let kind = if quote == b'`' {
            TokenKind::Ident
        } else {
            TokenKind::String
        };
        let mut n = 1;
        let mut skip_next = false;
        let mut done = false;
        while let Some(b) = self.byte_at(n) {
            if skip_next {
                skip_next = false;
            } else if b == b'\\' && quote != b'`' {
                skip_next = true;
            } else if b == quote {
                if self.byte_at(n + 1) == Some(quote) {
                    skip_next = true;
                } else {
                    n += 1;
                    done = true;
                    break;
                }
            }
            n += 1;
        }
        if !done && self.read_err.is_none() {
            let noun = if quote == b'`' { "Identifier" } else { "String" };
            self.pending = Some(MalformedSqlError::new(format!(
                "{noun} is missing closing quote"
            )));
        }
        self.emit(n, kind)
    }

    /// If whitespace or a comment starts at offset `i`, returns how many
    /// bytes certainly belong to the filler and, for comments, the byte
    /// sequence that closes it.
    fn filler_prefix(&mut self, i: usize) -> Option<(usize, Option<&'static [u8]>)> {
        let b0 = self.byte_at(i)?;
        if b0 >= 0x80 {
            let (c, size) = self.decode_at(i);
            return c.is_whitespace().then_some((size, None));
        }
        if is_space(b0) {
            return Some((1, None));
        }
        if b0 == b'#' {
            return Some((1, Some(NEEDLE_NEWLINE)));
        }
        let b1 = self.byte_at(i + 1)?;
        match (b0, b1) {
            (b'-', b'-') => {
                // "--" only starts a comment when followed by whitespace or EOF;
                // the whitespace itself may be the terminating newline
                let space_follows = match self.byte_at(i + 2) {
                    None => true,
                    Some(_) => self.decode_at(i + 2).0.is_whitespace(),
                };
                space_follows.then_some((2, Some(NEEDLE_NEWLINE)))
            }
            (b'/', b'*') => Some((2, Some(NEEDLE_CLOSE_COMMENT))),
            _ => None,
        }
    }

    // ------------------------------------------------------------
    // Buffer management
    // ------------------------------------------------------------

    fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Drops consumed bytes once they make up a sizeable prefix.
    fn compact(&mut self) {
        if self.pos >= self.chunk_size {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }

    /// Reads until at least `want` unconsumed bytes are buffered or the
    /// stream ends.
    fn fill_to(&mut self, want: usize) {
        while !self.eof && self.buf.len() - self.pos < want {
            let start = self.buf.len();
            self.buf.resize(start + self.chunk_size, 0);
            match self.reader.read(&mut self.buf[start..]) {
                Ok(0) => {
                    self.buf.truncate(start);
                    self.eof = true;
                }
                Ok(read) => self.buf.truncate(start + read),
                Err(err) if err.kind() == ErrorKind::Interrupted => self.buf.truncate(start),
                Err(err) => {
                    self.buf.truncate(start);
                    self.eof = true;
                    self.read_err = Some(err);
                }
            }
        }
    }

    fn byte_at(&mut self, i: usize) -> Option<u8> {
        self.fill_to(i + 1);
        self.remaining().get(i).copied()
    }

    /// Decodes the rune at offset `i`. Invalid UTF-8 decodes as U+FFFD
    /// with a size of 1.
    fn decode_at(&mut self, i: usize) -> (char, usize) {
        self.fill_to(i + 4);
        let rest = &self.remaining()[i..];
        let want = match rest.first() {
            Some(0xC0..=0xDF) => 2,
            Some(0xE0..=0xEF) => 3,
            Some(0xF0..=0xF7) => 4,
            _ => 1,
        };
        rest.get(..want)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|s| s.chars().next())
            .map_or((char::REPLACEMENT_CHARACTER, 1), |c| (c, want))
    }

    fn delimiter_at(&mut self, i: usize) -> bool {
        if self.delimiter.is_empty() {
            return false;
        }
        self.fill_to(i + self.delimiter.len());
        self.remaining()
            .get(i..)
            .is_some_and(|rest| rest.starts_with(self.delimiter.as_bytes()))
    }

    /// Finds `needle` at or after offset `from`, reading more input as
    /// needed. Returns the offset of the match.
    fn find_from(&mut self, from: usize, needle: &[u8]) -> Option<usize> {
        let mut search_from = from;
        loop {
            if let Some(found) = self.remaining()[search_from..]
                .windows(needle.len())
                .position(|w| w == needle)
            {
                return Some(search_from + found);
            }
            if self.eof {
                return None;
            }
            let have = self.remaining().len();
            // a needle may straddle the refill boundary
            search_from = (have + 1).saturating_sub(needle.len()).max(from);
            self.fill_to(have + 1);
        }
    }

    fn emit(&mut self, n: usize, kind: TokenKind) -> (TokenKind, &[u8]) {
        let start = self.pos;
        self.pos += n;
        (kind, &self.buf[start..start + n])
    }
}
