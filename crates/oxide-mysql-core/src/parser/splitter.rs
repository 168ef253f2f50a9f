//! Partial SQL parser that splits input into [`Statement`] records.
//!
//! Full SQL parsing is out of scope and invalid SQL must be tolerated. The
//! splitter only identifies statement types, object types and names, schema
//! qualifiers, `DEFINER` clauses and delimiters. Anything it does not
//! recognize is kept verbatim up to the next delimiter.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::sync::LazyLock;

use tracing::{debug, trace};

use super::{ParseError, Statement, StatementType};
use crate::lexer::{LexError, Lexer, TokenKind, DEFAULT_BUFFER_SIZE};
use crate::object::ObjectType;

// ============================================================================
// Keyword dispatch
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Processor {
    UntilDelimiter,
    Create,
    Use,
    Delimiter,
    CreateTable,
    CreateRoutine,
    CreateWithDefiner,
    CreateOrReplace,
}

/// Builds a lookup table holding every keyword in both all-uppercase and
/// all-lowercase form. Lookups try the input's own casing first and only
/// upper-case mixed-case input on a miss.
fn keyword_table(entries: &[(&'static str, Processor)]) -> HashMap<String, Processor> {
    let mut table = HashMap::with_capacity(entries.len() * 2);
    for &(keyword, processor) in entries {
        table.insert(keyword.to_ascii_uppercase(), processor);
        table.insert(keyword.to_ascii_lowercase(), processor);
    }
    table
}

static STATEMENT_PROCESSORS: LazyLock<HashMap<String, Processor>> = LazyLock::new(|| {
    keyword_table(&[
        ("CREATE", Processor::Create),
        ("USE", Processor::Use),
        ("DELIMITER", Processor::Delimiter),
    ])
});

static CREATE_PROCESSORS: LazyLock<HashMap<String, Processor>> = LazyLock::new(|| {
    keyword_table(&[
        ("TABLE", Processor::CreateTable),
        ("FUNCTION", Processor::CreateRoutine),
        ("PROCEDURE", Processor::CreateRoutine),
        ("DEFINER", Processor::CreateWithDefiner),
        ("OR", Processor::CreateOrReplace),
    ])
});

fn lookup(table: &HashMap<String, Processor>, word: &str) -> Option<Processor> {
    table
        .get(word)
        .or_else(|| table.get(&word.to_uppercase()))
        .copied()
}

// ============================================================================
// Tokens
// ============================================================================

/// A token located by its byte range inside the statement text buffer.
#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    offset: usize,
    len: usize,
}

impl Token {
    const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Returns the line and column immediately after `text`, which starts at
/// `line`:`column`. Columns count characters; an invalid UTF-8 sequence
/// counts as one.
fn position_after(text: &[u8], mut line: usize, mut column: usize) -> (usize, usize) {
    let mut rest = text;
    while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
        line += 1;
        column = 1;
        rest = &rest[pos + 1..];
    }
    (line, column + String::from_utf8_lossy(rest).chars().count())
}

const BOM: &[u8] = b"\xEF\xBB\xBF";

// ============================================================================
// Splitter
// ============================================================================

/// Streams [`Statement`] values out of a reader.
///
/// Yields every statement in order. If an error occurs, the statement that
/// was being built when it happened is yielded first, then the error, and
/// then iteration ends.
pub struct Splitter<R> {
    lexer: Lexer<R>,
    /// The statement under construction.
    stmt: Option<Statement>,
    /// Raw bytes of the statement under construction.
    text: Vec<u8>,
    /// Set once the input is exhausted or an error occurred.
    finished: bool,
    err: Option<ParseError>,
    /// Position of the token that triggered a pending lexer error.
    error_position: Option<(usize, usize)>,
    default_database: String,
    /// True once a `DELIMITER` command was seen in this input.
    explicit_delimiter: bool,
    file_path: String,
    line: usize,
    column: usize,
}

impl<R: Read> Splitter<R> {
    /// Creates a splitter. `file_path` is only used for locations and
    /// error messages.
    #[must_use]
    pub fn new(reader: R, file_path: &str) -> Self {
        Self::with_delimiter(reader, file_path, ";")
    }

    /// Creates a splitter starting with a non-default delimiter.
    #[must_use]
    pub fn with_delimiter(reader: R, file_path: &str, delimiter: &str) -> Self {
        Self {
            lexer: Lexer::new(reader, delimiter, DEFAULT_BUFFER_SIZE),
            stmt: None,
            text: Vec::new(),
            finished: false,
            err: None,
            error_position: None,
            default_database: String::new(),
            explicit_delimiter: false,
            file_path: file_path.to_string(),
            line: 1,
            column: 1,
        }
    }

    fn next_statement(&mut self) -> Option<Statement> {
        if self.stmt.is_some() {
            self.fail(ParseError::Internal(format!(
                "at {}:{}:{}, previous statement not closed properly",
                self.file_path, self.line, self.column
            )));
            return None;
        }
        self.stmt = Some(Statement {
            file: self.file_path.clone(),
            line_no: self.line,
            char_no: self.column,
            default_database: self.default_database.clone(),
            delimiter: self.lexer.delimiter().to_string(),
            ..Statement::default()
        });

        // A BOM is a no-op statement of its own, located at column 0. This
        // is the only way two no-op statements can be adjacent.
        let first = if self.line == 1 && self.column == 1 && self.lexer.scan_bom() {
            self.text.extend_from_slice(BOM);
            self.column -= 1;
            self.stmt_mut().char_no = 0;
            Some(TokenKind::Filler)
        } else {
            self.next_token().map(|t| t.kind)
        };

        let Some(kind) = first else {
            self.stmt = None;
            self.text.clear();
            return None;
        };
        if kind == TokenKind::Filler || kind == TokenKind::Delimiter {
            self.stmt_mut().statement_type = StatementType::Noop;
            return Some(self.finish_statement());
        }

        let processor = if kind == TokenKind::Word {
            lookup(&STATEMENT_PROCESSORS, &String::from_utf8_lossy(&self.text)).unwrap_or(Processor::UntilDelimiter)
        } else {
            Processor::UntilDelimiter
        };
        trace!(?processor, "dispatching statement");
        // the leading keyword is consumed here
        Some(self.process(processor, Vec::new()))
    }

    fn process(&mut self, processor: Processor, tokens: Vec<Token>) -> Statement {
        match processor {
            Processor::UntilDelimiter => self.process_until_delimiter(&tokens),
            Processor::Create => self.process_create(tokens),
            Processor::Use => self.process_use_command(),
            Processor::Delimiter => self.process_delimiter_command(),
            Processor::CreateTable => self.process_create_table(tokens),
            Processor::CreateRoutine => self.process_create_routine(tokens),
            Processor::CreateWithDefiner => self.process_create_with_definer(tokens),
            Processor::CreateOrReplace => self.process_create_or_replace(tokens),
        }
    }

    fn stmt_mut(&mut self) -> &mut Statement {
        self.stmt.get_or_insert_with(Statement::default)
    }

    /// The token's text. Keywords and names are matched on this view; the
    /// statement keeps the raw bytes.
    fn value(&self, token: &Token) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text[token.offset..token.end()])
    }

    fn fail(&mut self, err: ParseError) {
        self.finished = true;
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Scans the next token and appends it to the statement text. Returns
    /// `None` at end of input or on error; the error is kept for the caller
    /// of the iterator.
    fn next_token(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let offset = self.text.len();
        let kind = match self.lexer.scan() {
            Ok(Some((kind, data))) => {
                self.text.extend_from_slice(data);
                kind
            }
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Err(LexError::Malformed(mut err)) => {
                let (line, column) = self
                    .error_position
                    .take()
                    .unwrap_or_else(|| position_after(&self.text, self.line, self.column));
                err.file_path.clone_from(&self.file_path);
                err.line = line;
                err.column = column;
                self.fail(err.into());
                return None;
            }
            Err(LexError::Io(err)) => {
                self.fail(err.into());
                return None;
            }
        };

        // The lexer reports a malformed token after returning it; remember
        // where the token started so the error points there.
        if self.lexer.has_pending_error() {
            self.error_position = Some(position_after(
                &self.text[..offset],
                self.line,
                self.column,
            ));
        }
        Some(Token {
            kind,
            offset,
            len: self.text.len() - offset,
        })
    }

    /// Grows `tokens` to at least `n` non-filler tokens, stopping early at a
    /// delimiter, end of input, or error.
    fn next_tokens(&mut self, mut tokens: Vec<Token>, n: usize) -> Vec<Token> {
        while !self.finished
            && tokens.len() < n
            && tokens.last().is_none_or(|t| t.kind != TokenKind::Delimiter)
        {
            if let Some(t) = self.next_token() {
                if !t.kind.is_filler() {
                    tokens.push(t);
                }
            }
        }
        tokens
    }

    /// Like [`Self::next_tokens`], but grows until the combined length of
    /// the tokens reaches `want_bytes`.
    fn next_tokens_min_bytes(&mut self, mut tokens: Vec<Token>, want_bytes: usize) -> Vec<Token> {
        let mut have_bytes: usize = tokens.iter().map(|t| t.len).sum();
        while !self.finished
            && have_bytes < want_bytes
            && tokens.last().is_none_or(|t| t.kind != TokenKind::Delimiter)
        {
            if let Some(t) = self.next_token() {
                if !t.kind.is_filler() {
                    have_bytes += t.len;
                    tokens.push(t);
                }
            }
        }
        tokens
    }

    /// Returns how many tokens make up `sequence` (space-separated words,
    /// matched case-insensitively) at the start of `tokens`, or `None` if
    /// the full sequence is not there.
    fn tokens_match_sequence(&self, tokens: &[Token], sequence: &str) -> Option<usize> {
        let mut rest = sequence;
        for (n, token) in tokens.iter().enumerate() {
            let val = self.value(token);
            if val.len() > rest.len() {
                return None;
            }
            if val.len() == rest.len() {
                return val.eq_ignore_ascii_case(rest).then_some(n + 1);
            }
            if rest.as_bytes()[val.len()] != b' ' || !val.eq_ignore_ascii_case(&rest[..val.len()]) {
                return None;
            }
            rest = &rest[val.len() + 1..];
        }
        None
    }

    /// Greedily matches the longest of `sequences` at the start of `tokens`,
    /// fetching more tokens as needed. Returns the matched tokens (empty if
    /// none matched) and the leftovers.
    fn match_next_sequence(&mut self, tokens: Vec<Token>, sequences: &[&str]) -> (Vec<Token>, Vec<Token>) {
        let longest = sequences.iter().map(|s| s.len()).max().unwrap_or(0);
        let mut tokens = self.next_tokens_min_bytes(tokens, longest);
        let best = sequences
            .iter()
            .filter_map(|seq| self.tokens_match_sequence(&tokens, seq))
            .max()
            .unwrap_or(0);
        let leftovers = tokens.split_off(best);
        (tokens, leftovers)
    }

    /// Scans forward for the first occurrence of any of `sequences`,
    /// stopping at a delimiter. Returns the text before the match (without
    /// surrounding filler), the tokens starting at the match (or at the
    /// delimiter), and whether a match was found.
    fn skip_until_sequence(&mut self, mut tokens: Vec<Token>, sequences: &[&str]) -> (String, Vec<Token>, bool) {
        let longest = sequences.iter().map(|s| s.len()).max().unwrap_or(0);
        let start = tokens.first().map_or(self.text.len(), |t| t.offset);
        let mut end = start;
        loop {
            tokens = self.next_tokens_min_bytes(tokens, longest);
            let before = String::from_utf8_lossy(&self.text[start..end]).into_owned();
            match tokens.first() {
                None => return (before, tokens, false),
                Some(t) if t.kind == TokenKind::Delimiter => return (before, tokens, false),
                Some(t) => {
                    if sequences
                        .iter()
                        .any(|seq| self.tokens_match_sequence(&tokens, seq).is_some())
                    {
                        return (before, tokens, true);
                    }
                    end = t.end();
                }
            }
            tokens.remove(0);
        }
    }

    /// Parses an optionally schema-qualified object name, recording it on
    /// the statement. Returns the tokens after the name, or the input tokens
    /// unchanged if no name could be parsed.
    fn parse_object_name_clause(&mut self, tokens: Vec<Token>) -> Vec<Token> {
        let mut tokens = self.next_tokens(tokens, 3);
        if tokens.is_empty() {
            return tokens;
        }

        if tokens.len() >= 3
            && tokens[1].kind == TokenKind::Symbol
            && self.value(&tokens[1]).starts_with('.')
        {
            let schema = name_from_token(tokens[0].kind, &self.value(&tokens[0]));
            let name = name_from_token(tokens[2].kind, &self.value(&tokens[2]));
            if let (Some(schema), Some(name)) = (schema, name) {
                let clause = String::from_utf8_lossy(&self.text[tokens[0].offset..tokens[2].end()]).into_owned();
                let stmt = self.stmt_mut();
                stmt.object_qualifier = schema;
                stmt.object_name = name;
                stmt.name_clause = clause;
                return tokens.split_off(3);
            }
            return tokens;
        }

        if let Some(name) = name_from_token(tokens[0].kind, &self.value(&tokens[0])) {
            let clause = self.value(&tokens[0]).into_owned();
            let stmt = self.stmt_mut();
            stmt.object_name = name;
            stmt.name_clause = clause;
            return tokens.split_off(1);
        }
        tokens
    }

    /// Marks the current statement complete and advances the position.
    fn finish_statement(&mut self) -> Statement {
        let mut stmt = self.stmt.take().unwrap_or_default();
        (self.line, self.column) = position_after(&self.text, self.line, self.column);
        stmt.text = std::mem::take(&mut self.text);
        debug!(
            location = %stmt.location(),
            statement_type = %stmt.statement_type,
            object = %stmt.object_name,
            "statement parsed"
        );
        stmt
    }

    // ------------------------------------------------------------------
    // Statement processors
    // ------------------------------------------------------------------

    /// Discards tokens until a delimiter, end of input, or error.
    fn process_until_delimiter(&mut self, tokens: &[Token]) -> Statement {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Delimiter) {
            while let Some(t) = self.next_token() {
                if t.kind == TokenKind::Delimiter {
                    break;
                }
            }
        }
        self.finish_statement()
    }

    /// `USE db`, terminated by a newline or the normal delimiter. The client
    /// accepts symbols in unquoted names and ignores extra arguments.
    fn process_use_command(&mut self) -> Statement {
        self.lexer.set_command_mode(true);
        let mut database = String::new();
        let mut ignore_rest = false;
        while let Some(t) = self.next_token() {
            match t.kind {
                TokenKind::Delimiter => break,
                TokenKind::Filler => ignore_rest = !database.is_empty(),
                _ if ignore_rest => {}
                TokenKind::Ident => {
                    database.push_str(&strip_backticks(&self.value(&t)));
                    ignore_rest = true;
                }
                _ => database.push_str(&self.value(&t)),
            }
        }
        if !database.is_empty() {
            debug!(database = %database, "default database changed");
            self.stmt_mut().statement_type = StatementType::Command;
            self.default_database = database;
        }
        self.finish_statement()
    }

    /// `DELIMITER x`, always terminated by a newline.
    fn process_delimiter_command(&mut self) -> Statement {
        self.lexer.set_command_mode(true);

        // Nothing may delimit the command itself, so switch to a NUL
        // delimiter while reading it. This also keeps e.g. ";;" from being
        // lexed as the old ";" delimiter.
        let old_delimiter = self.lexer.delimiter().to_string();
        self.lexer.change_delimiter("\0");
        self.stmt_mut().delimiter = "\0".to_string();

        let mut delimiter = String::new();
        let mut ignore_rest = false;
        while let Some(t) = self.next_token() {
            match t.kind {
                TokenKind::Delimiter => break,
                TokenKind::Filler => ignore_rest = !delimiter.is_empty(),
                _ if ignore_rest => {}
                TokenKind::String | TokenKind::Ident => {
                    delimiter.push_str(&strip_any_quote(&self.value(&t)));
                    ignore_rest = true;
                }
                _ => delimiter.push_str(&self.value(&t)),
            }
        }
        if delimiter.is_empty() {
            delimiter = old_delimiter;
        }
        self.stmt_mut().statement_type = StatementType::Command;
        self.lexer.change_delimiter(&delimiter);
        self.explicit_delimiter = true;
        self.finish_statement()
    }

    fn create_processor(&self, tokens: &[Token]) -> Processor {
        if tokens.len() < 2 || tokens[0].kind != TokenKind::Word {
            return Processor::UntilDelimiter;
        }
        lookup(&CREATE_PROCESSORS, &self.value(&tokens[0])).unwrap_or(Processor::UntilDelimiter)
    }

    fn process_create(&mut self, tokens: Vec<Token>) -> Statement {
        let tokens = self.next_tokens(tokens, 20);
        let processor = self.create_processor(&tokens);
        self.process(processor, tokens)
    }

    fn process_create_table(&mut self, mut tokens: Vec<Token>) -> Statement {
        // skip TABLE and the optional IF NOT EXISTS
        tokens.remove(0);
        let (_, tokens) = self.match_next_sequence(tokens, &["IF NOT EXISTS"]);

        let tokens = self.parse_object_name_clause(tokens);
        if !self.stmt_mut().object_name.is_empty() {
            let stmt = self.stmt_mut();
            stmt.statement_type = StatementType::Create;
            stmt.object_type = Some(ObjectType::Table);
        }

        // CREATE ... SELECT mixes DDL with DML, and system-versioned tables
        // aren't introspected.
        let (_, tokens, found) = self.skip_until_sequence(tokens, &["SELECT", "WITH SYSTEM VERSIONING"]);
        if found {
            debug!(table = %self.stmt_mut().object_name, "unsupported CREATE TABLE");
            self.stmt_mut().statement_type = StatementType::CreateUnsupported;
        }
        self.process_until_delimiter(&tokens)
    }

    fn process_create_routine(&mut self, tokens: Vec<Token>) -> Statement {
        let (matched, tokens) = self.match_next_sequence(tokens, &["PROCEDURE", "FUNCTION"]);
        let Some(keyword) = matched.first() else {
            return self.process_until_delimiter(&tokens);
        };
        let object_type = if self.value(keyword).eq_ignore_ascii_case("PROCEDURE") {
            ObjectType::Procedure
        } else {
            ObjectType::Function
        };

        let (_, tokens) = self.match_next_sequence(tokens, &["IF NOT EXISTS"]);
        let tokens = self.parse_object_name_clause(tokens);
        if !self.stmt_mut().object_name.is_empty() {
            let stmt = self.stmt_mut();
            stmt.statement_type = StatementType::Create;
            stmt.object_type = Some(object_type);
        }
        self.process_stored_program(&tokens)
    }

    /// `CREATE OR REPLACE` is parsed the same as a plain `CREATE`.
    fn process_create_or_replace(&mut self, tokens: Vec<Token>) -> Statement {
        let mut tokens = self.next_tokens(tokens, 4);
        if tokens.len() < 4 || !self.value(&tokens[1]).eq_ignore_ascii_case("REPLACE") {
            return self.process_until_delimiter(&tokens);
        }
        let tokens = tokens.split_off(2);
        let processor = self.create_processor(&tokens);
        self.process(processor, tokens)
    }

    fn process_create_with_definer(&mut self, tokens: Vec<Token>) -> Statement {
        // longest definer clause plus one token to pick the next processor
        let tokens = self.next_tokens(tokens, 6);
        if tokens.len() < 4 {
            return self.process_until_delimiter(&tokens);
        }
        let (matched, tokens) = self.match_next_sequence(tokens, &["DEFINER ="]);
        if matched.len() != 2 {
            return self.process_until_delimiter(&tokens);
        }

        // CURRENT_USER, CURRENT_USER(), or user@host
        let (matched, mut tokens) =
            self.match_next_sequence(tokens, &["CURRENT_USER", "CURRENT_USER ( )"]);
        if matched.is_empty() {
            if tokens.len() < 4
                || tokens[1].kind != TokenKind::Symbol
                || self.value(&tokens[1]) != "@"
            {
                return self.process_until_delimiter(&tokens);
            }
            tokens = tokens.split_off(3);
        }
        let processor = self.create_processor(&tokens);
        self.process(processor, tokens)
    }

    /// Consumes a stored program definition. Without an explicit DELIMITER
    /// command in the input, a BEGIN keyword makes the rest of the input one
    /// compound statement, since semicolons inside the body can't be told
    /// apart from real delimiters.
    fn process_stored_program(&mut self, tokens: &[Token]) -> Statement {
        let mut buffered = tokens.iter().copied();
        let mut compound = false;
        loop {
            let Some(t) = buffered.next().or_else(|| self.next_token()) else {
                break;
            };
            if t.kind == TokenKind::Delimiter && (self.explicit_delimiter || !compound) {
                break;
            }
            if !compound && t.kind == TokenKind::Word && self.value(&t).eq_ignore_ascii_case("BEGIN") {
                compound = true;
            }
        }
        let mut stmt = self.finish_statement();
        stmt.compound = compound;
        stmt
    }
}

impl<R: Read> Iterator for Splitter<R> {
    type Item = Result<Statement, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.finished {
            if let Some(stmt) = self.next_statement() {
                return Some(Ok(stmt));
            }
        }
        self.err.take().map(Err)
    }
}

// ============================================================================
// Name helpers
// ============================================================================

fn name_from_token(kind: TokenKind, val: &str) -> Option<String> {
    let name = match kind {
        TokenKind::Ident => strip_backticks(val),
        TokenKind::Word => val.to_string(),
        // double-quoted names under ANSI_QUOTES
        TokenKind::String if val.starts_with('"') => strip_any_quote(val),
        _ => String::new(),
    };
    (!name.is_empty()).then_some(name)
}

/// Removes surrounding backticks and un-doubles inner ones. Input that isn't
/// backtick-wrapped is returned unchanged.
#[must_use]
pub fn strip_backticks(input: &str) -> String {
    match input.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        Some(inner) if input.len() >= 2 => inner.replace("``", "`"),
        _ => input.to_string(),
    }
}

/// Removes a surrounding pair of backticks, single quotes or double quotes,
/// undoing doubled and backslash-escaped inner quotes.
#[must_use]
pub fn strip_any_quote(input: &str) -> String {
    let bytes = input.as_bytes();
    if bytes.len() < 2 || bytes[0] != bytes[bytes.len() - 1] {
        return input.to_string();
    }
    let quote = match bytes[0] {
        b'`' => return strip_backticks(input),
        b'"' => "\"",
        b'\'' => "'",
        _ => return input.to_string(),
    };
    let inner = &input[1..input.len() - 1];
    inner
        .replace(&quote.repeat(2), quote)
        .replace(&format!("\\{quote}"), quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> Vec<Statement> {
        Splitter::new(input.as_bytes(), "")
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn types(input: &str) -> Vec<StatementType> {
        split(input).iter().map(|s| s.statement_type).collect()
    }

    #[test]
    fn test_keyword_lookup_casing() {
        assert_eq!(lookup(&STATEMENT_PROCESSORS, "CREATE"), Some(Processor::Create));
        assert_eq!(lookup(&STATEMENT_PROCESSORS, "create"), Some(Processor::Create));
        assert_eq!(lookup(&STATEMENT_PROCESSORS, "CrEaTe"), Some(Processor::Create));
        assert_eq!(lookup(&STATEMENT_PROCESSORS, "SELECT"), None);
    }

    #[test]
    fn test_position_after() {
        assert_eq!(position_after(b"", 1, 1), (1, 1));
        assert_eq!(position_after(b"abc", 1, 1), (1, 4));
        assert_eq!(position_after(b"a\nbc", 1, 5), (2, 3));
        assert_eq!(position_after("é\n\nxyz".as_bytes(), 3, 1), (5, 4));
        assert_eq!(position_after(b"caf\xe9 x", 1, 1), (1, 7));
    }

    #[test]
    fn test_noop_and_unknown() {
        assert_eq!(
            types("  -- c\nSELECT 1;\n"),
            vec![StatementType::Noop, StatementType::Unknown]
        );
        assert_eq!(types(";\n"), vec![StatementType::Noop]);
    }

    #[test]
    fn test_create_table_names() {
        let stmts = split("CREATE TABLE IF NOT EXISTS `db`.`my``tbl` (id int);\n");
        assert_eq!(stmts.len(), 1);
        let s = &stmts[0];
        assert_eq!(s.statement_type, StatementType::Create);
        assert_eq!(s.object_type, Some(ObjectType::Table));
        assert_eq!(s.object_qualifier, "db");
        assert_eq!(s.object_name, "my`tbl");
        assert_eq!(s.name_clause(), "`db`.`my``tbl`");
    }

    #[test]
    fn test_create_table_unsupported() {
        assert_eq!(
            types("CREATE TABLE t2 SELECT * FROM t1;\n"),
            vec![StatementType::CreateUnsupported]
        );
        assert_eq!(
            types("create table t (id int) with system versioning;"),
            vec![StatementType::CreateUnsupported]
        );
    }

    #[test]
    fn test_create_table_at_end_of_input() {
        let stmts = split("CREATE TABLE t");
        assert_eq!(stmts[0].statement_type, StatementType::Create);
        assert_eq!(stmts[0].text, b"CREATE TABLE t");
    }

    #[test]
    fn test_use_command() {
        let stmts = split("USE `my db` extra\nCREATE TABLE t (id int);\n");
        assert_eq!(stmts[0].statement_type, StatementType::Command);
        assert_eq!(stmts[0].text, b"USE `my db` extra\n");
        assert_eq!(stmts[1].default_database, "my db");
        assert_eq!(stmts[1].schema(), "my db");
    }

    #[test]
    fn test_use_with_semicolon() {
        let stmts = split("use foo;\nSELECT 1;\n");
        assert_eq!(stmts[0].text, b"use foo;\n");
        assert_eq!(stmts[1].default_database, "foo");
    }

    #[test]
    fn test_delimiter_command() {
        let stmts = split("DELIMITER //\nCREATE PROCEDURE p() BEGIN SELECT 1; END//\nDELIMITER ;\n");
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0].statement_type, StatementType::Command);
        assert_eq!(stmts[1].delimiter, "//");
        assert_eq!(stmts[1].object_type, Some(ObjectType::Procedure));
        assert!(stmts[1].compound);
        assert_eq!(stmts[1].body(), "CREATE PROCEDURE p() BEGIN SELECT 1; END");
        assert_eq!(stmts[2].delimiter, "\0");
    }

    #[test]
    fn test_quoted_delimiter() {
        let stmts = split("DELIMITER ';;' ignored\nSELECT 1;;\n");
        assert_eq!(stmts[1].delimiter, ";;");
        assert_eq!(stmts[1].text, b"SELECT 1;;\n");
    }

    #[test]
    fn test_definer_and_or_replace() {
        let stmts = split(
            "CREATE OR REPLACE DEFINER=`root`@`localhost` FUNCTION db.f() RETURNS int RETURN 1;\n\
             CREATE DEFINER=CURRENT_USER() PROCEDURE p() SELECT 1;\n\
             CREATE DEFINER = CURRENT_USER FUNCTION `g`() RETURNS int RETURN 2;\n",
        );
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0].object_type, Some(ObjectType::Function));
        assert_eq!(stmts[0].object_qualifier, "db");
        assert_eq!(stmts[0].object_name, "f");
        assert_eq!(stmts[1].object_type, Some(ObjectType::Procedure));
        assert_eq!(stmts[1].object_name, "p");
        assert!(!stmts[1].compound);
        assert_eq!(stmts[2].object_name, "g");
    }

    #[test]
    fn test_compound_without_delimiter_consumes_rest() {
        let input = "CREATE PROCEDURE p()\nBEGIN\n  SELECT 1;\n  SELECT 2;\nEND;\nSELECT 3;\n";
        let stmts = split(input);
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].compound);
        assert_eq!(stmts[0].text, input.as_bytes());
    }

    #[test]
    fn test_unrecognized_create_is_unknown() {
        assert_eq!(
            types("CREATE VIEW v AS SELECT 1;\n"),
            vec![StatementType::Unknown]
        );
    }

    #[test]
    fn test_locations() {
        let stmts = split("SELECT 1;\n  SELECT 2;\n");
        assert_eq!((stmts[0].line_no, stmts[0].char_no), (1, 1));
        assert_eq!((stmts[1].line_no, stmts[1].char_no), (2, 1));
        assert_eq!((stmts[2].line_no, stmts[2].char_no), (2, 3));
    }

    #[test]
    fn test_bom_statement() {
        let stmts = split("\u{FEFF}SELECT 1;\n");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].statement_type, StatementType::Noop);
        assert_eq!(stmts[0].char_no, 0);
        assert_eq!(stmts[0].text, "\u{FEFF}".as_bytes());
        assert_eq!((stmts[1].line_no, stmts[1].char_no), (1, 1));
    }

    #[test]
    fn test_latin1_bytes_kept() {
        let input = &b"INSERT INTO t VALUES ('caf\xe9');\nSELECT 1;\n"[..];
        let stmts: Vec<Statement> = Splitter::new(input, "latin1.sql").map(|s| s.unwrap()).collect();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text, b"INSERT INTO t VALUES ('caf\xe9');\n");
        assert_eq!(stmts[0].statement_type, StatementType::Unknown);
        assert_eq!((stmts[1].line_no, stmts[1].char_no), (2, 1));
        let joined: Vec<u8> = stmts.iter().flat_map(|s| s.text.iter().copied()).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_malformed_error_points_at_token_start() {
        let mut splitter = Splitter::new("SELECT 1;\nSELECT 'abc\n".as_bytes(), "x.sql");
        let first = splitter.next().unwrap().unwrap();
        assert_eq!(first.text, b"SELECT 1;\n");
        let partial = splitter.next().unwrap().unwrap();
        assert_eq!(partial.text, b"SELECT 'abc\n");
        let err = splitter.next().unwrap().unwrap_err();
        let malformed = err.as_malformed().unwrap();
        assert_eq!(malformed.file_path, "x.sql");
        assert_eq!((malformed.line, malformed.column), (2, 8));
        assert!(splitter.next().is_none());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_backticks("`a``b`"), "a`b");
        assert_eq!(strip_backticks("ab"), "ab");
        assert_eq!(strip_backticks("`"), "`");
        assert_eq!(strip_any_quote("'it''s'"), "it's");
        assert_eq!(strip_any_quote(r#""a\"b""#), "a\"b");
        assert_eq!(strip_any_quote("`x`"), "x");
        assert_eq!(strip_any_quote("$$"), "$$");
        assert_eq!(strip_any_quote("'x\""), "'x\"");
    }
}
