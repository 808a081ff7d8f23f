//! Main lexer implementation for the OX language.
//!
//! This module provides the `Lexer` struct which transforms source code
//! into a stream of tokens. It handles all token types including
//! structural characters, markers, operators, literals, and free-text
//! payloads fenced by backtick runs.

use std::sync::Arc;

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{Token, TokenKind};
use oxc_util::Location;

/// The main lexer for OX source code.
///
/// The lexer transforms source code into a stream of tokens using a
/// dispatch-on-first-character approach. It maintains a cursor for
/// position tracking and fails fast on the first lexical error.
///
/// # Example
///
/// ```
/// use oxc_lex::{Lexer, TokenKind};
///
/// let tokens = Lexer::new("[Item (idx: 3)]", "main.ox").tokenize().unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::LBracket);
/// assert_eq!(tokens[1].kind, TokenKind::Ident("Item".to_string()));
/// ```
pub struct Lexer<'a> {
    /// Character cursor for traversing source.
    cursor: Cursor<'a>,

    /// Source file name, shared into token locations.
    file: Arc<str>,

    /// Start byte position of the current token.
    token_start: usize,

    /// Start line of the current token.
    token_line: u32,

    /// Start column of the current token.
    token_column: u32,

    /// Whether the previously emitted token can end an operand.
    /// Drives the negative-number / binary-minus disambiguation.
    prev_ends_operand: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source code.
    ///
    /// # Arguments
    ///
    /// * `source` - The source code to lex
    /// * `file` - File name used in token locations and errors
    pub fn new(source: &'a str, file: &str) -> Self {
        Self {
            cursor: Cursor::new(source),
            file: Arc::from(file),
            token_start: 0,
            token_line: 1,
            token_column: 1,
            prev_ends_operand: false,
        }
    }

    /// Tokenize the entire source.
    ///
    /// Returns the ordered token sequence ending with `Eof`, or the first
    /// lexical error encountered.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            self.prev_ends_operand = token.kind.ends_operand();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Returns the next token from the source.
    ///
    /// Skips whitespace and comments, then dispatches on the first
    /// character of the token.
    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        // Record start position of this token
        self.token_start = self.cursor.position();
        self.token_line = self.cursor.line();
        self.token_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(self.make(TokenKind::Eof));
        }

        match self.cursor.current_char() {
            // Structural single characters
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ':' => self.single(TokenKind::Colon),
            ',' => self.single(TokenKind::Comma),
            '.' => self.single(TokenKind::Dot),

            // Markers
            '$' => self.single(TokenKind::Dollar),
            '@' => self.single(TokenKind::At),
            '#' => self.single(TokenKind::Hash),

            // Operators
            '+' => self.single(TokenKind::Plus),
            '-' => self.lex_minus(),
            '*' => {
                self.cursor.advance();
                if self.cursor.match_char('*') {
                    Ok(self.make(TokenKind::StarStar))
                } else {
                    Ok(self.make(TokenKind::Star))
                }
            }
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '=' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::EqEq))
                } else {
                    Ok(self.make(TokenKind::Assign))
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::NotEq))
                } else {
                    Ok(self.make(TokenKind::Bang))
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::LtEq))
                } else {
                    Ok(self.make(TokenKind::Lt))
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(self.make(TokenKind::GtEq))
                } else {
                    Ok(self.make(TokenKind::Gt))
                }
            }
            '&' => {
                self.cursor.advance();
                if self.cursor.match_char('&') {
                    Ok(self.make(TokenKind::AndAnd))
                } else {
                    Err(self.error_at_start('&'))
                }
            }
            '|' => {
                self.cursor.advance();
                if self.cursor.match_char('|') {
                    Ok(self.make(TokenKind::OrOr))
                } else {
                    Err(self.error_at_start('|'))
                }
            }

            // Literals and payloads
            '"' | '\'' => self.lex_string(),
            '`' => self.lex_free_text(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.lex_identifier()),

            c => Err(self.error_at_start(c)),
        }
    }

    /// Consume one character and emit the given kind.
    fn single(&mut self, kind: TokenKind) -> Result<Token, LexError> {
        self.cursor.advance();
        Ok(self.make(kind))
    }

    /// Build a token from the recorded start position to the cursor.
    fn make(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            self.token_line,
            self.token_column,
            self.cursor.slice_from(self.token_start),
        )
    }

    /// Location of the current token's start.
    fn start_location(&self) -> Location {
        Location {
            file: Arc::clone(&self.file),
            line: self.token_line,
            column: self.token_column,
        }
    }

    fn error_at_start(&self, ch: char) -> LexError {
        LexError::UnexpectedCharacter {
            ch,
            location: self.start_location(),
        }
    }

    /// Skip whitespace and `//` / `/* */` comments.
    ///
    /// An unterminated block comment simply ends at EOF.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let c = self.cursor.current_char();
            if c.is_whitespace() {
                self.cursor.advance();
            } else if c == '/' && self.cursor.peek_char(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
            } else if c == '/' && self.cursor.peek_char(1) == '*' {
                self.cursor.advance_n(2);
                while !self.cursor.is_at_end() {
                    if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                        self.cursor.advance_n(2);
                        break;
                    }
                    self.cursor.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Lex `-`: either a negative number literal or the binary operator.
    fn lex_minus(&mut self) -> Result<Token, LexError> {
        if self.cursor.peek_char(1).is_ascii_digit() && !self.prev_ends_operand {
            self.cursor.advance(); // consume '-'
            self.lex_number()
        } else {
            self.single(TokenKind::Minus)
        }
    }

    /// Lex a number literal: decimal digits with an optional fractional
    /// part. The leading `-`, if any, was already consumed by `lex_minus`.
    fn lex_number(&mut self) -> Result<Token, LexError> {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let raw = self.cursor.slice_from(self.token_start);
        // The scan above only admits [-0-9.] so the parse cannot fail.
        let value = raw.parse::<f64>().unwrap_or(0.0);
        Ok(self.make(TokenKind::Number(value)))
    }

    /// Lex an identifier or the keywords `true` / `false` / `null`.
    fn lex_identifier(&mut self) -> Token {
        while {
            let c = self.cursor.current_char();
            c.is_ascii_alphanumeric() || c == '_'
        } {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(self.token_start);
        let kind = match text {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            "null" => TokenKind::Null,
            _ => TokenKind::Ident(text.to_string()),
        };
        self.make(kind)
    }

    /// Lex a string literal delimited by `"` or `'`.
    ///
    /// Recognised escapes: `\n \t \r \\ \" \'`. Any other escape sequence
    /// is passed through verbatim.
    fn lex_string(&mut self) -> Result<Token, LexError> {
        let quote = self.cursor.current_char();
        self.cursor.advance();
        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString {
                    location: self.start_location(),
                });
            }
            let c = self.cursor.current_char();
            if c == quote {
                self.cursor.advance();
                return Ok(self.make(TokenKind::Str(value)));
            }
            if c == '\\' {
                self.cursor.advance();
                if self.cursor.is_at_end() {
                    return Err(LexError::UnterminatedString {
                        location: self.start_location(),
                    });
                }
                let escaped = self.cursor.current_char();
                self.cursor.advance();
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    '\'' => value.push('\''),
                    other => {
                        value.push('\\');
                        value.push(other);
                    }
                }
            } else {
                value.push(c);
                self.cursor.advance();
            }
        }
    }

    /// Lex a free-text block fenced by a backtick run.
    ///
    /// The opener is a run of at least three backticks; the closer is a run
    /// of exactly the same length. A standalone even run (>= 6) with no
    /// matching closer ahead splits in half and yields an empty block.
    fn lex_free_text(&mut self) -> Result<Token, LexError> {
        let mut run = 0usize;
        while self.cursor.current_char() == '`' {
            self.cursor.advance();
            run += 1;
        }
        if run < 3 {
            return Err(LexError::SingleBacktickUnsupported {
                location: self.start_location(),
            });
        }

        if has_closing_run(self.cursor.remaining(), run) {
            let mut content = String::new();
            loop {
                if self.cursor.is_at_end() {
                    // has_closing_run guaranteed a closer; reaching EOF
                    // means the closer was consumed as content, which the
                    // scan below never does.
                    return Err(LexError::UnterminatedFreeText {
                        delimiter: run,
                        location: self.start_location(),
                    });
                }
                if self.cursor.current_char() == '`' {
                    let mut inner = 0usize;
                    while self.cursor.current_char() == '`' {
                        self.cursor.advance();
                        inner += 1;
                    }
                    if inner == run {
                        break;
                    }
                    for _ in 0..inner {
                        content.push('`');
                    }
                } else {
                    content.push(self.cursor.current_char());
                    self.cursor.advance();
                }
            }
            Ok(self.make(TokenKind::FreeText(dedent(&content))))
        } else if run >= 6 && run % 2 == 0 {
            // An even run with nothing to close it: split in half, which
            // yields an empty free-text block.
            Ok(self.make(TokenKind::FreeText(String::new())))
        } else {
            Err(LexError::UnterminatedFreeText {
                delimiter: run,
                location: self.start_location(),
            })
        }
    }
}

/// Returns true if `rest` contains a backtick run of exactly `len`.
fn has_closing_run(rest: &str, len: usize) -> bool {
    let mut count = 0usize;
    for c in rest.chars() {
        if c == '`' {
            count += 1;
        } else {
            if count == len {
                return true;
            }
            count = 0;
        }
    }
    count == len
}

/// Dedent free-text content.
///
/// Strips the common leading indentation of non-empty lines, then trims
/// surrounding blank lines.
///
/// # Example
///
/// ```
/// use oxc_lex::dedent;
///
/// let text = "\n    first\n      second\n";
/// assert_eq!(dedent(text), "first\n  second");
/// ```
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut dedented: Vec<String> = lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.chars().skip(indent).collect()
            }
        })
        .collect();

    while dedented.first().map(|l| l.is_empty()).unwrap_or(false) {
        dedented.remove(0);
    }
    while dedented.last().map(|l| l.is_empty()).unwrap_or(false) {
        dedented.pop();
    }

    dedented.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, "test.ox")
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_structural_tokens() {
        assert_eq!(
            kinds("[](){}:,."),
            vec![
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_markers() {
        assert_eq!(
            kinds("$ @ # ="),
            vec![
                TokenKind::Dollar,
                TokenKind::At,
                TokenKind::Hash,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ * / % ** == != > < >= <= && || !"),
            vec![
                TokenKind::Plus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::StarStar,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Gt,
                TokenKind::Lt,
                TokenKind::GtEq,
                TokenKind::LtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_and_keywords() {
        assert_eq!(
            kinds("Box _x true false null"),
            vec![
                TokenKind::Ident("Box".into()),
                TokenKind::Ident("_x".into()),
                TokenKind::Bool(true),
                TokenKind::Bool(false),
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("0 42 3.14"),
            vec![
                TokenKind::Number(0.0),
                TokenKind::Number(42.0),
                TokenKind::Number(3.14),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_negative_number_after_colon() {
        // After ':' a minus-digit sequence is a negative literal.
        assert_eq!(
            kinds("w: -5"),
            vec![
                TokenKind::Ident("w".into()),
                TokenKind::Colon,
                TokenKind::Number(-5.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_binary_minus_after_operand() {
        assert_eq!(
            kinds("a -5"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Minus,
                TokenKind::Number(5.0),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("10 - 3"),
            vec![
                TokenKind::Number(10.0),
                TokenKind::Minus,
                TokenKind::Number(3.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_double_and_single() {
        assert_eq!(
            kinds(r#""hello" 'world'"#),
            vec![
                TokenKind::Str("hello".into()),
                TokenKind::Str("world".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\t\\\"q\"""#),
            vec![TokenKind::Str("a\nb\t\\\"q\"".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unknown_escape_passes_through() {
        assert_eq!(
            kinds(r#""a\qb""#),
            vec![TokenKind::Str("a\\qb".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("\"open", "t.ox").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("a // comment\nb /* block\ncomment */ c"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Ident("c".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_line_column_positions() {
        let tokens = Lexer::new("[\n  Box\n]", "t.ox").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
        assert_eq!((tokens[2].line, tokens[2].column), (3, 1));
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("a ^ b", "t.ox").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                ch: '^',
                location: Location::new("t.ox", 1, 3),
            }
        );
    }

    #[test]
    fn test_single_ampersand_rejected() {
        let err = Lexer::new("a & b", "t.ox").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnexpectedCharacter { ch: '&', .. }));
    }

    #[test]
    fn test_free_text_simple() {
        assert_eq!(
            kinds("```hello```"),
            vec![TokenKind::FreeText("hello".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_free_text_longer_delimiter() {
        assert_eq!(
            kinds("````contains ``` inside````"),
            vec![
                TokenKind::FreeText("contains ``` inside".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_free_text_even_run_splits_to_empty() {
        assert_eq!(
            kinds("``````"),
            vec![TokenKind::FreeText(String::new()), TokenKind::Eof]
        );
        assert_eq!(
            kinds("````````"),
            vec![TokenKind::FreeText(String::new()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_free_text_six_run_with_content_is_opener() {
        assert_eq!(
            kinds("``````x``````"),
            vec![TokenKind::FreeText("x".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_free_text_double_backtick_rejected() {
        let err = Lexer::new("``nope``", "t.ox").tokenize().unwrap_err();
        assert!(matches!(err, LexError::SingleBacktickUnsupported { .. }));
    }

    #[test]
    fn test_free_text_unterminated() {
        let err = Lexer::new("```open", "t.ox").tokenize().unwrap_err();
        assert!(matches!(
            err,
            LexError::UnterminatedFreeText { delimiter: 3, .. }
        ));
    }

    #[test]
    fn test_free_text_dedent_applied() {
        let source = "```\n    line one\n      line two\n```";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::FreeText("line one\n  line two".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_dedent_blank_line_trim() {
        assert_eq!(dedent("\n\n  a\n\n"), "a");
        assert_eq!(dedent("  a\n  b"), "a\nb");
        assert_eq!(dedent(""), "");
    }

    #[test]
    fn test_dedent_idempotent() {
        let once = dedent("\n    alpha\n      beta\n");
        assert_eq!(dedent(&once), once);
    }
}
