//! oxc-lex - Lexical analyzer for the OX language
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The lexer transforms UTF-8 OX source text into a flat token stream
//! terminated by `Eof`. Each token carries its kind, the raw source slice
//! it was built from, and a 1-based line/column pair.
//!
//! TOKEN FAMILIES:
//! ---------------
//! - Structural:  `[ ] ( ) { } : , .`
//! - Markers:     `$ @ # =`
//! - Arithmetic:  `+ - * / % **`
//! - Comparison:  `== != > < >= <=`
//! - Logical:     `&& || !`
//! - Literals:    identifiers, strings, numbers, `true`/`false`, `null`
//! - Payload:     free-text content fenced by backtick runs
//!
//! Whitespace and comments (`//` line, `/* */` block) are skipped and never
//! reach the parser; newlines carry no significance after tokenisation.
//!
//! FREE TEXT:
//! ----------
//! A run of three or more backticks opens a free-text block; the matching
//! closer is a run of exactly the same length. A standalone even run of six
//! or more backticks with no matching closer ahead splits in half and
//! yields an empty free-text block. Runs of one or two backticks are
//! lexical errors. Captured content is dedented: the common leading
//! indentation of non-empty lines is stripped and surrounding blank lines
//! are trimmed.
//!
//! NEGATIVE NUMBERS:
//! -----------------
//! `-` directly followed by a digit lexes as a negative number literal
//! unless the previous significant token could end an operand (an
//! identifier, a literal, or a closing bracket), in which case it is the
//! binary minus operator. `(w: -5)` is a literal; `(a -5)` is a
//! subtraction.
//!
//! ERRORS:
//! -------
//! All failures are typed [`LexError`]s citing the location where the
//! offending construct started. The lexer is fail-fast: the first error
//! aborts tokenisation.

pub mod cursor;
mod edge_cases;
pub mod error;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use error::LexError;
pub use lexer::{dedent, Lexer};
pub use token::{Token, TokenKind};

/// Tokenize a complete source file.
///
/// Convenience wrapper around [`Lexer::tokenize`].
///
/// # Example
///
/// ```
/// use oxc_lex::{tokenize, TokenKind};
///
/// let tokens = tokenize("[Box (w: 10)]", "main.ox").unwrap();
/// assert_eq!(tokens.first().map(|t| t.kind.clone()), Some(TokenKind::LBracket));
/// assert_eq!(tokens.last().map(|t| t.kind.clone()), Some(TokenKind::Eof));
/// ```
pub fn tokenize(source: &str, file: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source, file).tokenize()
}
