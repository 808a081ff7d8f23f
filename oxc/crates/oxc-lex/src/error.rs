//! Lexical error types.

use oxc_util::Location;
use thiserror::Error;

/// Errors produced by the lexer.
///
/// Every variant cites the location where the offending construct started,
/// not where the scan gave up.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    /// A character with no meaning in OX.
    #[error("{location}: unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, location: Location },

    /// A string literal with no closing quote before end of file.
    #[error("{location}: unterminated string literal")]
    UnterminatedString { location: Location },

    /// A free-text opener with no closing run of the same length.
    #[error("{location}: unterminated free-text block (expected closing run of {delimiter} backticks)")]
    UnterminatedFreeText { delimiter: usize, location: Location },

    /// A run of one or two backticks; free text requires at least three.
    #[error("{location}: free-text blocks require at least three backticks")]
    SingleBacktickUnsupported { location: Location },
}

impl LexError {
    /// The location the error cites.
    pub fn location(&self) -> &Location {
        match self {
            LexError::UnexpectedCharacter { location, .. }
            | LexError::UnterminatedString { location }
            | LexError::UnterminatedFreeText { location, .. }
            | LexError::SingleBacktickUnsupported { location } => location,
        }
    }
}
