//! Parse error types.

use oxc_lex::LexError;
use oxc_util::Location;
use thiserror::Error;

/// Errors produced by the parser.
///
/// The parser does not attempt recovery: the first error halts the parse.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    /// The current token does not fit the grammar at this point.
    #[error("{location}: unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    /// A block was still open when the file ended.
    #[error("{location}: unclosed block (missing ']')")]
    UnclosedBlock { location: Location },

    /// A block opener was followed by a token that cannot name a block.
    #[error("{location}: expected block identifier, properties, or body")]
    MissingBlockIdentifier { location: Location },

    /// A template close tag does not match the open directive.
    #[error("{location}: mismatched closing tag: expected </{expected}>, found {found}")]
    MismatchedClosingTag {
        expected: String,
        found: String,
        location: Location,
    },

    /// A block carries both definition and instance tags.
    #[error("{location}: a block cannot mix definition and instance tags")]
    MixedTagKinds { location: Location },
}

impl ParseError {
    /// The location the error cites.
    pub fn location(&self) -> &Location {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::UnclosedBlock { location }
            | ParseError::MissingBlockIdentifier { location }
            | ParseError::MismatchedClosingTag { location, .. }
            | ParseError::MixedTagKinds { location } => location,
        }
    }
}

/// Lexing-or-parsing error, for entry points that run both phases.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyntaxError {
    /// Lexical error.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Parse error.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mismatched_closing_tag() {
        let err = ParseError::MismatchedClosingTag {
            expected: "foreach".into(),
            found: "if".into(),
            location: Location::new("t.ox", 4, 2),
        };
        assert_eq!(
            err.to_string(),
            "t.ox:4:2: mismatched closing tag: expected </foreach>, found if"
        );
    }

    #[test]
    fn test_syntax_error_from_lex() {
        let lex = LexError::UnterminatedString {
            location: Location::new("t.ox", 1, 1),
        };
        let err: SyntaxError = lex.clone().into();
        assert_eq!(err, SyntaxError::Lex(lex));
    }
}
