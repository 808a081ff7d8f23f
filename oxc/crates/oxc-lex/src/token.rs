//! Token definitions for the OX language.

use oxc_util::Location;
use std::sync::Arc;

/// The kind of a lexical token, with payload for literal classes.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // =========================================================================
    // STRUCTURAL
    // =========================================================================
    /// "[" - Block open
    LBracket,

    /// "]" - Block close
    RBracket,

    /// "(" - Property list / expression open
    LParen,

    /// ")" - Property list / expression close
    RParen,

    /// "{" - Array open
    LBrace,

    /// "}" - Array close
    RBrace,

    /// ":" - Property key/value separator
    Colon,

    /// "," - Separator
    Comma,

    /// "." - Member access
    Dot,

    // =========================================================================
    // MARKERS
    // =========================================================================
    /// "$" - Reference prefix
    Dollar,

    /// "@" - Tag definition marker
    At,

    /// "#" - Tag instance marker
    Hash,

    /// "=" - Assignment (in `<set>`)
    Assign,

    // =========================================================================
    // ARITHMETIC OPERATORS
    // =========================================================================
    /// "+" - Addition
    Plus,

    /// "-" - Subtraction
    Minus,

    /// "*" - Multiplication
    Star,

    /// "/" - Division; also the close-tag slash in `</keyword>`
    Slash,

    /// "%" - Modulo
    Percent,

    /// "**" - Exponentiation
    StarStar,

    // =========================================================================
    // COMPARISON OPERATORS
    // =========================================================================
    /// "==" - Equality
    EqEq,

    /// "!=" - Inequality
    NotEq,

    /// ">" - Greater than; also the template-tag closer
    Gt,

    /// "<" - Less than; also the template-tag opener
    Lt,

    /// ">=" - Greater than or equal
    GtEq,

    /// "<=" - Less than or equal
    LtEq,

    // =========================================================================
    // LOGICAL OPERATORS
    // =========================================================================
    /// "&&" - Logical AND
    AndAnd,

    /// "||" - Logical OR
    OrOr,

    /// "!" - Logical NOT
    Bang,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Identifier (block id, property key, variable, template keyword)
    Ident(String),

    /// String literal with escapes already processed
    Str(String),

    /// Number literal. All OX numbers are 64-bit floats.
    Number(f64),

    /// "true" / "false"
    Bool(bool),

    /// "null"
    Null,

    // =========================================================================
    // PAYLOAD
    // =========================================================================
    /// Free-text content captured between backtick fences, already dedented
    FreeText(String),

    // =========================================================================
    // SPECIAL
    // =========================================================================
    /// End of file marker
    Eof,
}

impl TokenKind {
    /// Human-readable name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Dollar => "'$'",
            TokenKind::At => "'@'",
            TokenKind::Hash => "'#'",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::StarStar => "'**'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Gt => "'>'",
            TokenKind::Lt => "'<'",
            TokenKind::GtEq => "'>='",
            TokenKind::LtEq => "'<='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Str(_) => "string",
            TokenKind::Number(_) => "number",
            TokenKind::Bool(_) => "boolean",
            TokenKind::Null => "null",
            TokenKind::FreeText(_) => "free text",
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether a token of this kind can end an expression operand.
    ///
    /// Used to decide whether a following `-digit` sequence is a negative
    /// number literal or a binary subtraction.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Str(_)
                | TokenKind::Number(_)
                | TokenKind::Bool(_)
                | TokenKind::Null
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }
}

/// A lexical token: kind plus source position and raw text.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// What the token is (and its payload, for literal classes).
    pub kind: TokenKind,
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based).
    pub column: u32,
    /// The raw source slice the token was built from.
    pub raw: String,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, line: u32, column: u32, raw: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            column,
            raw: raw.into(),
        }
    }

    /// Build a [`Location`] for this token within the given file.
    pub fn location(&self, file: &Arc<str>) -> Location {
        Location {
            file: Arc::clone(file),
            line: self.line,
            column: self.column,
        }
    }
}
