//! oxc-par - Recursive-descent parser for the OX language
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The parser turns the token stream produced by `oxc-lex` into a raw AST:
//! a [`Document`] of blocks, template directives, and imports. It is a
//! hand-written recursive descent parser: one `parse_*` method per
//! production, no backtracking, fail-fast on the first error.
//!
//! GRAMMAR SKETCH:
//! ---------------
//! ```text
//! document   = { block | template } EOF ;
//! block      = { tag } "[" [ IDENT ] [ "(" properties ")" ] { child } "]" ;
//! child      = { tag } ( block | FREE_TEXT ) | template ;
//! tag        = ( "@" | "#" ) dotted-name [ "(" IDENT ")" ] ;
//! properties = property { "," property } [ "," ] ;
//! property   = IDENT ":" value ;
//! value      = expression | array | STRING | NUMBER | BOOLEAN | NULL | IDENT ;
//! expression = "(" { any-token-balancing-parens } ")" ;
//! array      = "{" [ value { "," value } [ "," ] ] "}" ;
//! template   = "<" keyword … ">" [ body "</" keyword ">" ] ;
//! ```
//!
//! DOCUMENT ROUTING:
//! -----------------
//! Top-level items are sorted into directive categories: `<import>` goes to
//! `Document::imports`, `<inject>` stays inline in `Document::blocks` (its
//! position relative to surrounding blocks is meaningful), all other
//! templates go to `Document::templates`.
//!
//! EXPRESSION CAPTURE:
//! -------------------
//! `(` starts a capture that records every token while tracking nested
//! parentheses; the matching outer `)` is consumed and excluded. Nothing
//! is evaluated here - expressions stay opaque until preprocessing.
//!
//! FREE-TEXT MERGING:
//! ------------------
//! Adjacent free-text siblings whose tag runs match structurally are merged
//! with a blank line between them. Controlled by
//! [`ParserOptions::merge_free_text`]; merging is idempotent.

pub mod ast;
mod edge_cases;
pub mod error;
pub mod printer;

use std::sync::Arc;

use indexmap::IndexMap;
use oxc_lex::{Token, TokenKind};
use oxc_util::Location;

pub use ast::*;
pub use error::{ParseError, SyntaxError};

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Merge adjacent free-text siblings with matching tag runs.
    pub merge_free_text: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            merge_free_text: true,
        }
    }
}

/// How a template body ended.
enum BodyTerm {
    /// `</keyword>` close tag.
    Close,
    /// `<elseif (cond)>` branch marker.
    ElseIf(Expr),
    /// `<else>` branch marker.
    Else,
    /// `<on-error>` branch marker.
    OnError,
}

/// Recursive-descent parser over a token stream.
///
/// # Example
///
/// ```
/// use oxc_par::parse_source;
///
/// let doc = parse_source("[Box (w: 10)]", "main.ox").unwrap();
/// assert_eq!(doc.blocks.len(), 1);
/// ```
pub struct Parser {
    /// Token stream, ending with `Eof`.
    tokens: Vec<Token>,

    /// Index of the current token.
    pos: usize,

    /// Source file name shared into node locations.
    file: Arc<str>,

    /// Parser configuration.
    options: ParserOptions,
}

impl Parser {
    /// Create a parser with default options.
    pub fn new(tokens: Vec<Token>, file: &str) -> Self {
        Self::with_options(tokens, file, ParserOptions::default())
    }

    /// Create a parser with explicit options.
    pub fn with_options(mut tokens: Vec<Token>, file: &str, options: ParserOptions) -> Self {
        // The lexer always terminates the stream; guard hand-built input.
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, 1, 1, ""));
        }
        Self {
            tokens,
            pos: 0,
            file: Arc::from(file),
            options,
        }
    }

    // =========================================================================
    // TOKEN STREAM HELPERS
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Consume and return the current token.
    fn bump(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    /// Consume the current token if it has the given kind.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(&kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(kind.name()))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Location), ParseError> {
        match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let location = self.here();
                self.bump();
                Ok((name, location))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Location of the current token.
    fn here(&self) -> Location {
        self.current().location(&self.file)
    }

    fn describe(token: &Token) -> String {
        match &token.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::FreeText(_) => "free text".to_string(),
            _ => format!("'{}'", token.raw),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: Self::describe(self.current()),
            location: self.here(),
        }
    }

    // =========================================================================
    // DOCUMENT
    // =========================================================================

    /// Parse the whole token stream into a [`Document`].
    pub fn parse_document(mut self) -> Result<Document, ParseError> {
        let location = Location::start_of(Arc::clone(&self.file));
        let mut blocks = Vec::new();
        let mut templates = Vec::new();
        let mut imports = Vec::new();

        loop {
            match &self.current().kind {
                TokenKind::Eof => break,
                TokenKind::At | TokenKind::Hash | TokenKind::LBracket => {
                    blocks.push(Node::Block(self.parse_block()?));
                }
                TokenKind::Lt => {
                    let template = self.parse_template()?;
                    match template {
                        Template::Import(import) => imports.push(import),
                        Template::Inject(_) => blocks.push(Node::Template(template)),
                        other => templates.push(other),
                    }
                }
                _ => {
                    return Err(self.unexpected("a block, tag run, or template directive"));
                }
            }
        }

        Ok(Document {
            blocks,
            templates,
            imports,
            location,
        })
    }

    // =========================================================================
    // BLOCKS AND TAGS
    // =========================================================================

    /// Parse a block, including any leading tag run.
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let tags = self.parse_tags()?;
        self.parse_block_after_tags(tags)
    }

    fn parse_block_after_tags(&mut self, tags: Vec<Tag>) -> Result<Block, ParseError> {
        let open = self.expect(TokenKind::LBracket)?;
        let location = tags
            .first()
            .map(|t| t.location.clone())
            .unwrap_or_else(|| open.location(&self.file));
        let open_location = open.location(&self.file);

        let id = match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                Some(name)
            }
            TokenKind::Number(_) | TokenKind::Str(_) | TokenKind::Bool(_) | TokenKind::Null => {
                return Err(ParseError::MissingBlockIdentifier {
                    location: self.here(),
                });
            }
            _ => None,
        };

        let properties = if self.at(&TokenKind::LParen) {
            self.parse_properties()?
        } else {
            IndexMap::new()
        };

        let children = self.parse_block_body(&open_location)?;

        Ok(Block {
            id,
            properties,
            children,
            tags,
            location,
        })
    }

    /// Parse an optional run of `@name` / `#name(arg)` tags.
    fn parse_tags(&mut self) -> Result<Vec<Tag>, ParseError> {
        let mut tags: Vec<Tag> = Vec::new();
        loop {
            let kind = match self.current().kind {
                TokenKind::At => TagKind::Definition,
                TokenKind::Hash => TagKind::Instance,
                _ => break,
            };
            let location = self.here();
            self.bump();

            let (mut name, _) = self.expect_ident()?;
            // Dotted names address aliased imports: `#ui.button(Save)`.
            while self.at(&TokenKind::Dot)
                && matches!(self.peek(1).kind, TokenKind::Ident(_))
            {
                self.bump();
                let (segment, _) = self.expect_ident()?;
                name.push('.');
                name.push_str(&segment);
            }

            let argument = if self.eat(&TokenKind::LParen) {
                let (arg, _) = self.expect_ident()?;
                self.expect(TokenKind::RParen)?;
                Some(arg)
            } else {
                None
            };

            if let Some(first) = tags.first() {
                if first.kind != kind {
                    return Err(ParseError::MixedTagKinds { location });
                }
            }

            tags.push(Tag {
                kind,
                name,
                argument,
                location,
            });
        }
        Ok(tags)
    }

    /// Parse `( key: value, … )`.
    fn parse_properties(&mut self) -> Result<IndexMap<String, PropValue>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut properties = IndexMap::new();

        if self.eat(&TokenKind::RParen) {
            return Ok(properties);
        }

        loop {
            let (key, _) = self.expect_ident()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value()?;
            // Duplicate keys: last write wins.
            properties.insert(key, value);

            if self.eat(&TokenKind::RParen) {
                break;
            }
            self.expect(TokenKind::Comma)?;
            // Trailing comma before the closer.
            if self.eat(&TokenKind::RParen) {
                break;
            }
        }

        Ok(properties)
    }

    /// Parse a property value.
    fn parse_value(&mut self) -> Result<PropValue, ParseError> {
        match &self.current().kind {
            TokenKind::LParen => Ok(PropValue::Expression(self.capture_expression()?)),
            TokenKind::LBrace => self.parse_array(),
            TokenKind::Str(s) => {
                let s = s.clone();
                self.bump();
                Ok(PropValue::Literal(Literal::Str(s)))
            }
            TokenKind::Number(n) => {
                let n = *n;
                self.bump();
                Ok(PropValue::Literal(Literal::Number(n)))
            }
            TokenKind::Bool(b) => {
                let b = *b;
                self.bump();
                Ok(PropValue::Literal(Literal::Bool(b)))
            }
            TokenKind::Null => {
                self.bump();
                Ok(PropValue::Literal(Literal::Null))
            }
            // A bare identifier is treated as a string.
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                Ok(PropValue::Literal(Literal::Str(name)))
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    /// Parse `{ value, … }`.
    fn parse_array(&mut self) -> Result<PropValue, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut items = Vec::new();

        if self.eat(&TokenKind::RBrace) {
            return Ok(PropValue::Array(items));
        }

        loop {
            items.push(self.parse_value()?);
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            self.expect(TokenKind::Comma)?;
            if self.eat(&TokenKind::RBrace) {
                break;
            }
        }

        Ok(PropValue::Array(items))
    }

    /// Capture an expression: record all tokens between a matched `(` `)`
    /// pair, tracking nesting. Evaluation is deferred.
    fn capture_expression(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(TokenKind::LParen)?;
        let location = open.location(&self.file);
        let mut depth = 1usize;
        let mut tokens = Vec::new();

        loop {
            match self.current().kind {
                TokenKind::Eof => return Err(self.unexpected("')'")),
                TokenKind::LParen => {
                    depth += 1;
                    tokens.push(self.bump());
                }
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                    tokens.push(self.bump());
                }
                _ => tokens.push(self.bump()),
            }
        }

        Ok(Expr { tokens, location })
    }

    /// Parse a block body up to and including the closing `]`.
    fn parse_block_body(&mut self, open_location: &Location) -> Result<Vec<Node>, ParseError> {
        let mut children = Vec::new();

        loop {
            match &self.current().kind {
                TokenKind::RBracket => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::UnclosedBlock {
                        location: open_location.clone(),
                    });
                }
                TokenKind::At | TokenKind::Hash => {
                    let tags = self.parse_tags()?;
                    match &self.current().kind {
                        TokenKind::LBracket => {
                            children.push(Node::Block(self.parse_block_after_tags(tags)?));
                        }
                        TokenKind::FreeText(text) => {
                            let text = text.clone();
                            let location = self.here();
                            self.bump();
                            children.push(Node::FreeText(FreeText {
                                text,
                                tags,
                                location,
                            }));
                        }
                        _ => return Err(self.unexpected("a block or free text after tags")),
                    }
                }
                TokenKind::LBracket => {
                    children.push(Node::Block(self.parse_block_after_tags(Vec::new())?));
                }
                TokenKind::FreeText(text) => {
                    let text = text.clone();
                    let location = self.here();
                    self.bump();
                    children.push(Node::FreeText(FreeText {
                        text,
                        tags: Vec::new(),
                        location,
                    }));
                }
                TokenKind::Lt => {
                    if matches!(self.peek(1).kind, TokenKind::Slash) {
                        return Err(self.unexpected("a child block, free text, or template"));
                    }
                    children.push(Node::Template(self.parse_template()?));
                }
                _ => {
                    return Err(self.unexpected("a child block, free text, or template"));
                }
            }
        }

        Ok(self.maybe_merge_free_text(children))
    }

    // =========================================================================
    // TEMPLATE DIRECTIVES
    // =========================================================================

    /// Parse a `<keyword …>` template directive.
    fn parse_template(&mut self) -> Result<Template, ParseError> {
        let open = self.expect(TokenKind::Lt)?;
        let location = open.location(&self.file);
        let keyword = self.parse_template_keyword()?;

        match keyword.as_str() {
            "set" => {
                let (name, _) = self.expect_ident()?;
                self.expect(TokenKind::Assign)?;
                let value = self.parse_value()?;
                self.expect(TokenKind::Gt)?;
                Ok(Template::Set(SetTemplate {
                    name,
                    value,
                    location,
                }))
            }
            "if" => self.parse_if(location),
            "foreach" => self.parse_foreach(location),
            "while" => self.parse_while(location),
            "on-data" => self.parse_on_data(location),
            "import" => {
                let path = self.expect_string()?;
                let alias = if matches!(&self.current().kind, TokenKind::Ident(k) if k == "as") {
                    self.bump();
                    let (alias, _) = self.expect_ident()?;
                    Some(alias)
                } else {
                    None
                };
                self.expect(TokenKind::Gt)?;
                Ok(Template::Import(ImportTemplate {
                    path,
                    alias,
                    location,
                }))
            }
            "inject" => {
                let path = self.expect_string()?;
                self.expect(TokenKind::Gt)?;
                Ok(Template::Inject(InjectTemplate { path, location }))
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "a template keyword (set, if, foreach, while, on-data, import, inject)"
                    .to_string(),
                found: format!("'{other}'"),
                location,
            }),
        }
    }

    /// Parse a template keyword, joining hyphenated names such as
    /// `on-data` from IDENT `-` IDENT token runs.
    fn parse_template_keyword(&mut self) -> Result<String, ParseError> {
        let (mut keyword, _) = self.expect_ident()?;
        while self.at(&TokenKind::Minus) && matches!(self.peek(1).kind, TokenKind::Ident(_)) {
            self.bump();
            let (segment, _) = self.expect_ident()?;
            keyword.push('-');
            keyword.push_str(&segment);
        }
        Ok(keyword)
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            _ => Err(self.unexpected("string")),
        }
    }

    fn parse_if(&mut self, location: Location) -> Result<Template, ParseError> {
        let condition = self.capture_expression()?;
        self.expect(TokenKind::Gt)?;

        let (then_body, mut term) = self.parse_template_body("if")?;
        let mut else_ifs = Vec::new();
        let mut else_body = Vec::new();

        loop {
            match term {
                BodyTerm::Close => break,
                BodyTerm::ElseIf(cond) => {
                    let (body, next) = self.parse_template_body("if")?;
                    else_ifs.push(ElseIfBranch {
                        condition: cond,
                        body,
                    });
                    term = next;
                }
                BodyTerm::Else => {
                    let (body, next) = self.parse_template_body("if")?;
                    match next {
                        BodyTerm::Close => {
                            else_body = body;
                            break;
                        }
                        _ => {
                            return Err(ParseError::MismatchedClosingTag {
                                expected: "if".to_string(),
                                found: "a branch marker after <else>".to_string(),
                                location: self.here(),
                            });
                        }
                    }
                }
                BodyTerm::OnError => {
                    return Err(ParseError::MismatchedClosingTag {
                        expected: "if".to_string(),
                        found: "<on-error>".to_string(),
                        location: self.here(),
                    });
                }
            }
        }

        Ok(Template::If(IfTemplate {
            condition,
            then_body,
            else_ifs,
            else_body,
            location,
        }))
    }

    fn parse_foreach(&mut self, location: Location) -> Result<Template, ParseError> {
        self.expect(TokenKind::LParen)?;
        let (item_var, _) = self.expect_ident()?;
        let index_var = if self.eat(&TokenKind::Comma) {
            let (index, _) = self.expect_ident()?;
            Some(index)
        } else {
            None
        };
        match &self.current().kind {
            TokenKind::Ident(k) if k == "in" => {
                self.bump();
            }
            _ => return Err(self.unexpected("'in'")),
        }
        let (collection, _) = self.expect_ident()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Gt)?;

        let (body, term) = self.parse_template_body("foreach")?;
        self.expect_close(term, "foreach")?;

        Ok(Template::Foreach(ForeachTemplate {
            item_var,
            index_var,
            collection,
            body,
            location,
        }))
    }

    fn parse_while(&mut self, location: Location) -> Result<Template, ParseError> {
        let condition = self.capture_expression()?;
        self.expect(TokenKind::Gt)?;

        let (body, term) = self.parse_template_body("while")?;
        self.expect_close(term, "while")?;

        Ok(Template::While(WhileTemplate {
            condition,
            body,
            location,
        }))
    }

    fn parse_on_data(&mut self, location: Location) -> Result<Template, ParseError> {
        let (source, _) = self.expect_ident()?;
        self.expect(TokenKind::Gt)?;

        let (data_body, term) = self.parse_template_body("on-data")?;
        let error_body = match term {
            BodyTerm::Close => Vec::new(),
            BodyTerm::OnError => {
                let (body, next) = self.parse_template_body("on-data")?;
                self.expect_close(next, "on-data")?;
                body
            }
            _ => {
                return Err(ParseError::MismatchedClosingTag {
                    expected: "on-data".to_string(),
                    found: "a branch marker".to_string(),
                    location: self.here(),
                });
            }
        };

        Ok(Template::OnData(OnDataTemplate {
            source,
            data_body,
            error_body,
            location,
        }))
    }

    fn expect_close(&self, term: BodyTerm, context: &str) -> Result<(), ParseError> {
        match term {
            BodyTerm::Close => Ok(()),
            BodyTerm::ElseIf(_) | BodyTerm::Else => Err(ParseError::MismatchedClosingTag {
                expected: context.to_string(),
                found: "a conditional branch marker".to_string(),
                location: self.here(),
            }),
            BodyTerm::OnError => Err(ParseError::MismatchedClosingTag {
                expected: context.to_string(),
                found: "<on-error>".to_string(),
                location: self.here(),
            }),
        }
    }

    /// Parse a template body until its terminator, which is consumed.
    ///
    /// Terminators are `</context>` close tags and, inside the matching
    /// directives, `<elseif (cond)>`, `<else>`, and `<on-error>` markers.
    fn parse_template_body(&mut self, context: &str) -> Result<(Vec<Node>, BodyTerm), ParseError> {
        let mut nodes = Vec::new();

        loop {
            match &self.current().kind {
                TokenKind::Eof => {
                    return Err(ParseError::MismatchedClosingTag {
                        expected: context.to_string(),
                        found: "end of file".to_string(),
                        location: self.here(),
                    });
                }
                TokenKind::Lt if matches!(self.peek(1).kind, TokenKind::Slash) => {
                    self.bump();
                    self.bump();
                    let keyword = self.parse_template_keyword()?;
                    let location = self.here();
                    self.expect(TokenKind::Gt)?;
                    if keyword != context {
                        return Err(ParseError::MismatchedClosingTag {
                            expected: context.to_string(),
                            found: keyword,
                            location,
                        });
                    }
                    return Ok((self.maybe_merge_free_text(nodes), BodyTerm::Close));
                }
                TokenKind::Lt => {
                    if let Some(term) = self.try_parse_branch_marker()? {
                        return Ok((self.maybe_merge_free_text(nodes), term));
                    }
                    nodes.push(Node::Template(self.parse_template()?));
                }
                TokenKind::At | TokenKind::Hash => {
                    let tags = self.parse_tags()?;
                    match &self.current().kind {
                        TokenKind::LBracket => {
                            nodes.push(Node::Block(self.parse_block_after_tags(tags)?));
                        }
                        TokenKind::FreeText(text) => {
                            let text = text.clone();
                            let location = self.here();
                            self.bump();
                            nodes.push(Node::FreeText(FreeText {
                                text,
                                tags,
                                location,
                            }));
                        }
                        _ => return Err(self.unexpected("a block or free text after tags")),
                    }
                }
                TokenKind::LBracket => {
                    nodes.push(Node::Block(self.parse_block_after_tags(Vec::new())?));
                }
                TokenKind::FreeText(text) => {
                    let text = text.clone();
                    let location = self.here();
                    self.bump();
                    nodes.push(Node::FreeText(FreeText {
                        text,
                        tags: Vec::new(),
                        location,
                    }));
                }
                _ => return Err(self.unexpected("a child block, free text, or template")),
            }
        }
    }

    /// If the cursor sits on `<elseif`, `<else>`, or `<on-error>`, consume
    /// the marker and return its terminator. Nested directives such as
    /// `<on-data …>` are left for `parse_template`.
    fn try_parse_branch_marker(&mut self) -> Result<Option<BodyTerm>, ParseError> {
        let keyword = match &self.peek(1).kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return Ok(None),
        };

        match keyword.as_str() {
            "elseif" => {
                self.bump(); // <
                self.bump(); // elseif
                let condition = self.capture_expression()?;
                self.expect(TokenKind::Gt)?;
                Ok(Some(BodyTerm::ElseIf(condition)))
            }
            "else" => {
                self.bump();
                self.bump();
                self.expect(TokenKind::Gt)?;
                Ok(Some(BodyTerm::Else))
            }
            "on" => {
                // `<on-error>` is a marker; `<on-data …>` is a directive.
                let is_error = self.at_hyphenated_keyword("error");
                if is_error {
                    self.bump(); // <
                    self.parse_template_keyword()?; // on-error
                    self.expect(TokenKind::Gt)?;
                    Ok(Some(BodyTerm::OnError))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    /// Looks past `< on -` for the given trailing segment.
    fn at_hyphenated_keyword(&self, tail: &str) -> bool {
        matches!(self.peek(2).kind, TokenKind::Minus)
            && matches!(&self.peek(3).kind, TokenKind::Ident(name) if name == tail)
    }

    // =========================================================================
    // FREE-TEXT MERGING
    // =========================================================================

    fn maybe_merge_free_text(&self, nodes: Vec<Node>) -> Vec<Node> {
        if self.options.merge_free_text {
            merge_free_text(nodes)
        } else {
            nodes
        }
    }
}

/// Merge adjacent free-text siblings whose tag runs match structurally,
/// joining their texts with a blank line. Idempotent.
pub fn merge_free_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match (merged.last_mut(), node) {
            (Some(Node::FreeText(prev)), Node::FreeText(next))
                if tags_match(&prev.tags, &next.tags) =>
            {
                prev.text.push_str("\n\n");
                prev.text.push_str(&next.text);
            }
            (_, node) => merged.push(node),
        }
    }
    merged
}

/// Lex and parse a source string with default options.
///
/// # Example
///
/// ```
/// use oxc_par::parse_source;
///
/// let doc = parse_source("<set x = 1> [A] [B]", "main.ox").unwrap();
/// assert_eq!(doc.blocks.len(), 2);
/// assert_eq!(doc.templates.len(), 1);
/// ```
pub fn parse_source(source: &str, file: &str) -> Result<Document, SyntaxError> {
    parse_source_with_options(source, file, ParserOptions::default())
}

/// Lex and parse a source string with explicit options.
pub fn parse_source_with_options(
    source: &str,
    file: &str,
    options: ParserOptions,
) -> Result<Document, SyntaxError> {
    let tokens = oxc_lex::tokenize(source, file)?;
    Ok(Parser::with_options(tokens, file, options).parse_document()?)
}
