//! AST node definitions for the OX language.
//!
//! Nodes are tagged variants: a node never changes variant after creation.
//! Every node carries a [`Location`]. The preprocessor consumes the raw
//! tree produced here and returns a tree in which all property values are
//! literals and no template directives remain.

use indexmap::IndexMap;
use oxc_lex::Token;
use oxc_util::{Location, Value};

/// A parsed source file.
///
/// Top-level items are sorted into directive categories after parse:
/// blocks (with inject directives kept inline to preserve their relative
/// order with surrounding blocks), templates, and imports.
#[derive(Debug, Clone)]
pub struct Document {
    /// Top-level blocks, with `<inject>` directives kept inline.
    pub blocks: Vec<Node>,

    /// Top-level template directives other than imports and injects.
    pub templates: Vec<Template>,

    /// Top-level `<import>` directives.
    pub imports: Vec<ImportTemplate>,

    /// Location of the start of the file.
    pub location: Location,
}

/// A node in a block tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// A structural block.
    Block(Block),

    /// A free-text payload.
    FreeText(FreeText),

    /// A template directive (gone after preprocessing).
    Template(Template),
}

impl Node {
    /// The node's source location.
    pub fn location(&self) -> &Location {
        match self {
            Node::Block(b) => &b.location,
            Node::FreeText(ft) => &ft.location,
            Node::Template(t) => t.location(),
        }
    }
}

/// A named or anonymous structural record with properties, children, and
/// tags.
#[derive(Debug, Clone)]
pub struct Block {
    /// Block identifier; `None` for anonymous blocks.
    pub id: Option<String>,

    /// Ordered property mapping. Duplicate keys at parse time follow
    /// last-write-wins.
    pub properties: IndexMap<String, PropValue>,

    /// Ordered child nodes.
    pub children: Vec<Node>,

    /// Leading tag run. Kinds are uniform within one block.
    pub tags: Vec<Tag>,

    /// Source location of the block opener.
    pub location: Location,
}

impl Block {
    /// Create an empty block at the given location.
    pub fn new(id: Option<String>, location: Location) -> Self {
        Self {
            id,
            properties: IndexMap::new(),
            children: Vec::new(),
            tags: Vec::new(),
            location,
        }
    }
}

/// A property value.
#[derive(Debug, Clone)]
pub enum PropValue {
    /// A literal value.
    Literal(Literal),

    /// An ordered sequence of values.
    Array(Vec<PropValue>),

    /// A deferred expression: the token sequence captured between a
    /// matched `(` `)` pair, evaluated during preprocessing.
    Expression(Expr),
}

impl PropValue {
    /// True if this value or anything beneath it is still an expression.
    pub fn contains_expression(&self) -> bool {
        match self {
            PropValue::Literal(_) => false,
            PropValue::Array(items) => items.iter().any(PropValue::contains_expression),
            PropValue::Expression(_) => true,
        }
    }

    /// Convert a runtime value into a property value. Arrays become
    /// `Array` nodes; everything else becomes the matching literal.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                PropValue::Array(items.into_iter().map(PropValue::from_value).collect())
            }
            other => PropValue::Literal(Literal::from_scalar(other)),
        }
    }

    /// Convert a fully-resolved property value back into a runtime value.
    ///
    /// Returns `None` if an expression remains anywhere beneath.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            PropValue::Literal(lit) => Some(lit.to_value()),
            PropValue::Array(items) => items
                .iter()
                .map(PropValue::to_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            PropValue::Expression(_) => None,
        }
    }
}

/// A literal property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A string.
    Str(String),
    /// A number.
    Number(f64),
    /// A boolean.
    Bool(bool),
    /// The null value.
    Null,
    /// An object value (from data sources or resolved references).
    Object(Value),
}

impl Literal {
    /// The OX value-type name of this literal.
    pub fn value_type(&self) -> &'static str {
        match self {
            Literal::Str(_) => "string",
            Literal::Number(_) => "number",
            Literal::Bool(_) => "boolean",
            Literal::Null => "null",
            Literal::Object(_) => "object",
        }
    }

    /// Convert into a runtime value.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Str(s) => Value::Str(s.clone()),
            Literal::Number(n) => Value::Number(*n),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
            Literal::Object(v) => v.clone(),
        }
    }

    /// Build a literal from a non-array runtime value.
    pub fn from_scalar(value: Value) -> Self {
        match value {
            Value::Str(s) => Literal::Str(s),
            Value::Number(n) => Literal::Number(n),
            Value::Bool(b) => Literal::Bool(b),
            Value::Null => Literal::Null,
            object @ Value::Object(_) => Literal::Object(object),
            // Arrays are handled by PropValue::from_value; an array that
            // reaches here is preserved as an object-typed literal.
            array @ Value::Array(_) => Literal::Object(array),
        }
    }
}

/// A deferred expression: an opaque token sequence plus the location of
/// the opening parenthesis.
#[derive(Debug, Clone)]
pub struct Expr {
    /// Captured tokens, excluding the delimiting parentheses.
    pub tokens: Vec<Token>,

    /// Location of the opening `(`.
    pub location: Location,
}

/// Tag kind: `@name` defines, `#name(arg)` instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `@name` - registers a reusable template.
    Definition,
    /// `#name(arg)` - instantiates a registered template.
    Instance,
}

/// A tag annotation on a block or free-text node.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Definition or instance.
    pub kind: TagKind,

    /// Tag name. May be dotted for aliased imports (`ui.button`).
    pub name: String,

    /// Optional argument (`#component(Button)` carries `Button`).
    pub argument: Option<String>,

    /// Source location of the marker character.
    pub location: Location,
}

impl Tag {
    /// Registry key for this tag: `name(argument)` or bare `name`.
    pub fn key(&self) -> String {
        match &self.argument {
            Some(arg) => format!("{}({})", self.name, arg),
            None => self.name.clone(),
        }
    }
}

/// Structural equality of two tag runs: same length and same
/// kind/name/argument at each index. Locations are ignored.
pub fn tags_match(a: &[Tag], b: &[Tag]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.kind == y.kind && x.name == y.name && x.argument == y.argument
        })
}

/// A triple-backtick-fenced payload child of a block.
#[derive(Debug, Clone)]
pub struct FreeText {
    /// Dedented text content.
    pub text: String,

    /// Leading tag run.
    pub tags: Vec<Tag>,

    /// Source location of the opening fence.
    pub location: Location,
}

/// A template directive.
#[derive(Debug, Clone)]
pub enum Template {
    /// `<set name = value>`
    Set(SetTemplate),
    /// `<if (cond)> … <elseif (cond)> … <else> … </if>`
    If(IfTemplate),
    /// `<foreach (item[, index] in collection)> … </foreach>`
    Foreach(ForeachTemplate),
    /// `<while (cond)> … </while>`
    While(WhileTemplate),
    /// `<on-data name> … <on-error> … </on-data>`
    OnData(OnDataTemplate),
    /// `<import "path" [as alias]>`
    Import(ImportTemplate),
    /// `<inject "path">`
    Inject(InjectTemplate),
}

impl Template {
    /// The directive's source location.
    pub fn location(&self) -> &Location {
        match self {
            Template::Set(t) => &t.location,
            Template::If(t) => &t.location,
            Template::Foreach(t) => &t.location,
            Template::While(t) => &t.location,
            Template::OnData(t) => &t.location,
            Template::Import(t) => &t.location,
            Template::Inject(t) => &t.location,
        }
    }

    /// The directive keyword, as written in source.
    pub fn keyword(&self) -> &'static str {
        match self {
            Template::Set(_) => "set",
            Template::If(_) => "if",
            Template::Foreach(_) => "foreach",
            Template::While(_) => "while",
            Template::OnData(_) => "on-data",
            Template::Import(_) => "import",
            Template::Inject(_) => "inject",
        }
    }
}

/// `<set name = value>`: assigns into the current variable scope.
#[derive(Debug, Clone)]
pub struct SetTemplate {
    /// Variable name.
    pub name: String,
    /// Assigned value (may be an expression).
    pub value: PropValue,
    /// Source location.
    pub location: Location,
}

/// One `<elseif (cond)>` branch.
#[derive(Debug, Clone)]
pub struct ElseIfBranch {
    /// Branch condition.
    pub condition: Expr,
    /// Branch body.
    pub body: Vec<Node>,
}

/// `<if>` directive with optional `<elseif>` branches and `<else>` body.
#[derive(Debug, Clone)]
pub struct IfTemplate {
    /// Main condition.
    pub condition: Expr,
    /// Body expanded when the main condition holds.
    pub then_body: Vec<Node>,
    /// `<elseif>` branches, in source order.
    pub else_ifs: Vec<ElseIfBranch>,
    /// `<else>` body; empty when absent.
    pub else_body: Vec<Node>,
    /// Source location.
    pub location: Location,
}

/// `<foreach>` directive.
#[derive(Debug, Clone)]
pub struct ForeachTemplate {
    /// Loop variable bound to each element.
    pub item_var: String,
    /// Optional variable bound to the element index.
    pub index_var: Option<String>,
    /// Name of the collection variable.
    pub collection: String,
    /// Loop body.
    pub body: Vec<Node>,
    /// Source location.
    pub location: Location,
}

/// `<while>` directive.
#[derive(Debug, Clone)]
pub struct WhileTemplate {
    /// Loop condition.
    pub condition: Expr,
    /// Loop body.
    pub body: Vec<Node>,
    /// Source location.
    pub location: Location,
}

/// `<on-data>` directive.
#[derive(Debug, Clone)]
pub struct OnDataTemplate {
    /// Data-source name.
    pub source: String,
    /// Body expanded on success, with the result bound to the source name.
    pub data_body: Vec<Node>,
    /// `<on-error>` body; empty when absent.
    pub error_body: Vec<Node>,
    /// Source location.
    pub location: Location,
}

/// `<import "path" [as alias]>` directive.
#[derive(Debug, Clone)]
pub struct ImportTemplate {
    /// Import path as written.
    pub path: String,
    /// Optional alias prefix for imported tag definitions.
    pub alias: Option<String>,
    /// Source location.
    pub location: Location,
}

/// `<inject "path">` directive.
#[derive(Debug, Clone)]
pub struct InjectTemplate {
    /// Inject path as written.
    pub path: String,
    /// Source location.
    pub location: Location,
}
