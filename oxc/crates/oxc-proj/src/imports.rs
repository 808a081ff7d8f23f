//! Import processing helpers: alias validation and nested-import checks.
//!
//! The actual import walk (resolve, load, extract definitions, merge) is
//! driven by [`crate::OxProject`], which owns the loader and graph.

use oxc_par::{Node, Template};
use oxc_util::Location;

use crate::error::ProjectError;

/// Template keywords an alias may not shadow.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "set", "if", "elseif", "else", "foreach", "while", "on-data", "on-error", "import", "inject",
];

/// Maximum alias length in characters.
pub const MAX_ALIAS_LENGTH: usize = 50;

/// Validate an import alias: identifier shape, length, not reserved.
pub fn validate_alias(alias: &str, location: &Location) -> Result<(), ProjectError> {
    let reject = |reason: &str| {
        Err(ProjectError::InvalidAlias {
            alias: alias.to_string(),
            reason: reason.to_string(),
            location: location.clone(),
        })
    };

    if alias.is_empty() {
        return reject("alias is empty");
    }
    if alias.chars().count() > MAX_ALIAS_LENGTH {
        return reject("alias exceeds 50 characters");
    }
    let mut chars = alias.chars();
    let first = chars.next().unwrap_or('\0');
    if !(first.is_ascii_alphabetic() || first == '_') {
        return reject("alias must start with a letter or underscore");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return reject("alias may only contain letters, digits, and underscores");
    }
    if RESERVED_KEYWORDS.contains(&alias) {
        return reject("alias is a reserved template keyword");
    }
    Ok(())
}

/// Reject `<import>` directives anywhere below the document top level.
pub fn check_no_nested_imports(blocks: &[Node]) -> Result<(), ProjectError> {
    for node in blocks {
        check_node(node)?;
    }
    Ok(())
}

fn check_node(node: &Node) -> Result<(), ProjectError> {
    match node {
        Node::Block(block) => check_no_nested_imports(&block.children),
        Node::FreeText(_) => Ok(()),
        Node::Template(template) => check_template(template),
    }
}

fn check_template(template: &Template) -> Result<(), ProjectError> {
    match template {
        Template::Import(import) => Err(ProjectError::NestedImport {
            location: import.location.clone(),
        }),
        Template::If(t) => {
            check_no_nested_imports(&t.then_body)?;
            for branch in &t.else_ifs {
                check_no_nested_imports(&branch.body)?;
            }
            check_no_nested_imports(&t.else_body)
        }
        Template::Foreach(t) => check_no_nested_imports(&t.body),
        Template::While(t) => check_no_nested_imports(&t.body),
        Template::OnData(t) => {
            check_no_nested_imports(&t.data_body)?;
            check_no_nested_imports(&t.error_body)
        }
        Template::Set(_) | Template::Inject(_) => Ok(()),
    }
}
