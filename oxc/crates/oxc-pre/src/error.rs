//! Preprocessing error types.

use oxc_eval::{DataSourceError, EvalError};
use oxc_util::Location;
use thiserror::Error;

/// Errors produced while preprocessing a parsed document.
#[derive(Debug, Clone, Error)]
pub enum PreprocessError {
    /// Expression evaluation failed. Covers the arithmetic, scope, and
    /// reference failures raised by `oxc-eval`.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// `<foreach>` over something that is not an array.
    #[error("{location}: foreach collection '{name}' is {type_name}, not an array")]
    ForeachCollectionNotArray {
        name: String,
        type_name: String,
        location: Location,
    },

    /// `<while>` exceeded the iteration cap.
    #[error("{location}: while loop exceeded {limit} iterations")]
    WhileLoopLimit { limit: usize, location: Location },

    /// A tag definition block carries an unevaluated expression property.
    #[error("{location}: tag definition '{tag}' has an expression property '{property}'")]
    TagDefinitionHasExpression {
        tag: String,
        property: String,
        location: Location,
    },

    /// Two definitions registered under the same key.
    #[error("{location}: duplicate tag definition '{key}'")]
    DuplicateTagDefinition { key: String, location: Location },

    /// A tag that is not declared in the registry, or an instance of an
    /// unregistered definition.
    #[error("{location}: undefined tag '{key}'")]
    UndefinedTag { key: String, location: Location },

    /// A user property collides with an injected module property.
    #[error("{location}: property '{property}' conflicts with module property of tag '{tag}'")]
    ModulePropertyConflict {
        tag: String,
        property: String,
        location: Location,
    },

    /// A multi-instance composition block carries its own properties.
    #[error("{location}: a composition block cannot declare properties")]
    CompositionHasProperties { location: Location },

    /// A multi-instance composition block carries its own children.
    #[error("{location}: a composition block cannot declare children")]
    CompositionHasChildren { location: Location },

    /// `<on-data>` names with no registered provider.
    #[error("{location}: undefined data sources: {}", names.join(", "))]
    UndefinedDataSource {
        names: Vec<String>,
        location: Location,
    },

    /// A data-source failure that surfaced outside an `<on-error>` path.
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    /// A macro callback failed.
    #[error(transparent)]
    Macro(#[from] MacroError),
}

/// Errors raised by or through user macro callbacks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MacroError {
    /// A bare message, as produced by `throw_error` or a panicking host
    /// callback before hook context is attached.
    #[error("{0}")]
    Message(String),

    /// A message wrapped with the hook and block it came from.
    #[error("Error in {hook} for block '{block}': {message}")]
    Hook {
        hook: String,
        block: String,
        message: String,
    },
}

impl MacroError {
    /// Attach hook context to a bare message; already-contextualised
    /// errors pass through unchanged.
    pub fn in_hook(self, hook: &str, block: &str) -> MacroError {
        match self {
            MacroError::Message(message) => MacroError::Hook {
                hook: hook.to_string(),
                block: block.to_string(),
                message,
            },
            already => already,
        }
    }
}
