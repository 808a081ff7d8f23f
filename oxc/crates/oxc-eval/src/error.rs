//! Evaluation and data-source error types.

use oxc_util::{Location, Value};
use thiserror::Error;

/// Errors produced while evaluating an expression.
///
/// The reference-shaped variants (`NoParentBlock` through
/// `InvalidReference`) are raised through the [`crate::ReferenceResolver`]
/// seam during Pass 2 of reference resolution; they carry the rendered
/// reference path for diagnosis.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    /// A variable name with no binding in scope.
    #[error("{location}: undefined variable '{name}'")]
    UndefinedVariable { name: String, location: Location },

    /// Member access on an object that lacks the property.
    #[error("{location}: undefined property '{name}'")]
    UndefinedProperty { name: String, location: Location },

    /// A call to a host function that was never registered.
    #[error("{location}: undefined function '{name}'")]
    UndefinedFunction { name: String, location: Location },

    /// Division or modulo with a zero divisor.
    #[error("{location}: division by zero")]
    DivisionByZero { location: Location },

    /// Member access or indexing on null.
    #[error("{location}: member access on null")]
    NullMemberAccess { location: Location },

    /// Array index outside `0..len`.
    #[error("{location}: index {index} out of range (length {length})")]
    IndexOutOfRange {
        index: usize,
        length: usize,
        location: Location,
    },

    /// An operator applied to an operand of the wrong type.
    #[error("{location}: operator '{op}' cannot be applied to {type_name}")]
    InvalidOperandType {
        op: String,
        type_name: String,
        location: Location,
    },

    /// A `$`-reference in a context where references are not available.
    #[error("{location}: unresolved reference '{path}'")]
    UnresolvedReference { path: String, location: Location },

    /// `$parent` walked past the document root.
    #[error("{location}: reference '{path}' has no parent block")]
    NoParentBlock { path: String, location: Location },

    /// `$Id` that matches no block in the document.
    #[error("{location}: block '{id}' not found (in reference '{path}')")]
    BlockNotFound {
        id: String,
        path: String,
        location: Location,
    },

    /// A property access on a block that has no such property.
    #[error("{location}: property '{property}' not found (in reference '{path}')")]
    PropertyNotFound {
        property: String,
        path: String,
        location: Location,
    },

    /// A reference that ends at a block instead of a value.
    #[error("{location}: incomplete reference '{path}' (ends at a block)")]
    IncompleteReference { path: String, location: Location },

    /// A reference shape the resolver cannot interpret.
    #[error("{location}: invalid reference '{path}': {reason}")]
    InvalidReference {
        path: String,
        reason: String,
        location: Location,
    },

    /// The token stream ended mid-expression.
    #[error("{location}: unexpected end of expression")]
    UnexpectedEnd { location: Location },

    /// A token that cannot appear at this point of an expression.
    #[error("{location}: unexpected token {found} in expression")]
    UnexpectedToken { found: String, location: Location },
}

impl EvalError {
    /// The location the error cites.
    pub fn location(&self) -> &Location {
        match self {
            EvalError::UndefinedVariable { location, .. }
            | EvalError::UndefinedProperty { location, .. }
            | EvalError::UndefinedFunction { location, .. }
            | EvalError::DivisionByZero { location }
            | EvalError::NullMemberAccess { location }
            | EvalError::IndexOutOfRange { location, .. }
            | EvalError::InvalidOperandType { location, .. }
            | EvalError::UnresolvedReference { location, .. }
            | EvalError::NoParentBlock { location, .. }
            | EvalError::BlockNotFound { location, .. }
            | EvalError::PropertyNotFound { location, .. }
            | EvalError::IncompleteReference { location, .. }
            | EvalError::InvalidReference { location, .. }
            | EvalError::UnexpectedEnd { location }
            | EvalError::UnexpectedToken { location, .. } => location,
        }
    }
}

/// Errors produced by data-source providers and the fetch machinery.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataSourceError {
    /// The provider did not answer within the configured timeout.
    #[error("data source '{source_name}' timed out after {timeout_ms} ms")]
    Timeout {
        source_name: String,
        timeout_ms: u64,
        timestamp: u64,
    },

    /// The provider returned an error.
    #[error("data source '{source_name}' failed: {message}")]
    Provider {
        source_name: String,
        message: String,
        code: Option<String>,
        timestamp: u64,
    },

    /// A fetch was requested for a name with no registered provider.
    #[error("data source '{source_name}' is not registered")]
    Unknown { source_name: String },
}

impl DataSourceError {
    /// Build a provider error stamped with the current time.
    pub fn provider(
        source: impl Into<String>,
        message: impl Into<String>,
        code: Option<String>,
    ) -> Self {
        DataSourceError::Provider {
            source_name: source.into(),
            message: message.into(),
            code,
            timestamp: now_millis(),
        }
    }

    /// The source name this error belongs to.
    pub fn source_name(&self) -> &str {
        match self {
            DataSourceError::Timeout { source_name, .. }
            | DataSourceError::Provider { source_name, .. }
            | DataSourceError::Unknown { source_name } => source_name,
        }
    }

    /// Render as the `$error` object bound inside `<on-error>` bodies:
    /// `{message, code?, timestamp, source}`.
    pub fn to_value(&self) -> Value {
        let mut map = indexmap::IndexMap::new();
        match self {
            DataSourceError::Timeout {
                source_name,
                timeout_ms,
                timestamp,
            } => {
                map.insert(
                    "message".to_string(),
                    Value::Str(format!("timed out after {timeout_ms} ms")),
                );
                map.insert("code".to_string(), Value::Str("TIMEOUT".to_string()));
                map.insert("timestamp".to_string(), Value::Number(*timestamp as f64));
                map.insert("source".to_string(), Value::Str(source_name.clone()));
            }
            DataSourceError::Provider {
                source_name,
                message,
                code,
                timestamp,
            } => {
                map.insert("message".to_string(), Value::Str(message.clone()));
                if let Some(code) = code {
                    map.insert("code".to_string(), Value::Str(code.clone()));
                }
                map.insert("timestamp".to_string(), Value::Number(*timestamp as f64));
                map.insert("source".to_string(), Value::Str(source_name.clone()));
            }
            DataSourceError::Unknown { source_name } => {
                map.insert("message".to_string(), Value::Str(self.to_string()));
                map.insert("source".to_string(), Value::Str(source_name.clone()));
            }
        }
        Value::Object(map)
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
