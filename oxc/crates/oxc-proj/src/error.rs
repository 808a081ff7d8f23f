//! Project-level error types.

use std::path::PathBuf;

use oxc_lex::LexError;
use oxc_par::ParseError;
use oxc_pre::PreprocessError;
use oxc_util::Location;
use thiserror::Error;

/// Errors produced by multi-file orchestration: loading, path resolution,
/// import/inject processing, and configuration.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// A referenced file does not exist (or cannot be canonicalized).
    #[error("file not found: {path}", path = path.display())]
    FileNotFound { path: PathBuf },

    /// A path without an allowed source extension.
    #[error("invalid file extension: '{path}' (expected one of {})", allowed.join(", "))]
    InvalidFileExtension { path: String, allowed: Vec<String> },

    /// A file larger than the configured limit.
    #[error("file too large: {path} is {size} bytes (limit {max})", path = path.display())]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max: u64,
    },

    /// The AST cache exceeded its limit with eviction disabled.
    #[error("cache limit exceeded: {size} bytes cached (limit {max})")]
    CacheLimitExceeded { size: u64, max: u64 },

    /// A malformed path (empty, control characters, null bytes).
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A resolved path outside the allowed directory.
    #[error("path escape: {path} resolves outside {base}", path = path.display(), base = base.display())]
    PathEscape { path: PathBuf, base: PathBuf },

    /// An `<import>` below the document top level.
    #[error("{location}: imports are only allowed at the top level of a file")]
    NestedImport { location: Location },

    /// An `<inject>` anywhere other than the document top level or a
    /// direct block child.
    #[error("{location}: inject directives are only allowed at the top level or as a direct block child")]
    InvalidInjectLocation { location: Location },

    /// An import/inject cycle.
    #[error("circular dependency: {}", format_chain(cycle))]
    CircularDependency { cycle: Vec<PathBuf> },

    /// The import/inject stack exceeded the configured depth.
    #[error("maximum import depth {max} exceeded: {}", format_chain(chain))]
    MaxDepthExceeded { max: usize, chain: Vec<PathBuf> },

    /// An import alias that is not a valid identifier.
    #[error("{location}: invalid import alias '{alias}': {reason}")]
    InvalidAlias {
        alias: String,
        reason: String,
        location: Location,
    },

    /// Configuration file problems.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failures outside the typed cases above.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Lexical error in a loaded file.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Parse error in a loaded file.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Preprocessing error in a loaded file.
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_dependency_display() {
        let err = ProjectError::CircularDependency {
            cycle: vec![
                PathBuf::from("a.ox"),
                PathBuf::from("b.ox"),
                PathBuf::from("a.ox"),
            ],
        };
        assert_eq!(err.to_string(), "circular dependency: a.ox -> b.ox -> a.ox");
    }

    #[test]
    fn test_invalid_extension_display() {
        let err = ProjectError::InvalidFileExtension {
            path: "x.txt".into(),
            allowed: vec![".ox".into()],
        };
        assert_eq!(err.to_string(), "invalid file extension: 'x.txt' (expected one of .ox)");
    }
}
