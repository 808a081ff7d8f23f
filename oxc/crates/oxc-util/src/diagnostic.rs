//! Diagnostic module - Error and warning aggregation.
//!
//! The OX pipeline is fail-fast: the first typed error aborts compilation
//! and surfaces to the caller. Tooling hosts (editors, linters) sometimes
//! want to gather several problems in one run instead; [`ErrorCollector`]
//! exists for them. The pipeline itself never silently continues past an
//! error.

use std::cell::RefCell;
use std::fmt;

use crate::Location;

/// Diagnostic severity level.
///
/// # Examples
///
/// ```
/// use oxc_util::Level;
///
/// assert_eq!(format!("{}", Level::Error), "error");
/// assert_eq!(format!("{}", Level::Warning), "warning");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that fails compilation.
    Error,
    /// A warning that does not fail compilation.
    Warning,
}

impl Level {
    /// Returns true for [`Level::Error`].
    pub fn is_error(self) -> bool {
        matches!(self, Level::Error)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic message.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity level.
    pub level: Level,
    /// Main message.
    pub message: String,
    /// Source location, when the diagnostic is source-derived.
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            location,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: {}: {}", loc, self.level, self.message),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

/// Collects diagnostics during compilation.
///
/// Interior mutability lets shared pipeline components report without
/// threading `&mut` through every call chain.
///
/// # Examples
///
/// ```
/// use oxc_util::ErrorCollector;
///
/// let collector = ErrorCollector::new();
/// collector.error("unexpected token", None);
/// assert!(collector.has_errors());
/// assert_eq!(collector.error_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ErrorCollector {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl ErrorCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(&self, message: impl Into<String>, location: Option<Location>) {
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::error(message, location));
    }

    /// Record a warning.
    pub fn warning(&self, message: impl Into<String>, location: Option<Location>) {
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::warning(message, location));
    }

    /// Record a prebuilt diagnostic.
    pub fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Returns true if any error-level diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level.is_error())
    }

    /// Number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level.is_error())
            .count()
    }

    /// Number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// Take all recorded diagnostics, leaving the collector empty.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    /// Clone out all recorded diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collector() {
        let collector = ErrorCollector::new();
        assert!(!collector.has_errors());
        assert_eq!(collector.error_count(), 0);
        assert_eq!(collector.warning_count(), 0);
    }

    #[test]
    fn test_errors_and_warnings() {
        let collector = ErrorCollector::new();
        collector.error("bad", None);
        collector.warning("iffy", None);
        collector.warning("also iffy", None);
        assert!(collector.has_errors());
        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 2);
    }

    #[test]
    fn test_take_drains() {
        let collector = ErrorCollector::new();
        collector.error("bad", None);
        let taken = collector.take();
        assert_eq!(taken.len(), 1);
        assert!(!collector.has_errors());
    }

    #[test]
    fn test_display_with_location() {
        let diag = Diagnostic::error("oops", Some(Location::new("a.ox", 2, 3)));
        assert_eq!(diag.to_string(), "a.ox:2:3: error: oops");
    }

    #[test]
    fn test_display_without_location() {
        let diag = Diagnostic::warning("hmm", None);
        assert_eq!(diag.to_string(), "warning: hmm");
    }
}
