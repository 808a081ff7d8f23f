//! Location module - Source position tracking.
//!
//! This module provides the [`Location`] type that identifies a position in
//! an OX source file. Locations are attached to tokens, AST nodes, and all
//! source-derived errors.

use std::fmt;
use std::sync::Arc;

/// A position in an OX source file.
///
/// A `Location` identifies where a token or node came from:
/// - The file name (shared, cheaply clonable)
/// - Line number (1-based)
/// - Column number (1-based, in characters)
///
/// # Examples
///
/// ```
/// use oxc_util::Location;
///
/// let loc = Location::new("main.ox", 3, 14);
/// assert_eq!(loc.to_string(), "main.ox:3:14");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Source file name.
    pub file: Arc<str>,
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based).
    pub column: u32,
}

impl Location {
    /// Create a new location.
    ///
    /// # Examples
    ///
    /// ```
    /// use oxc_util::Location;
    ///
    /// let loc = Location::new("main.ox", 1, 1);
    /// assert_eq!(loc.line, 1);
    /// ```
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Create a location at the start of a file.
    pub fn start_of(file: impl Into<Arc<str>>) -> Self {
        Self::new(file, 1, 1)
    }

    /// A placeholder location for synthesized nodes and tests.
    ///
    /// # Examples
    ///
    /// ```
    /// use oxc_util::Location;
    ///
    /// let loc = Location::dummy();
    /// assert_eq!(loc.file.as_ref(), "<unknown>");
    /// ```
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0, 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_location() {
        let loc = Location::new("a.ox", 2, 7);
        assert_eq!(loc.file.as_ref(), "a.ox");
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 7);
    }

    #[test]
    fn test_display() {
        let loc = Location::new("src/main.ox", 10, 3);
        assert_eq!(loc.to_string(), "src/main.ox:10:3");
    }

    #[test]
    fn test_cheap_clone_shares_file() {
        let loc = Location::new("main.ox", 1, 1);
        let other = loc.clone();
        assert!(Arc::ptr_eq(&loc.file, &other.file));
    }

    #[test]
    fn test_start_of() {
        let loc = Location::start_of("main.ox");
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 1);
    }
}
