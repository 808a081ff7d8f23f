//! Edge case tests for oxc-par
