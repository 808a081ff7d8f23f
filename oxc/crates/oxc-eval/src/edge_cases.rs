//! Edge case tests for oxc-eval
