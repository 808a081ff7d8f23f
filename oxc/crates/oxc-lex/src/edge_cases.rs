//! Edge case tests for oxc-lex
