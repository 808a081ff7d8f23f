//! oxc-util - Shared infrastructure for the OX compiler
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! This crate hosts the types every other `oxc-*` crate needs:
//!
//! 1. SOURCE LOCATIONS
//!    - `Location`: file/line/column triple attached to tokens, AST nodes,
//!      and every source-derived error.
//!
//! 2. RUNTIME VALUES
//!    - `Value`: the dynamic value domain of the OX expression language
//!      (null, booleans, numbers, strings, arrays, objects). Used by the
//!      expression evaluator, the transaction variable store, data-source
//!      providers, and module property injection.
//!
//! 3. DIAGNOSTICS
//!    - `Level`, `Diagnostic`, `ErrorCollector`: aggregation of compile
//!      errors and warnings for tooling. The default pipeline is fail-fast
//!      and reports single typed errors; the collector exists for hosts
//!      that want to gather everything in one pass.
//!
//! The crate deliberately has no knowledge of tokens, AST shapes, or the
//! pipeline. Higher tiers (`oxc-lex`, `oxc-par`, ...) depend on it; it
//! depends on nothing internal.

pub mod diagnostic;
pub mod location;
pub mod value;

pub use diagnostic::{Diagnostic, ErrorCollector, Level};
pub use location::Location;
pub use value::Value;
