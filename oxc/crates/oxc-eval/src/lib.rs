//! oxc-eval - Expression evaluation and the transaction store
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Two tightly-coupled pieces live here:
//!
//! 1. THE EXPRESSION EVALUATOR
//!    A precedence-climbing interpreter over the token slices captured by
//!    the parser. Operator precedence, loosest to tightest:
//!
//!    ```text
//!    ||  >  &&  >  == !=  >  < <= > >=  >  + -  >  * / %  >  ** (right)
//!    >  unary - !  >  primary
//!    ```
//!
//!    Primaries: literals, parenthesised subexpressions, variable paths
//!    (`ident.member[0]`), host function calls (`name(args…)`), and
//!    `$`-references. References are not interpreted here: the evaluator
//!    hands the collected path to a [`ReferenceResolver`], which is the
//!    seam between Pass 1 (no references allowed) and Pass 2 (the block
//!    registry resolves them).
//!
//! 2. THE TRANSACTION
//!    The scoped store a document compiles against: variables with
//!    snapshot/restore discipline, a host function table, and data-source
//!    providers with memoised results, memoised errors, and per-source
//!    timeouts. Providers run on spawned threads and are awaited through
//!    crossbeam channels so a whole plan level can be fetched
//!    concurrently.

mod edge_cases;
pub mod error;
pub mod eval;
pub mod transaction;

pub use error::{DataSourceError, EvalError};
pub use eval::{
    access, contains_reference, evaluate, Evaluator, NullResolver, PathSegment, RefPath,
    ReferenceResolver,
};
pub use transaction::{DataProvider, HostFunction, Transaction, DEFAULT_FETCH_TIMEOUT_MS};
