//! oxc-proj - Multi-file project orchestration
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Everything above a single document lives here:
//!
//! 1. FILE LOADER
//!    Canonical-path AST cache with a per-file size limit and an
//!    LRU-evicting total size limit.
//!
//! 2. PATH RESOLVER
//!    Relative and package resolution with mandatory security rules:
//!    allowed extensions, no control characters, and containment inside
//!    the project base directory.
//!
//! 3. IMPORT GRAPH
//!    Labelled dependency edges plus the runtime processing stack that
//!    refuses cycles and enforces the depth limit.
//!
//! 4. IMPORT / INJECT PROCESSING
//!    Imports merge tag definitions (optionally under an alias prefix);
//!    injects splice independently compiled files into the host tree.
//!
//! 5. PROJECT
//!    [`OxProject`] composes configuration, loader, graph, tag registry,
//!    and host registrations, and drives the full per-file pipeline from
//!    `oxc-lex` / `oxc-par` / `oxc-pre`.

pub mod config;
pub mod error;
pub mod graph;
pub mod imports;
pub mod injects;
pub mod loader;
pub mod paths;
pub mod project;

pub use config::{ProjectConfig, ProjectOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_FILE_SIZE};
pub use error::ProjectError;
pub use graph::{EdgeKind, ImportGraph};
pub use loader::{FileLoader, LoaderStats};
pub use paths::PathResolver;
pub use project::{OxProject, ParseResult};
