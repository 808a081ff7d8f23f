//! oxc-pre - The OX preprocessor
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The preprocessor turns a raw parsed [`Document`] into a tree of blocks
//! whose properties are all literals. For one document the phases run in
//! this order:
//!
//! ```text
//! [Tag Definitions] ──▶ registry populated, can_output=false blocks dropped
//!        │
//!        ▼
//! [Instance Validation] ──▶ every #tag resolves to a definition
//!        │
//!        ▼
//! [Data-Source Plan + Execute] ──▶ levelled fetch, results memoised
//!        │
//!        ▼
//! [Template Expansion] ──▶ set/if/foreach/while/on-data, instance
//!        │                 expansion, macro onWalk per block
//!        ▼
//! [Reference Resolution] ──▶ two passes: registry build, then $-property
//!        │                   evaluation written back in place
//!        ▼
//!   compiled nodes (blocks + free text; injects still inline for the
//!   project layer to splice)
//! ```
//!
//! Import and inject processing are multi-file concerns and live in
//! `oxc-proj`; [`preprocess`] covers everything in between for a single
//! document.

pub mod datasource;
mod edge_cases;
pub mod error;
pub mod expand;
pub mod macros;
pub mod resolve;
pub mod tags;
pub mod walk;

use oxc_eval::Transaction;
use oxc_par::Document;
use oxc_par::Node;

pub use datasource::{build_plan, execute_plan, ExecutionPlan, PlannedSource};
pub use error::{MacroError, PreprocessError};
pub use expand::{Expander, WalkCursor, WHILE_LOOP_LIMIT};
pub use macros::{MacroHooks, ParseContext, ParseHook, WalkHook};
pub use resolve::{
    resolve_references, BlockContext, BlockIdx, BlockRegistry, SiblingSelector,
};
pub use tags::{expand_instances, TagDescriptor, TagRegistry};
pub use walk::{
    find_all_nodes, find_by_property, find_by_tag, find_node, get_ancestors, walk,
    WalkContext, WalkControl, WalkOptions, WalkOrder,
};

/// Preprocess one parsed document end to end (tags, data sources,
/// expansion, reference resolution).
///
/// Inject directives pass through inline for the project layer; import
/// directives must already have been handled.
pub fn preprocess(
    mut doc: Document,
    txn: &mut Transaction,
    registry: &mut TagRegistry,
    hooks: MacroHooks,
    file: &str,
) -> Result<Vec<Node>, PreprocessError> {
    registry.process_definitions(&mut doc.blocks)?;
    registry.validate_instances(&doc.blocks)?;

    let plan = build_plan(&doc, txn)?;
    execute_plan(&plan, txn);

    let mut nodes = Expander::new(txn, registry, file)
        .with_hooks(hooks)
        .expand(doc)?;

    let mut block_registry = BlockRegistry::build(&nodes);
    resolve_references(&mut nodes, &mut block_registry, txn, file)?;

    Ok(nodes)
}
