//! Two-pass reference resolver.
//!
//! Pass 1 walks the expanded tree and builds a [`BlockRegistry`]: one
//! [`BlockContext`] per block, holding its parent link, its position among
//! its parent's children, its block children, and a snapshot of its
//! already-literal properties as runtime values. The tree itself stays
//! owned by `Block::children`; contexts refer to each other through arena
//! indices, never through shared ownership.
//!
//! Pass 2 revisits every property that is still an expression and
//! re-evaluates it with a resolver that understands `$this`, `$parent`
//! (chains included), `$Id` (forward references allowed), and
//! `children[i]` hops. Each resolved literal is written back into both the
//! tree and the registry snapshot, so acyclic reference chains resolve in
//! document order; cycles surface as `PropertyNotFound`.

use indexmap::IndexMap;
use oxc_eval::{evaluate, EvalError, PathSegment, RefPath, ReferenceResolver, Transaction};
use oxc_par::{Block, Node, PropValue};
use oxc_util::{Location, Value};
use rustc_hash::FxHashMap;

use crate::error::PreprocessError;

/// Index of a block context in the registry arena.
pub type BlockIdx = usize;

/// Everything Pass 2 needs to know about one block.
#[derive(Debug, Clone)]
pub struct BlockContext {
    /// Block id, if any.
    pub id: Option<String>,

    /// Arena index of the parent block; `None` for roots.
    pub parent: Option<BlockIdx>,

    /// Position of this block in its parent's `children` (counting every
    /// child node, free text included).
    pub index: usize,

    /// Child slots, in `children` order. `Some` for block children,
    /// `None` for free-text slots.
    pub children: Vec<Option<BlockIdx>>,

    /// Snapshot of properties already evaluated to literals.
    pub properties: IndexMap<String, Value>,

    /// Block location.
    pub location: Location,
}

/// Arena of block contexts built by Pass 1.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    contexts: Vec<BlockContext>,
    /// Arena indices of the top-level blocks, in document order.
    roots: Vec<BlockIdx>,
    /// First block per id, in document order.
    by_id: FxHashMap<String, BlockIdx>,
}

impl BlockRegistry {
    /// Pass 1: build the registry from the expanded top-level nodes.
    ///
    /// Blocks are numbered in document (pre-order) order; Pass 2 walks
    /// the tree in the same order to stay aligned with the arena.
    pub fn build(nodes: &[Node]) -> Self {
        let mut registry = BlockRegistry::default();
        for (index, node) in nodes.iter().enumerate() {
            if let Node::Block(block) = node {
                let idx = registry.add_block(block, None, index);
                registry.roots.push(idx);
            }
        }
        registry
    }

    fn add_block(&mut self, block: &Block, parent: Option<BlockIdx>, index: usize) -> BlockIdx {
        let idx = self.contexts.len();
        self.contexts.push(BlockContext {
            id: block.id.clone(),
            parent,
            index,
            children: Vec::with_capacity(block.children.len()),
            properties: literal_snapshot(block),
            location: block.location.clone(),
        });

        if let Some(id) = &block.id {
            // First block in document order wins.
            self.by_id.entry(id.clone()).or_insert(idx);
        }

        for (child_index, child) in block.children.iter().enumerate() {
            let slot = match child {
                Node::Block(child_block) => {
                    Some(self.add_block(child_block, Some(idx), child_index))
                }
                _ => None,
            };
            self.contexts[idx].children.push(slot);
        }
        idx
    }

    /// The context at an arena index.
    pub fn context(&self, idx: BlockIdx) -> &BlockContext {
        &self.contexts[idx]
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// First block with the given id, in document order.
    pub fn find_by_id(&self, id: &str) -> Option<BlockIdx> {
        self.by_id.get(id).copied()
    }

    /// Sibling of a block by id or by position among the parent's
    /// children.
    pub fn find_sibling(&self, of: BlockIdx, selector: &SiblingSelector) -> Option<BlockIdx> {
        let siblings: Vec<Option<BlockIdx>> = match self.contexts[of].parent {
            Some(parent) => self.contexts[parent].children.clone(),
            None => self.roots.iter().map(|&idx| Some(idx)).collect(),
        };
        match selector {
            SiblingSelector::Id(id) => siblings.into_iter().flatten().find(|&idx| {
                self.contexts[idx].id.as_deref() == Some(id.as_str())
            }),
            SiblingSelector::Index(position) => {
                siblings.get(*position).copied().flatten()
            }
        }
    }

    fn resolved_property(&self, idx: BlockIdx, name: &str) -> Option<Value> {
        self.contexts[idx].properties.get(name).cloned()
    }

    fn record_resolved(&mut self, idx: BlockIdx, name: &str, value: Value) {
        self.contexts[idx]
            .properties
            .insert(name.to_string(), value);
    }
}

/// Sibling lookup selector: by id or by position.
#[derive(Debug, Clone)]
pub enum SiblingSelector {
    /// Match the sibling's id.
    Id(String),
    /// Match the sibling's position in the parent's children.
    Index(usize),
}

/// Snapshot the block's already-literal properties as runtime values.
fn literal_snapshot(block: &Block) -> IndexMap<String, Value> {
    block
        .properties
        .iter()
        .filter_map(|(key, value)| value.to_value().map(|v| (key.clone(), v)))
        .collect()
}

/// Pass 2: resolve every remaining expression property in place.
pub fn resolve_references(
    nodes: &mut [Node],
    registry: &mut BlockRegistry,
    txn: &Transaction,
    file: &str,
) -> Result<(), PreprocessError> {
    let mut counter = 0usize;
    for node in nodes.iter_mut() {
        if let Node::Block(block) = node {
            resolve_block(block, &mut counter, registry, txn, file)?;
        }
    }
    Ok(())
}

/// Resolve one block's properties, then recurse. `counter` follows the
/// same pre-order numbering Pass 1 used.
fn resolve_block(
    block: &mut Block,
    counter: &mut usize,
    registry: &mut BlockRegistry,
    txn: &Transaction,
    file: &str,
) -> Result<(), PreprocessError> {
    let idx = *counter;
    *counter += 1;

    // Properties in source order.
    let keys: Vec<String> = block.properties.keys().cloned().collect();
    for key in keys {
        let value = block.properties[&key].clone();
        if !value.contains_expression() {
            continue;
        }
        let resolved = resolve_prop_value(value, idx, registry, txn, file)?;
        if let Some(runtime) = resolved.to_value() {
            registry.record_resolved(idx, &key, runtime);
        }
        block.properties.insert(key, resolved);
    }

    for child in block.children.iter_mut() {
        if let Node::Block(child_block) = child {
            resolve_block(child_block, counter, registry, txn, file)?;
        }
    }
    Ok(())
}

fn resolve_prop_value(
    value: PropValue,
    idx: BlockIdx,
    registry: &BlockRegistry,
    txn: &Transaction,
    file: &str,
) -> Result<PropValue, PreprocessError> {
    match value {
        PropValue::Expression(expr) => {
            let mut resolver = RegistryResolver {
                registry,
                current: idx,
            };
            let runtime = evaluate(&expr.tokens, file, txn, &mut resolver)?;
            Ok(PropValue::from_value(runtime))
        }
        PropValue::Array(items) => {
            let resolved = items
                .into_iter()
                .map(|item| resolve_prop_value(item, idx, registry, txn, file))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PropValue::Array(resolved))
        }
        literal => Ok(literal),
    }
}

/// The registry-backed reference resolver used by Pass 2.
struct RegistryResolver<'r> {
    registry: &'r BlockRegistry,
    current: BlockIdx,
}

/// Intermediate state while walking a reference path.
enum Cursor {
    Block(BlockIdx),
    Value(Value),
}

impl ReferenceResolver for RegistryResolver<'_> {
    fn resolve(&mut self, path: &RefPath, location: &Location) -> Result<Value, EvalError> {
        let rendered = path.to_string();

        let mut cursor = match path.base.as_str() {
            "this" => Cursor::Block(self.current),
            "parent" => match self.registry.context(self.current).parent {
                Some(parent) => Cursor::Block(parent),
                None => {
                    return Err(EvalError::NoParentBlock {
                        path: rendered,
                        location: location.clone(),
                    })
                }
            },
            id => match self.registry.find_by_id(id) {
                Some(idx) => Cursor::Block(idx),
                None => {
                    return Err(EvalError::BlockNotFound {
                        id: id.to_string(),
                        path: rendered,
                        location: location.clone(),
                    })
                }
            },
        };

        let mut segments = path.segments.iter().peekable();
        while let Some(segment) = segments.next() {
            cursor = match (cursor, segment) {
                (Cursor::Block(idx), PathSegment::Name(name)) => match name.as_str() {
                    "parent" => match self.registry.context(idx).parent {
                        Some(parent) => Cursor::Block(parent),
                        None => {
                            return Err(EvalError::NoParentBlock {
                                path: rendered,
                                location: location.clone(),
                            })
                        }
                    },
                    "children" => {
                        let index = match segments.next() {
                            Some(PathSegment::Index(index)) => *index,
                            _ => {
                                return Err(EvalError::InvalidReference {
                                    path: rendered,
                                    reason: "'children' must be indexed".to_string(),
                                    location: location.clone(),
                                })
                            }
                        };
                        let children = &self.registry.context(idx).children;
                        match children.get(index) {
                            Some(Some(child)) => Cursor::Block(*child),
                            Some(None) => {
                                return Err(EvalError::InvalidReference {
                                    path: rendered,
                                    reason: format!("child {index} is not a block"),
                                    location: location.clone(),
                                })
                            }
                            None => {
                                return Err(EvalError::IndexOutOfRange {
                                    index,
                                    length: children.len(),
                                    location: location.clone(),
                                })
                            }
                        }
                    }
                    property => match self.registry.resolved_property(idx, property) {
                        Some(value) => Cursor::Value(value),
                        None => {
                            return Err(EvalError::PropertyNotFound {
                                property: property.to_string(),
                                path: rendered,
                                location: location.clone(),
                            })
                        }
                    },
                },
                (Cursor::Block(_), PathSegment::Index(_)) => {
                    return Err(EvalError::InvalidReference {
                        path: rendered,
                        reason: "a block cannot be indexed directly".to_string(),
                        location: location.clone(),
                    })
                }
                (Cursor::Value(value), segment) => {
                    Cursor::Value(oxc_eval::access(&value, segment, location)?)
                }
            };
        }

        match cursor {
            Cursor::Value(value) => Ok(value),
            Cursor::Block(_) => Err(EvalError::IncompleteReference {
                path: rendered,
                location: location.clone(),
            }),
        }
    }
}
