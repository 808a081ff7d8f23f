//! Tag registry and tag processing.
//!
//! Three operations run in order during preprocessing:
//!
//! 1. Definitions: top-level blocks whose tags are all `@definitions` are
//!    validated and registered under `name(argument)` / `name` keys.
//!    Definitions whose descriptor declares `can_output = false` are
//!    removed from the output tree.
//! 2. Instance validation: every `#instance` key must resolve to a
//!    registered definition.
//! 3. Instance expansion: performed by the template expander per block -
//!    a single-instance block deep-clones its definition and overlays the
//!    user's properties; a multi-instance block becomes a synthetic parent
//!    with one expanded child per tag.
//!
//! A tag descriptor may also declare module properties: host-side getters
//! whose values are injected into every instance-tagged block before the
//! user's own properties are validated.

use std::sync::Arc;

use indexmap::IndexMap;
use oxc_par::{Block, Literal, Node, PropValue, Tag, TagKind, Template};
use oxc_util::Value;
use rustc_hash::FxHashMap;

use crate::error::PreprocessError;

/// A host-side getter for an injected module property.
pub type ModuleGetter = Arc<dyn Fn() -> Value + Send + Sync>;

/// Host-declared description of a tag.
#[derive(Clone)]
pub struct TagDescriptor {
    /// Tag name (without alias prefix).
    pub name: String,

    /// Whether definition blocks carrying this tag stay in the output.
    pub can_output: bool,

    /// Module properties injected into instance-tagged blocks, in
    /// declaration order. Getters run once per occurrence.
    pub module: Vec<(String, ModuleGetter)>,
}

impl TagDescriptor {
    /// Declare a tag that keeps its definition blocks in the output.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            can_output: true,
            module: Vec::new(),
        }
    }

    /// Set whether definition blocks stay in the output.
    pub fn can_output(mut self, can_output: bool) -> Self {
        self.can_output = can_output;
        self
    }

    /// Add a module property getter.
    pub fn module_property<F>(mut self, property: impl Into<String>, getter: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.module.push((property.into(), Arc::new(getter)));
        self
    }
}

impl std::fmt::Debug for TagDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagDescriptor")
            .field("name", &self.name)
            .field("can_output", &self.can_output)
            .field(
                "module",
                &self.module.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Registry of declared tags and registered definitions.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    /// Host-declared descriptors, by bare tag name.
    descriptors: FxHashMap<String, TagDescriptor>,

    /// Registered definition blocks, by `name(argument)` / `name` key.
    /// Insertion order is kept for deterministic diagnostics.
    definitions: IndexMap<String, Block>,
}

impl TagRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a tag.
    pub fn declare(&mut self, descriptor: TagDescriptor) {
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }

    /// Look up a descriptor by tag name. Alias prefixes are ignored:
    /// `ui.button` resolves the descriptor declared for `button`.
    pub fn descriptor(&self, name: &str) -> Option<&TagDescriptor> {
        self.descriptors.get(base_name(name))
    }

    /// Whether a tag name is declared.
    pub fn is_declared(&self, name: &str) -> bool {
        self.descriptor(name).is_some()
    }

    /// Register a definition; duplicate keys fail.
    pub fn define(&mut self, key: String, block: Block) -> Result<(), PreprocessError> {
        if self.definitions.contains_key(&key) {
            return Err(PreprocessError::DuplicateTagDefinition {
                key,
                location: block.location,
            });
        }
        self.definitions.insert(key, block);
        Ok(())
    }

    /// Register a definition, overwriting any previous entry. Used for
    /// import merging, where later definitions win.
    pub fn redefine(&mut self, key: String, block: Block) {
        self.definitions.insert(key, block);
    }

    /// Look up a definition by key.
    pub fn definition(&self, key: &str) -> Option<&Block> {
        self.definitions.get(key)
    }

    /// All registered definition keys, in registration order.
    pub fn definition_keys(&self) -> Vec<&String> {
        self.definitions.keys().collect()
    }

    /// Merge extracted definitions, optionally under an alias prefix.
    /// Unaliased key collisions follow last-write-wins.
    pub fn merge_definitions(&mut self, definitions: IndexMap<String, Block>, alias: Option<&str>) {
        for (key, block) in definitions {
            let key = match alias {
                Some(alias) => format!("{alias}.{key}"),
                None => key,
            };
            self.redefine(key, block);
        }
    }

    /// Process the definition blocks of a document's top level: validate,
    /// register, and drop blocks whose descriptors say `can_output = false`.
    pub fn process_definitions(&mut self, blocks: &mut Vec<Node>) -> Result<(), PreprocessError> {
        let mut kept = Vec::with_capacity(blocks.len());
        for node in blocks.drain(..) {
            match node {
                Node::Block(block) if is_definition_block(&block) => {
                    let keep = self.register_definition_block(&block)?;
                    if keep {
                        kept.push(Node::Block(block));
                    }
                }
                other => kept.push(other),
            }
        }
        *blocks = kept;
        Ok(())
    }

    /// Extract definition blocks without mutating the registry. Used by
    /// the import processor; duplicates within one file fail.
    pub fn extract_definitions(
        &self,
        blocks: &[Node],
    ) -> Result<IndexMap<String, Block>, PreprocessError> {
        let mut definitions = IndexMap::new();
        for node in blocks {
            let block = match node {
                Node::Block(block) if is_definition_block(block) => block,
                _ => continue,
            };
            validate_definition_block(self, block)?;
            for tag in &block.tags {
                let key = tag.key();
                if definitions.contains_key(&key) {
                    return Err(PreprocessError::DuplicateTagDefinition {
                        key,
                        location: tag.location.clone(),
                    });
                }
                definitions.insert(key, stored_definition(block));
            }
        }
        Ok(definitions)
    }

    /// Register one definition block under all of its tag keys. Returns
    /// whether the block stays in the output.
    fn register_definition_block(&mut self, block: &Block) -> Result<bool, PreprocessError> {
        validate_definition_block(self, block)?;
        let mut keep = true;
        for tag in &block.tags {
            // Validated above, so the descriptor exists.
            if let Some(descriptor) = self.descriptor(&tag.name) {
                keep &= descriptor.can_output;
            }
            let stored = stored_definition(block);
            if self.definitions.contains_key(&tag.key()) {
                return Err(PreprocessError::DuplicateTagDefinition {
                    key: tag.key(),
                    location: tag.location.clone(),
                });
            }
            self.definitions.insert(tag.key(), stored);
        }
        Ok(keep)
    }

    /// Validate that every instance tag in the tree resolves to a
    /// registered definition.
    pub fn validate_instances(&self, blocks: &[Node]) -> Result<(), PreprocessError> {
        for node in blocks {
            self.validate_instances_in_node(node)?;
        }
        Ok(())
    }

    fn validate_instances_in_node(&self, node: &Node) -> Result<(), PreprocessError> {
        match node {
            Node::Block(block) => {
                for tag in &block.tags {
                    if tag.kind == TagKind::Instance && self.definition(&tag.key()).is_none() {
                        return Err(PreprocessError::UndefinedTag {
                            key: tag.key(),
                            location: tag.location.clone(),
                        });
                    }
                }
                self.validate_instances(&block.children)
            }
            Node::FreeText(_) => Ok(()),
            Node::Template(template) => match template {
                Template::If(t) => {
                    self.validate_instances(&t.then_body)?;
                    for branch in &t.else_ifs {
                        self.validate_instances(&branch.body)?;
                    }
                    self.validate_instances(&t.else_body)
                }
                Template::Foreach(t) => self.validate_instances(&t.body),
                Template::While(t) => self.validate_instances(&t.body),
                Template::OnData(t) => {
                    self.validate_instances(&t.data_body)?;
                    self.validate_instances(&t.error_body)
                }
                Template::Set(_) | Template::Import(_) | Template::Inject(_) => Ok(()),
            },
        }
    }
}

/// True if the block carries tags and they are all definitions.
pub fn is_definition_block(block: &Block) -> bool {
    !block.tags.is_empty() && block.tags.iter().all(|t| t.kind == TagKind::Definition)
}

fn validate_definition_block(registry: &TagRegistry, block: &Block) -> Result<(), PreprocessError> {
    for tag in &block.tags {
        if !registry.is_declared(&tag.name) {
            return Err(PreprocessError::UndefinedTag {
                key: tag.name.clone(),
                location: tag.location.clone(),
            });
        }
        if let Some((property, _)) = block
            .properties
            .iter()
            .find(|(_, value)| value.contains_expression())
        {
            return Err(PreprocessError::TagDefinitionHasExpression {
                tag: tag.key(),
                property: property.clone(),
                location: block.location.clone(),
            });
        }
    }
    Ok(())
}

/// The form a definition is stored in: the block with its tags cleared.
fn stored_definition(block: &Block) -> Block {
    let mut stored = block.clone();
    stored.tags.clear();
    stored
}

/// Expand the instance tags of a block against the registry.
///
/// Module properties are injected first. A single-instance block
/// deep-clones its definition and overlays the user's properties and
/// children; a multi-instance block (composition) must carry neither and
/// becomes a synthetic parent with one expanded child per tag, each child
/// named `<parentId>_<tagArg>`.
pub fn expand_instances(
    block: Block,
    registry: &TagRegistry,
) -> Result<Block, PreprocessError> {
    debug_assert!(block.tags.iter().all(|t| t.kind == TagKind::Instance));

    if block.tags.len() > 1 {
        expand_composition(block, registry)
    } else {
        expand_single(block, registry)
    }
}

fn expand_single(mut block: Block, registry: &TagRegistry) -> Result<Block, PreprocessError> {
    let tag = block.tags.remove(0);
    inject_module_properties(&mut block, &tag, registry, true)?;

    let definition = registry
        .definition(&tag.key())
        .ok_or_else(|| PreprocessError::UndefinedTag {
            key: tag.key(),
            location: tag.location.clone(),
        })?;

    let mut expanded = definition.clone();
    // User properties win over inherited definition properties.
    for (key, value) in block.properties {
        expanded.properties.insert(key, value);
    }
    if !block.children.is_empty() {
        expanded.children = block.children;
    }
    expanded.id = block.id;
    expanded.tags.clear();
    expanded.location = block.location;
    Ok(expanded)
}

fn expand_composition(block: Block, registry: &TagRegistry) -> Result<Block, PreprocessError> {
    if !block.properties.is_empty() {
        return Err(PreprocessError::CompositionHasProperties {
            location: block.location,
        });
    }
    if !block.children.is_empty() {
        return Err(PreprocessError::CompositionHasChildren {
            location: block.location,
        });
    }

    let mut parent = Block::new(block.id.clone(), block.location.clone());
    for tag in &block.tags {
        let definition =
            registry
                .definition(&tag.key())
                .ok_or_else(|| PreprocessError::UndefinedTag {
                    key: tag.key(),
                    location: tag.location.clone(),
                })?;
        let mut child = definition.clone();
        inject_module_properties(&mut child, tag, registry, false)?;
        child.id = Some(compose_child_id(block.id.as_deref(), tag));
        child.tags.clear();
        parent.children.push(Node::Block(child));
    }
    Ok(parent)
}

/// Child id for composition: `<parentId>_<tagArg>`.
fn compose_child_id(parent_id: Option<&str>, tag: &Tag) -> String {
    let suffix = tag
        .argument
        .clone()
        .unwrap_or_else(|| base_name(&tag.name).to_string());
    match parent_id {
        Some(parent) => format!("{parent}_{suffix}"),
        None => suffix,
    }
}

/// Inject the module properties declared by the tag's descriptor.
///
/// With `strict` set, an existing property under a module name is a
/// conflict (the user wrote it); otherwise the injected value replaces it
/// (composition children overlay their definition's copy).
fn inject_module_properties(
    block: &mut Block,
    tag: &Tag,
    registry: &TagRegistry,
    strict: bool,
) -> Result<(), PreprocessError> {
    let descriptor = match registry.descriptor(&tag.name) {
        Some(descriptor) => descriptor,
        None => return Ok(()),
    };

    for (property, getter) in &descriptor.module {
        if strict && block.properties.contains_key(property) {
            return Err(PreprocessError::ModulePropertyConflict {
                tag: tag.key(),
                property: property.clone(),
                location: block.location.clone(),
            });
        }
        let value = getter();
        block
            .properties
            .insert(property.clone(), module_value_to_prop(value));
    }
    Ok(())
}

/// Convert an injected module value into a property value: objects become
/// string literals carrying their canonical JSON, arrays become array
/// nodes, other primitives become matching literals.
fn module_value_to_prop(value: Value) -> PropValue {
    match value {
        Value::Object(_) => PropValue::Literal(Literal::Str(value.to_canonical_json())),
        Value::Array(items) => {
            PropValue::Array(items.into_iter().map(module_value_to_prop).collect())
        }
        Value::Str(s) => PropValue::Literal(Literal::Str(s)),
        Value::Number(n) => PropValue::Literal(Literal::Number(n)),
        Value::Bool(b) => PropValue::Literal(Literal::Bool(b)),
        Value::Null => PropValue::Literal(Literal::Null),
    }
}

/// Strip an alias prefix: `ui.button` → `button`.
fn base_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
