//! Template expander.
//!
//! Entry point [`Expander::expand`]: consumes a parsed [`Document`] and
//! produces the ordered sequence of output nodes. The expander operates
//! in pre-order over templates and blocks:
//!
//! - Blocks get module properties injected and instance tags expanded,
//!   then every expression property without a `$` reference is evaluated
//!   to a literal, then the macro `on_walk` hook runs (with a cursor over
//!   the block's pending children), then unprocessed children are
//!   expanded in source order.
//! - `<set>` assigns into the current scope and produces nothing.
//! - `<if>` expands the first branch whose condition holds; no scope is
//!   pushed.
//! - `<foreach>` pushes one scope around the whole loop, binds the item
//!   (and optional index) per element, and concatenates the bodies.
//! - `<while>` loops under a hard iteration cap.
//! - `<on-data>` expands its data body with the fetched result in scope,
//!   or its error body with `$error` bound.
//! - `<import>` produces nothing (handled by the import processor);
//!   `<inject>` passes through for the inject processor.
//!
//! `$`-bearing properties are left untouched for Pass 2 of the reference
//! resolver, with one exception: `$error` references are resolvable while
//! an `<on-error>` scope is live, so properties whose only references are
//! `$error` are evaluated immediately.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use oxc_eval::{evaluate, ReferenceResolver, Transaction};
use oxc_lex::{Token, TokenKind};
use oxc_par::{
    Block, Document, Expr, ForeachTemplate, Node, PropValue, TagKind, Template,
};
use oxc_util::{Location, Value};

use oxc_eval::{EvalError, RefPath};

use crate::error::{MacroError, PreprocessError};
use crate::macros::{MacroHooks, WalkHook};
use crate::tags::{self, TagRegistry};

/// Hard cap on `<while>` iterations.
pub const WHILE_LOOP_LIMIT: usize = 10_000;

/// The template expander.
///
/// One expander compiles one document; it borrows the transaction and the
/// tag registry for the duration.
pub struct Expander<'a> {
    txn: &'a mut Transaction,
    registry: &'a TagRegistry,
    hooks: MacroHooks,
    /// Set by the cursor's `stop()`: no further `on_walk` invocations.
    stopped: bool,
    while_limit: usize,
    file: Arc<str>,
    /// Id of the block whose children are currently being expanded.
    current_parent: Option<String>,
    /// Typed error stashed when `invoke_walk` fails inside a hook.
    pending_error: Option<PreprocessError>,
}

impl<'a> Expander<'a> {
    /// Create an expander without macro hooks.
    pub fn new(txn: &'a mut Transaction, registry: &'a TagRegistry, file: &str) -> Self {
        Self {
            txn,
            registry,
            hooks: MacroHooks::new(),
            stopped: false,
            while_limit: WHILE_LOOP_LIMIT,
            file: Arc::from(file),
            current_parent: None,
            pending_error: None,
        }
    }

    /// Install macro hooks.
    pub fn with_hooks(mut self, hooks: MacroHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Override the `<while>` iteration cap.
    pub fn with_while_limit(mut self, limit: usize) -> Self {
        self.while_limit = limit;
        self
    }

    /// Expand a document: top-level templates first, then the block list
    /// (inject directives pass through untouched).
    pub fn expand(&mut self, doc: Document) -> Result<Vec<Node>, PreprocessError> {
        let mut out = Vec::new();
        for template in doc.templates {
            out.extend(self.expand_template(template)?);
        }
        for node in doc.blocks {
            out.extend(self.expand_node(node)?);
        }
        Ok(out)
    }

    /// Expand a list of nodes, concatenating output in source order.
    fn expand_nodes(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>, PreprocessError> {
        let mut out = Vec::new();
        for node in nodes {
            out.extend(self.expand_node(node)?);
        }
        Ok(out)
    }

    fn expand_node(&mut self, node: Node) -> Result<Vec<Node>, PreprocessError> {
        match node {
            Node::Block(block) => Ok(vec![Node::Block(self.expand_block(block)?)]),
            Node::FreeText(ft) => Ok(vec![Node::FreeText(ft)]),
            Node::Template(template) => self.expand_template(template),
        }
    }

    // =========================================================================
    // BLOCKS
    // =========================================================================

    fn expand_block(&mut self, block: Block) -> Result<Block, PreprocessError> {
        let mut block = block;

        if !block.tags.is_empty() && block.tags.iter().all(|t| t.kind == TagKind::Instance) {
            block = tags::expand_instances(block, self.registry)?;
        }

        self.literalize_properties(&mut block)?;

        let mut frame = Frame::new(std::mem::take(&mut block.children));

        if !self.stopped {
            if let Some(hook) = self.hooks.on_walk.clone() {
                self.run_walk_hook(&hook, &mut block, &mut frame)?;
            }
        }

        let saved_parent = std::mem::replace(&mut self.current_parent, block.id.clone());
        let outcome = self.expand_pending(&mut frame);
        self.current_parent = saved_parent;
        outcome?;

        block.children = frame.into_children();
        Ok(block)
    }

    /// Auto-expand every child the hook did not already process.
    fn expand_pending(&mut self, frame: &mut Frame) -> Result<(), PreprocessError> {
        for index in 0..frame.len() {
            if let Some(node) = frame.take(index) {
                let nodes = self.expand_node(node)?;
                frame.set_result(index, nodes);
            }
        }
        Ok(())
    }

    fn run_walk_hook(
        &mut self,
        hook: &WalkHook,
        block: &mut Block,
        frame: &mut Frame,
    ) -> Result<(), PreprocessError> {
        let block_label = block
            .id
            .clone()
            .unwrap_or_else(|| "<anonymous>".to_string());
        let parent = self.current_parent.clone();

        let result = {
            let mut cursor = WalkCursor {
                expander: self,
                frame,
                block,
                parent,
                pos: 0,
            };
            match catch_unwind(AssertUnwindSafe(|| hook(&mut cursor))) {
                Ok(result) => result,
                Err(panic) => Err(MacroError::Message(panic_message(panic))),
            }
        };

        // A failed invoke_walk stashed its typed error; it outranks the
        // MacroError the hook relayed back.
        if let Some(pending) = self.pending_error.take() {
            return Err(pending);
        }
        result.map_err(|e| PreprocessError::Macro(e.in_hook("onWalk", &block_label)))
    }

    // =========================================================================
    // PROPERTY LITERALISATION
    // =========================================================================

    /// Evaluate every expression property that does not need Pass 2.
    fn literalize_properties(&mut self, block: &mut Block) -> Result<(), PreprocessError> {
        let keys: Vec<String> = block.properties.keys().cloned().collect();
        for key in keys {
            let value = block.properties[&key].clone();
            let literalized = self.literalize_value(value)?;
            block.properties.insert(key, literalized);
        }
        Ok(())
    }

    fn literalize_value(&mut self, value: PropValue) -> Result<PropValue, PreprocessError> {
        match value {
            PropValue::Expression(expr) => {
                if self.resolvable_now(&expr.tokens) {
                    let runtime = self.eval_tokens(&expr.tokens)?;
                    Ok(PropValue::from_value(runtime))
                } else {
                    Ok(PropValue::Expression(expr))
                }
            }
            PropValue::Array(items) => {
                let literalized = items
                    .into_iter()
                    .map(|item| self.literalize_value(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PropValue::Array(literalized))
            }
            literal => Ok(literal),
        }
    }

    /// An expression is evaluable now when it carries no references, or
    /// when every reference is `$error` inside a live error scope.
    fn resolvable_now(&self, tokens: &[Token]) -> bool {
        let error_scope = self.txn.variable("$error").is_some();
        for (i, token) in tokens.iter().enumerate() {
            if token.kind == TokenKind::Dollar {
                let is_error_ref = error_scope
                    && matches!(
                        tokens.get(i + 1).map(|t| &t.kind),
                        Some(TokenKind::Ident(name)) if name == "error"
                    );
                if !is_error_ref {
                    return false;
                }
            }
        }
        true
    }

    // =========================================================================
    // TEMPLATES
    // =========================================================================

    fn expand_template(&mut self, template: Template) -> Result<Vec<Node>, PreprocessError> {
        match template {
            Template::Set(t) => {
                let value = self.eval_prop_value(&t.value)?;
                self.txn.set_variable(t.name, value);
                Ok(Vec::new())
            }
            Template::If(t) => {
                if self.eval_expr(&t.condition)?.is_truthy() {
                    return self.expand_nodes(t.then_body);
                }
                for branch in t.else_ifs {
                    if self.eval_expr(&branch.condition)?.is_truthy() {
                        return self.expand_nodes(branch.body);
                    }
                }
                self.expand_nodes(t.else_body)
            }
            Template::Foreach(t) => {
                let collection = match self.txn.variable(&t.collection) {
                    Some(value) => value.clone(),
                    None => {
                        return Err(EvalError::UndefinedVariable {
                            name: t.collection.clone(),
                            location: t.location.clone(),
                        }
                        .into())
                    }
                };
                let items = match collection {
                    Value::Array(items) => items,
                    other => {
                        return Err(PreprocessError::ForeachCollectionNotArray {
                            name: t.collection.clone(),
                            type_name: other.type_name().to_string(),
                            location: t.location.clone(),
                        })
                    }
                };
                self.txn.snapshot();
                let outcome = self.run_foreach(&t, items);
                self.txn.restore();
                outcome
            }
            Template::While(t) => {
                self.txn.snapshot();
                let outcome = self.run_while(&t.condition, &t.body, &t.location);
                self.txn.restore();
                outcome
            }
            Template::OnData(t) => {
                if let Some(result) = self.txn.cached_result(&t.source).cloned() {
                    self.txn.snapshot();
                    self.txn.set_variable(t.source.clone(), result);
                    let outcome = self.expand_nodes(t.data_body);
                    self.txn.restore();
                    outcome
                } else if let Some(error) = self.txn.cached_error(&t.source).cloned() {
                    if t.error_body.is_empty() {
                        return Ok(Vec::new());
                    }
                    self.txn.snapshot();
                    self.txn.set_variable("$error", error.to_value());
                    let outcome = self.expand_nodes(t.error_body);
                    self.txn.restore();
                    outcome
                } else {
                    // The data-source processor runs before expansion, so
                    // an unpopulated cache means the source never made it
                    // into the plan.
                    Err(PreprocessError::UndefinedDataSource {
                        names: vec![t.source.clone()],
                        location: t.location.clone(),
                    })
                }
            }
            // Imports are handled before expansion.
            Template::Import(_) => Ok(Vec::new()),
            // Injects are spliced after resolution.
            Template::Inject(t) => Ok(vec![Node::Template(Template::Inject(t))]),
        }
    }

    fn run_foreach(
        &mut self,
        t: &ForeachTemplate,
        items: Vec<Value>,
    ) -> Result<Vec<Node>, PreprocessError> {
        let mut out = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            self.txn.set_variable(t.item_var.clone(), item);
            if let Some(index_var) = &t.index_var {
                self.txn
                    .set_variable(index_var.clone(), Value::Number(index as f64));
            }
            out.extend(self.expand_nodes(t.body.clone())?);
        }
        Ok(out)
    }

    fn run_while(
        &mut self,
        condition: &Expr,
        body: &[Node],
        location: &Location,
    ) -> Result<Vec<Node>, PreprocessError> {
        let mut out = Vec::new();
        let mut iterations = 0usize;
        while self.eval_expr(condition)?.is_truthy() {
            iterations += 1;
            if iterations > self.while_limit {
                return Err(PreprocessError::WhileLoopLimit {
                    limit: self.while_limit,
                    location: location.clone(),
                });
            }
            out.extend(self.expand_nodes(body.to_vec())?);
        }
        Ok(out)
    }

    // =========================================================================
    // EVALUATION
    // =========================================================================

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, PreprocessError> {
        self.eval_tokens(&expr.tokens)
    }

    fn eval_tokens(&mut self, tokens: &[Token]) -> Result<Value, PreprocessError> {
        let txn: &Transaction = self.txn;
        let mut resolver = ScopeRefResolver { txn };
        Ok(evaluate(tokens, self.file.as_ref(), txn, &mut resolver)?)
    }

    fn eval_prop_value(&mut self, value: &PropValue) -> Result<Value, PreprocessError> {
        match value {
            PropValue::Literal(lit) => Ok(lit.to_value()),
            PropValue::Array(items) => items
                .iter()
                .map(|item| self.eval_prop_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            PropValue::Expression(expr) => self.eval_expr(expr),
        }
    }
}

/// Expansion-time reference resolver: only `$error` (inside a live
/// `<on-error>` scope) resolves; everything else defers to Pass 2.
struct ScopeRefResolver<'t> {
    txn: &'t Transaction,
}

impl ReferenceResolver for ScopeRefResolver<'_> {
    fn resolve(&mut self, path: &RefPath, location: &Location) -> Result<Value, EvalError> {
        if path.base == "error" {
            if let Some(error) = self.txn.variable("$error") {
                let mut value = error.clone();
                for segment in &path.segments {
                    value = oxc_eval::access(&value, segment, location)?;
                }
                return Ok(value);
            }
        }
        Err(EvalError::UnresolvedReference {
            path: path.to_string(),
            location: location.clone(),
        })
    }
}

// =============================================================================
// MACRO CURSOR
// =============================================================================

/// The frontier of one block's children during expansion.
struct Frame {
    pending: Vec<Option<Node>>,
    results: Vec<Vec<Node>>,
}

impl Frame {
    fn new(children: Vec<Node>) -> Self {
        let len = children.len();
        Self {
            pending: children.into_iter().map(Some).collect(),
            results: (0..len).map(|_| Vec::new()).collect(),
        }
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn take(&mut self, index: usize) -> Option<Node> {
        self.pending.get_mut(index).and_then(Option::take)
    }

    fn peek(&self, index: usize) -> Option<&Node> {
        self.pending.get(index).and_then(Option::as_ref)
    }

    fn first_pending(&self, from: usize) -> Option<usize> {
        (from..self.pending.len()).find(|&i| self.pending[i].is_some())
    }

    fn pending_indices(&self) -> Vec<usize> {
        (0..self.pending.len())
            .filter(|&i| self.pending[i].is_some())
            .collect()
    }

    fn set_result(&mut self, index: usize, nodes: Vec<Node>) {
        self.results[index] = nodes;
    }

    /// Splice results back together in source order.
    fn into_children(self) -> Vec<Node> {
        self.results.into_iter().flatten().collect()
    }
}

/// Cursor handed to the `on_walk` hook.
///
/// The cursor exposes the block being visited, its parent, and the
/// frontier of unprocessed children. A child processed through
/// [`WalkCursor::invoke_walk`] is marked done; after the callback returns
/// the expander auto-processes only unmarked children. The cursor cannot
/// outlive the callback, so "cursor used outside `onWalk`" is
/// unrepresentable.
pub struct WalkCursor<'c, 'e> {
    expander: &'c mut Expander<'e>,
    frame: &'c mut Frame,
    block: &'c mut Block,
    parent: Option<String>,
    /// Peek position; only [`WalkCursor::back`] and
    /// [`WalkCursor::invoke_walk`] move it.
    pos: usize,
}

impl WalkCursor<'_, '_> {
    /// The block being visited, mutable. Property edits made here are
    /// kept in the output.
    pub fn block(&mut self) -> &mut Block {
        self.block
    }

    /// Id of the enclosing block, if any.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The current `{node, parent}` pair.
    pub fn current(&self) -> (&Block, Option<&str>) {
        (&*self.block, self.parent.as_deref())
    }

    /// Peek the first unprocessed child of the current node.
    pub fn next_block(&self) -> Option<&Node> {
        self.frame
            .first_pending(0)
            .and_then(|index| self.frame.peek(index))
    }

    /// Peek the next unprocessed `{index, node}` at or after the cursor,
    /// without advancing.
    pub fn peek_next(&self) -> Option<(usize, &Node)> {
        self.frame
            .first_pending(self.pos)
            .and_then(|index| self.frame.peek(index).map(|node| (index, node)))
    }

    /// The unprocessed frontier, as `{index, node}` pairs.
    pub fn remaining_children(&self) -> Vec<(usize, &Node)> {
        self.frame
            .pending_indices()
            .into_iter()
            .filter_map(|index| self.frame.peek(index).map(|node| (index, node)))
            .collect()
    }

    /// Immediately process the child at `index` with full property
    /// evaluation and hook invocation, and mark it done.
    pub fn invoke_walk(&mut self, index: usize) -> Result<(), MacroError> {
        let node = match self.frame.take(index) {
            Some(node) => node,
            None => {
                return Err(MacroError::Message(format!(
                    "child {index} was already processed or does not exist"
                )))
            }
        };

        let saved_parent = std::mem::replace(
            &mut self.expander.current_parent,
            self.block.id.clone(),
        );
        let outcome = self.expander.expand_node(node);
        self.expander.current_parent = saved_parent;

        match outcome {
            Ok(nodes) => {
                self.frame.set_result(index, nodes);
                self.pos = index + 1;
                Ok(())
            }
            Err(error) => {
                let message = error.to_string();
                self.expander.pending_error = Some(error);
                Err(MacroError::Message(message))
            }
        }
    }

    /// Move the peek cursor back. Advisory: already-processed children
    /// stay processed.
    pub fn back(&mut self, steps: usize) {
        self.pos = self.pos.saturating_sub(steps);
    }

    /// Terminate the walk: after this callback returns, no further
    /// `on_walk` invocations happen; expansion itself completes.
    pub fn stop(&mut self) {
        self.expander.stopped = true;
    }

    /// Build a macro error carrying the given message.
    pub fn throw_error(&self, message: impl Into<String>) -> MacroError {
        MacroError::Message(message.into())
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic in macro callback".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_par::{parse_source, Literal};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn expand_with(
        source: &str,
        txn: &mut Transaction,
        registry: &mut TagRegistry,
        hooks: MacroHooks,
    ) -> Result<Vec<Node>, PreprocessError> {
        let mut doc = parse_source(source, "expand.ox").unwrap();
        registry.process_definitions(&mut doc.blocks)?;
        registry.validate_instances(&doc.blocks)?;
        Expander::new(txn, registry, "expand.ox")
            .with_hooks(hooks)
            .expand(doc)
    }

    fn expand(source: &str) -> Result<Vec<Node>, PreprocessError> {
        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        expand_with(source, &mut txn, &mut registry, MacroHooks::new())
    }

    fn block(node: &Node) -> &Block {
        match node {
            Node::Block(b) => b,
            other => panic!("expected block, got {other:?}"),
        }
    }

    fn number(block: &Block, key: &str) -> f64 {
        match &block.properties[key] {
            PropValue::Literal(Literal::Number(n)) => *n,
            other => panic!("expected number for '{key}', got {other:?}"),
        }
    }

    fn string<'a>(block: &'a Block, key: &str) -> &'a str {
        match &block.properties[key] {
            PropValue::Literal(Literal::Str(s)) => s,
            other => panic!("expected string for '{key}', got {other:?}"),
        }
    }

    #[test]
    fn test_arithmetic_literalisation() {
        let nodes = expand("[Box (w: (10 + 20 * 2))]").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(number(block(&nodes[0]), "w"), 50.0);
    }

    #[test]
    fn test_reference_properties_left_for_pass_two() {
        let nodes = expand("[A (w: ($parent.width), h: (1 + 1))]").unwrap();
        let a = block(&nodes[0]);
        assert!(matches!(&a.properties["w"], PropValue::Expression(_)));
        assert_eq!(number(a, "h"), 2.0);
    }

    #[test]
    fn test_set_and_interpolation() {
        let nodes = expand("<set w = 7> [Box (w: (w * 2))]").unwrap();
        assert_eq!(number(block(&nodes[0]), "w"), 14.0);
    }

    #[test]
    fn test_foreach_with_index() {
        let nodes = expand(
            "<set items = {\"a\", \"b\", \"c\"}>\n<foreach (x, i in items)>[Item (idx: (i), val: (x))]</foreach>",
        )
        .unwrap();
        assert_eq!(nodes.len(), 3);
        for (i, expected) in ["a", "b", "c"].iter().enumerate() {
            let item = block(&nodes[i]);
            assert_eq!(item.id.as_deref(), Some("Item"));
            assert_eq!(number(item, "idx"), i as f64);
            assert_eq!(string(item, "val"), *expected);
        }
    }

    #[test]
    fn test_foreach_restores_bindings() {
        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        expand_with(
            "<set x = 1>\n<set items = {10, 20}>\n<foreach (x in items)>[I (v: (x))]</foreach>",
            &mut txn,
            &mut registry,
            MacroHooks::new(),
        )
        .unwrap();
        assert_eq!(txn.variable("x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_foreach_requires_array() {
        let err = expand("<set items = 4>\n<foreach (x in items)>[I]</foreach>").unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::ForeachCollectionNotArray { name, .. } if name == "items"
        ));
    }

    #[test]
    fn test_foreach_undefined_collection() {
        let err = expand("<foreach (x in ghost)>[I]</foreach>").unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::Eval(EvalError::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn test_if_elseif_else() {
        let source = |n: i32| {
            format!(
                "<set n = {n}>\n<if (n > 10)>[Big]<elseif (n > 5)>[Mid]<else>[Small]</if>"
            )
        };
        let pick = |n: i32| {
            let nodes = expand(&source(n)).unwrap();
            block(&nodes[0]).id.clone().unwrap()
        };
        assert_eq!(pick(20), "Big");
        assert_eq!(pick(7), "Mid");
        assert_eq!(pick(1), "Small");
    }

    #[test]
    fn test_if_empty_branches_drop() {
        let nodes = expand("<set n = 1>\n<if (n > 10)>[Big]</if>").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_while_loop() {
        let nodes = expand(
            "<set n = 0>\n<while (n < 3)><set n = (n + 1)>[Tick (n: (n))]</while>",
        )
        .unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(number(block(&nodes[2]), "n"), 3.0);
    }

    #[test]
    fn test_while_loop_limit() {
        let mut txn = Transaction::new();
        let registry = TagRegistry::new();
        let doc = parse_source("<while (true)>[T]</while>", "expand.ox").unwrap();
        let err = Expander::new(&mut txn, &registry, "expand.ox")
            .with_while_limit(50)
            .expand(doc)
            .unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::WhileLoopLimit { limit: 50, .. }
        ));
    }

    #[test]
    fn test_on_data_happy_path() {
        let mut txn = Transaction::new();
        txn.add_data_source("users", || {
            Ok(Value::Array(vec![Value::Str("ada".into()), Value::Str("bob".into())]))
        });
        txn.fetch("users").unwrap();

        let mut registry = TagRegistry::new();
        let nodes = expand_with(
            "<on-data users>[UserList (count: (users[0]))]</on-data>",
            &mut txn,
            &mut registry,
            MacroHooks::new(),
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(string(block(&nodes[0]), "count"), "ada");
    }

    #[test]
    fn test_on_data_error_path() {
        use oxc_eval::DataSourceError;

        let mut txn = Transaction::new();
        txn.add_data_source("users", || {
            Err(DataSourceError::provider("users", "down", Some("E1".into())))
        });
        let _ = txn.fetch("users");

        let mut registry = TagRegistry::new();
        let nodes = expand_with(
            "<on-data users>[UserList]<on-error>[ErrorBlock (code: ($error.code))]</on-data>",
            &mut txn,
            &mut registry,
            MacroHooks::new(),
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        let error_block = block(&nodes[0]);
        assert_eq!(error_block.id.as_deref(), Some("ErrorBlock"));
        assert_eq!(string(error_block, "code"), "E1");
    }

    #[test]
    fn test_on_data_error_with_empty_error_body() {
        use oxc_eval::DataSourceError;

        let mut txn = Transaction::new();
        txn.add_data_source("users", || {
            Err(DataSourceError::provider("users", "down", None))
        });
        let _ = txn.fetch("users");

        let mut registry = TagRegistry::new();
        let nodes = expand_with(
            "<on-data users>[UserList]</on-data>",
            &mut txn,
            &mut registry,
            MacroHooks::new(),
        )
        .unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_instance_expansion_through_expander() {
        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        registry.declare(crate::tags::TagDescriptor::new("component").can_output(false));
        let nodes = expand_with(
            "@component(Button) [Button (width: 100)]\n#component(Button) [Save (label: \"go\")]",
            &mut txn,
            &mut registry,
            MacroHooks::new(),
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        let save = block(&nodes[0]);
        assert_eq!(save.id.as_deref(), Some("Save"));
        assert_eq!(number(save, "width"), 100.0);
        assert_eq!(string(save, "label"), "go");
    }

    #[test]
    fn test_nested_template_in_block() {
        let nodes = expand(
            "<set xs = {1, 2}>\n[Wrap <foreach (x in xs)>[Item (v: (x))]</foreach> [Tail]]",
        )
        .unwrap();
        let wrap = block(&nodes[0]);
        assert_eq!(wrap.children.len(), 3);
        assert_eq!(number(block(&wrap.children[0]), "v"), 1.0);
        assert_eq!(number(block(&wrap.children[1]), "v"), 2.0);
        assert_eq!(block(&wrap.children[2]).id.as_deref(), Some("Tail"));
    }

    #[test]
    fn test_on_walk_receives_literal_properties() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&seen);
        let hooks = MacroHooks::new().on_walk(move |cursor| {
            let (block, parent) = cursor.current();
            let literal = block
                .properties
                .values()
                .all(|v| !v.contains_expression());
            record.borrow_mut().push((
                block.id.clone().unwrap_or_default(),
                parent.map(String::from),
                literal,
            ));
            Ok(())
        });

        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        expand_with(
            "[Outer (w: (1 + 1)) [Inner (h: (2 + 2))]]",
            &mut txn,
            &mut registry,
            hooks,
        )
        .unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("Outer".to_string(), None, true));
        assert_eq!(
            seen[1],
            ("Inner".to_string(), Some("Outer".to_string()), true)
        );
    }

    #[test]
    fn test_on_walk_can_mutate_block() {
        let hooks = MacroHooks::new().on_walk(|cursor| {
            cursor.block().properties.insert(
                "stamped".to_string(),
                PropValue::Literal(Literal::Bool(true)),
            );
            Ok(())
        });

        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        let nodes = expand_with("[A]", &mut txn, &mut registry, hooks).unwrap();
        assert!(matches!(
            &block(&nodes[0]).properties["stamped"],
            PropValue::Literal(Literal::Bool(true))
        ));
    }

    #[test]
    fn test_invoke_walk_marks_children_processed() {
        let visits = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&visits);
        let hooks = MacroHooks::new().on_walk(move |cursor| {
            record
                .borrow_mut()
                .push(cursor.current().0.id.clone().unwrap_or_default());
            if cursor.current().0.id.as_deref() == Some("Parent") {
                // Manually process the first child; the expander must not
                // process it a second time.
                let (index, _) = cursor.peek_next().expect("a pending child");
                cursor.invoke_walk(index)?;
            }
            Ok(())
        });

        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        let nodes = expand_with(
            "[Parent [First] [Second]]",
            &mut txn,
            &mut registry,
            hooks,
        )
        .unwrap();

        // Every block visited exactly once.
        assert_eq!(*visits.borrow(), vec!["Parent", "First", "Second"]);
        // Children keep source order.
        let parent = block(&nodes[0]);
        assert_eq!(block(&parent.children[0]).id.as_deref(), Some("First"));
        assert_eq!(block(&parent.children[1]).id.as_deref(), Some("Second"));
    }

    #[test]
    fn test_stop_suppresses_later_hooks() {
        let visits = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&visits);
        let hooks = MacroHooks::new().on_walk(move |cursor| {
            *counter.borrow_mut() += 1;
            cursor.stop();
            Ok(())
        });

        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        let nodes = expand_with("[A [B]] [C]", &mut txn, &mut registry, hooks).unwrap();
        // Only the first block's hook ran; expansion still completed.
        assert_eq!(*visits.borrow(), 1);
        assert_eq!(nodes.len(), 2);
        assert_eq!(block(&nodes[0]).children.len(), 1);
    }

    #[test]
    fn test_hook_error_carries_block_context() {
        let hooks = MacroHooks::new()
            .on_walk(|cursor| Err(cursor.throw_error("refused")));
        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        let err = expand_with("[Box]", &mut txn, &mut registry, hooks).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in onWalk for block 'Box': refused"
        );
    }

    #[test]
    fn test_hook_panic_becomes_macro_error() {
        let hooks = MacroHooks::new().on_walk(|_cursor| panic!("host bug"));
        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        let err = expand_with("[Box]", &mut txn, &mut registry, hooks).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in onWalk for block 'Box': host bug"
        );
    }

    #[test]
    fn test_invoke_walk_error_keeps_typed_error() {
        let hooks = MacroHooks::new().on_walk(|cursor| {
            if let Some((index, _)) = cursor.peek_next() {
                cursor.invoke_walk(index)?;
            }
            Ok(())
        });
        let mut txn = Transaction::new();
        let mut registry = TagRegistry::new();
        // The child dividing by zero fails inside invoke_walk; the typed
        // evaluation error must surface, not a wrapped macro error.
        let err = expand_with(
            "[Parent [Child (x: (1 / 0))]]",
            &mut txn,
            &mut registry,
            hooks,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::Eval(EvalError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_deterministic_expansion() {
        let source =
            "<set items = {\"a\", \"b\"}>\n<foreach (x, i in items)>[I (k: (x), n: (i))]</foreach>\n[Tail (t: (1 + 2))]";
        let first = format!("{:?}", expand(source).unwrap());
        let second = format!("{:?}", expand(source).unwrap());
        assert_eq!(first, second);
    }
}
