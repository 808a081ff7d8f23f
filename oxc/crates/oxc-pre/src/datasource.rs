//! Data-source detection, ordering, and execution.
//!
//! Walks the parsed document collecting every `<on-data>` use together
//! with its lexical ancestry: a source enclosed by another `<on-data>` is
//! `nested`, everything else is a parallel root. The result is a levelled
//! execution plan; all sources in a level are fetched together, and a
//! level only starts after the previous one completed. A nested source
//! runs only if its lexical parent succeeded.

use oxc_eval::{DataSourceError, Transaction};
use oxc_par::{Document, Node, Template};
use oxc_util::Location;
use rustc_hash::FxHashSet;

use crate::error::PreprocessError;

/// One `<on-data>` use, with its lexical parent source (if nested).
#[derive(Debug, Clone)]
pub struct PlannedSource {
    /// Source name.
    pub name: String,
    /// Name of the lexically enclosing source, when nested.
    pub parent: Option<String>,
    /// Location of the `<on-data>` directive.
    pub location: Location,
}

/// A levelled execution plan: level 0 holds the parallel roots, level 1
/// their nested children, and so on.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    /// Sources per nesting level, sorted by name within each level for
    /// deterministic execution and error reporting.
    pub levels: Vec<Vec<PlannedSource>>,
}

impl ExecutionPlan {
    /// Total number of planned sources.
    pub fn source_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// Whether the plan contains no sources.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Collect every `<on-data>` use in the document and build the execution
/// plan. Unknown source names fail with the full list.
pub fn build_plan(doc: &Document, txn: &Transaction) -> Result<ExecutionPlan, PreprocessError> {
    let mut collector = Collector {
        levels: Vec::new(),
        seen: FxHashSet::default(),
        unknown: Vec::new(),
        first_unknown_location: None,
    };

    for template in &doc.templates {
        collector.visit_template(template, 0, None, txn);
    }
    for node in &doc.blocks {
        collector.visit_node(node, 0, None, txn);
    }

    if !collector.unknown.is_empty() {
        let mut names = collector.unknown;
        names.sort();
        names.dedup();
        return Err(PreprocessError::UndefinedDataSource {
            names,
            location: collector
                .first_unknown_location
                .unwrap_or_else(|| doc.location.clone()),
        });
    }

    let mut levels = collector.levels;
    for level in &mut levels {
        level.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(ExecutionPlan { levels })
}

/// Execute the plan against the transaction.
///
/// Each level is fetched concurrently through
/// [`Transaction::fetch_many`]. A nested source whose parent did not
/// succeed is marked failed without running its provider.
pub fn execute_plan(plan: &ExecutionPlan, txn: &mut Transaction) {
    for level in &plan.levels {
        let mut runnable = Vec::new();
        for source in level {
            match &source.parent {
                Some(parent) if txn.cached_result(parent).is_none() => {
                    txn.mark_failed(
                        &source.name,
                        DataSourceError::provider(
                            &source.name,
                            format!("skipped: parent data source '{parent}' did not succeed"),
                            Some("PARENT_FAILED".to_string()),
                        ),
                    );
                }
                _ => runnable.push(source.name.clone()),
            }
        }
        txn.fetch_many(&runnable);
    }
}

struct Collector {
    levels: Vec<Vec<PlannedSource>>,
    seen: FxHashSet<String>,
    unknown: Vec<String>,
    first_unknown_location: Option<Location>,
}

impl Collector {
    fn visit_node(
        &mut self,
        node: &Node,
        depth: usize,
        parent: Option<&str>,
        txn: &Transaction,
    ) {
        match node {
            Node::Block(block) => {
                for child in &block.children {
                    self.visit_node(child, depth, parent, txn);
                }
            }
            Node::FreeText(_) => {}
            Node::Template(template) => self.visit_template(template, depth, parent, txn),
        }
    }

    fn visit_template(
        &mut self,
        template: &Template,
        depth: usize,
        parent: Option<&str>,
        txn: &Transaction,
    ) {
        match template {
            Template::OnData(t) => {
                self.record(&t.source, depth, parent, &t.location, txn);
                for node in &t.data_body {
                    self.visit_node(node, depth + 1, Some(&t.source), txn);
                }
                for node in &t.error_body {
                    self.visit_node(node, depth + 1, Some(&t.source), txn);
                }
            }
            Template::If(t) => {
                for node in &t.then_body {
                    self.visit_node(node, depth, parent, txn);
                }
                for branch in &t.else_ifs {
                    for node in &branch.body {
                        self.visit_node(node, depth, parent, txn);
                    }
                }
                for node in &t.else_body {
                    self.visit_node(node, depth, parent, txn);
                }
            }
            Template::Foreach(t) => {
                for node in &t.body {
                    self.visit_node(node, depth, parent, txn);
                }
            }
            Template::While(t) => {
                for node in &t.body {
                    self.visit_node(node, depth, parent, txn);
                }
            }
            Template::Set(_) | Template::Import(_) | Template::Inject(_) => {}
        }
    }

    fn record(
        &mut self,
        name: &str,
        depth: usize,
        parent: Option<&str>,
        location: &Location,
        txn: &Transaction,
    ) {
        if !txn.has_data_source(name) {
            self.unknown.push(name.to_string());
            if self.first_unknown_location.is_none() {
                self.first_unknown_location = Some(location.clone());
            }
            return;
        }
        // First occurrence wins: results are memoised by name, so a
        // second use shares the first fetch.
        if !self.seen.insert(name.to_string()) {
            return;
        }
        while self.levels.len() <= depth {
            self.levels.push(Vec::new());
        }
        self.levels[depth].push(PlannedSource {
            name: name.to_string(),
            parent: parent.map(String::from),
            location: location.clone(),
        });
    }
}
