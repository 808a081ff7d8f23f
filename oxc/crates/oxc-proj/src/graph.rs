//! Import graph: a DAG over canonical file paths.
//!
//! Edges are labelled `import` or `inject`. The runtime processing stack
//! detects cycles (pushing a path already on the stack) and enforces the
//! configured depth limit, reporting the full chain either way.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::ProjectError;

/// Edge label: how one file pulls in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `<import "…">`: merges tag definitions.
    Import,
    /// `<inject "…">`: splices compiled blocks.
    Inject,
}

impl EdgeKind {
    fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Import => "import",
            EdgeKind::Inject => "inject",
        }
    }
}

/// Dependency graph plus the runtime processing stack.
#[derive(Debug, Default)]
pub struct ImportGraph {
    /// Adjacency: file → (dependency, kind), in insertion order.
    edges: IndexMap<PathBuf, Vec<(PathBuf, EdgeKind)>>,
    /// Files currently being processed, outermost first.
    stack: Vec<PathBuf>,
    /// Stack depth limit.
    max_depth: usize,
}

impl ImportGraph {
    /// Create a graph with the given depth limit.
    pub fn new(max_depth: usize) -> Self {
        Self {
            edges: IndexMap::new(),
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Ensure a node exists.
    pub fn add_node(&mut self, path: &Path) {
        self.edges.entry(path.to_path_buf()).or_default();
    }

    /// Record a labelled edge.
    pub fn add_edge(&mut self, from: &Path, to: &Path, kind: EdgeKind) {
        self.add_node(to);
        let deps = self.edges.entry(from.to_path_buf()).or_default();
        if !deps.iter().any(|(path, k)| path == to && *k == kind) {
            deps.push((to.to_path_buf(), kind));
        }
    }

    /// Push a file onto the processing stack.
    ///
    /// Fails with the full cycle when the file is already on the stack,
    /// or with the current chain when the depth limit is exceeded.
    pub fn push(&mut self, path: &Path) -> Result<(), ProjectError> {
        if let Some(position) = self.stack.iter().position(|p| p == path) {
            let mut cycle: Vec<PathBuf> = self.stack[position..].to_vec();
            cycle.push(path.to_path_buf());
            return Err(ProjectError::CircularDependency { cycle });
        }
        if self.stack.len() + 1 > self.max_depth {
            let mut chain = self.stack.clone();
            chain.push(path.to_path_buf());
            return Err(ProjectError::MaxDepthExceeded {
                max: self.max_depth,
                chain,
            });
        }
        self.stack.push(path.to_path_buf());
        self.add_node(path);
        Ok(())
    }

    /// Pop the top of the processing stack.
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Current stack depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Direct dependencies of a file.
    pub fn dependencies(&self, path: &Path) -> Vec<&PathBuf> {
        self.edges
            .get(path)
            .map(|deps| deps.iter().map(|(p, _)| p).collect())
            .unwrap_or_default()
    }

    /// Files that directly depend on a file.
    pub fn dependents(&self, path: &Path) -> Vec<&PathBuf> {
        self.edges
            .iter()
            .filter(|(_, deps)| deps.iter().any(|(p, _)| p == path))
            .map(|(from, _)| from)
            .collect()
    }

    /// Dependencies-first ordering of every known file.
    ///
    /// The graph is acyclic by construction (cycles are refused at push
    /// time), so a depth-first post-order suffices.
    pub fn topological_order(&self) -> Vec<PathBuf> {
        let mut visited: Vec<&PathBuf> = Vec::new();
        let mut order: Vec<PathBuf> = Vec::new();

        fn visit<'g>(
            graph: &'g ImportGraph,
            node: &'g PathBuf,
            visited: &mut Vec<&'g PathBuf>,
            order: &mut Vec<PathBuf>,
        ) {
            if visited.contains(&node) {
                return;
            }
            visited.push(node);
            if let Some(deps) = graph.edges.get(node) {
                for (dep, _) in deps {
                    visit(graph, dep, visited, order);
                }
            }
            order.push(node.clone());
        }

        for node in self.edges.keys() {
            visit(self, node, &mut visited, &mut order);
        }
        order
    }

    /// JSON description of the graph for tooling.
    pub fn to_json(&self) -> serde_json::Value {
        let nodes: Vec<String> = self
            .edges
            .keys()
            .map(|p| p.display().to_string())
            .collect();
        let edges: Vec<serde_json::Value> = self
            .edges
            .iter()
            .flat_map(|(from, deps)| {
                deps.iter().map(move |(to, kind)| {
                    serde_json::json!({
                        "from": from.display().to_string(),
                        "to": to.display().to_string(),
                        "kind": kind.as_str(),
                    })
                })
            })
            .collect();
        serde_json::json!({ "nodes": nodes, "edges": edges })
    }
}
