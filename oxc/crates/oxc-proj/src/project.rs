//! OxProject - the composition root.
//!
//! Owns the configuration, the file loader, the import graph, the tag
//! registry prototype, and the transaction prototype (host functions and
//! data sources). `parse()` compiles the configured entry file through
//! the full pipeline:
//!
//! ```text
//! load ─▶ (onParse) ─▶ imports ─▶ tag definitions ─▶ data sources
//!      ─▶ template expansion (onWalk) ─▶ reference resolution
//!      ─▶ inject splicing ─▶ compiled blocks
//! ```
//!
//! Every compiled file gets a fresh transaction and a fresh definition
//! registry seeded from the host-declared descriptors; injected files are
//! therefore evaluated independently of their host.

use std::path::{Path, PathBuf};
use std::time::Duration;

use oxc_eval::{DataProvider, DataSourceError, EvalError, Transaction};
use oxc_par::{Block, Document, Node, Parser, Template};
use oxc_pre::{MacroHooks, ParseContext, PreprocessError, TagDescriptor, TagRegistry};
use oxc_util::Value;

use crate::config::{ProjectConfig, ProjectOptions};
use crate::error::ProjectError;
use crate::graph::{EdgeKind, ImportGraph};
use crate::imports;
use crate::injects;
use crate::loader::{FileLoader, LoaderStats};
use crate::paths::PathResolver;

/// Result of compiling an entry: the raw tree when `onParse` called
/// `finish()`, otherwise the fully compiled block sequence.
#[derive(Debug)]
pub enum ParseResult {
    /// The raw parsed tree; preprocessing was skipped.
    Raw(Document),
    /// The compiled top-level blocks.
    Compiled(Vec<Block>),
}

/// A configured OX project.
pub struct OxProject {
    config: ProjectConfig,
    resolver: PathResolver,
    loader: FileLoader,
    graph: ImportGraph,
    registry_proto: TagRegistry,
    txn_proto: Transaction,
}

impl OxProject {
    /// Create a project from an explicit configuration.
    pub fn new(config: ProjectConfig) -> Result<Self, ProjectError> {
        let base_dir = std::fs::canonicalize(&config.base_dir).map_err(|_| {
            ProjectError::FileNotFound {
                path: config.base_dir.clone(),
            }
        })?;
        let resolver = PathResolver::new(
            base_dir,
            config.module_directories.clone(),
            config.extensions.clone(),
        );
        let loader = FileLoader::new(
            config.extensions.clone(),
            config.max_file_size,
            config.max_cache_size,
            config.enable_cache_eviction,
        );
        let graph = ImportGraph::new(config.max_depth);

        let mut txn_proto = Transaction::new();
        if let Some(ms) = config.timeout {
            txn_proto.set_timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            config,
            resolver,
            loader,
            graph,
            registry_proto: TagRegistry::new(),
            txn_proto,
        })
    }

    /// Discover `ox.config.*` in a directory and build the project.
    pub fn from_directory(dir: &Path) -> Result<Self, ProjectError> {
        Self::new(ProjectConfig::discover(dir)?)
    }

    /// Load a specific configuration file and build the project.
    pub fn from_file(config_path: &Path) -> Result<Self, ProjectError> {
        let mut config = ProjectConfig::load_from_path(config_path)?;
        if config.base_dir == PathBuf::from(".") {
            if let Some(parent) = config_path.parent() {
                config.base_dir = parent.to_path_buf();
            }
        }
        Self::new(config)
    }

    /// Discover configuration and merge explicit option overrides.
    pub fn from_directory_with_options(
        dir: &Path,
        options: ProjectOptions,
    ) -> Result<Self, ProjectError> {
        Self::new(ProjectConfig::discover(dir)?.with_options(options))
    }

    /// The active configuration.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The import graph accumulated so far.
    pub fn graph(&self) -> &ImportGraph {
        &self.graph
    }

    // =========================================================================
    // HOST REGISTRATION
    // =========================================================================

    /// Declare a tag descriptor.
    pub fn declare_tag(&mut self, descriptor: TagDescriptor) {
        self.registry_proto.declare(descriptor);
    }

    /// Register a host function reachable from expressions.
    pub fn add_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.txn_proto.add_function(name, function);
    }

    /// Register a data-source provider.
    pub fn add_data_source<F>(&mut self, name: impl Into<String>, provider: F)
    where
        F: Fn() -> Result<Value, DataSourceError> + Send + Sync + 'static,
    {
        self.txn_proto.add_data_source(name, provider);
    }

    /// Register a data source through a factory receiving the prototype
    /// transaction; the factory runs once, now.
    pub fn add_data_source_with<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: FnOnce(&Transaction) -> DataProvider,
    {
        self.txn_proto.add_data_source_with(name, factory);
    }

    // =========================================================================
    // COMPILATION
    // =========================================================================

    /// Compile the configured entry file.
    pub fn parse(&mut self) -> Result<Vec<Block>, ProjectError> {
        match self.parse_with_macros(MacroHooks::new())? {
            ParseResult::Compiled(blocks) => Ok(blocks),
            // Unreachable without an onParse hook; return the raw blocks
            // rather than failing.
            ParseResult::Raw(doc) => Ok(collect_blocks(doc.blocks)),
        }
    }

    /// Compile the configured entry file with macro hooks.
    pub fn parse_with_macros(&mut self, hooks: MacroHooks) -> Result<ParseResult, ProjectError> {
        let entry = self.resolver.resolve_entry(&self.config.entry_point)?;
        self.graph.push(&entry)?;
        let result = self.compile_entry(&entry, hooks);
        self.graph.pop();
        result
    }

    /// Compile an arbitrary project file.
    pub fn parse_file(&mut self, path: &Path) -> Result<Vec<Block>, ProjectError> {
        let resolved = self.resolver.resolve_entry(path)?;
        self.graph.push(&resolved)?;
        let result = self.compile_file(&resolved);
        self.graph.pop();
        Ok(collect_blocks(result?))
    }

    /// Compile source text directly, resolving imports and injects
    /// against the project base directory.
    pub fn parse_source(
        &mut self,
        source: &str,
        filename: &str,
        hooks: MacroHooks,
    ) -> Result<ParseResult, ProjectError> {
        let tokens = oxc_lex::tokenize(source, filename)?;
        let mut doc = Parser::new(tokens, filename).parse_document()?;

        if let Some(on_parse) = hooks.on_parse.clone() {
            let mut ctx = ParseContext::new(&mut doc);
            on_parse(&mut ctx).map_err(|e| {
                ProjectError::Preprocess(PreprocessError::Macro(
                    e.in_hook("onParse", "<document>"),
                ))
            })?;
            if ctx.finished() {
                return Ok(ParseResult::Raw(doc));
            }
        }

        let synthetic = self.resolver.base_dir().join(filename);
        self.graph.push(&synthetic)?;
        let result = self.compile_document(doc, &synthetic, hooks);
        self.graph.pop();
        Ok(ParseResult::Compiled(collect_blocks(result?)))
    }

    fn compile_entry(
        &mut self,
        entry: &Path,
        hooks: MacroHooks,
    ) -> Result<ParseResult, ProjectError> {
        let mut doc = (*self.loader.load(entry)?).clone();

        if let Some(on_parse) = hooks.on_parse.clone() {
            let mut ctx = ParseContext::new(&mut doc);
            on_parse(&mut ctx).map_err(|e| {
                ProjectError::Preprocess(PreprocessError::Macro(
                    e.in_hook("onParse", "<document>"),
                ))
            })?;
            if ctx.finished() {
                return Ok(ParseResult::Raw(doc));
            }
        }

        let nodes = self.compile_document(doc, entry, hooks)?;
        Ok(ParseResult::Compiled(collect_blocks(nodes)))
    }

    /// Compile an already-loaded file for inject splicing. The file gets
    /// its own transaction scope and definition registry.
    fn compile_file(&mut self, path: &Path) -> Result<Vec<Node>, ProjectError> {
        let doc = (*self.loader.load(path)?).clone();
        self.compile_document(doc, path, MacroHooks::new())
    }

    /// The per-file pipeline between parse and output.
    fn compile_document(
        &mut self,
        doc: Document,
        path: &Path,
        hooks: MacroHooks,
    ) -> Result<Vec<Node>, ProjectError> {
        imports::check_no_nested_imports(&doc.blocks)?;
        injects::validate_inject_locations(&doc)?;

        let mut registry = self.registry_proto.clone();
        self.process_imports(&doc, path, &mut registry)?;

        let mut txn = self.txn_proto.clone();
        let file_name = path.to_string_lossy().into_owned();
        let nodes = oxc_pre::preprocess(doc, &mut txn, &mut registry, hooks, &file_name)?;

        self.splice_injects(nodes, path)
    }

    // =========================================================================
    // IMPORTS
    // =========================================================================

    fn process_imports(
        &mut self,
        doc: &Document,
        path: &Path,
        registry: &mut TagRegistry,
    ) -> Result<(), ProjectError> {
        let importer_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.resolver.base_dir().to_path_buf());

        for import in &doc.imports {
            if let Some(alias) = &import.alias {
                imports::validate_alias(alias, &import.location)?;
            }
            let target = self.resolver.resolve(&import.path, &importer_dir)?;
            self.graph.add_edge(path, &target, EdgeKind::Import);
            self.graph.push(&target)?;
            let result = self.merge_one_import(&target, import.alias.as_deref(), registry);
            self.graph.pop();
            result?;
        }
        Ok(())
    }

    /// Load an imported file, process its own imports, and merge its tag
    /// definitions (under the alias prefix, when given). Unaliased key
    /// collisions follow last-write-wins.
    fn merge_one_import(
        &mut self,
        target: &Path,
        alias: Option<&str>,
        registry: &mut TagRegistry,
    ) -> Result<(), ProjectError> {
        let doc = (*self.loader.load(target)?).clone();
        imports::check_no_nested_imports(&doc.blocks)?;
        self.process_imports(&doc, target, registry)?;
        let definitions = registry.extract_definitions(&doc.blocks)?;
        registry.merge_definitions(definitions, alias);
        Ok(())
    }

    // =========================================================================
    // INJECTS
    // =========================================================================

    /// Replace inject directives (top level and direct block children)
    /// with the compiled top-level blocks of their target files.
    fn splice_injects(
        &mut self,
        nodes: Vec<Node>,
        path: &Path,
    ) -> Result<Vec<Node>, ProjectError> {
        let importer_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.resolver.base_dir().to_path_buf());

        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Template(Template::Inject(inject)) => {
                    let target = self.resolver.resolve(&inject.path, &importer_dir)?;
                    self.graph.add_edge(path, &target, EdgeKind::Inject);
                    self.graph.push(&target)?;
                    let result = self.compile_file(&target);
                    self.graph.pop();
                    out.extend(result?);
                }
                Node::Block(mut block) => {
                    block.children = self.splice_injects(block.children, path)?;
                    out.push(Node::Block(block));
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }

    // =========================================================================
    // CACHE AND STATS
    // =========================================================================

    /// Paths currently cached, least recently used first.
    pub fn loaded_files(&self) -> Vec<PathBuf> {
        self.loader.loaded_files()
    }

    /// Loader statistics.
    pub fn stats(&self) -> LoaderStats {
        self.loader.stats()
    }

    /// Drop every cached AST.
    pub fn clear_cache(&mut self) {
        self.loader.clear();
    }

    /// Re-read one file from disk, replacing its cache entry.
    pub fn reload_file(&mut self, path: &Path) -> Result<(), ProjectError> {
        let resolved = self.resolver.resolve_entry(path)?;
        self.loader.reload(&resolved)?;
        Ok(())
    }
}

/// Keep only the blocks of a compiled top level.
fn collect_blocks(nodes: Vec<Node>) -> Vec<Block> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Block(block) => Some(block),
            _ => None,
        })
        .collect()
}
