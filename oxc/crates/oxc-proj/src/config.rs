//! Project configuration.
//!
//! Configuration is discovered from `ox.config.toml` (or `ox.config.json`)
//! in the project directory; explicit options merge on top of the file's
//! values, which in turn sit on top of the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// Base name of recognised configuration files.
pub const CONFIG_FILE_STEM: &str = "ox.config";

/// Default per-file size limit: 1 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default import/inject stack depth.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Project configuration record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Project root; all file paths must resolve inside it.
    pub base_dir: PathBuf,

    /// Relative path of the entry `.ox` file.
    pub entry_point: PathBuf,

    /// Advisory output directory for downstream build scripts.
    pub output_dir: Option<PathBuf>,

    /// Directory names walked upward for package lookup.
    pub module_directories: Vec<String>,

    /// Allowed source extensions.
    pub extensions: Vec<String>,

    /// File globs for project scanning (advisory).
    pub includes: Vec<String>,

    /// File globs excluded from project scanning (advisory).
    pub excludes: Vec<String>,

    /// Per-file size limit in bytes.
    pub max_file_size: u64,

    /// Total cached AST bytes; unlimited when absent.
    pub max_cache_size: Option<u64>,

    /// Evict least-recently-used cache entries instead of failing.
    pub enable_cache_eviction: bool,

    /// Import/inject stack depth limit.
    pub max_depth: usize,

    /// Per data-source fetch timeout in milliseconds.
    pub timeout: Option<u64>,

    /// Advisory flag for the CLI collaborator.
    pub watch: bool,

    /// Advisory flag for the CLI collaborator.
    pub verbose: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            entry_point: PathBuf::from("main.ox"),
            output_dir: None,
            module_directories: vec!["node_modules".to_string()],
            extensions: vec![".ox".to_string()],
            includes: Vec::new(),
            excludes: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_cache_size: None,
            enable_cache_eviction: true,
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: None,
            watch: false,
            verbose: false,
        }
    }
}

impl ProjectConfig {
    /// Load a configuration file by extension (`.toml` or `.json`).
    pub fn load_from_path(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ProjectError::Config(format!("{}: {e}", path.display()))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ProjectError::Config(format!("{}: {e}", path.display()))),
            _ => Err(ProjectError::Config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Discover `ox.config.*` in a directory. Returns the defaults when no
    /// config file exists.
    pub fn discover(dir: &Path) -> Result<Self, ProjectError> {
        for extension in ["toml", "json"] {
            let candidate = dir.join(format!("{CONFIG_FILE_STEM}.{extension}"));
            if candidate.exists() {
                let mut config = Self::load_from_path(&candidate)?;
                if config.base_dir == PathBuf::from(".") {
                    config.base_dir = dir.to_path_buf();
                }
                return Ok(config);
            }
        }
        let mut config = Self::default();
        config.base_dir = dir.to_path_buf();
        Ok(config)
    }

    /// Merge explicit option overrides on top of this configuration.
    pub fn with_options(mut self, options: ProjectOptions) -> Self {
        if let Some(entry_point) = options.entry_point {
            self.entry_point = entry_point;
        }
        if let Some(max_file_size) = options.max_file_size {
            self.max_file_size = max_file_size;
        }
        if let Some(max_cache_size) = options.max_cache_size {
            self.max_cache_size = Some(max_cache_size);
        }
        if let Some(enable_cache_eviction) = options.enable_cache_eviction {
            self.enable_cache_eviction = enable_cache_eviction;
        }
        if let Some(max_depth) = options.max_depth {
            self.max_depth = max_depth;
        }
        if let Some(timeout) = options.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(verbose) = options.verbose {
            self.verbose = verbose;
        }
        self
    }
}

/// Partial overrides merged on top of a configuration.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Override the entry point.
    pub entry_point: Option<PathBuf>,
    /// Override the per-file size limit.
    pub max_file_size: Option<u64>,
    /// Override the cache size limit.
    pub max_cache_size: Option<u64>,
    /// Override cache eviction behaviour.
    pub enable_cache_eviction: Option<bool>,
    /// Override the import depth limit.
    pub max_depth: Option<usize>,
    /// Override the data-source timeout.
    pub timeout: Option<u64>,
    /// Override the verbose flag.
    pub verbose: Option<bool>,
}
