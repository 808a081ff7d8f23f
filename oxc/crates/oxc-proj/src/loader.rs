//! File loader with a size-bounded, LRU-evicting AST cache.
//!
//! Reads are synchronous. Parsed documents are cached by canonical path;
//! a cache hit moves the entry to the back of the LRU order. When the
//! total cached bytes exceed the configured limit, least-recently-used
//! entries are evicted (or the load fails, when eviction is disabled).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use oxc_par::{Document, Parser};

use crate::error::ProjectError;

/// One cached file: its parsed document and its size on disk.
#[derive(Debug, Clone)]
struct CachedFile {
    document: Arc<Document>,
    size: u64,
}

/// Statistics snapshot for tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderStats {
    /// Total number of load-from-disk operations performed.
    pub files_loaded: usize,
    /// Number of entries currently cached.
    pub cached_files: usize,
    /// Total cached bytes.
    pub current_cache_size_bytes: u64,
    /// Cache order, least recently used first.
    pub cache_order: Vec<PathBuf>,
}

/// Loads and caches parsed `.ox` files.
#[derive(Debug)]
pub struct FileLoader {
    /// Cache in LRU order: front is the eviction candidate.
    cache: IndexMap<PathBuf, CachedFile>,
    extensions: Vec<String>,
    max_file_size: u64,
    max_cache_size: Option<u64>,
    enable_cache_eviction: bool,
    current_cache_size: u64,
    files_loaded: usize,
}

impl FileLoader {
    /// Create a loader.
    pub fn new(
        extensions: Vec<String>,
        max_file_size: u64,
        max_cache_size: Option<u64>,
        enable_cache_eviction: bool,
    ) -> Self {
        Self {
            cache: IndexMap::new(),
            extensions,
            max_file_size,
            max_cache_size,
            enable_cache_eviction,
            current_cache_size: 0,
            files_loaded: 0,
        }
    }

    /// Load a file, returning the cached document when available.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Document>, ProjectError> {
        // Cache hit: refresh LRU position.
        if let Some(entry) = self.cache.shift_remove(path) {
            let document = Arc::clone(&entry.document);
            self.cache.insert(path.to_path_buf(), entry);
            return Ok(document);
        }
        self.load_from_disk(path)
    }

    /// Re-read a file from disk, replacing any cached entry.
    pub fn reload(&mut self, path: &Path) -> Result<Arc<Document>, ProjectError> {
        if let Some(entry) = self.cache.shift_remove(path) {
            self.current_cache_size = self.current_cache_size.saturating_sub(entry.size);
        }
        self.load_from_disk(path)
    }

    fn load_from_disk(&mut self, path: &Path) -> Result<Arc<Document>, ProjectError> {
        self.check_extension(path)?;

        let metadata = std::fs::metadata(path).map_err(|_| ProjectError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.max_file_size {
            return Err(ProjectError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max: self.max_file_size,
            });
        }

        let source = std::fs::read_to_string(path).map_err(|_| ProjectError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let file_name = path.to_string_lossy();
        let tokens = oxc_lex::tokenize(&source, &file_name)?;
        let document = Arc::new(Parser::new(tokens, &file_name).parse_document()?);

        let size = metadata.len();
        self.cache.insert(
            path.to_path_buf(),
            CachedFile {
                document: Arc::clone(&document),
                size,
            },
        );
        self.current_cache_size += size;
        self.files_loaded += 1;
        self.enforce_cache_limit()?;

        Ok(document)
    }

    fn check_extension(&self, path: &Path) -> Result<(), ProjectError> {
        let as_str = path.to_string_lossy();
        if self
            .extensions
            .iter()
            .any(|extension| as_str.ends_with(extension.as_str()))
        {
            Ok(())
        } else {
            Err(ProjectError::InvalidFileExtension {
                path: as_str.into_owned(),
                allowed: self.extensions.clone(),
            })
        }
    }

    fn enforce_cache_limit(&mut self) -> Result<(), ProjectError> {
        let max = match self.max_cache_size {
            Some(max) => max,
            None => return Ok(()),
        };
        while self.current_cache_size > max {
            if !self.enable_cache_eviction || self.cache.len() <= 1 {
                return Err(ProjectError::CacheLimitExceeded {
                    size: self.current_cache_size,
                    max,
                });
            }
            // Front of the map is the least recently used entry.
            if let Some((_, evicted)) = self.cache.shift_remove_index(0) {
                self.current_cache_size = self.current_cache_size.saturating_sub(evicted.size);
            }
        }
        Ok(())
    }

    /// Paths currently cached, least recently used first.
    pub fn loaded_files(&self) -> Vec<PathBuf> {
        self.cache.keys().cloned().collect()
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> LoaderStats {
        LoaderStats {
            files_loaded: self.files_loaded,
            cached_files: self.cache.len(),
            current_cache_size_bytes: self.current_cache_size,
            cache_order: self.loaded_files(),
        }
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.current_cache_size = 0;
    }
}
