//! Path resolution with mandatory security rules.
//!
//! Relative specs resolve against the importing file's directory; bare
//! specs resolve as packages by walking the configured module directories
//! upward. Every resolution enforces: non-empty input, an allowed source
//! extension, no null bytes or control characters, and containment inside
//! the project base directory (package resolutions are additionally
//! confined to their module directory).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// Resolves import/inject specs to canonical paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Canonical project root.
    base_dir: PathBuf,
    /// Directory names for package lookup.
    module_directories: Vec<String>,
    /// Allowed source extensions (e.g. `.ox`).
    extensions: Vec<String>,
}

/// The subset of a package's own config the resolver cares about.
#[derive(Debug, Deserialize)]
struct PackageConfig {
    /// Source subdirectory inside the package.
    source: Option<String>,
}

impl PathResolver {
    /// Create a resolver. `base_dir` must already be canonical.
    pub fn new(base_dir: PathBuf, module_directories: Vec<String>, extensions: Vec<String>) -> Self {
        Self {
            base_dir,
            module_directories,
            extensions,
        }
    }

    /// The canonical project root.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a spec as written in an `<import>`/`<inject>` directive.
    pub fn resolve(&self, spec: &str, importer_dir: &Path) -> Result<PathBuf, ProjectError> {
        self.validate_spec(spec)?;

        if spec.starts_with("./") || spec.starts_with("../") || spec.starts_with('/') {
            self.resolve_relative(spec, importer_dir)
        } else {
            self.resolve_package(spec, importer_dir)
        }
    }

    /// Resolve the configured entry point against the base directory.
    pub fn resolve_entry(&self, entry: &Path) -> Result<PathBuf, ProjectError> {
        let spec = entry.to_string_lossy();
        self.validate_spec(&spec)?;
        let candidate = if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            self.base_dir.join(entry)
        };
        let canonical = canonicalize(&candidate)?;
        self.ensure_within(&canonical, &self.base_dir)?;
        Ok(canonical)
    }

    fn validate_spec(&self, spec: &str) -> Result<(), ProjectError> {
        if spec.is_empty() {
            return Err(ProjectError::InvalidPath {
                path: spec.to_string(),
                reason: "empty path".to_string(),
            });
        }
        if spec.chars().any(|c| c == '\0' || c.is_control()) {
            return Err(ProjectError::InvalidPath {
                path: spec.escape_default().to_string(),
                reason: "control characters are not allowed".to_string(),
            });
        }
        if !self
            .extensions
            .iter()
            .any(|extension| spec.ends_with(extension.as_str()))
        {
            return Err(ProjectError::InvalidFileExtension {
                path: spec.to_string(),
                allowed: self.extensions.clone(),
            });
        }
        Ok(())
    }

    fn resolve_relative(&self, spec: &str, importer_dir: &Path) -> Result<PathBuf, ProjectError> {
        let candidate = if spec.starts_with('/') {
            PathBuf::from(spec)
        } else {
            importer_dir.join(spec)
        };
        let canonical = canonicalize(&candidate)?;
        self.ensure_within(&canonical, &self.base_dir)?;
        Ok(canonical)
    }

    /// Package lookup: walk from the importing directory up to the
    /// project root, checking each module directory.
    fn resolve_package(&self, spec: &str, importer_dir: &Path) -> Result<PathBuf, ProjectError> {
        let mut dir = importer_dir.to_path_buf();
        loop {
            for module_dir in &self.module_directories {
                let root = dir.join(module_dir);
                if !root.is_dir() {
                    continue;
                }
                if let Some(found) = self.try_package_candidate(&root, spec)? {
                    return Ok(found);
                }
            }
            if dir == self.base_dir || !dir.starts_with(&self.base_dir) {
                break;
            }
            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => break,
            }
        }
        Err(ProjectError::FileNotFound {
            path: PathBuf::from(spec),
        })
    }

    fn try_package_candidate(
        &self,
        module_root: &Path,
        spec: &str,
    ) -> Result<Option<PathBuf>, ProjectError> {
        let module_root_canonical = canonicalize(module_root)?;

        // Direct layout: node_modules/<pkg>/<rest>.ox
        let direct = module_root.join(spec);
        if direct.is_file() {
            let canonical = canonicalize(&direct)?;
            self.ensure_within(&canonical, &module_root_canonical)?;
            return Ok(Some(canonical));
        }

        // Source layout: the package's own config points at a source
        // subdirectory, validated against escapes the same way.
        if let Some((package, rest)) = spec.split_once('/') {
            let package_dir = module_root.join(package);
            if package_dir.is_dir() {
                if let Some(source) = package_source(&package_dir)? {
                    let package_canonical = canonicalize(&package_dir)?;
                    let source_dir = canonicalize(&package_dir.join(&source))?;
                    self.ensure_within(&source_dir, &package_canonical)?;
                    let candidate = source_dir.join(rest);
                    if candidate.is_file() {
                        let canonical = canonicalize(&candidate)?;
                        self.ensure_within(&canonical, &package_canonical)?;
                        return Ok(Some(canonical));
                    }
                }
            }
        }

        Ok(None)
    }

    fn ensure_within(&self, path: &Path, base: &Path) -> Result<(), ProjectError> {
        if path.starts_with(base) {
            Ok(())
        } else {
            Err(ProjectError::PathEscape {
                path: path.to_path_buf(),
                base: base.to_path_buf(),
            })
        }
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf, ProjectError> {
    std::fs::canonicalize(path).map_err(|_| ProjectError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Read the package's `source` sub-configuration, if present.
fn package_source(package_dir: &Path) -> Result<Option<String>, ProjectError> {
    let config_path = package_dir.join("ox.config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&config_path)?;
    let config: PackageConfig = toml::from_str(&content)
        .map_err(|e| ProjectError::Config(format!("{}: {e}", config_path.display())))?;
    Ok(config.source)
}
