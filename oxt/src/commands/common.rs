//! Shared helpers for command handlers.

use std::path::Path;

use oxc_proj::OxProject;
use tracing::debug;

use crate::error::Result;

/// Build a project from an explicit config file or by discovery in the
/// current directory.
pub fn load_project(config: Option<&Path>) -> Result<OxProject> {
    let project = match config {
        Some(path) => {
            debug!(config = %path.display(), "loading explicit configuration");
            OxProject::from_file(path)?
        }
        None => {
            let cwd = std::env::current_dir()?;
            debug!(dir = %cwd.display(), "discovering configuration");
            OxProject::from_directory(&cwd)?
        }
    };
    debug!(
        entry = %project.config().entry_point.display(),
        base = %project.config().base_dir.display(),
        "project configured"
    );
    Ok(project)
}

/// Compile the project and log the outcome.
pub fn compile_project(project: &mut OxProject, verbose: bool) -> Result<Vec<oxc_par::Block>> {
    let blocks = project.parse()?;
    let stats = project.stats();
    debug!(
        blocks = blocks.len(),
        files = stats.files_loaded,
        cached_bytes = stats.current_cache_size_bytes,
        "compilation finished"
    );
    if verbose {
        for path in project.graph().topological_order() {
            println!("  load: {}", path.display());
        }
    }
    Ok(blocks)
}
