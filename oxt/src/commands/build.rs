//! The `build` command: compile the project's entry point.

use std::path::PathBuf;

use tracing::info;

use crate::commands::common::{compile_project, load_project};
use crate::error::Result;

/// Arguments for a build run.
#[derive(Debug)]
pub struct BuildArgs {
    /// Explicit configuration file, when given.
    pub config: Option<PathBuf>,
    /// Optional build script; execution is delegated to the host.
    pub script: Option<PathBuf>,
    /// Verbose output.
    pub verbose: bool,
}

/// Compile the project and print a summary.
pub fn run_build(args: BuildArgs) -> Result<()> {
    let mut project = load_project(args.config.as_deref())?;
    let blocks = compile_project(&mut project, args.verbose)?;

    let stats = project.stats();
    println!(
        "compiled {} block{} from {} file{}",
        blocks.len(),
        plural(blocks.len()),
        stats.files_loaded,
        plural(stats.files_loaded),
    );

    if let Some(output_dir) = &project.config().output_dir {
        info!(dir = %output_dir.display(), "output directory (advisory)");
    }
    if let Some(script) = &args.script {
        // Script execution belongs to the host build environment.
        println!("build script '{}' handed to the host", script.display());
    }
    Ok(())
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
