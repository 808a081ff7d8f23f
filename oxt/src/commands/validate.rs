//! The `validate` command: compile without building anything.

use std::path::Path;

use crate::commands::common::{compile_project, load_project};
use crate::error::Result;

/// Compile the project and report success; exactly `build` minus the
/// script hand-off.
pub fn run_validate(config: Option<&Path>, verbose: bool) -> Result<()> {
    let mut project = load_project(config)?;
    let blocks = compile_project(&mut project, verbose)?;
    println!("ok: {} top-level blocks", blocks.len());
    Ok(())
}
