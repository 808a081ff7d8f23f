//! The `init` command: scaffold a new OX project.

use std::path::PathBuf;

use tracing::info;

use crate::error::{OxtError, Result};

/// Arguments for project initialization.
#[derive(Debug)]
pub struct InitArgs {
    /// Target directory; current directory when absent.
    pub path: Option<PathBuf>,
    /// Overwrite existing files.
    pub force: bool,
}

const CONFIG_TEMPLATE: &str = r#"entryPoint = "src/main.ox"
outputDir = "dist"
"#;

const ENTRY_TEMPLATE: &str = r#"// Entry point. Compile with `oxt build`.
[App (title: "Hello, OX", columns: 12)
  [Main (width: ($parent.columns * 80))]
]
"#;

/// Create `ox.config.toml` and a starter entry file.
pub fn run_init(args: InitArgs) -> Result<()> {
    let target = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&target)?;

    let config_path = target.join("ox.config.toml");
    if config_path.exists() && !args.force {
        return Err(OxtError::Validation(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    std::fs::create_dir_all(target.join("src"))?;
    std::fs::write(&config_path, CONFIG_TEMPLATE)?;
    std::fs::write(target.join("src/main.ox"), ENTRY_TEMPLATE)?;

    info!(dir = %target.display(), "project initialized");
    println!("initialized OX project in {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_scaffolds_files() {
        let dir = TempDir::new().unwrap();
        run_init(InitArgs {
            path: Some(dir.path().to_path_buf()),
            force: false,
        })
        .unwrap();
        assert!(dir.path().join("ox.config.toml").exists());
        assert!(dir.path().join("src/main.ox").exists());
    }

    #[test]
    fn test_init_refuses_existing_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ox.config.toml"), "").unwrap();
        let err = run_init(InitArgs {
            path: Some(dir.path().to_path_buf()),
            force: false,
        })
        .unwrap_err();
        assert!(matches!(err, OxtError::Validation(_)));
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ox.config.toml"), "old").unwrap();
        run_init(InitArgs {
            path: Some(dir.path().to_path_buf()),
            force: true,
        })
        .unwrap();
        let content = std::fs::read_to_string(dir.path().join("ox.config.toml")).unwrap();
        assert!(content.contains("entryPoint"));
    }
}
