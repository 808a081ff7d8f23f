//! oxc-drv - Compiler driver
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The driver is the entry point and orchestrator for the compilation
//! pipeline. For one file:
//!
//! ```text
//! Source (.ox)
//!      │
//!      ▼
//!   [Lexer] ──▶ token stream          (--emit-tokens stops here)
//!      │
//!      ▼
//!   [Parser] ──▶ raw AST              (--emit-ast stops here)
//!      │
//!      ▼
//!   [Preprocessor + Project] ──▶ compiled blocks
//! ```
//!
//! The full pipeline goes through [`oxc_proj::OxProject`], which handles
//! imports, injects, tag registrations, and data sources. The driver adds
//! the [`CompileError`] umbrella, emit stops for tooling, and the thin
//! `oxc` binary.
//!
//! EXIT CODES:
//! -----------
//! - 0: success
//! - 1: compilation error (any [`CompileError`])

use std::path::{Path, PathBuf};

use thiserror::Error;

use oxc_lex::{LexError, Token};
use oxc_par::{Block, Document, ParseError, Parser, SyntaxError};
use oxc_pre::{MacroHooks, PreprocessError};
use oxc_proj::{OxProject, ParseResult, ProjectError};

/// Umbrella error for the whole pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Lexical error.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Parse error.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Preprocessing error.
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    /// Project-level error.
    #[error(transparent)]
    Project(#[from] ProjectError),
}

impl From<SyntaxError> for CompileError {
    fn from(error: SyntaxError) -> Self {
        match error {
            SyntaxError::Lex(e) => CompileError::Lex(e),
            SyntaxError::Parse(e) => CompileError::Parse(e),
        }
    }
}

/// What the driver should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitKind {
    /// Lexer output only.
    Tokens,
    /// Parser output only.
    Ast,
    /// The fully compiled block sequence.
    #[default]
    Compiled,
}

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Input `.ox` file.
    pub input: PathBuf,
    /// Pipeline stop.
    pub emit: EmitKind,
    /// Verbose output.
    pub verbose: bool,
}

impl DriverConfig {
    /// Configuration for compiling one file with default settings.
    pub fn for_file(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            emit: EmitKind::Compiled,
            verbose: false,
        }
    }
}

/// Output of one driver invocation.
#[derive(Debug)]
pub enum Output {
    /// Token stream, ending with `Eof`.
    Tokens(Vec<Token>),
    /// Raw parsed document.
    Ast(Document),
    /// Compiled top-level blocks.
    Blocks(Vec<Block>),
}

/// One compilation session.
///
/// # Example
///
/// ```no_run
/// use oxc_drv::{DriverConfig, Session};
///
/// let session = Session::new(DriverConfig::for_file("main.ox"));
/// let output = session.compile().unwrap();
/// println!("{output:#?}");
/// ```
pub struct Session {
    /// Session configuration.
    pub config: DriverConfig,
}

impl Session {
    /// Create a session.
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline up to the configured emit stop.
    pub fn compile(&self) -> Result<Output, CompileError> {
        let input = &self.config.input;
        let file_name = input.to_string_lossy().into_owned();

        match self.config.emit {
            EmitKind::Tokens => {
                let source = read_input(input)?;
                Ok(Output::Tokens(oxc_lex::tokenize(&source, &file_name)?))
            }
            EmitKind::Ast => {
                let source = read_input(input)?;
                let tokens = oxc_lex::tokenize(&source, &file_name)?;
                Ok(Output::Ast(Parser::new(tokens, &file_name).parse_document()?))
            }
            EmitKind::Compiled => {
                let mut project = project_for_input(input)?;
                Ok(Output::Blocks(project.parse()?))
            }
        }
    }
}

/// Build a project rooted at the input file's directory, honouring any
/// `ox.config.*` found there, with the input as the entry point.
fn project_for_input(input: &Path) -> Result<OxProject, CompileError> {
    let dir = input.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    let mut config = oxc_proj::ProjectConfig::discover(dir)?;
    if let Some(file_name) = input.file_name() {
        config.entry_point = PathBuf::from(file_name);
    }
    Ok(OxProject::new(config)?)
}

fn read_input(input: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(input).map_err(|_| {
        CompileError::Project(ProjectError::FileNotFound {
            path: input.to_path_buf(),
        })
    })
}

/// Run Lexer+Parser on a source string, invoke `onParse` if installed,
/// and continue through the full pipeline unless the hook finished early.
///
/// Imports and injects resolve against the current directory.
pub fn parse_with_macros(
    source: &str,
    filename: Option<&str>,
    hooks: MacroHooks,
) -> Result<ParseResult, CompileError> {
    let mut project = OxProject::from_directory(Path::new("."))?;
    Ok(project.parse_source(source, filename.unwrap_or("<input>.ox"), hooks)?)
}

/// Binary entry point: minimal argument handling; the full CLI surface
/// lives in `oxt`.
pub fn run(args: &[String]) -> anyhow::Result<()> {
    let mut input: Option<PathBuf> = None;
    let mut emit = EmitKind::Compiled;
    let mut verbose = false;

    for arg in args {
        match arg.as_str() {
            "--emit-tokens" => emit = EmitKind::Tokens,
            "--emit-ast" => emit = EmitKind::Ast,
            "--verbose" => verbose = true,
            "-h" | "--help" => {
                println!("usage: oxc <file.ox> [--emit-tokens | --emit-ast] [--verbose]");
                return Ok(());
            }
            other if !other.starts_with('-') => input = Some(PathBuf::from(other)),
            other => anyhow::bail!("unknown option '{other}'"),
        }
    }

    let input = input.ok_or_else(|| anyhow::anyhow!("no input file given"))?;
    let session = Session::new(DriverConfig {
        input,
        emit,
        verbose,
    });

    let output = session.compile()?;
    if session.config.verbose {
        match &output {
            Output::Tokens(tokens) => eprintln!("{} tokens", tokens.len()),
            Output::Ast(doc) => eprintln!(
                "{} blocks, {} templates, {} imports",
                doc.blocks.len(),
                doc.templates.len(),
                doc.imports.len()
            ),
            Output::Blocks(blocks) => eprintln!("{} compiled blocks", blocks.len()),
        }
    }
    println!("{output:#?}");
    Ok(())
}
