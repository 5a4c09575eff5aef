// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Splinter compiler
//!
//! Unified entry point for the modularization pipeline. Consolidates
//! lexing, parsing, resolution, and emission into a single API.
//!
//! The pipeline is strictly two-phase and synchronous (it is a batch
//! build tool, not a service):
//!
//! 1. **Resolve**: every module is lexed, parsed, and classified in
//!    order, fully populating the unit and method registries. Statement
//!    order within a module is load-bearing; module order matters only
//!    in that a build call must follow its build function and forward
//!    references across modules resolve by name.
//! 2. **Emit**: every registered package is rendered to an in-memory
//!    file. Nothing is written to disk here, so a failure anywhere
//!    leaves no partial output.

use splinter_emit::{emit, EmitError, RenderedFile};
use splinter_lexer::LexError;
use splinter_parser::ParseError;
use splinter_resolve::{resolve_module, Config, ModuleInput, Registry, ResolveError};
use thiserror::Error;
use tracing::info;

/// One module of the monolithic library: a name (`date`, `string`, …)
/// and its source text.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    pub name: String,
    /// Emit the aggregate bundle file requiring all of this module's
    /// methods.
    pub bundle: bool,
    pub source: String,
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct Output {
    /// Rendered files, paths relative to the output root.
    pub files: Vec<RenderedFile>,
    pub unit_count: usize,
    pub method_count: usize,
}

/// A failure from any phase, tagged with the module that triggered it
/// where one is known. All variants abort the run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("module `{module}`: {error}")]
    Lex {
        module: String,
        #[source]
        error: LexError,
    },
    #[error("module `{module}`: {error}")]
    Parse {
        module: String,
        #[source]
        error: ParseError,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Run the full pipeline over an ordered module list.
pub fn modularize(modules: &[ModuleSource], config: &Config) -> Result<Output, CompileError> {
    let mut registry = Registry::new();

    for module in modules {
        let lexed = splinter_lexer::lex(&module.source).map_err(|error| CompileError::Lex {
            module: module.name.clone(),
            error,
        })?;
        let program =
            splinter_parser::parse_program(&lexed.tokens).map_err(|error| CompileError::Parse {
                module: module.name.clone(),
                error,
            })?;
        resolve_module(
            &mut registry,
            config,
            &ModuleInput {
                name: &module.name,
                bundle: module.bundle,
                source: &module.source,
                program: &program,
                comments: &lexed.comments,
            },
        )?;
    }

    let resolved = registry.materialize();
    let unit_count = resolved.units.len();
    let method_count = resolved.methods.len();
    info!(
        modules = modules.len(),
        units = unit_count,
        methods = method_count,
        "resolved source set"
    );

    let files = emit(&resolved, config)?;
    info!(files = files.len(), "emission complete");

    Ok(Output {
        files,
        unit_count,
        method_count,
    })
}
