// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Phase one of the splinter pipeline: classify every top-level
//! declaration of every module, resolve free-variable dependencies,
//! fold build expressions, and populate the unit/method registries.
//!
//! # Pipeline position
//!
//! ```text
//! Lex → Parse → Resolve → Emit
//!               ^^^^^^^
//! ```
//!
//! The registries are owned values constructed per invocation and
//! discarded after emission; nothing in this crate holds ambient state.
//! Every error is fatal — the module graph must never be emitted from a
//! partially understood source set.

pub mod classify;
pub mod comments;
pub mod config;
pub mod deps;
pub mod error;
pub mod module;
pub mod registry;

mod build;

pub use config::Config;
pub use error::{ResolveError, Result};
pub use module::{resolve_module, ModuleInput};
pub use registry::{
    Exports, MethodPackage, ModuleRecord, Registry, Resolved, UnitKind, UnitPackage,
};
