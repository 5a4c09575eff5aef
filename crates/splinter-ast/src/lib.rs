// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Syntax tree types for the splinter source subset.
//!
//! This crate contains the AST node definitions for the restricted
//! JavaScript subset splinter operates on, plus the source-position
//! machinery (spans, line index) downstream phases use to map nodes
//! back to source text.
//!
//! # Design
//!
//! - `Stmt` / `Expr` — closed sum types over exactly the node kinds the
//!   source set uses. Analysis passes match exhaustively, so a new node
//!   kind is a compile-time error in every consumer rather than a
//!   runtime surprise.
//! - Binding positions (declarator names, parameters, function names,
//!   catch parameters) are `Ident` struct fields, never `Expr` nodes, so
//!   a reference occurrence is always an `Expr::Ident`.
//! - `Span` carries byte offsets only; line and column are derived on
//!   demand through `LineIndex`.

pub mod foundation;
pub mod tree;

pub use foundation::{LineIndex, SourceText, Span};
pub use tree::*;
