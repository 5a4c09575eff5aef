// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Hand-written recursive descent parser for the splinter source subset.
//!
//! ## Architecture
//!
//! - `stream`: TokenStream wrapper with lookahead
//! - `error`: ParseError
//! - `expr`: Expression parser using Pratt precedence climbing
//! - `stmt`: Statement parsers (keyword-dispatched)
//!
//! The grammar is deliberately restricted: it accepts exactly the
//! statement and expression shapes of [`splinter_ast`], and anything
//! else is a hard error. The library source set this tool consumes is
//! fully semicolon-terminated, so automatic semicolon insertion is not
//! implemented.

pub mod parser;

pub use parser::{parse_program, ParseError};

// Re-export lexer
pub use splinter_lexer::{lex, Token};
