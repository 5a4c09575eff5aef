//! Recursive descent parser over the lexed token stream.
//!
//! - `stream`: TokenStream wrapper with lookahead
//! - `error`: ParseError
//! - `expr`: Expression parser (Pratt precedence climbing)
//! - `stmt`: Statement parsers (keyword-dispatched)

mod error;
mod stream;

pub use error::{ParseError, ParseErrorKind};
use stream::TokenStream;

mod expr;
mod stmt;

use splinter_ast::Stmt;
use splinter_lexer::Token;
use std::ops::Range;

/// Parse a token stream into a program (top-level statement list).
///
/// Fails on the first grammar violation: the downstream analysis must
/// never run over a partially parsed module.
pub fn parse_program(tokens: &[(Token, Range<usize>)]) -> Result<Vec<Stmt>, ParseError> {
    let mut stream = TokenStream::new(tokens);
    let mut body = Vec::new();
    while !stream.at_end() {
        body.push(stmt::parse_stmt(&mut stream)?);
    }
    Ok(body)
}
