//! Statement parsers (keyword-dispatched).

use super::{expr, ParseError, TokenStream};
use splinter_ast::{
    CatchClause, ForInTarget, ForInit, Function, Ident, Stmt, SwitchCase, VarDeclarator,
};
use splinter_lexer::Token;

/// Parse a single statement.
pub fn parse_stmt(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    match stream.peek() {
        Some(Token::Var) => parse_var_stmt(stream),
        Some(Token::Function) => {
            let function = parse_function(stream, true)?;
            Ok(Stmt::FunctionDecl(function))
        }
        Some(Token::LBrace) => parse_block_stmt(stream),
        Some(Token::If) => parse_if(stream),
        Some(Token::For) => parse_for(stream),
        Some(Token::While) => parse_while(stream),
        Some(Token::Do) => parse_do_while(stream),
        Some(Token::Switch) => parse_switch(stream),
        Some(Token::Try) => parse_try(stream),
        Some(Token::Throw) => parse_throw(stream),
        Some(Token::Return) => parse_return(stream),
        Some(Token::Break) => {
            let start = stream.current_pos();
            stream.advance();
            stream.expect(Token::Semi)?;
            Ok(Stmt::Break {
                span: stream.span_from(start),
            })
        }
        Some(Token::Continue) => {
            let start = stream.current_pos();
            stream.advance();
            stream.expect(Token::Semi)?;
            Ok(Stmt::Continue {
                span: stream.span_from(start),
            })
        }
        Some(Token::Semi) => {
            let start = stream.current_pos();
            stream.advance();
            Ok(Stmt::Empty {
                span: stream.span_from(start),
            })
        }
        Some(_) => parse_expr_stmt(stream),
        None => Err(ParseError::unexpected_token(
            None,
            "at statement",
            stream.current_span(),
        )),
    }
}

/// Parse an identifier token into an `Ident` node.
pub(super) fn parse_ident(stream: &mut TokenStream, context: &str) -> Result<Ident, ParseError> {
    let start = stream.current_pos();
    let span = stream.current_span();
    match stream.advance() {
        Some(Token::Ident(name)) => Ok(Ident::new(name, stream.span_from(start))),
        other => Err(ParseError::unexpected_token(other.as_ref(), context, span)),
    }
}

fn parse_expr_stmt(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    let expression = expr::parse_expression(stream, false)?;
    stream.expect(Token::Semi)?;
    Ok(Stmt::Expr {
        expression,
        span: stream.span_from(start),
    })
}

fn parse_var_stmt(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Var)?;
    let declarations = parse_declarator_list(stream, false)?;
    stream.expect(Token::Semi)?;
    Ok(Stmt::VarDecl {
        declarations,
        span: stream.span_from(start),
    })
}

/// Parse one or more `name [= init]` declarators.
fn parse_declarator_list(
    stream: &mut TokenStream,
    no_in: bool,
) -> Result<Vec<VarDeclarator>, ParseError> {
    let mut declarations = Vec::new();
    loop {
        declarations.push(parse_declarator(stream, no_in)?);
        if !stream.eat(&Token::Comma) {
            break;
        }
    }
    Ok(declarations)
}

fn parse_declarator(stream: &mut TokenStream, no_in: bool) -> Result<VarDeclarator, ParseError> {
    let start = stream.current_pos();
    let id = parse_ident(stream, "in variable declaration")?;
    let init = if stream.eat(&Token::Assign) {
        Some(expr::parse_assignment(stream, no_in)?)
    } else {
        None
    };
    Ok(VarDeclarator {
        id,
        init,
        span: stream.span_from(start),
    })
}

/// Parse a function declaration or expression.
///
/// `require_name` is set in statement position, where an anonymous
/// function has no way to be referenced and is a grammar error.
pub(super) fn parse_function(
    stream: &mut TokenStream,
    require_name: bool,
) -> Result<Function, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Function)?;

    let name = if matches!(stream.peek(), Some(Token::Ident(_))) {
        Some(parse_ident(stream, "function name")?)
    } else if require_name {
        return Err(ParseError::invalid_syntax(
            "function declaration requires a name",
            stream.current_span(),
        ));
    } else {
        None
    };

    stream.expect(Token::LParen)?;
    let mut params = Vec::new();
    while !matches!(stream.peek(), Some(Token::RParen)) {
        params.push(parse_ident(stream, "in parameter list")?);
        if !matches!(stream.peek(), Some(Token::RParen)) {
            stream.expect(Token::Comma)?;
        }
    }
    stream.expect(Token::RParen)?;

    let body = parse_block_body(stream)?;

    Ok(Function {
        name,
        params,
        body,
        span: stream.span_from(start),
    })
}

/// Parse a `{ ... }` statement list, returning the inner statements.
fn parse_block_body(stream: &mut TokenStream) -> Result<Vec<Stmt>, ParseError> {
    stream.expect(Token::LBrace)?;
    let mut body = Vec::new();
    while !matches!(stream.peek(), Some(Token::RBrace)) {
        if stream.at_end() {
            return Err(ParseError::unexpected_token(
                None,
                "in block, missing '}'",
                stream.current_span(),
            ));
        }
        body.push(parse_stmt(stream)?);
    }
    stream.expect(Token::RBrace)?;
    Ok(body)
}

fn parse_block_stmt(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    let body = parse_block_body(stream)?;
    Ok(Stmt::Block {
        body,
        span: stream.span_from(start),
    })
}

fn parse_if(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::If)?;
    stream.expect(Token::LParen)?;
    let test = expr::parse_expression(stream, false)?;
    stream.expect(Token::RParen)?;
    let consequent = Box::new(parse_stmt(stream)?);
    let alternate = if stream.eat(&Token::Else) {
        Some(Box::new(parse_stmt(stream)?))
    } else {
        None
    };
    Ok(Stmt::If {
        test,
        consequent,
        alternate,
        span: stream.span_from(start),
    })
}

/// Parse `for (init; test; update)` and `for (target in object)`.
///
/// The `in` operator is suppressed while parsing the initializer so the
/// two forms can be told apart after one expression/declarator.
fn parse_for(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::For)?;
    stream.expect(Token::LParen)?;

    let init = if matches!(stream.peek(), Some(Token::Semi)) {
        None
    } else if stream.check(&Token::Var) {
        stream.advance();
        let first = parse_declarator(stream, true)?;
        if stream.eat(&Token::In) {
            return finish_for_in(stream, start, ForInTarget::Var(first));
        }
        let mut declarations = vec![first];
        while stream.eat(&Token::Comma) {
            declarations.push(parse_declarator(stream, true)?);
        }
        Some(ForInit::Var(declarations))
    } else {
        let first = expr::parse_expression(stream, true)?;
        if stream.eat(&Token::In) {
            return finish_for_in(stream, start, ForInTarget::Expr(first));
        }
        Some(ForInit::Expr(first))
    };

    stream.expect(Token::Semi)?;
    let test = if matches!(stream.peek(), Some(Token::Semi)) {
        None
    } else {
        Some(expr::parse_expression(stream, false)?)
    };
    stream.expect(Token::Semi)?;
    let update = if matches!(stream.peek(), Some(Token::RParen)) {
        None
    } else {
        Some(expr::parse_expression(stream, false)?)
    };
    stream.expect(Token::RParen)?;
    let body = Box::new(parse_stmt(stream)?);

    Ok(Stmt::For {
        init,
        test,
        update,
        body,
        span: stream.span_from(start),
    })
}

fn finish_for_in(
    stream: &mut TokenStream,
    start: usize,
    left: ForInTarget,
) -> Result<Stmt, ParseError> {
    let right = expr::parse_expression(stream, false)?;
    stream.expect(Token::RParen)?;
    let body = Box::new(parse_stmt(stream)?);
    Ok(Stmt::ForIn {
        left,
        right,
        body,
        span: stream.span_from(start),
    })
}

fn parse_while(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::While)?;
    stream.expect(Token::LParen)?;
    let test = expr::parse_expression(stream, false)?;
    stream.expect(Token::RParen)?;
    let body = Box::new(parse_stmt(stream)?);
    Ok(Stmt::While {
        test,
        body,
        span: stream.span_from(start),
    })
}

fn parse_do_while(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Do)?;
    let body = Box::new(parse_stmt(stream)?);
    stream.expect(Token::While)?;
    stream.expect(Token::LParen)?;
    let test = expr::parse_expression(stream, false)?;
    stream.expect(Token::RParen)?;
    stream.expect(Token::Semi)?;
    Ok(Stmt::DoWhile {
        body,
        test,
        span: stream.span_from(start),
    })
}

fn parse_switch(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Switch)?;
    stream.expect(Token::LParen)?;
    let discriminant = expr::parse_expression(stream, false)?;
    stream.expect(Token::RParen)?;
    stream.expect(Token::LBrace)?;

    let mut cases = Vec::new();
    while !matches!(stream.peek(), Some(Token::RBrace)) {
        let case_start = stream.current_pos();
        let test = if stream.eat(&Token::Case) {
            Some(expr::parse_expression(stream, false)?)
        } else {
            stream.expect(Token::Default)?;
            None
        };
        stream.expect(Token::Colon)?;
        let mut body = Vec::new();
        while !matches!(
            stream.peek(),
            Some(Token::Case) | Some(Token::Default) | Some(Token::RBrace) | None
        ) {
            body.push(parse_stmt(stream)?);
        }
        cases.push(SwitchCase {
            test,
            body,
            span: stream.span_from(case_start),
        });
    }
    stream.expect(Token::RBrace)?;

    Ok(Stmt::Switch {
        discriminant,
        cases,
        span: stream.span_from(start),
    })
}

fn parse_try(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Try)?;
    let block = parse_block_body(stream)?;

    let handler = if stream.eat(&Token::Catch) {
        let handler_start = stream.current_pos();
        stream.expect(Token::LParen)?;
        let param = parse_ident(stream, "in catch clause")?;
        stream.expect(Token::RParen)?;
        let body = parse_block_body(stream)?;
        Some(CatchClause {
            param,
            body,
            span: stream.span_from(handler_start),
        })
    } else {
        None
    };

    let finalizer = if stream.eat(&Token::Finally) {
        Some(parse_block_body(stream)?)
    } else {
        None
    };

    if handler.is_none() && finalizer.is_none() {
        return Err(ParseError::invalid_syntax(
            "try statement requires catch or finally",
            stream.current_span(),
        ));
    }

    Ok(Stmt::Try {
        block,
        handler,
        finalizer,
        span: stream.span_from(start),
    })
}

fn parse_throw(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Throw)?;
    let argument = expr::parse_expression(stream, false)?;
    stream.expect(Token::Semi)?;
    Ok(Stmt::Throw {
        argument,
        span: stream.span_from(start),
    })
}

fn parse_return(stream: &mut TokenStream) -> Result<Stmt, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Return)?;
    let argument = if matches!(stream.peek(), Some(Token::Semi)) {
        None
    } else {
        Some(expr::parse_expression(stream, false)?)
    };
    stream.expect(Token::Semi)?;
    Ok(Stmt::Return {
        argument,
        span: stream.span_from(start),
    })
}
