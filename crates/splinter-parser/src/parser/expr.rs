//! Expression parser - Pratt precedence climbing over the binary
//! operator ladder, with separate prefix/postfix/member layers.

use super::{stmt, ParseError, TokenStream};
use splinter_ast::{
    AssignOp, BinaryOp, Expr, Literal, LogicalOp, MemberProp, Property, PropertyKey, UnaryOp,
    UpdateOp,
};
use splinter_lexer::Token;

/// Binary and logical operators, one precedence ladder.
enum BinOp {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

/// Get binary operator metadata (precedence and operator).
///
/// Higher precedence binds tighter; every operator here is
/// left-associative. `in` is suppressed when `no_in` is set (inside a
/// `for` initializer, where it would be ambiguous with `for..in`).
fn binary_op_info(token: &Token, no_in: bool) -> Option<(u8, BinOp)> {
    let info = match token {
        Token::PipePipe => (1, BinOp::Logical(LogicalOp::Or)),
        Token::AmpAmp => (2, BinOp::Logical(LogicalOp::And)),
        Token::Pipe => (3, BinOp::Binary(BinaryOp::BitOr)),
        Token::Caret => (4, BinOp::Binary(BinaryOp::BitXor)),
        Token::Amp => (5, BinOp::Binary(BinaryOp::BitAnd)),
        Token::Eq => (6, BinOp::Binary(BinaryOp::Eq)),
        Token::Ne => (6, BinOp::Binary(BinaryOp::Ne)),
        Token::StrictEq => (6, BinOp::Binary(BinaryOp::StrictEq)),
        Token::StrictNe => (6, BinOp::Binary(BinaryOp::StrictNe)),
        Token::Lt => (7, BinOp::Binary(BinaryOp::Lt)),
        Token::Gt => (7, BinOp::Binary(BinaryOp::Gt)),
        Token::Le => (7, BinOp::Binary(BinaryOp::Le)),
        Token::Ge => (7, BinOp::Binary(BinaryOp::Ge)),
        Token::InstanceOf => (7, BinOp::Binary(BinaryOp::InstanceOf)),
        Token::In if !no_in => (7, BinOp::Binary(BinaryOp::In)),
        Token::Shl => (8, BinOp::Binary(BinaryOp::Shl)),
        Token::Shr => (8, BinOp::Binary(BinaryOp::Shr)),
        Token::UShr => (8, BinOp::Binary(BinaryOp::UShr)),
        Token::Plus => (9, BinOp::Binary(BinaryOp::Add)),
        Token::Minus => (9, BinOp::Binary(BinaryOp::Sub)),
        Token::Star => (10, BinOp::Binary(BinaryOp::Mul)),
        Token::Slash => (10, BinOp::Binary(BinaryOp::Div)),
        Token::Percent => (10, BinOp::Binary(BinaryOp::Rem)),
        _ => return None,
    };
    Some(info)
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    let op = match token {
        Token::Assign => AssignOp::Assign,
        Token::PlusAssign => AssignOp::AddAssign,
        Token::MinusAssign => AssignOp::SubAssign,
        Token::StarAssign => AssignOp::MulAssign,
        Token::SlashAssign => AssignOp::DivAssign,
        Token::PercentAssign => AssignOp::RemAssign,
        Token::AmpAssign => AssignOp::BitAndAssign,
        Token::PipeAssign => AssignOp::BitOrAssign,
        Token::CaretAssign => AssignOp::BitXorAssign,
        _ => return None,
    };
    Some(op)
}

/// Parse a full expression, comma sequences included.
pub fn parse_expression(stream: &mut TokenStream, no_in: bool) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let first = parse_assignment(stream, no_in)?;
    if !matches!(stream.peek(), Some(Token::Comma)) {
        return Ok(first);
    }
    let mut expressions = vec![first];
    while stream.eat(&Token::Comma) {
        expressions.push(parse_assignment(stream, no_in)?);
    }
    Ok(Expr::Sequence {
        expressions,
        span: stream.span_from(start),
    })
}

/// Parse an assignment expression (right-associative).
pub fn parse_assignment(stream: &mut TokenStream, no_in: bool) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let left = parse_conditional(stream, no_in)?;

    if let Some(op) = stream.peek().and_then(assign_op) {
        stream.advance();
        let right = parse_assignment(stream, no_in)?;
        return Ok(Expr::Assignment {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: stream.span_from(start),
        });
    }

    Ok(left)
}

fn parse_conditional(stream: &mut TokenStream, no_in: bool) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let test = parse_binary(stream, 1, no_in)?;

    if !stream.eat(&Token::Question) {
        return Ok(test);
    }
    let consequent = parse_assignment(stream, false)?;
    stream.expect(Token::Colon)?;
    let alternate = parse_assignment(stream, no_in)?;
    Ok(Expr::Conditional {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
        span: stream.span_from(start),
    })
}

/// Pratt parser - binary/logical operators with precedence climbing.
fn parse_binary(stream: &mut TokenStream, min_prec: u8, no_in: bool) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let mut left = parse_unary(stream, no_in)?;

    while let Some(token) = stream.peek() {
        let Some((prec, op)) = binary_op_info(token, no_in) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        stream.advance();
        let right = parse_binary(stream, prec + 1, no_in)?;
        let span = stream.span_from(start);
        left = match op {
            BinOp::Binary(op) => Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            },
            BinOp::Logical(op) => Expr::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            },
        };
    }

    Ok(left)
}

fn unary_op(token: &Token) -> Option<UnaryOp> {
    let op = match token {
        Token::Not => UnaryOp::Not,
        Token::Minus => UnaryOp::Neg,
        Token::Plus => UnaryOp::Pos,
        Token::Tilde => UnaryOp::BitNot,
        Token::TypeOf => UnaryOp::TypeOf,
        Token::Void => UnaryOp::Void,
        Token::Delete => UnaryOp::Delete,
        _ => return None,
    };
    Some(op)
}

fn parse_unary(stream: &mut TokenStream, no_in: bool) -> Result<Expr, ParseError> {
    let start = stream.current_pos();

    if let Some(op) = stream.peek().and_then(unary_op) {
        stream.advance();
        let argument = parse_unary(stream, no_in)?;
        return Ok(Expr::Unary {
            op,
            argument: Box::new(argument),
            span: stream.span_from(start),
        });
    }

    if let Some(op) = update_op(stream.peek()) {
        stream.advance();
        let argument = parse_unary(stream, no_in)?;
        return Ok(Expr::Update {
            op,
            prefix: true,
            argument: Box::new(argument),
            span: stream.span_from(start),
        });
    }

    parse_postfix(stream)
}

fn update_op(token: Option<&Token>) -> Option<UpdateOp> {
    match token {
        Some(Token::PlusPlus) => Some(UpdateOp::Increment),
        Some(Token::MinusMinus) => Some(UpdateOp::Decrement),
        _ => None,
    }
}

/// Parse call/member chains plus the postfix `++`/`--` forms.
fn parse_postfix(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let expr = parse_call_member(stream)?;

    if let Some(op) = update_op(stream.peek()) {
        stream.advance();
        return Ok(Expr::Update {
            op,
            prefix: false,
            argument: Box::new(expr),
            span: stream.span_from(start),
        });
    }

    Ok(expr)
}

fn parse_call_member(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let base = if stream.check(&Token::New) {
        parse_new(stream)?
    } else {
        atom(stream)?
    };
    parse_suffixes(stream, base, start, true)
}

/// Parse `new Callee(...)`. The callee may carry member suffixes but no
/// call, so `new a.b.C(x)` groups as expected.
fn parse_new(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::New)?;

    let callee_start = stream.current_pos();
    let callee_base = if stream.check(&Token::New) {
        parse_new(stream)?
    } else {
        atom(stream)?
    };
    let callee = parse_suffixes(stream, callee_base, callee_start, false)?;

    let arguments = if matches!(stream.peek(), Some(Token::LParen)) {
        parse_call_args(stream)?
    } else {
        Vec::new()
    };

    Ok(Expr::New {
        callee: Box::new(callee),
        arguments,
        span: stream.span_from(start),
    })
}

/// Apply member-access and (optionally) call suffixes to a base
/// expression.
fn parse_suffixes(
    stream: &mut TokenStream,
    mut expr: Expr,
    start: usize,
    allow_calls: bool,
) -> Result<Expr, ParseError> {
    loop {
        match stream.peek() {
            Some(Token::Dot) => {
                stream.advance();
                let name = stmt::parse_ident(stream, "after '.'")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: MemberProp::Static(name),
                    span: stream.span_from(start),
                };
            }
            Some(Token::LBracket) => {
                stream.advance();
                let index = parse_expression(stream, false)?;
                stream.expect(Token::RBracket)?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: MemberProp::Computed(Box::new(index)),
                    span: stream.span_from(start),
                };
            }
            Some(Token::LParen) if allow_calls => {
                let arguments = parse_call_args(stream)?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    arguments,
                    span: stream.span_from(start),
                };
            }
            _ => break,
        }
    }
    Ok(expr)
}

/// Parse a parenthesized call argument list.
fn parse_call_args(stream: &mut TokenStream) -> Result<Vec<Expr>, ParseError> {
    stream.expect(Token::LParen)?;
    let mut args = Vec::new();
    while !matches!(stream.peek(), Some(Token::RParen)) {
        args.push(parse_assignment(stream, false)?);
        if !matches!(stream.peek(), Some(Token::RParen)) {
            stream.expect(Token::Comma)?;
        }
    }
    stream.expect(Token::RParen)?;
    Ok(args)
}

/// Parse atomic expressions (literals, identifiers, grouping, array and
/// object literals, function expressions).
fn atom(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();

    match stream.peek() {
        Some(Token::Ident(_)) => {
            let id = stmt::parse_ident(stream, "in expression")?;
            Ok(Expr::Ident(id))
        }
        Some(Token::Number(_)) => {
            let span = stream.current_span();
            match stream.advance() {
                Some(Token::Number(n)) => Ok(Expr::Literal {
                    value: Literal::Number(n),
                    span: stream.span_from(start),
                }),
                other => Err(ParseError::unexpected_token(other.as_ref(), "number", span)),
            }
        }
        Some(Token::String(_)) => {
            let span = stream.current_span();
            match stream.advance() {
                Some(Token::String(s)) => Ok(Expr::Literal {
                    value: Literal::String(s),
                    span: stream.span_from(start),
                }),
                other => Err(ParseError::unexpected_token(other.as_ref(), "string", span)),
            }
        }
        Some(Token::Regex(_)) => {
            let span = stream.current_span();
            match stream.advance() {
                Some(Token::Regex(r)) => Ok(Expr::Literal {
                    value: Literal::Regex(r),
                    span: stream.span_from(start),
                }),
                other => Err(ParseError::unexpected_token(other.as_ref(), "regex", span)),
            }
        }
        Some(Token::True) => {
            stream.advance();
            Ok(Expr::Literal {
                value: Literal::Bool(true),
                span: stream.span_from(start),
            })
        }
        Some(Token::False) => {
            stream.advance();
            Ok(Expr::Literal {
                value: Literal::Bool(false),
                span: stream.span_from(start),
            })
        }
        Some(Token::Null) => {
            stream.advance();
            Ok(Expr::Literal {
                value: Literal::Null,
                span: stream.span_from(start),
            })
        }
        Some(Token::This) => {
            stream.advance();
            Ok(Expr::This {
                span: stream.span_from(start),
            })
        }
        Some(Token::LParen) => {
            stream.advance();
            let expr = parse_expression(stream, false)?;
            stream.expect(Token::RParen)?;
            Ok(expr)
        }
        Some(Token::LBracket) => parse_array(stream),
        Some(Token::LBrace) => parse_object(stream),
        Some(Token::Function) => {
            let function = stmt::parse_function(stream, false)?;
            Ok(Expr::Function(function))
        }
        other => Err(ParseError::unexpected_token(
            other,
            "in expression",
            stream.current_span(),
        )),
    }
}

fn parse_array(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::LBracket)?;
    let mut elements = Vec::new();
    while !matches!(stream.peek(), Some(Token::RBracket)) {
        elements.push(parse_assignment(stream, false)?);
        if !matches!(stream.peek(), Some(Token::RBracket)) {
            stream.expect(Token::Comma)?;
        }
    }
    stream.expect(Token::RBracket)?;
    Ok(Expr::Array {
        elements,
        span: stream.span_from(start),
    })
}

fn parse_object(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::LBrace)?;
    let mut properties = Vec::new();
    while !matches!(stream.peek(), Some(Token::RBrace)) {
        properties.push(parse_property(stream)?);
        if !stream.eat(&Token::Comma) {
            break;
        }
    }
    stream.expect(Token::RBrace)?;
    Ok(Expr::Object {
        properties,
        span: stream.span_from(start),
    })
}

fn parse_property(stream: &mut TokenStream) -> Result<Property, ParseError> {
    let start = stream.current_pos();
    let span = stream.current_span();
    let key = match stream.advance() {
        Some(Token::Ident(name)) => PropertyKey::Ident(name),
        Some(Token::String(s)) => PropertyKey::String(s),
        Some(Token::Number(n)) => PropertyKey::Number(n),
        other => {
            return Err(ParseError::unexpected_token(
                other.as_ref(),
                "as object key",
                span,
            ));
        }
    };
    stream.expect(Token::Colon)?;
    let value = parse_assignment(stream, false)?;
    Ok(Property {
        key,
        value,
        span: stream.span_from(start),
    })
}
