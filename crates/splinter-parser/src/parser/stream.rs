//! Token stream wrapper for the hand-written parser.

use splinter_ast::Span;
use splinter_lexer::Token;
use std::ops::Range;

/// Token stream with lookahead and position tracking.
///
/// Each token is paired with its byte span from the source, so node
/// spans and error locations map straight back to the file.
pub struct TokenStream<'src> {
    tokens: &'src [(Token, Range<usize>)],
    pos: usize,
}

impl<'src> TokenStream<'src> {
    /// Create a new token stream from tokens with their byte spans.
    pub fn new(tokens: &'src [(Token, Range<usize>)]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Advance to the next token and return it.
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token matches the expected token kind.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Consume the current token if it matches, reporting whether it did.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Expect a specific token and advance past it.
    pub fn expect(&mut self, expected: Token) -> Result<Span, super::ParseError> {
        if self.check(&expected) {
            let start = self.pos;
            self.advance();
            Ok(self.span_from(start))
        } else {
            Err(super::ParseError::expected_token(
                expected,
                self.peek().cloned(),
                self.current_span(),
            ))
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Get the current position in the token stream.
    pub fn current_pos(&self) -> usize {
        self.pos
    }

    /// Create a span from a starting token position to the last
    /// consumed token, using real byte offsets.
    pub fn span_from(&self, start: usize) -> Span {
        let start_byte = self
            .tokens
            .get(start)
            .map(|(_, span)| span.start)
            .unwrap_or_else(|| self.tokens.last().map(|(_, s)| s.end).unwrap_or(0));

        let end_byte = if self.pos > 0 && self.pos <= self.tokens.len() {
            self.tokens[self.pos - 1].1.end
        } else {
            start_byte
        };

        Span::new(start_byte, end_byte)
    }

    /// Get a span for the current token (or a zero-width span at EOF).
    pub fn current_span(&self) -> Span {
        if let Some((_, span)) = self.tokens.get(self.pos) {
            Span::new(span.start, span.end)
        } else if let Some((_, span)) = self.tokens.last() {
            Span::new(span.end, span.end)
        } else {
            Span::new(0, 0)
        }
    }
}
