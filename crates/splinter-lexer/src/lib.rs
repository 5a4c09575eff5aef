// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for the splinter source subset.
//!
//! Tokenizes the restricted JavaScript subset using logos.
//!
//! # Design
//!
//! - `Token` — all token types of the subset (keywords, operators,
//!   literals, identifiers).
//! - Comments are **tokens**, not skips: downstream phases read
//!   `@namespace` / `@package` / `@method` / `@set` tags out of them.
//!   The [`lex`] wrapper separates them from the code token stream.
//! - Regex literals cannot be recognized by a context-free lexer (`/`
//!   is also division). [`lex`] resolves the ambiguity from the
//!   previous significant token and scans the literal body manually.

use logos::Logos;
use std::ops::Range;

/// Tokens of the source subset.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace
pub enum Token {
    // === Keywords ===
    #[token("var")]
    Var,
    #[token("function")]
    Function,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("throw")]
    Throw,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("new")]
    New,
    #[token("typeof")]
    TypeOf,
    #[token("void")]
    Void,
    #[token("delete")]
    Delete,
    #[token("instanceof")]
    InstanceOf,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    // === Operators ===
    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNe,
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("=")]
    Assign,
    #[token("!")]
    Not,
    #[token("<<")]
    Shl,
    #[token("<=")]
    Le,
    #[token("<")]
    Lt,
    #[token(">>>")]
    UShr,
    #[token(">>")]
    Shr,
    #[token(">=")]
    Ge,
    #[token(">")]
    Gt,
    #[token("++")]
    PlusPlus,
    #[token("+=")]
    PlusAssign,
    #[token("+")]
    Plus,
    #[token("--")]
    MinusMinus,
    #[token("-=")]
    MinusAssign,
    #[token("-")]
    Minus,
    #[token("*=")]
    StarAssign,
    #[token("*")]
    Star,
    #[token("/=")]
    SlashAssign,
    #[token("/")]
    Slash,
    #[token("%=")]
    PercentAssign,
    #[token("%")]
    Percent,
    #[token("&&")]
    AmpAmp,
    #[token("&=")]
    AmpAssign,
    #[token("&")]
    Amp,
    #[token("||")]
    PipePipe,
    #[token("|=")]
    PipeAssign,
    #[token("|")]
    Pipe,
    #[token("^=")]
    CaretAssign,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,

    // === Literals & identifiers ===
    #[regex(r"0[xX][0-9a-fA-F]+", parse_hex)]
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    Number(f64),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#, unquote)]
    #[regex(r"'([^'\\\n]|\\[^\n])*'", unquote)]
    String(String),

    /// Produced only by the [`lex`] wrapper; the raw lexer emits
    /// `Slash`/`SlashAssign` (the `/` pattern below is shadowed by
    /// `Slash` and never matches) and the wrapper re-scans the literal.
    #[regex("/", |lex| lex.slice().to_string(), priority = 0)]
    Regex(String),

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Comments (captured, filtered out of the code stream) ===
    #[regex(r"//[^\n]*", |lex| lex.slice()[2..].to_string())]
    LineComment(String),
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", block_comment_text)]
    BlockComment(String),
}

fn parse_number(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

fn parse_hex(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    u64::from_str_radix(&lex.slice()[2..], 16)
        .ok()
        .map(|v| v as f64)
}

fn unquote(lex: &mut logos::Lexer<Token>) -> Option<String> {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

fn block_comment_text(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    slice[2..slice.len() - 2].to_string()
}

/// Resolve backslash escapes in a string literal body.
fn unescape(raw: &str) -> Option<String> {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('0') => result.push('\0'),
                Some('b') => result.push('\u{0008}'),
                Some('f') => result.push('\u{000C}'),
                Some('v') => result.push('\u{000B}'),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    if hex.len() != 4 {
                        return None;
                    }
                    let code = u32::from_str_radix(&hex, 16).ok()?;
                    result.push(char::from_u32(code)?);
                }
                Some('x') => {
                    let hex: String = chars.by_ref().take(2).collect();
                    if hex.len() != 2 {
                        return None;
                    }
                    let code = u32::from_str_radix(&hex, 16).ok()?;
                    result.push(char::from_u32(code)?);
                }
                Some(other) => result.push(other),
                None => return None, // Trailing backslash
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

/// A comment captured during lexing, before line resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Text between the comment delimiters.
    pub text: String,
    /// True for `/* */`, false for `//`.
    pub block: bool,
    /// Byte range including the delimiters.
    pub span: Range<usize>,
}

/// Lexer failure: an unrecognizable character sequence or an
/// unterminated literal. Fatal — the analysis must not proceed on a
/// partial token stream.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Range<usize>,
    pub message: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for LexError {}

/// Result of lexing one source file.
#[derive(Debug, Clone)]
pub struct Lexed {
    /// Code tokens with their byte spans, comments excluded.
    pub tokens: Vec<(Token, Range<usize>)>,
    /// All comments, in source order.
    pub comments: Vec<Comment>,
}

/// Tokenize a whole source file.
///
/// Separates comments from code tokens and resolves the regex-literal
/// ambiguity: a `/` (or `/=`) is a regex literal start unless the
/// previous significant token can end an operand.
pub fn lex(source: &str) -> Result<Lexed, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens: Vec<(Token, Range<usize>)> = Vec::new();
    let mut comments = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = result.map_err(|()| LexError {
            span: span.clone(),
            message: format!("unrecognized token {:?}", &source[span.clone()]),
        })?;
        match token {
            Token::LineComment(text) => comments.push(Comment {
                text,
                block: false,
                span,
            }),
            Token::BlockComment(text) => comments.push(Comment {
                text,
                block: true,
                span,
            }),
            Token::Slash | Token::SlashAssign
                if regex_allowed(tokens.last().map(|(t, _)| t)) =>
            {
                let extra = scan_regex_tail(lexer.remainder()).ok_or_else(|| LexError {
                    span: span.clone(),
                    message: "unterminated regex literal".to_string(),
                })?;
                lexer.bump(extra);
                let full = span.start..span.end + extra;
                tokens.push((Token::Regex(source[full.clone()].to_string()), full));
            }
            tok => tokens.push((tok, span)),
        }
    }

    Ok(Lexed { tokens, comments })
}

/// Whether a `/` at this point starts a regex literal rather than a
/// division. After anything that can end an operand it is division.
fn regex_allowed(prev: Option<&Token>) -> bool {
    !matches!(
        prev,
        Some(
            Token::Ident(_)
                | Token::Number(_)
                | Token::String(_)
                | Token::Regex(_)
                | Token::RParen
                | Token::RBracket
                | Token::This
                | Token::True
                | Token::False
                | Token::Null
                | Token::PlusPlus
                | Token::MinusMinus
        )
    )
}

/// Scan the remainder of a regex literal (everything after the opening
/// `/` or `/=`) and return how many bytes it occupies, flags included.
/// Returns `None` on newline or end of input before the closing `/`.
fn scan_regex_tail(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = 0;
    let mut escaped = false;
    let mut in_class = false;
    loop {
        let b = *bytes.get(i)?;
        if escaped {
            escaped = false;
        } else {
            match b {
                b'\\' => escaped = true,
                b'[' => in_class = true,
                b']' => in_class = false,
                b'\n' => return None,
                b'/' if !in_class => {
                    i += 1;
                    while bytes
                        .get(i)
                        .is_some_and(|b| b.is_ascii_alphabetic())
                    {
                        i += 1;
                    }
                    return Some(i);
                }
                _ => {}
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test helper: lex source and return code tokens only.
    fn toks(source: &str) -> Vec<Token> {
        lex(source)
            .unwrap()
            .tokens
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    fn ident(name: &str) -> Token {
        Token::Ident(name.to_string())
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            toks("var x = typeof y;"),
            vec![
                Token::Var,
                ident("x"),
                Token::Assign,
                Token::TypeOf,
                ident("y"),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn operators_longest_match() {
        assert_eq!(
            toks("a === b >>> 2"),
            vec![
                ident("a"),
                Token::StrictEq,
                ident("b"),
                Token::UShr,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            toks(r#"'a\nb' "c\'d""#),
            vec![
                Token::String("a\nb".to_string()),
                Token::String("c'd".to_string()),
            ]
        );
    }

    #[test]
    fn hex_and_float_numbers() {
        assert_eq!(
            toks("0xff 1.5e2 .25"),
            vec![
                Token::Number(255.0),
                Token::Number(150.0),
                Token::Number(0.25),
            ]
        );
    }

    #[test]
    fn comments_are_captured_not_streamed() {
        let lexed = lex("// line\nvar x; /* block\n@namespace Str */").unwrap();
        assert_eq!(lexed.tokens.len(), 3);
        assert_eq!(lexed.comments.len(), 2);
        assert_eq!(lexed.comments[0].text, " line");
        assert!(!lexed.comments[0].block);
        assert!(lexed.comments[1].block);
        assert!(lexed.comments[1].text.contains("@namespace Str"));
    }

    #[test]
    fn regex_literal_after_operator() {
        let tokens = toks("x = /a[/]b/gi;");
        assert_eq!(
            tokens,
            vec![
                ident("x"),
                Token::Assign,
                Token::Regex("/a[/]b/gi".to_string()),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn slash_after_operand_is_division() {
        assert_eq!(
            toks("a / b"),
            vec![ident("a"), Token::Slash, ident("b")]
        );
        assert_eq!(
            toks("(a) / 2"),
            vec![
                Token::LParen,
                ident("a"),
                Token::RParen,
                Token::Slash,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn regex_in_call_argument() {
        let tokens = toks("str.match(/@set/);");
        assert!(tokens.contains(&Token::Regex("/@set/".to_string())));
    }

    #[test]
    fn unterminated_regex_is_error() {
        assert!(lex("x = /abc").is_err());
    }
}
