//! Spans, line lookup, and source slicing.

use std::fmt;
use std::ops::Range;

/// Byte range of a node in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: u32,
    /// Byte offset one past the last character.
    pub end: u32,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    /// Span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Span::new(r.start, r.end)
    }
}

/// Byte offset to line/column lookup for one source file.
///
/// Lines are 1-based (matching every editor and the comment/namespace
/// bookkeeping built on top); columns are 0-based byte columns.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: u32) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i as u32 + 1,
            Err(i) => i as u32,
        }
    }

    /// 0-based byte column of `offset` within its line.
    pub fn column(&self, offset: u32) -> u32 {
        offset - self.line_start_of(offset)
    }

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start_of(&self, offset: u32) -> u32 {
        let line = self.line(offset);
        self.line_starts[line as usize - 1]
    }
}

/// One module's source text paired with its line index.
///
/// Provides the two body-extraction flavors the resolver needs: the
/// exact node slice, and the slice widened to the start of the node's
/// first line so leading indentation is preserved in emitted output.
#[derive(Debug)]
pub struct SourceText<'src> {
    text: &'src str,
    index: LineIndex,
}

impl<'src> SourceText<'src> {
    pub fn new(text: &'src str) -> Self {
        let index = LineIndex::new(text);
        Self { text, index }
    }

    pub fn text(&self) -> &'src str {
        self.text
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    /// 1-based line on which `span` starts.
    pub fn start_line(&self, span: Span) -> u32 {
        self.index.line(span.start)
    }

    /// Exact source slice for `span`, no surrounding whitespace.
    pub fn slice(&self, span: Span) -> &'src str {
        &self.text[span.range()]
    }

    /// Source slice widened left to the start of the span's first line,
    /// keeping the original indentation of multi-line bodies intact.
    pub fn slice_from_line_start(&self, span: Span) -> &'src str {
        let start = self.index.line_start_of(span.start) as usize;
        &self.text[start..span.end as usize]
    }
}
