//! Comment bookkeeping: end-line indexing, namespace boundaries, and
//! method-name extraction from doc tags.

use regex::Regex;
use splinter_ast::LineIndex;
use splinter_lexer::Comment;
use std::collections::HashMap;
use std::sync::LazyLock;

static NAMESPACE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(namespace|package) (\w+)").expect("namespace tag regex"));
static SET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@set([^@/]+)").expect("set tag regex"));
static METHOD_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@method (\w+)").expect("method tag regex"));
static TAG_FILLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s*]+").expect("tag filler regex"));

/// A comment resolved to the line it ends on.
#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub text: String,
    pub block: bool,
    pub end_line: u32,
}

/// Comments of one module, indexed by end line.
///
/// When several comments end on the same line the later one wins, which
/// matches reading order: the comment physically closest to the code.
#[derive(Debug, Default)]
pub struct CommentMap {
    by_end_line: HashMap<u32, CommentRecord>,
}

impl CommentMap {
    pub fn new(comments: &[Comment], index: &LineIndex) -> Self {
        let mut by_end_line = HashMap::new();
        for comment in comments {
            let end_line = index.line(comment.span.end.saturating_sub(1) as u32);
            by_end_line.insert(
                end_line,
                CommentRecord {
                    text: comment.text.clone(),
                    block: comment.block,
                    end_line,
                },
            );
        }
        Self { by_end_line }
    }

    /// The comment ending nearest above `line`, scanning upward.
    pub fn nearest_above(&self, line: u32) -> Option<&CommentRecord> {
        let mut l = line;
        while l > 1 {
            l -= 1;
            if let Some(comment) = self.by_end_line.get(&l) {
                return Some(comment);
            }
        }
        None
    }
}

/// One `@namespace` / `@package` boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceBoundary {
    pub name: String,
    pub line: u32,
}

/// Ordered namespace boundaries of one module.
///
/// Built in a single forward pass over the comments, so boundary lines
/// are monotonically increasing by construction.
#[derive(Debug, Default)]
pub struct NamespaceTracker {
    boundaries: Vec<NamespaceBoundary>,
}

impl NamespaceTracker {
    /// Collect boundaries from every comment carrying a namespace tag.
    /// When one comment block declares both `@package` and
    /// `@namespace`, the last tag wins.
    pub fn from_comments(comments: &[Comment], index: &LineIndex) -> Self {
        let mut boundaries = Vec::new();
        for comment in comments {
            if let Some(caps) = NAMESPACE_TAG.captures_iter(&comment.text).last() {
                let line = index.line(comment.span.end.saturating_sub(1) as u32);
                boundaries.push(NamespaceBoundary {
                    name: caps[2].to_string(),
                    line,
                });
            }
        }
        Self { boundaries }
    }

    /// Namespace in effect at `line`: the nearest boundary strictly
    /// above it.
    pub fn resolve(&self, line: u32) -> Option<&str> {
        self.boundaries
            .iter()
            .filter(|b| b.line < line)
            .next_back()
            .map(|b| b.name.as_str())
    }
}

/// Extract method names from a comment's `@set` / `@method` tags.
///
/// The comment is split into tag blocks on `***` separators; each block
/// contributes either its whitespace-separated `@set` body or a single
/// `@method` name.
pub fn method_names_in_comment(comment: &CommentRecord) -> Vec<String> {
    let mut names = Vec::new();
    for section in comment.text.split("***") {
        if let Some(caps) = SET_TAG.captures(section) {
            let body = caps[1].trim_matches(|c: char| c.is_whitespace() || c == '*');
            let list = TAG_FILLER.replace_all(body, ",");
            names.extend(
                list.split(',')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string()),
            );
        } else if let Some(caps) = METHOD_TAG.captures(section) {
            names.push(caps[1].to_string());
        }
    }
    names
}
