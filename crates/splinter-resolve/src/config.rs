//! Invocation configuration.

use std::collections::HashSet;

/// Identifiers excluded from dependency resolution even though they are
/// not bound anywhere in the analyzed unit: the `arguments` object, the
/// undefined/NaN value names, and the two base64 host functions the
/// source set calls without declaring.
pub const DEFAULT_WHITELIST: &[&str] = &["arguments", "undefined", "NaN", "btoa", "atob"];

/// Names resolvable as language or host globals at evaluation time.
///
/// The original pass probed the live interpreter environment for these;
/// a batch tool evaluates nothing, so the set is a fixed table covering
/// every global the source set touches.
pub const DEFAULT_GLOBALS: &[&str] = &[
    "Object",
    "Array",
    "String",
    "Number",
    "Boolean",
    "Function",
    "Date",
    "RegExp",
    "Error",
    "TypeError",
    "RangeError",
    "SyntaxError",
    "Math",
    "JSON",
    "Infinity",
    "parseInt",
    "parseFloat",
    "isNaN",
    "isFinite",
    "escape",
    "unescape",
    "encodeURI",
    "decodeURI",
    "encodeURIComponent",
    "decodeURIComponent",
    "eval",
    "setTimeout",
    "clearTimeout",
    "setInterval",
    "clearInterval",
    "console",
];

/// Per-invocation configuration shared by the resolve and emit phases.
///
/// Constructed once per run and passed by reference; there is no
/// ambient global configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the root library object. References to it flag a unit
    /// as core instead of becoming ordinary dependencies.
    pub root_object: String,
    /// Require path of the root-object package. Interpreted relative
    /// to the output root when it starts with `.`, otherwise used
    /// verbatim as a bare module specifier.
    pub core_path: String,
    /// Identifiers never treated as dependencies.
    pub whitelist: HashSet<String>,
    /// Language/host globals never treated as dependencies.
    pub globals: HashSet<String>,
}

impl Config {
    /// Configuration for a library whose root object is `root_object`,
    /// with the default whitelist and globals table.
    pub fn new(root_object: impl Into<String>, core_path: impl Into<String>) -> Self {
        Self {
            root_object: root_object.into(),
            core_path: core_path.into(),
            whitelist: DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
            globals: DEFAULT_GLOBALS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// True if `name` may never appear in a dependency list.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.whitelist.contains(name) || self.globals.contains(name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new("Core", "../../../lib/core")
    }
}
