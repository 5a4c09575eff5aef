//! Resolution errors.
//!
//! Every variant is fatal: the registries must never be emitted from a
//! partially understood source set, so nothing here is recoverable or
//! retried.

use thiserror::Error;

/// Phase-one result type.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors raised while classifying declarations and populating the
/// registries.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A top-level statement (or a statement inside a build function
    /// body that claims to define methods) matches none of the
    /// recognized shapes.
    #[error("{module}:{line}: unrecognized statement: {detail}")]
    UnrecognizedStatement {
        module: String,
        line: u32,
        detail: String,
    },

    /// Two top-level declarations share a name. Unit names are global
    /// across the whole source set.
    #[error("duplicate top-level unit `{name}` (module {module})")]
    DuplicateUnit { name: String, module: String },

    /// Two methods share a `namespace|name` key.
    #[error("duplicate method `{key}` (module {module})")]
    DuplicateMethod { key: String, module: String },

    /// A method registration occurred before any namespace boundary
    /// comment.
    #[error("{module}:{line}: method `{name}` has no enclosing @namespace")]
    MissingNamespace {
        module: String,
        line: u32,
        name: String,
    },

    /// A member assignment or build call referenced a name that no
    /// registered unit carries.
    #[error("{module}:{line}: unknown unit `{name}`")]
    UnknownUnit {
        module: String,
        line: u32,
        name: String,
    },

    /// A build call's callee resolved to something other than an
    /// internal function.
    #[error("{module}:{line}: build callee `{name}` is not an internal function")]
    BuildNotFunction {
        module: String,
        line: u32,
        name: String,
    },

    /// A similar-definition call gave no literal name list and no
    /// preceding comment carries `@method`/`@set` tags.
    #[error("{module}:{line}: cannot determine method names for similar definition")]
    MissingMethodNames { module: String, line: u32 },
}
