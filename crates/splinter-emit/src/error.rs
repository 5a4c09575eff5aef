//! Emission errors.

use thiserror::Error;

/// Phase-two result type.
pub type Result<T> = std::result::Result<T, EmitError>;

/// Errors raised while rendering packages.
#[derive(Debug, Error)]
pub enum EmitError {
    /// A dependency or requirement name resolved against neither
    /// registry. Always a registration bug upstream; emitting a broken
    /// require is never an option.
    #[error("package `{package}`: missing dependency `{dependency}`")]
    MissingDependency { package: String, dependency: String },
}
