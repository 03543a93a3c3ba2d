//! Error types for route compilation.

use thiserror::Error;

/// Errors raised while compiling a route pattern.
///
/// These surface when a route is registered, never while a request is
/// being resolved.
#[derive(Debug, Error)]
pub enum Error {
    /// A wildcard name is not an identifier, `!` or empty.
    #[error("Invalid wildcard name '{name}' in '{spec}'")]
    InvalidWildcardName { name: String, spec: String },

    /// A wildcard type is not one of the recognised type tags.
    #[error("Invalid wildcard type '{kind}' in '{spec}'")]
    InvalidWildcardType { kind: String, spec: String },

    /// A regex route pattern was rejected by the regex engine.
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The HTTP method name is not a valid token.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
}
