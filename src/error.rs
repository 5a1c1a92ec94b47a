use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, parsing, or rewriting an environment
/// file. All are fatal to the operation that raised them; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured environment file does not exist.
    #[error("invalid path to the environment file or no such file exists: {path}")]
    Path { path: PathBuf },

    /// A line failed the `GROUP_NAME=value` grammar.
    #[error(
        "error parsing environment line `{line}`: a declaration must have a group name, \
         variable name and value, e.g. GROUP_NAME=value (pattern: {pattern})"
    )]
    Parsing { line: String, pattern: String },

    /// An identifier failed to split into a group and a name.
    #[error("identifier `{identifier}` must consist of a group and a name, e.g. GROUP_NAME")]
    VariableParsing { identifier: String },

    /// A `${...}` reference points at an identifier that is not defined.
    #[error("environment variable {identifier} not found")]
    VariableNotFound { identifier: String },

    /// A `${...}` reference chain revisited an identifier.
    #[error("cyclic reference while resolving environment variable {identifier}")]
    CyclicReference { identifier: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
