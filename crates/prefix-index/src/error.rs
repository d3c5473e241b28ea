use std::path::PathBuf;

use crate::types::NameId;

/// Errors raised while turning a corpus snapshot into a node set.
///
/// A build error is fatal only to the build attempt that raised it; the
/// serving generation is never touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("corpus is empty")]
    EmptyCorpus,

    #[error("invalid name {name:?} (id {id}): {reason}")]
    InvalidName {
        id: NameId,
        name: String,
        reason: String,
    },

    #[error("invalid popularity {value} for name id {id}")]
    InvalidPopularity { id: NameId, value: f64 },

    #[error("duplicate name {key:?} (ids {first} and {second})")]
    DuplicateName {
        key: String,
        first: NameId,
        second: NameId,
    },

    #[error("invariant violated at prefix {prefix:?}: {detail}")]
    InvariantViolation { prefix: String, detail: String },
}

/// Errors raised by the name source collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("name source unavailable: {0}")]
    Unavailable(String),

    #[error("name source backend error: {0}")]
    Backend(String),
}

/// Errors raised by a rebuild. The prior generation keeps serving.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RebuildError {
    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    #[error("reading corpus failed: {0}")]
    Source(SourceError),

    #[error("a rebuild is already in progress")]
    InProgress,

    #[error("panic during build: {0}")]
    Panicked(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PrefixIndexError {
    #[error("Prefix not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Rebuild error: {0}")]
    Rebuild(#[from] RebuildError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Config error ({path}): {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, PrefixIndexError>;
