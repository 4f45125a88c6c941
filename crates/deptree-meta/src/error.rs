//! Error types for deptree-meta

use std::path::PathBuf;

use crate::spec::SourceKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single declaration line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("declaration has no dependency name")]
    MissingName,

    #[error("invalid dependency name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("key {key} has no value")]
    MissingValue { key: String },

    #[error("declaration mixes fields for several source kinds ({})", format_kinds(.kinds))]
    AmbiguousSource { kinds: Vec<SourceKind> },

    #[error("invalid hash '{value}': {reason}")]
    InvalidHash { value: String, reason: String },
}

fn format_kinds(kinds: &[SourceKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] deptree_fs::Error),

    #[error("Invalid declaration at {path}:{line} `{content}`: {source}")]
    Manifest {
        path: PathBuf,
        line: usize,
        content: String,
        #[source]
        source: ParseError,
    },
}
