//! Error types for deptree-git

use std::path::PathBuf;

/// Result type for deptree-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in deptree-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] deptree_fs::Error),

    #[error("No repository URL given and no checkout exists at {path}")]
    MissingRepository { path: PathBuf },

    #[error("{path} exists but is not a git checkout")]
    NotARepository { path: PathBuf },

    #[error("Failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    #[error("Failed to fetch from {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("Revision '{revision}' not found in {url}")]
    RevisionNotFound { revision: String, url: String },
}
