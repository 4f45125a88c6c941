//! Error types for deptree-fetch

use std::path::PathBuf;

use deptree_fs::HashAlgorithm;
use deptree_meta::SourceKind;

use crate::FetchRequest;

pub type Result<T> = std::result::Result<T, Error>;

/// A failed fetch, tagged with the dependency it was for.
#[derive(Debug, thiserror::Error)]
#[error("Failed to fetch {name} from '{uri}' at revision '{revision}': {kind}")]
pub struct Error {
    pub name: String,
    pub uri: String,
    pub revision: String,
    #[source]
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(request: &FetchRequest<'_>, kind: ErrorKind) -> Self {
        Self {
            name: request.spec.name.clone(),
            uri: request.spec.uri().to_string(),
            revision: request.spec.revision(),
            kind,
        }
    }
}

/// What went wrong while materializing a dependency.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("no source declared and nothing present at {path}")]
    NotPresent { path: PathBuf },

    #[error("no repository or URL declared")]
    MissingUri,

    #[error("{kind} sources are not handled by this fetcher")]
    UnsupportedSource { kind: SourceKind },

    #[error("unsupported URL scheme in '{url}'")]
    UnsupportedScheme { url: String },

    #[error("{algorithm} mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        algorithm: HashAlgorithm,
        expected: String,
        actual: String,
    },

    #[error("download failed: {message}")]
    Download { message: String },

    #[error("failed to unpack {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("command '{program}' not found")]
    CommandNotFound { program: String },

    #[error("'{program}' exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    Git(#[from] deptree_git::Error),

    #[error(transparent)]
    Fs(#[from] deptree_fs::Error),
}
