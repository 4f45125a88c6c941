//! Error types for deptree-fs

use std::path::PathBuf;

use crate::config::Format;

/// Result type for deptree-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in deptree-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: Format,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: Format,
        message: String,
    },

    #[error("Unsupported file format '.{extension}' (expected toml, json or yaml)")]
    UnsupportedFormat { extension: String },

    #[error("Unsupported hash algorithm: {name}")]
    UnsupportedHash { name: String },

    #[error("Failed to walk directory {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
