//! Error types for deptree-core

/// Result type for deptree-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a resolution run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host build rejected a dependency
    #[error("Failed to integrate {name}: {message}")]
    Integration { name: String, message: String },

    /// Recursion reached a dependency that has no source dir recorded
    #[error("Dependency {name} was not materialized before recursion")]
    NotMaterialized { name: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from deptree-fs
    #[error(transparent)]
    Fs(#[from] deptree_fs::Error),

    /// Manifest error from deptree-meta
    #[error(transparent)]
    Meta(#[from] deptree_meta::Error),

    /// Fetch error from deptree-fetch
    #[error(transparent)]
    Fetch(#[from] deptree_fetch::Error),
}
