//! The fetcher seam between resolution and the outside world

use deptree_fs::NormalizedPath;
use deptree_meta::{DependencySpec, Source};

use crate::Result;

/// Everything a fetcher needs to materialize one dependency.
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    /// Declaration that won for this name
    pub spec: &'a DependencySpec,
    /// Directory whose manifest declared it; relative local URLs resolve here
    pub declared_in: NormalizedPath,
    pub source_dir: NormalizedPath,
    pub binary_dir: NormalizedPath,
}

impl<'a> FetchRequest<'a> {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn source(&self) -> &Source {
        &self.spec.source
    }
}

/// Materializes a dependency's sources into its target directory.
///
/// Implementations must be idempotent: calling `materialize` again for a
/// target that already holds the requested revision leaves it in place.
pub trait Fetcher {
    /// Populate `request.source_dir` and return the directory that holds the
    /// sources.
    fn materialize(&self, request: &FetchRequest<'_>) -> Result<NormalizedPath>;
}
