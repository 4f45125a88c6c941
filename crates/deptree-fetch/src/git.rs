//! Git sources

use deptree_fs::NormalizedPath;
use deptree_meta::Source;

use crate::{Error, ErrorKind, FetchRequest, Fetcher, Result};

/// Clones or updates git checkouts through libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitFetcher;

impl GitFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for GitFetcher {
    fn materialize(&self, request: &FetchRequest<'_>) -> Result<NormalizedPath> {
        let Source::Git { repository, tag } = request.source() else {
            return Err(Error::new(
                request,
                ErrorKind::UnsupportedSource {
                    kind: request.spec.kind(),
                },
            ));
        };
        let revision = tag.as_deref().unwrap_or_default();

        let checkout = deptree_git::checkout_at(repository, &request.source_dir, revision)
            .map_err(|e| Error::new(request, e.into()))?;

        tracing::debug!(
            dependency = %request.name(),
            commit = %checkout.commit,
            fetched = checkout.fetched,
            "Git checkout ready"
        );
        Ok(checkout.path)
    }
}
