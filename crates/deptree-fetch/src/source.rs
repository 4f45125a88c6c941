//! Dispatch on the declared source kind

use deptree_fs::NormalizedPath;
use deptree_meta::SourceKind;

use crate::{
    CommandFetcher, Error, ErrorKind, FetchRequest, Fetcher, GitFetcher, Result, UrlFetcher,
};

/// Production fetcher: routes each request to the fetcher for its kind.
///
/// A dependency without source fields must already be present in its
/// source directory; it is never fetched.
#[derive(Debug, Clone, Default)]
pub struct SourceFetcher {
    git: GitFetcher,
    url: UrlFetcher,
    command: CommandFetcher,
}

impl SourceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url_fetcher(mut self, url: UrlFetcher) -> Self {
        self.url = url;
        self
    }

    pub fn with_command_fetcher(mut self, command: CommandFetcher) -> Self {
        self.command = command;
        self
    }
}

impl Fetcher for SourceFetcher {
    fn materialize(&self, request: &FetchRequest<'_>) -> Result<NormalizedPath> {
        match request.spec.kind() {
            SourceKind::Git => self.git.materialize(request),
            SourceKind::Url => self.url.materialize(request),
            SourceKind::Svn | SourceKind::Hg | SourceKind::Cvs => {
                self.command.materialize(request)
            }
            SourceKind::Unspecified if request.source_dir.is_dir() => {
                tracing::debug!(
                    dependency = %request.name(),
                    dir = %request.source_dir,
                    "No source declared; using what is present"
                );
                Ok(request.source_dir.clone())
            }
            SourceKind::Unspecified => Err(Error::new(
                request,
                ErrorKind::NotPresent {
                    path: request.source_dir.to_native(),
                },
            )),
        }
    }
}
