//! Fetchers for deptree
//!
//! A [`Fetcher`] turns a [`FetchRequest`] into a populated source directory.
//! [`SourceFetcher`] is the production implementation: it dispatches on the
//! declared source kind to [`GitFetcher`], [`UrlFetcher`] or
//! [`CommandFetcher`] (svn, hg, cvs).

pub mod command;
pub mod error;
pub mod fetcher;
pub mod git;
pub mod source;
pub mod url;

pub use command::CommandFetcher;
pub use error::{Error, ErrorKind, Result};
pub use fetcher::{FetchRequest, Fetcher};
pub use git::GitFetcher;
pub use source::SourceFetcher;
pub use url::UrlFetcher;
