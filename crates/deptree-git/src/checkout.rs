//! Clone, fetch and check out a repository at a requested revision
//!
//! These functions encapsulate the git2 patterns used by the git fetcher.

use std::fs;
use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Oid, Repository};

use crate::{Error, Result};
use deptree_fs::NormalizedPath;

/// Refspecs used when an existing checkout lacks the requested revision.
const FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

/// Outcome of [`checkout_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// Directory holding the working tree
    pub path: NormalizedPath,
    /// Commit checked out
    pub commit: String,
    /// Whether the network was touched (clone or fetch)
    pub fetched: bool,
}

/// Materialize `url` at `revision` into `dest`.
///
/// - An existing checkout at `dest` is reused. The revision is looked up
///   locally first and `origin` is only fetched when it is missing.
/// - Otherwise the repository is cloned into `dest`.
/// - An empty `revision` keeps the current HEAD of an existing checkout, or
///   the remote's default branch after a fresh clone.
///
/// The working tree ends up with a detached HEAD at the resolved commit.
///
/// # Errors
///
/// Returns an error if `dest` is populated but not a repository, if `url` is
/// empty and nothing exists at `dest`, or if the revision cannot be found.
pub fn checkout_at(url: &str, dest: &NormalizedPath, revision: &str) -> Result<Checkout> {
    let native = dest.to_native();

    if let Some(repo) = open_existing(&native)? {
        return update_existing(&repo, url, dest, revision);
    }

    if url.is_empty() {
        return Err(Error::MissingRepository { path: native });
    }

    if let Some(parent) = native.parent() {
        fs::create_dir_all(parent).map_err(|e| deptree_fs::Error::io(parent, e))?;
    }

    tracing::info!(url = %url, dest = %dest, "Cloning repository");
    let repo = RepoBuilder::new()
        .clone(url, &native)
        .map_err(|e| Error::CloneFailed {
            url: url.to_string(),
            message: e.message().to_string(),
        })?;

    let commit = if revision.is_empty() {
        head_commit(&repo)?
    } else {
        let oid = resolve_revision(&repo, revision)?.ok_or_else(|| Error::RevisionNotFound {
            revision: revision.to_string(),
            url: url.to_string(),
        })?;
        checkout_detached(&repo, oid)?;
        oid
    };

    Ok(Checkout {
        path: dest.clone(),
        commit: commit.to_string(),
        fetched: true,
    })
}

/// Resolve a tag, branch or commit to a commit id.
///
/// Tries the revision as given, then as a tag, then as a remote-tracking
/// branch of `origin`. Returns `None` when nothing matches.
pub fn resolve_revision(repo: &Repository, revision: &str) -> Result<Option<Oid>> {
    let candidates = [
        revision.to_string(),
        format!("refs/tags/{revision}"),
        format!("refs/remotes/origin/{revision}"),
    ];

    for candidate in &candidates {
        if let Ok(object) = repo.revparse_single(candidate) {
            let commit = object.peel_to_commit()?;
            return Ok(Some(commit.id()));
        }
    }
    Ok(None)
}

/// Commit id HEAD points at.
pub fn head_commit(repo: &Repository) -> Result<Oid> {
    Ok(repo.head()?.peel_to_commit()?.id())
}

fn open_existing(path: &Path) -> Result<Option<Repository>> {
    if !path.exists() {
        return Ok(None);
    }
    match Repository::open(path) {
        Ok(repo) => Ok(Some(repo)),
        Err(_) if !NormalizedPath::new(path).is_populated_dir() => Ok(None),
        Err(_) => Err(Error::NotARepository {
            path: path.to_path_buf(),
        }),
    }
}

fn update_existing(
    repo: &Repository,
    url: &str,
    dest: &NormalizedPath,
    revision: &str,
) -> Result<Checkout> {
    if revision.is_empty() {
        tracing::debug!(dest = %dest, "Existing checkout kept at current HEAD");
        return Ok(Checkout {
            path: dest.clone(),
            commit: head_commit(repo)?.to_string(),
            fetched: false,
        });
    }

    let mut fetched = false;
    let oid = match resolve_revision(repo, revision)? {
        Some(oid) => oid,
        None => {
            fetch_origin(repo, url)?;
            fetched = true;
            resolve_revision(repo, revision)?.ok_or_else(|| Error::RevisionNotFound {
                revision: revision.to_string(),
                url: url.to_string(),
            })?
        }
    };

    if head_commit(repo).ok() == Some(oid) {
        tracing::debug!(dest = %dest, revision = %revision, "Checkout already at revision");
    } else {
        tracing::info!(dest = %dest, revision = %revision, "Checking out revision");
        checkout_detached(repo, oid)?;
    }

    Ok(Checkout {
        path: dest.clone(),
        commit: oid.to_string(),
        fetched,
    })
}

fn fetch_origin(repo: &Repository, url: &str) -> Result<()> {
    let mut remote = repo.find_remote("origin").map_err(|e| Error::FetchFailed {
        url: url.to_string(),
        message: e.message().to_string(),
    })?;

    if let Some(existing) = remote.url()
        && !url.is_empty()
        && existing != url
    {
        tracing::warn!(
            origin = %existing,
            requested = %url,
            "Existing checkout tracks a different origin; fetching from origin"
        );
    }

    let origin_url = remote.url().unwrap_or(url).to_string();
    tracing::info!(url = %origin_url, "Fetching missing revision");
    remote
        .fetch(&FETCH_REFSPECS, None, None)
        .map_err(|e| Error::FetchFailed {
            url: origin_url,
            message: e.message().to_string(),
        })?;
    Ok(())
}

fn checkout_detached(repo: &Repository, oid: Oid) -> Result<()> {
    let commit = repo.find_commit(oid)?;
    repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))?;
    repo.set_head_detached(oid)?;
    Ok(())
}
