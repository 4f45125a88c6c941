//! Local git repositories with tagged history.
//!
//! Repositories are built with `git2` and a fixed signature, so no global git
//! configuration is needed on the machine running the tests.

use std::fs;
use std::path::Path;

use git2::{Repository, Signature};

/// One commit of a fixture repository: the files it writes and the tag it
/// receives.
pub struct TaggedCommit<'a> {
    pub tag: &'a str,
    pub files: &'a [(&'a str, &'a str)],
}

/// Initialises a real git repository at `path` and records one commit per
/// entry of `commits`, each with a lightweight tag.
///
/// Files accumulate: later commits keep earlier files unless they rewrite
/// them. Returns the commit ids in order.
///
/// # Panics
/// Panics if any git or filesystem operation fails.
pub fn tagged_repo(path: &Path, commits: &[TaggedCommit<'_>]) -> Vec<String> {
    let repo = Repository::init(path).unwrap_or_else(|e| {
        panic!("tagged_repo: failed to init repository at {}: {e}", path.display())
    });
    let signature = Signature::now("Test User", "test@test.com")
        .unwrap_or_else(|e| panic!("tagged_repo: failed to build signature: {e}"));

    let mut ids = Vec::new();
    for commit in commits {
        for (file, content) in commit.files {
            let full = path.join(file);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)
                    .unwrap_or_else(|e| panic!("tagged_repo: failed to create {file}: {e}"));
            }
            fs::write(&full, content)
                .unwrap_or_else(|e| panic!("tagged_repo: failed to write {file}: {e}"));
        }

        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<_> = parents.iter().collect();
        let oid = repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &format!("Release {}", commit.tag),
                &tree,
                &parent_refs,
            )
            .unwrap_or_else(|e| panic!("tagged_repo: commit for {} failed: {e}", commit.tag));

        let object = repo.find_object(oid, None).unwrap();
        repo.tag_lightweight(commit.tag, &object, false)
            .unwrap_or_else(|e| panic!("tagged_repo: tag {} failed: {e}", commit.tag));
        ids.push(oid.to_string());
    }
    ids
}

/// Read the content of `file` in the working tree at `checkout`.
///
/// # Panics
/// Panics if the file cannot be read.
pub fn read_checked_out(checkout: &Path, file: &str) -> String {
    fs::read_to_string(checkout.join(file)).unwrap_or_else(|e| {
        panic!(
            "read_checked_out: could not read {} in {}: {e}",
            file,
            checkout.display()
        )
    })
}

/// Commit id HEAD points at in the repository at `path`.
///
/// # Panics
/// Panics if the repository cannot be opened or has no HEAD.
pub fn head_id(path: &Path) -> String {
    let repo = Repository::open(path)
        .unwrap_or_else(|e| panic!("head_id: failed to open {}: {e}", path.display()));
    let id = repo.head().unwrap().peel_to_commit().unwrap().id();
    id.to_string()
}
