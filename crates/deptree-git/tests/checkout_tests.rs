//! Tests for cloning and checking out revisions from local repositories

use deptree_fs::NormalizedPath;
use deptree_git::{Error, checkout_at};
use deptree_test_utils::git::{TaggedCommit, head_id, read_checked_out, tagged_repo};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;
use tempfile::TempDir;

/// Upstream with two tagged releases of `VERSION`.
fn setup_upstream() -> (TempDir, PathBuf, Vec<String>) {
    let temp = TempDir::new().unwrap();
    let upstream = temp.path().join("upstream");
    let ids = tagged_repo(
        &upstream,
        &[
            TaggedCommit {
                tag: "v1.0",
                files: &[("VERSION", "1.0")],
            },
            TaggedCommit {
                tag: "v2.0",
                files: &[("VERSION", "2.0"), ("dependencies.txt", "libbar GIT_TAG v1\n")],
            },
        ],
    );
    (temp, upstream, ids)
}

fn url(path: &PathBuf) -> String {
    path.to_string_lossy().to_string()
}

#[rstest]
#[case("v1.0", "1.0", 0)]
#[case("v2.0", "2.0", 1)]
fn test_clone_at_tag(#[case] tag: &str, #[case] version: &str, #[case] commit: usize) {
    let (temp, upstream, ids) = setup_upstream();
    let dest = temp.path().join("_deps/libfoo-src");

    let checkout = checkout_at(&url(&upstream), &NormalizedPath::new(&dest), tag).unwrap();

    assert!(checkout.fetched);
    assert_eq!(checkout.commit, ids[commit]);
    assert_eq!(read_checked_out(&dest, "VERSION"), version);
    assert_eq!(head_id(&dest), ids[commit]);
}

#[test]
fn test_clone_at_commit_id() {
    let (temp, upstream, ids) = setup_upstream();
    let dest = temp.path().join("dest");

    checkout_at(&url(&upstream), &NormalizedPath::new(&dest), &ids[0]).unwrap();

    assert_eq!(read_checked_out(&dest, "VERSION"), "1.0");
}

#[test]
fn test_clone_without_revision_uses_default_branch() {
    let (temp, upstream, ids) = setup_upstream();
    let dest = temp.path().join("dest");

    let checkout = checkout_at(&url(&upstream), &NormalizedPath::new(&dest), "").unwrap();

    assert_eq!(checkout.commit, ids[1]);
    assert_eq!(read_checked_out(&dest, "VERSION"), "2.0");
}

#[test]
fn test_existing_checkout_at_revision_skips_network() {
    let (temp, upstream, ids) = setup_upstream();
    let dest = NormalizedPath::new(temp.path().join("dest"));

    checkout_at(&url(&upstream), &dest, "v1.0").unwrap();
    let again = checkout_at(&url(&upstream), &dest, "v1.0").unwrap();

    assert!(!again.fetched);
    assert_eq!(again.commit, ids[0]);
}

#[test]
fn test_existing_checkout_switches_to_known_tag() {
    let (temp, upstream, _ids) = setup_upstream();
    let dest = temp.path().join("dest");
    let dest_path = NormalizedPath::new(&dest);

    checkout_at(&url(&upstream), &dest_path, "v2.0").unwrap();
    let checkout = checkout_at(&url(&upstream), &dest_path, "v1.0").unwrap();

    assert!(!checkout.fetched);
    assert_eq!(read_checked_out(&dest, "VERSION"), "1.0");
    assert!(!dest.join("dependencies.txt").exists());
}

#[test]
fn test_existing_checkout_fetches_new_tag() {
    let (temp, upstream, _ids) = setup_upstream();
    let dest = temp.path().join("dest");
    let dest_path = NormalizedPath::new(&dest);
    checkout_at(&url(&upstream), &dest_path, "v1.0").unwrap();

    // Publish a release after the first clone
    let later = tagged_repo(
        &upstream,
        &[TaggedCommit {
            tag: "v3.0",
            files: &[("VERSION", "3.0")],
        }],
    );

    let checkout = checkout_at(&url(&upstream), &dest_path, "v3.0").unwrap();

    assert!(checkout.fetched);
    assert_eq!(checkout.commit, later[0]);
    assert_eq!(read_checked_out(&dest, "VERSION"), "3.0");
}

#[test]
fn test_unknown_revision_reports_url() {
    let (temp, upstream, _ids) = setup_upstream();
    let dest = temp.path().join("dest");

    let err = checkout_at(&url(&upstream), &NormalizedPath::new(&dest), "v9.9").unwrap_err();

    assert!(matches!(err, Error::RevisionNotFound { .. }));
    let message = err.to_string();
    assert!(message.contains("v9.9"), "got: {message}");
    assert!(message.contains("upstream"), "got: {message}");
}
