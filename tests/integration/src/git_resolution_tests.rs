//! End-to-end resolution against real git repositories
//!
//! Upstreams are local repositories with tagged history; resolution runs with
//! the production `SourceFetcher` and writes a `SubBuildManifest`.

use deptree_core::{Layout, ResolutionEngine, ResolutionReport, Resolver, SubBuildManifest};
use deptree_fetch::SourceFetcher;
use deptree_fs::NormalizedPath;
use deptree_test_utils::git::{TaggedCommit, head_id, read_checked_out, tagged_repo};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Upstream `libbar` with releases v1.0 and v2.0.
fn libbar(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("upstream/libbar");
    tagged_repo(
        &path,
        &[
            TaggedCommit {
                tag: "v1.0",
                files: &[("VERSION", "1.0")],
            },
            TaggedCommit {
                tag: "v2.0",
                files: &[("VERSION", "2.0")],
            },
        ],
    );
    path
}

/// Upstream `name` whose v1.0 manifest holds `manifest`.
fn with_manifest(temp: &TempDir, name: &str, manifest: &str) -> PathBuf {
    let path = temp.path().join("upstream").join(name);
    tagged_repo(
        &path,
        &[TaggedCommit {
            tag: "v1.0",
            files: &[("VERSION", "1.0"), ("dependencies.txt", manifest)],
        }],
    );
    path
}

fn git_line(name: &str, repo: &Path, tag: &str) -> String {
    format!("{name} GIT_REPOSITORY {} GIT_TAG {tag}\n", repo.display())
}

fn project(temp: &TempDir, name: &str, manifest: &str) -> NormalizedPath {
    let dir = temp.path().join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("dependencies.txt"), manifest).unwrap();
    NormalizedPath::new(dir)
}

fn resolve(root: &NormalizedPath, layout: &Layout) -> (ResolutionReport, SubBuildManifest) {
    let fetcher = SourceFetcher::new();
    let mut subbuilds = SubBuildManifest::new();
    let engine = ResolutionEngine::new(layout, &fetcher, &mut subbuilds);
    let report = Resolver::new(engine).run(root).unwrap();
    (report, subbuilds)
}

fn names(subbuilds: &SubBuildManifest) -> Vec<&str> {
    subbuilds.entries().iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn test_linear_chain_from_git() {
    let temp = TempDir::new().unwrap();
    let bar = libbar(&temp);
    let foo = with_manifest(&temp, "libfoo", &git_line("libbar", &bar, "v1.0"));
    let root = project(&temp, "app", &git_line("libfoo", &foo, "v1.0"));
    let layout = Layout::cache(root.join("build"));

    let (report, subbuilds) = resolve(&root, &layout);

    assert_eq!(names(&subbuilds), vec!["libbar", "libfoo"]);
    assert!(report.notices.is_empty());

    let bar_dir = layout.dirs("libbar").source_dir.to_native();
    assert_eq!(read_checked_out(&bar_dir, "VERSION"), "1.0");
    assert_eq!(subbuilds.entries()[0].source_dir, layout.dirs("libbar").source_dir);
}

#[test]
fn test_root_revision_overrides_nested_request() {
    let temp = TempDir::new().unwrap();
    let bar = libbar(&temp);
    let mid = with_manifest(&temp, "mid", &git_line("libbar", &bar, "v1.0"));
    let manifest = format!(
        "{}{}",
        git_line("mid", &mid, "v1.0"),
        git_line("libbar", &bar, "v2.0")
    );
    let root = project(&temp, "app", &manifest);
    let layout = Layout::cache(root.join("build"));

    let (report, subbuilds) = resolve(&root, &layout);

    let bar_dir = layout.dirs("libbar").source_dir.to_native();
    assert_eq!(read_checked_out(&bar_dir, "VERSION"), "2.0");

    assert_eq!(report.notices.len(), 1);
    assert_eq!(report.notices[0].name, "libbar");
    assert_eq!(report.notices[0].requested, "v1.0");
    assert_eq!(report.notices[0].chosen, "v2.0");

    let entry = report.summary.get("libbar").unwrap();
    assert!(entry.overridden);
    assert_eq!(entry.requested_revisions, vec!["v2.0", "v1.0"]);

    // libbar is integrated while mid's subtree is walked
    assert_eq!(names(&subbuilds), vec!["libbar", "mid"]);
}

#[test]
fn test_second_run_reuses_checkouts() {
    let temp = TempDir::new().unwrap();
    let bar = libbar(&temp);
    let root = project(&temp, "app", &git_line("libbar", &bar, "v1.0"));
    let layout = Layout::cache(root.join("build"));

    resolve(&root, &layout);
    let bar_dir = layout.dirs("libbar").source_dir.to_native();
    let first = head_id(&bar_dir);

    let (report, subbuilds) = resolve(&root, &layout);

    assert_eq!(head_id(&bar_dir), first);
    assert_eq!(names(&subbuilds), vec!["libbar"]);
    assert_eq!(report.summary.get("libbar").unwrap().chosen_revision, "v1.0");
}

#[test]
fn test_workspace_is_shared_between_projects() {
    let temp = TempDir::new().unwrap();
    let bar = libbar(&temp);
    let workspace = NormalizedPath::new(temp.path().join("workspace"));

    let first = project(&temp, "first", &git_line("libbar", &bar, "v1.0"));
    let first_layout = Layout::workspace(&first, workspace.clone(), first.join("build"));
    resolve(&first, &first_layout);

    // The second project asks for another tag but finds the shared checkout
    let second = project(&temp, "second", &git_line("libbar", &bar, "v2.0"));
    let second_layout = Layout::workspace(&second, workspace.clone(), second.join("build"));
    let (report, _) = resolve(&second, &second_layout);

    let shared = workspace.join("libbar");
    assert_eq!(
        report.summary.get("libbar").unwrap().source_dir,
        Some(shared.clone())
    );
    assert_eq!(read_checked_out(&shared.to_native(), "VERSION"), "1.0");
    assert_eq!(
        second_layout.dirs("libbar").binary_dir,
        second.join("build").join("_deps").join("libbar-build")
    );
}

#[test]
fn test_missing_tag_aborts_run() {
    let temp = TempDir::new().unwrap();
    let bar = libbar(&temp);
    let root = project(&temp, "app", &git_line("libbar", &bar, "v9.9"));
    let layout = Layout::cache(root.join("build"));

    let fetcher = SourceFetcher::new();
    let mut subbuilds = SubBuildManifest::new();
    let engine = ResolutionEngine::new(&layout, &fetcher, &mut subbuilds);
    let err = Resolver::new(engine).run(&root).unwrap_err();

    assert!(err.to_string().contains("libbar"), "{err}");
    assert!(subbuilds.is_empty());
}
