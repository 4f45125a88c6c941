//! [`ProjectTree`] builder for manifest hierarchies.
//!
//! A project tree is a temporary directory holding a root project and a set
//! of "remote" dependency snapshots laid out as `remotes/<name>/<revision>/`.
//! Test fetchers copy a snapshot into the requested target directory, which
//! lets resolution tests run without a network or a VCS.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest file name used when a test does not pick its own.
pub const MANIFEST: &str = "dependencies.txt";

/// Snapshot directory name used for an empty revision.
pub const DEFAULT_REVISION_DIR: &str = "_default";

/// A temporary project with helper methods for writing manifests.
///
/// # Example
///
/// ```rust,no_run
/// use deptree_test_utils::tree::ProjectTree;
///
/// let tree = ProjectTree::new();
/// tree.manifest("project", &["libfoo GIT_REPOSITORY https://example/foo GIT_TAG v1.0"]);
/// tree.remote("libfoo", "v1.0", &["libbar GIT_TAG v2.0"]);
/// tree.remote("libbar", "v2.0", &[]);
/// ```
pub struct ProjectTree {
    temp_dir: TempDir,
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the tree.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `lines` as the default-named manifest of directory `relative`.
    pub fn manifest(&self, relative: &str, lines: &[&str]) -> PathBuf {
        self.manifest_named(relative, MANIFEST, lines)
    }

    /// Write `lines` as manifest `name` of directory `relative`, returning
    /// the directory.
    pub fn manifest_named(&self, relative: &str, name: &str, lines: &[&str]) -> PathBuf {
        let dir = self.path(relative);
        fs::create_dir_all(&dir).unwrap();
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(dir.join(name), content).unwrap();
        dir
    }

    /// Create the remote snapshot of dependency `name` at `revision`.
    ///
    /// An empty `lines` slice creates a snapshot without a manifest, i.e. a
    /// leaf dependency. Returns the snapshot directory.
    pub fn remote(&self, name: &str, revision: &str, lines: &[&str]) -> PathBuf {
        let dir = self.remote_dir(name, revision);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("REVISION"), revision).unwrap();
        if !lines.is_empty() {
            self.manifest(&relative_to(self.root(), &dir), lines);
        }
        dir
    }

    /// Directory a remote snapshot lives in, whether or not it exists.
    pub fn remote_dir(&self, name: &str, revision: &str) -> PathBuf {
        let revision_dir = if revision.is_empty() {
            DEFAULT_REVISION_DIR
        } else {
            revision
        };
        self.root().join("remotes").join(name).join(revision_dir)
    }

    /// Write an arbitrary file relative to the root.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.path(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}

fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap()
        .to_string_lossy()
        .replace('\\', "/")
}
