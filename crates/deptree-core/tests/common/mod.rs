//! Fetcher double backed by `ProjectTree` remote snapshots.

use std::cell::RefCell;
use std::path::PathBuf;

use deptree_fetch::{Error as FetchError, ErrorKind, FetchRequest, Fetcher};
use deptree_fs::{NormalizedPath, io};
use deptree_test_utils::tree::{DEFAULT_REVISION_DIR, ProjectTree};

/// Copies `remotes/<name>/<revision>` into the requested source dir and
/// records every call.
pub struct SnapshotFetcher {
    tree_root: PathBuf,
    calls: RefCell<Vec<(String, String)>>,
}

impl SnapshotFetcher {
    pub fn new(tree: &ProjectTree) -> Self {
        Self {
            tree_root: tree.root().to_path_buf(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every `(name, revision)` the engine asked for, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    /// How many times `name` was fetched.
    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|(n, _)| n == name).count()
    }

    fn snapshot_dir(&self, name: &str, revision: &str) -> PathBuf {
        let revision_dir = if revision.is_empty() {
            DEFAULT_REVISION_DIR
        } else {
            revision
        };
        self.tree_root.join("remotes").join(name).join(revision_dir)
    }
}

impl Fetcher for SnapshotFetcher {
    fn materialize(&self, request: &FetchRequest<'_>) -> deptree_fetch::Result<NormalizedPath> {
        let revision = request.spec.revision();
        self.calls
            .borrow_mut()
            .push((request.name().to_string(), revision.clone()));

        let snapshot = self.snapshot_dir(request.name(), &revision);
        if !snapshot.is_dir() {
            return Err(FetchError::new(request, ErrorKind::NotPresent { path: snapshot }));
        }
        io::copy_tree(&NormalizedPath::new(&snapshot), &request.source_dir)
            .map_err(|e| FetchError::new(request, e.into()))?;
        Ok(request.source_dir.clone())
    }
}
