//! Where each dependency's sources and build output go

use std::fmt;

use deptree_fs::{DeptreePath, NormalizedPath};

use crate::Settings;

/// Source and binary directories of one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDirs {
    pub source_dir: NormalizedPath,
    pub binary_dir: NormalizedPath,
}

/// Why a configured workspace could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceProblem {
    Empty,
    NotADirectory,
}

impl fmt::Display for WorkspaceProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("workspace path is empty"),
            Self::NotADirectory => f.write_str("workspace path exists but is not a directory"),
        }
    }
}

/// A misconfigured workspace and the directory used instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFallback {
    pub requested: NormalizedPath,
    pub problem: WorkspaceProblem,
    pub using: NormalizedPath,
}

impl fmt::Display for WorkspaceFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ('{}'); using {}",
            self.problem, self.requested, self.using
        )
    }
}

/// Maps dependency names to directories.
///
/// - cache mode: `<build_dir>/_deps/<name>-src`
/// - workspace mode: `<workspace_dir>/<name>`
///
/// The binary dir is always `<build_dir>/_deps/<name>-build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    build_dir: NormalizedPath,
    workspace_dir: Option<NormalizedPath>,
    fallback: Option<WorkspaceFallback>,
}

impl Layout {
    /// Materialize every dependency into the per-build cache.
    pub fn cache(build_dir: NormalizedPath) -> Self {
        Self {
            build_dir,
            workspace_dir: None,
            fallback: None,
        }
    }

    /// Materialize into a shared workspace.
    ///
    /// An empty `workspace_dir`, or one that exists but is not a directory,
    /// falls back to `<root>/.deptree/workspace` with a warning. The fallback
    /// is kept and reported by [`Layout::fallback`].
    pub fn workspace(
        root: &NormalizedPath,
        workspace_dir: NormalizedPath,
        build_dir: NormalizedPath,
    ) -> Self {
        let problem = if workspace_dir.as_str().trim().is_empty() {
            Some(WorkspaceProblem::Empty)
        } else if workspace_dir.exists() && !workspace_dir.is_dir() {
            Some(WorkspaceProblem::NotADirectory)
        } else {
            None
        };

        let Some(problem) = problem else {
            return Self {
                build_dir,
                workspace_dir: Some(workspace_dir),
                fallback: None,
            };
        };

        let using = root
            .join(DeptreePath::ConfigDir.as_str())
            .join(DeptreePath::Workspace.as_str());
        let fallback = WorkspaceFallback {
            requested: workspace_dir,
            problem,
            using: using.clone(),
        };
        tracing::warn!(
            requested = %fallback.requested,
            using = %fallback.using,
            "Workspace misconfigured ({}); falling back to default",
            fallback.problem
        );

        Self {
            build_dir,
            workspace_dir: Some(using),
            fallback: Some(fallback),
        }
    }

    /// Layout selected by effective settings.
    pub fn from_settings(root: &NormalizedPath, settings: &Settings) -> Self {
        if settings.use_workspace {
            Self::workspace(root, settings.workspace_dir.clone(), settings.build_dir.clone())
        } else {
            Self::cache(settings.build_dir.clone())
        }
    }

    /// Directories for dependency `name`; a pure function of the name.
    pub fn dirs(&self, name: &str) -> DependencyDirs {
        let deps = self.build_dir.join(DeptreePath::DepsDir.as_str());
        let source_dir = match &self.workspace_dir {
            Some(workspace) => workspace.join(name),
            None => deps.join(&format!("{name}-src")),
        };

        DependencyDirs {
            source_dir,
            binary_dir: deps.join(&format!("{name}-build")),
        }
    }

    pub fn uses_workspace(&self) -> bool {
        self.workspace_dir.is_some()
    }

    pub fn build_dir(&self) -> &NormalizedPath {
        &self.build_dir
    }

    pub fn workspace_dir(&self) -> Option<&NormalizedPath> {
        self.workspace_dir.as_ref()
    }

    /// The fallback taken for a misconfigured workspace, if any.
    pub fn fallback(&self) -> Option<&WorkspaceFallback> {
        self.fallback.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn cache_dirs_are_under_deps() {
        let layout = Layout::cache(NormalizedPath::new("/proj/build"));
        let dirs = layout.dirs("libfoo");

        assert!(!layout.uses_workspace());
        assert_eq!(dirs.source_dir.as_str(), "/proj/build/_deps/libfoo-src");
        assert_eq!(dirs.binary_dir.as_str(), "/proj/build/_deps/libfoo-build");
    }

    #[test]
    fn workspace_dirs_are_named_after_dependency() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());
        let layout = Layout::workspace(&root, root.join("ws"), root.join("build"));
        let dirs = layout.dirs("libfoo");

        assert!(layout.fallback().is_none());
        assert_eq!(dirs.source_dir, root.join("ws/libfoo"));
        assert_eq!(dirs.binary_dir, root.join("build/_deps/libfoo-build"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn empty_workspace_falls_back_to_default(#[case] workspace: &str) {
        let root = NormalizedPath::new("/proj");
        let layout = Layout::workspace(&root, NormalizedPath::new(workspace), root.join("build"));

        let fallback = layout.fallback().unwrap();
        assert_eq!(fallback.problem, WorkspaceProblem::Empty);
        assert_eq!(layout.dirs("x").source_dir.as_str(), "/proj/.deptree/workspace/x");
    }

    #[test]
    fn file_as_workspace_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());
        std::fs::write(temp.path().join("not-a-dir"), "").unwrap();

        let layout = Layout::workspace(&root, root.join("not-a-dir"), root.join("build"));

        let fallback = layout.fallback().unwrap();
        assert_eq!(fallback.problem, WorkspaceProblem::NotADirectory);
        assert_eq!(fallback.using, root.join(".deptree/workspace"));
        assert!(fallback.to_string().contains("not a directory"));
    }
}
