//! Well-known file and directory names.

use std::path::Path;

/// Default name of the per-directory dependency manifest.
pub const DEFAULT_MANIFEST_NAME: &str = "dependencies.txt";

/// Project settings file inside [`DeptreePath::ConfigDir`].
pub const CONFIG_FILE: &str = "config.toml";

/// Git-ignored local overrides inside [`DeptreePath::ConfigDir`].
pub const LOCAL_CONFIG_FILE: &str = "config.local.toml";

/// Post-order list of materialized dependencies, written into the build dir.
pub const SUBBUILD_MANIFEST: &str = "deptree-subbuilds.toml";

/// Marker recording what a URL fetch last produced, kept in the binary dir.
pub const FETCH_STAMP: &str = ".deptree-stamp.toml";

/// Standard deptree directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeptreePath {
    /// The `.deptree` directory at the project root
    ConfigDir,
    /// The default shared workspace, under the config dir
    Workspace,
    /// The default build directory, under the config dir
    Build,
    /// The fetch cache, under the build directory
    DepsDir,
}

impl DeptreePath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigDir => ".deptree",
            Self::Workspace => "workspace",
            Self::Build => "build",
            Self::DepsDir => "_deps",
        }
    }
}

impl AsRef<Path> for DeptreePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for DeptreePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for DeptreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
