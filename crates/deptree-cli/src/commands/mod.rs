//! Command implementations for deptree-cli

pub mod config;
pub mod list;
pub mod resolve;

pub use config::run_config;
pub use list::run_list;
pub use resolve::run_resolve;

use std::path::Path;

use deptree_core::{ConfigResolver, Settings};
use deptree_fs::NormalizedPath;

use crate::cli::SettingsArgs;
use crate::error::{CliError, Result};

/// Canonical project root for `path`.
pub(crate) fn project_root(path: &Path) -> Result<NormalizedPath> {
    if !path.is_dir() {
        return Err(CliError::user(format!(
            "project directory '{}' does not exist",
            path.display()
        )));
    }
    Ok(NormalizedPath::canonicalize(path)?)
}

/// Effective settings for `root` with command-line overrides on top.
pub(crate) fn effective_settings(root: &NormalizedPath, args: &SettingsArgs) -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let resolver = ConfigResolver::new(root.clone()).with_overrides(args.layer(&cwd));
    Ok(resolver.resolve()?)
}
