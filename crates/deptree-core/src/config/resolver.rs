//! Configuration resolution with hierarchical merge

use std::path::PathBuf;

use deptree_fs::constants::{CONFIG_FILE, LOCAL_CONFIG_FILE};
use deptree_fs::{ConfigStore, DeptreePath, NormalizedPath};

use super::settings::{Settings, SettingsLayer};
use crate::Result;

/// Resolves settings by merging multiple sources
///
/// Layers, later overriding earlier:
/// 1. Global defaults (`<config_dir>/deptree/config.toml`)
/// 2. Project config (`.deptree/config.toml`)
/// 3. Local overrides (`.deptree/config.local.toml`), git-ignored
/// 4. Explicit overrides, typically command-line flags
pub struct ConfigResolver {
    root: NormalizedPath,

    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,

    overrides: SettingsLayer,
}

impl ConfigResolver {
    /// Create a resolver for the project at `root`.
    ///
    /// The global layer is read from the platform config directory:
    /// - Linux: `~/.config/deptree/`
    /// - macOS: `~/Library/Application Support/deptree/`
    /// - Windows: `%APPDATA%\deptree\`
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            global_config_dir_override: None,
            overrides: SettingsLayer::default(),
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(root: NormalizedPath, global_config_dir: PathBuf) -> Self {
        Self {
            global_config_dir_override: Some(global_config_dir),
            ..Self::new(root)
        }
    }

    /// Apply `overrides` on top of every file layer.
    pub fn with_overrides(mut self, overrides: SettingsLayer) -> Self {
        self.overrides = overrides;
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("deptree"))
    }

    fn project_config_dir(&self) -> NormalizedPath {
        self.root.join(DeptreePath::ConfigDir.as_str())
    }

    /// Merge all layers and fill in defaults.
    ///
    /// Missing files are skipped. A file that fails to parse is an error.
    pub fn resolve(&self) -> Result<Settings> {
        let mut merged = SettingsLayer::default();

        if let Some(global_dir) = self.global_config_dir() {
            let path = NormalizedPath::new(global_dir.join(CONFIG_FILE));
            self.load_layer(&mut merged, &path, "global")?;
        }
        let project_dir = self.project_config_dir();
        self.load_layer(&mut merged, &project_dir.join(CONFIG_FILE), "project")?;
        self.load_layer(&mut merged, &project_dir.join(LOCAL_CONFIG_FILE), "local")?;

        merged.merge(&self.overrides);
        Ok(Settings::from_layer(&self.root, merged))
    }

    fn load_layer(
        &self,
        merged: &mut SettingsLayer,
        path: &NormalizedPath,
        layer: &str,
    ) -> Result<()> {
        match ConfigStore::new().load_optional::<SettingsLayer>(path)? {
            Some(settings) => {
                tracing::debug!(path = %path, layer, "Loading config layer");
                merged.merge(&settings);
            }
            None => tracing::debug!(path = %path, layer, "No config layer found, skipping"),
        }
        Ok(())
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Check if a project configuration exists
    pub fn has_config(&self) -> bool {
        self.project_config_dir().join(CONFIG_FILE).is_file()
    }

    /// Check if local overrides exist
    pub fn has_local_overrides(&self) -> bool {
        self.project_config_dir().join(LOCAL_CONFIG_FILE).is_file()
    }
}
