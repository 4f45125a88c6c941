//! Settings types: a partial layer and the effective result

use serde::{Deserialize, Serialize};

use deptree_fs::constants::DEFAULT_MANIFEST_NAME;
use deptree_fs::{DeptreePath, NormalizedPath};
use deptree_meta::SourcePolicy;

/// One configuration layer. Absent keys leave lower layers in effect.
///
/// Relative directories are taken relative to the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsLayer {
    /// Manifest file name looked up in every directory
    pub manifest: Option<String>,
    /// Materialize into the shared workspace instead of the build cache
    pub use_workspace: Option<bool>,
    pub workspace_dir: Option<String>,
    pub build_dir: Option<String>,
    /// Skip fetching workspace dependencies whose source dir is populated
    pub reuse_existing: Option<bool>,
    pub mixed_sources: Option<SourcePolicy>,
}

impl SettingsLayer {
    /// Apply `other` on top of this layer.
    pub fn merge(&mut self, other: &SettingsLayer) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }

        take(&mut self.manifest, &other.manifest);
        take(&mut self.use_workspace, &other.use_workspace);
        take(&mut self.workspace_dir, &other.workspace_dir);
        take(&mut self.build_dir, &other.build_dir);
        take(&mut self.reuse_existing, &other.reuse_existing);
        take(&mut self.mixed_sources, &other.mixed_sources);
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub manifest: String,
    pub use_workspace: bool,
    /// Empty when configured as an empty string; the layout falls back then
    pub workspace_dir: NormalizedPath,
    pub build_dir: NormalizedPath,
    pub reuse_existing: bool,
    pub mixed_sources: SourcePolicy,
}

impl Settings {
    /// Fill the gaps of a merged layer with defaults for `root`.
    pub fn from_layer(root: &NormalizedPath, layer: SettingsLayer) -> Self {
        let config_dir = root.join(DeptreePath::ConfigDir.as_str());

        Self {
            manifest: layer
                .manifest
                .unwrap_or_else(|| DEFAULT_MANIFEST_NAME.to_string()),
            use_workspace: layer.use_workspace.unwrap_or(false),
            workspace_dir: layer
                .workspace_dir
                .map(|dir| resolve_dir(root, &dir))
                .unwrap_or_else(|| config_dir.join(DeptreePath::Workspace.as_str())),
            build_dir: layer
                .build_dir
                .map(|dir| resolve_dir(root, &dir))
                .unwrap_or_else(|| config_dir.join(DeptreePath::Build.as_str())),
            reuse_existing: layer.reuse_existing.unwrap_or(true),
            mixed_sources: layer.mixed_sources.unwrap_or_default(),
        }
    }

    /// Defaults for `root` with no configuration at all.
    pub fn defaults(root: &NormalizedPath) -> Self {
        Self::from_layer(root, SettingsLayer::default())
    }
}

fn resolve_dir(root: &NormalizedPath, dir: &str) -> NormalizedPath {
    if dir.is_empty() || std::path::Path::new(dir).is_absolute() {
        NormalizedPath::new(dir)
    } else {
        root.join(dir)
    }
}
