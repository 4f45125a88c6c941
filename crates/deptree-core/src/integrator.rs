//! Handing resolved dependencies to the host build

use serde::{Deserialize, Serialize};

use deptree_fs::{ConfigStore, NormalizedPath};

use crate::Result;

/// Receives each dependency after its own dependencies were integrated.
pub trait ProjectIntegrator {
    fn integrate(
        &mut self,
        name: &str,
        source_dir: &NormalizedPath,
        binary_dir: &NormalizedPath,
    ) -> Result<()>;
}

/// One sub-build for the host build system to add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBuild {
    pub name: String,
    pub source_dir: NormalizedPath,
    pub binary_dir: NormalizedPath,
}

/// Sub-builds in integration order, saved as `[[dependency]]` tables.
///
/// ```toml
/// [[dependency]]
/// name = "libbar"
/// source_dir = "/proj/.deptree/build/_deps/libbar-src"
/// binary_dir = "/proj/.deptree/build/_deps/libbar-build"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBuildManifest {
    #[serde(rename = "dependency", default)]
    dependencies: Vec<SubBuild>,
}

impl SubBuildManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SubBuild] {
        &self.dependencies
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Write atomically; the format follows the file extension.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        tracing::debug!(path = %path, count = self.len(), "Wrote sub-build manifest");
        Ok(())
    }

    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }
}

impl ProjectIntegrator for SubBuildManifest {
    fn integrate(
        &mut self,
        name: &str,
        source_dir: &NormalizedPath,
        binary_dir: &NormalizedPath,
    ) -> Result<()> {
        self.dependencies.push(SubBuild {
            name: name.to_string(),
            source_dir: source_dir.clone(),
            binary_dir: binary_dir.clone(),
        });
        Ok(())
    }
}
