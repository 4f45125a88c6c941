//! State owned by one resolution run

use std::fmt;

use serde::Serialize;

use deptree_fs::NormalizedPath;

use crate::Registry;

/// A request that lost to an earlier one for the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictNotice {
    pub name: String,
    pub requested: String,
    pub chosen: String,
    /// Directory whose manifest made the losing request
    pub declared_in: NormalizedPath,
}

impl fmt::Display for ConflictNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dependency {} overridden: requested @ {}, using @ {}",
            self.name,
            display_revision(&self.requested),
            display_revision(&self.chosen)
        )
    }
}

/// Render a revision for people; empty means the source's default.
pub(crate) fn display_revision(revision: &str) -> &str {
    if revision.is_empty() { "(default)" } else { revision }
}

/// Registry plus collected notices for a single run.
///
/// A fresh context per run keeps runs independent of each other.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    registry: Registry,
    notices: Vec<ConflictNotice>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn notices(&self) -> &[ConflictNotice] {
        &self.notices
    }

    pub fn push_notice(&mut self, notice: ConflictNotice) {
        self.notices.push(notice);
    }

    pub fn into_parts(self) -> (Registry, Vec<ConflictNotice>) {
        (self.registry, self.notices)
    }
}
