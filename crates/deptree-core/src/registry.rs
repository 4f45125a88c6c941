//! Run-wide record of dependency requests
//!
//! Every request for a name is appended in the order it is seen. The first
//! request decides the revision; later ones are kept for the summary and
//! flagged as conflicts when they ask for something else.

use indexmap::IndexMap;
use serde::Serialize;

use deptree_fs::NormalizedPath;

/// How far recursion into a dependency has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecursionState {
    #[default]
    Pending,
    /// Its manifest is being resolved; seeing it again means a cycle
    InProgress,
    /// Resolved and handed to the integrator
    Added,
}

/// Where a dependency was put.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Materialized {
    pub uri: String,
    pub source_dir: NormalizedPath,
    pub binary_dir: NormalizedPath,
    /// Directory holding its manifest: the source dir, or a subdir of it
    pub project_dir: NormalizedPath,
}

/// Everything known about one dependency name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    pub chosen_revision: String,
    /// Every requested revision in arrival order, duplicates included
    pub requested_revisions: Vec<String>,
    pub materialized: Option<Materialized>,
    pub recursion: RecursionState,
}

/// Outcome of [`Registry::register_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub chosen_revision: String,
    pub is_first_request: bool,
    /// A non-empty revision other than the chosen one was requested
    pub conflict: bool,
}

/// Dependency names in first-registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request for `name` at `revision` (empty means unspecified).
    pub fn register_request(&mut self, name: &str, revision: &str) -> Registration {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.requested_revisions.push(revision.to_string());
            return Registration {
                chosen_revision: entry.chosen_revision.clone(),
                is_first_request: false,
                conflict: !revision.is_empty() && revision != entry.chosen_revision,
            };
        }

        self.entries.insert(
            name.to_string(),
            RegistryEntry {
                name: name.to_string(),
                chosen_revision: revision.to_string(),
                requested_revisions: vec![revision.to_string()],
                materialized: None,
                recursion: RecursionState::Pending,
            },
        );
        Registration {
            chosen_revision: revision.to_string(),
            is_first_request: true,
            conflict: false,
        }
    }

    /// Record where `name` was materialized.
    ///
    /// The first location recorded for a name is kept; later calls and
    /// unknown names are ignored.
    pub fn mark_materialized(&mut self, name: &str, materialized: Materialized) {
        if let Some(entry) = self.entries.get_mut(name)
            && entry.materialized.is_none()
        {
            entry.materialized = Some(materialized);
        }
    }

    pub fn is_materialized(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| entry.materialized.is_some())
    }

    /// Claim recursion into `name`.
    ///
    /// Returns true only for the `Pending` to `InProgress` transition, so each
    /// name is recursed into at most once and cycles stop at the first
    /// repeat.
    pub fn begin_recursion(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) if entry.recursion == RecursionState::Pending => {
                entry.recursion = RecursionState::InProgress;
                true
            }
            _ => false,
        }
    }

    pub fn mark_added(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.recursion = RecursionState::Added;
        }
    }

    pub fn is_added(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| entry.recursion == RecursionState::Added)
    }

    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// All entries in first-registration order.
    pub fn snapshot(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
