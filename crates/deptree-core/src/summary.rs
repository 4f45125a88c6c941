//! End-of-run report

use std::fmt::Write;

use serde::Serialize;

use deptree_fs::NormalizedPath;

use crate::Registry;
use crate::context::display_revision;

/// Outcome for one dependency name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub name: String,
    pub chosen_revision: String,
    /// Distinct requested revisions, in first-seen order
    pub requested_revisions: Vec<String>,
    /// Some request asked for a revision other than the chosen one
    pub overridden: bool,
    pub source_dir: Option<NormalizedPath>,
}

/// Every dependency of a run in first-registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub dependencies: Vec<SummaryEntry>,
}

impl Summary {
    /// Read the registry; calling this repeatedly gives the same result.
    pub fn from_registry(registry: &Registry) -> Self {
        let dependencies = registry
            .snapshot()
            .map(|entry| {
                let mut requested: Vec<String> = Vec::new();
                for revision in &entry.requested_revisions {
                    if !requested.contains(revision) {
                        requested.push(revision.clone());
                    }
                }
                let overridden = requested
                    .iter()
                    .any(|r| !r.is_empty() && *r != entry.chosen_revision);

                SummaryEntry {
                    name: entry.name.clone(),
                    chosen_revision: entry.chosen_revision.clone(),
                    requested_revisions: requested,
                    overridden,
                    source_dir: entry.materialized.as_ref().map(|m| m.source_dir.clone()),
                }
            })
            .collect();

        Self { dependencies }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SummaryEntry> {
        self.dependencies.iter().find(|entry| entry.name == name)
    }

    /// Plain-text block, one line per dependency.
    pub fn render(&self) -> String {
        if self.dependencies.is_empty() {
            return "No dependencies.\n".to_string();
        }

        let width = self
            .dependencies
            .iter()
            .map(|entry| entry.name.len())
            .max()
            .unwrap_or(0);

        let mut out = String::from("Dependency summary:\n");
        for entry in &self.dependencies {
            let requested = entry
                .requested_revisions
                .iter()
                .map(|r| display_revision(r))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(
                out,
                "  {:<width$}  @ {}  requested [{}]",
                entry.name,
                display_revision(&entry.chosen_revision),
                requested,
            );
            if entry.overridden {
                out.push_str("  (overridden)");
            }
            out.push('\n');
        }
        out
    }
}
