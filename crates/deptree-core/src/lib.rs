//! Dependency tree resolution for deptree
//!
//! Starting from a root directory, every manifest reachable through declared
//! dependencies is read, each dependency name is fetched once, and the first
//! request for a name (closest to the root, earliest in file order) decides
//! its revision. Later requests for another revision are overridden and
//! reported as [`ConflictNotice`]s.
//!
//! The pieces:
//! - [`Registry`] records every request and the chosen revision per name
//! - [`ResolutionEngine`] walks the tree in two phases per manifest
//! - [`Layout`] maps names to source and binary directories
//! - [`ProjectIntegrator`] receives each dependency once its own dependencies
//!   are done; [`SubBuildManifest`] is the file-backed implementation
//! - [`Summary`] is the end-of-run report

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod integrator;
pub mod layout;
pub mod registry;
pub mod summary;

pub use config::{ConfigResolver, Settings, SettingsLayer};
pub use context::{ConflictNotice, ResolutionContext};
pub use engine::{ResolutionEngine, ResolutionReport, Resolver};
pub use error::{Error, Result};
pub use integrator::{ProjectIntegrator, SubBuild, SubBuildManifest};
pub use layout::{DependencyDirs, Layout, WorkspaceFallback, WorkspaceProblem};
pub use registry::{Materialized, RecursionState, Registration, Registry, RegistryEntry};
pub use summary::{Summary, SummaryEntry};
