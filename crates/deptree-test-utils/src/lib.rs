//! Shared test utilities for the deptree workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: local git repositories with tagged history
//! - [`tree`]: [`tree::ProjectTree`] builder for manifest hierarchies

pub mod git;
pub mod tree;
