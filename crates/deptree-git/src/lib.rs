//! Git checkout helpers for deptree
//!
//! Materializes a repository at a tag, branch or commit into a target
//! directory, reusing an existing checkout when it already has the revision.

pub mod checkout;
pub mod error;

pub use checkout::{Checkout, checkout_at, head_commit, resolve_revision};
pub use error::{Error, Result};
