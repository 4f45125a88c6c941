//! Filesystem helpers for deptree
//!
//! Path normalization, atomic writes, directory copies, checksums and
//! format-agnostic configuration loading shared by every other crate.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::HashAlgorithm;
pub use config::ConfigStore;
pub use constants::DeptreePath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
