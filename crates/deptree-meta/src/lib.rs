//! Manifest and dependency declaration parsing for deptree.
//!
//! A manifest is a directory-local text file with one declaration per line:
//!
//! ```text
//! # name  KEY value ...
//! libfoo  GIT_REPOSITORY https://example/foo GIT_TAG v1.0
//! zlib    URL https://example/zlib.tar.gz URL_HASH SHA256=...
//! ```
//!
//! [`ManifestReader`] finds and filters the lines, [`DependencySpec::parse`]
//! turns each line into a typed [`Source`] plus pass-through options.

pub mod error;
pub mod manifest;
pub mod name;
pub mod spec;

pub use error::{Error, ParseError, Result};
pub use manifest::{ManifestLine, ManifestReader};
pub use name::validate_dependency_name;
pub use spec::{DependencySpec, Source, SourceKind, SourcePolicy, UrlHash};
