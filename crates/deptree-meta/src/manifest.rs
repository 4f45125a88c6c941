//! Reading dependency manifests from project directories

use crate::spec::{DependencySpec, SourcePolicy};
use crate::{Error, Result};
use deptree_fs::constants::DEFAULT_MANIFEST_NAME;
use deptree_fs::{NormalizedPath, io};

/// A declaration line together with its 1-based position in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLine {
    pub number: usize,
    pub content: String,
}

/// Locates and reads the manifest of a directory.
#[derive(Debug, Clone)]
pub struct ManifestReader {
    file_name: String,
}

impl Default for ManifestReader {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_NAME)
    }
}

impl ManifestReader {
    /// Create a reader for manifests called `file_name`.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Manifest file name this reader looks for.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Where the manifest of `dir` would live.
    pub fn manifest_path(&self, dir: &NormalizedPath) -> NormalizedPath {
        dir.join(&self.file_name)
    }

    /// Declaration lines of `dir`'s manifest, in file order.
    ///
    /// Returns `None` when the directory has no manifest. Blank lines and
    /// `#` comments are dropped.
    pub fn read(&self, dir: &NormalizedPath) -> Result<Option<Vec<ManifestLine>>> {
        let path = self.manifest_path(dir);
        if !path.is_file() {
            return Ok(None);
        }
        let text = io::read_text(&path)?;
        Ok(Some(declaration_lines(&text)))
    }

    /// Parsed declarations of `dir`'s manifest, in file order.
    ///
    /// # Errors
    ///
    /// The first malformed line fails the whole read, naming the manifest
    /// path, line number and content.
    pub fn read_specs(
        &self,
        dir: &NormalizedPath,
        policy: SourcePolicy,
    ) -> Result<Option<Vec<DependencySpec>>> {
        let Some(lines) = self.read(dir)? else {
            return Ok(None);
        };

        let path = self.manifest_path(dir);
        lines
            .into_iter()
            .map(|line| {
                DependencySpec::parse_with(&line.content, policy).map_err(|source| {
                    Error::Manifest {
                        path: path.to_native(),
                        line: line.number,
                        content: line.content,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

/// Whether `line` is a comment: its first non-whitespace character is `#`.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Keep the declaration lines of a manifest's text.
pub fn declaration_lines(text: &str) -> Vec<ManifestLine> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !is_comment(line))
        .map(|(idx, line)| ManifestLine {
            number: idx + 1,
            content: line.trim().to_string(),
        })
        .collect()
}
