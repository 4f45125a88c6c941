//! Dependency declarations
//!
//! One manifest line parses into a [`DependencySpec`]: the dependency name, a
//! typed [`Source`] describing where and at which revision to fetch it, and
//! the options deptree passes through to fetchers without interpreting them.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ParseError;
use crate::name::validate_dependency_name;
use deptree_fs::HashAlgorithm;

/// Keys with a meaning to deptree itself. Everything else is pass-through.
pub const RECOGNIZED_KEYS: [&str; 12] = [
    "GIT_REPOSITORY",
    "GIT_TAG",
    "URL",
    "URL_HASH",
    "URL_MD5",
    "SVN_REPOSITORY",
    "SVN_REVISION",
    "HG_REPOSITORY",
    "HG_TAG",
    "CVS_REPOSITORY",
    "CVS_MODULE",
    "CVS_TAG",
];

/// Pass-through option naming the subdirectory of a checkout that holds the
/// dependency's own manifest.
pub const SOURCE_SUBDIR: &str = "SOURCE_SUBDIR";

/// Source kinds in the order used to pick one when fields for several are
/// given under [`SourcePolicy::Priority`].
const PRIORITY: [SourceKind; 5] = [
    SourceKind::Git,
    SourceKind::Url,
    SourceKind::Svn,
    SourceKind::Hg,
    SourceKind::Cvs,
];

/// Kind of source a dependency is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Git,
    Url,
    Svn,
    Hg,
    Cvs,
    /// No source fields; the dependency must already be in place.
    Unspecified,
}

impl SourceKind {
    fn of_key(key: &str) -> Option<Self> {
        match key {
            "GIT_REPOSITORY" | "GIT_TAG" => Some(Self::Git),
            "URL" | "URL_HASH" | "URL_MD5" => Some(Self::Url),
            "SVN_REPOSITORY" | "SVN_REVISION" => Some(Self::Svn),
            "HG_REPOSITORY" | "HG_TAG" => Some(Self::Hg),
            "CVS_REPOSITORY" | "CVS_MODULE" | "CVS_TAG" => Some(Self::Cvs),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Git => "git",
            Self::Url => "url",
            Self::Svn => "svn",
            Self::Hg => "hg",
            Self::Cvs => "cvs",
            Self::Unspecified => "unspecified",
        };
        f.write_str(name)
    }
}

/// How to treat a declaration carrying fields for more than one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourcePolicy {
    /// Reject the declaration.
    #[default]
    Strict,
    /// Keep the highest-priority kind (git, url, svn, hg, cvs) and drop the
    /// other fields with a warning.
    Priority,
}

impl FromStr for SourcePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "priority" => Ok(Self::Priority),
            other => Err(format!(
                "unknown mixed-source policy '{other}' (expected strict or priority)"
            )),
        }
    }
}

impl fmt::Display for SourcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Priority => f.write_str("priority"),
        }
    }
}

/// Expected digest of a downloaded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlHash {
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest
    pub digest: String,
}

impl UrlHash {
    fn new(algorithm: HashAlgorithm, digest: &str, original: &str) -> Result<Self, ParseError> {
        let invalid = |reason: String| ParseError::InvalidHash {
            value: original.to_string(),
            reason,
        };
        let digest = digest.to_ascii_lowercase();
        if hex::decode(&digest).is_err() {
            return Err(invalid("digest is not hexadecimal".into()));
        }
        if digest.len() != algorithm.hex_len() {
            return Err(invalid(format!(
                "{} digest must be {} hex characters, got {}",
                algorithm,
                algorithm.hex_len(),
                digest.len()
            )));
        }
        Ok(Self { algorithm, digest })
    }
}

impl FromStr for UrlHash {
    type Err = ParseError;

    /// Parse the `ALGO=hex` form used by `URL_HASH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, digest) = s.split_once('=').ok_or_else(|| ParseError::InvalidHash {
            value: s.to_string(),
            reason: "expected ALGO=<hex>".into(),
        })?;
        let algorithm: HashAlgorithm =
            algorithm.parse().map_err(|e: deptree_fs::Error| ParseError::InvalidHash {
                value: s.to_string(),
                reason: e.to_string(),
            })?;
        Self::new(algorithm, digest, s)
    }
}

impl fmt::Display for UrlHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.algorithm, self.digest)
    }
}

/// Where a dependency comes from, with the fields meaningful for its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Git {
        repository: String,
        tag: Option<String>,
    },
    Url {
        url: String,
        hash: Option<UrlHash>,
    },
    Svn {
        repository: String,
        revision: Option<String>,
    },
    Hg {
        repository: String,
        tag: Option<String>,
    },
    Cvs {
        repository: String,
        module: Option<String>,
        tag: Option<String>,
    },
    Unspecified,
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Git { .. } => SourceKind::Git,
            Self::Url { .. } => SourceKind::Url,
            Self::Svn { .. } => SourceKind::Svn,
            Self::Hg { .. } => SourceKind::Hg,
            Self::Cvs { .. } => SourceKind::Cvs,
            Self::Unspecified => SourceKind::Unspecified,
        }
    }

    /// Repository or archive location; empty when none was declared.
    pub fn uri(&self) -> &str {
        match self {
            Self::Git { repository, .. }
            | Self::Svn { repository, .. }
            | Self::Hg { repository, .. }
            | Self::Cvs { repository, .. } => repository,
            Self::Url { url, .. } => url,
            Self::Unspecified => "",
        }
    }

    /// Revision marker: tag, revision number or rendered hash. Empty when
    /// unspecified.
    pub fn revision(&self) -> String {
        match self {
            Self::Git { tag, .. } | Self::Hg { tag, .. } | Self::Cvs { tag, .. } => {
                tag.clone().unwrap_or_default()
            }
            Self::Svn { revision, .. } => revision.clone().unwrap_or_default(),
            Self::Url { hash, .. } => hash.as_ref().map(UrlHash::to_string).unwrap_or_default(),
            Self::Unspecified => String::new(),
        }
    }

    fn from_fields(
        kind: SourceKind,
        fields: &IndexMap<String, String>,
    ) -> Result<Self, ParseError> {
        let get = |key: &str| fields.get(key).cloned();
        let source = match kind {
            SourceKind::Git => Self::Git {
                repository: get("GIT_REPOSITORY").unwrap_or_default(),
                tag: get("GIT_TAG"),
            },
            SourceKind::Url => {
                let hash = match (fields.get("URL_HASH"), fields.get("URL_MD5")) {
                    (Some(value), _) => Some(value.parse()?),
                    (None, Some(md5)) => Some(UrlHash::new(HashAlgorithm::Md5, md5, md5)?),
                    (None, None) => None,
                };
                Self::Url {
                    url: get("URL").unwrap_or_default(),
                    hash,
                }
            }
            SourceKind::Svn => Self::Svn {
                repository: get("SVN_REPOSITORY").unwrap_or_default(),
                revision: get("SVN_REVISION"),
            },
            SourceKind::Hg => Self::Hg {
                repository: get("HG_REPOSITORY").unwrap_or_default(),
                tag: get("HG_TAG"),
            },
            SourceKind::Cvs => Self::Cvs {
                repository: get("CVS_REPOSITORY").unwrap_or_default(),
                module: get("CVS_MODULE"),
                tag: get("CVS_TAG"),
            },
            SourceKind::Unspecified => Self::Unspecified,
        };
        Ok(source)
    }
}

/// One parsed manifest declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Override key, unique across the whole tree
    pub name: String,
    pub source: Source,
    /// Unrecognized keys, passed through to fetchers
    pub options: IndexMap<String, String>,
    /// Every key/value pair of the line, in order, duplicates included
    pub fields: Vec<(String, String)>,
}

impl DependencySpec {
    /// Parse a declaration, rejecting lines that mix source kinds.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        Self::parse_with(line, SourcePolicy::Strict)
    }

    /// Parse a declaration under the given mixed-source policy.
    ///
    /// `line` must be a declaration: blank and comment lines are filtered by
    /// the manifest reader before this is called.
    pub fn parse_with(line: &str, policy: SourcePolicy) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace().peekable();
        let name = tokens.next().ok_or(ParseError::MissingName)?;
        validate_dependency_name(name)?;

        let mut fields = Vec::new();
        while let Some(key) = tokens.next() {
            match tokens.peek() {
                Some(value) if !RECOGNIZED_KEYS.contains(value) => {
                    fields.push((key.to_string(), value.to_string()));
                    tokens.next();
                }
                _ => {
                    return Err(ParseError::MissingValue {
                        key: key.to_string(),
                    });
                }
            }
        }

        // Later occurrences of a key override earlier ones
        let by_key: IndexMap<String, String> = fields.iter().cloned().collect();

        let present: Vec<SourceKind> = PRIORITY
            .into_iter()
            .filter(|kind| by_key.keys().any(|key| SourceKind::of_key(key) == Some(*kind)))
            .collect();

        let kind = match present.as_slice() {
            [] => SourceKind::Unspecified,
            [single] => *single,
            [first, ..] => match policy {
                SourcePolicy::Strict => {
                    return Err(ParseError::AmbiguousSource {
                        kinds: present.clone(),
                    });
                }
                SourcePolicy::Priority => {
                    tracing::warn!(
                        dependency = %name,
                        using = %first,
                        ignored = ?&present[1..],
                        "Declaration mixes source kinds; using the highest-priority one"
                    );
                    *first
                }
            },
        };

        let source = Source::from_fields(kind, &by_key)?;
        let options = by_key
            .into_iter()
            .filter(|(key, _)| !RECOGNIZED_KEYS.contains(&key.as_str()))
            .collect();

        Ok(Self {
            name: name.to_string(),
            source,
            options,
            fields,
        })
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub fn uri(&self) -> &str {
        self.source.uri()
    }

    pub fn revision(&self) -> String {
        self.source.revision()
    }

    /// Value of a pass-through option.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Subdirectory of the checkout holding this dependency's manifest.
    pub fn source_subdir(&self) -> Option<&str> {
        self.option(SOURCE_SUBDIR)
    }
}
