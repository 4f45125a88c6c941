//! File checksums for archive verification
//!
//! URL dependencies may pin their content with `URL_HASH ALGO=<hex>` or
//! `URL_MD5 <hex>`. Digests are always lowercase hex without a prefix.

use std::fmt;
use std::fs::File;
use std::io;
use std::str::FromStr;

use sha2::{Digest, Sha256, Sha512};

use crate::{Error, NormalizedPath, Result};

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
    Md5,
}

impl HashAlgorithm {
    /// Canonical upper-case name, as written in manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Md5 => "MD5",
        }
    }

    /// Length of a hex digest produced by this algorithm.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha512 => 128,
            Self::Md5 => 32,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            "MD5" => Ok(Self::Md5),
            _ => Err(Error::UnsupportedHash {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the hex digest of in-memory bytes.
pub fn digest_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(bytes)),
        HashAlgorithm::Sha512 => format!("{:x}", Sha512::digest(bytes)),
        HashAlgorithm::Md5 => format!("{:x}", md5::compute(bytes)),
    }
}

/// Compute the hex digest of a file, streaming its contents.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn digest_file(algorithm: HashAlgorithm, path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let mut file = File::open(&native).map_err(|e| Error::io(&native, e))?;

    Ok(match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            io::copy(&mut file, &mut hasher).map_err(|e| Error::io(&native, e))?;
            format!("{:x}", hasher.finalize())
        }
        HashAlgorithm::Sha512 => {
            let mut hasher = Sha512::new();
            io::copy(&mut file, &mut hasher).map_err(|e| Error::io(&native, e))?;
            format!("{:x}", hasher.finalize())
        }
        HashAlgorithm::Md5 => {
            let mut context = md5::Context::new();
            io::copy(&mut file, &mut context).map_err(|e| Error::io(&native, e))?;
            format!("{:x}", context.compute())
        }
    })
}
