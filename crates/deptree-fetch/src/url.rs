//! Archive and local-path sources
//!
//! `URL` may name an `http(s)://` download, a `file://` URL or a plain path.
//! Relative paths resolve against the directory whose manifest declared the
//! dependency. Archives are unpacked with their single top-level directory
//! stripped; directories are copied; any other file is placed as-is.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use deptree_fs::constants::FETCH_STAMP;
use deptree_fs::{ConfigStore, NormalizedPath, checksum, io as fs_io};
use deptree_meta::{Source, UrlHash};

use crate::{Error, ErrorKind, FetchRequest, Fetcher, Result};

type StepResult<T = ()> = std::result::Result<T, ErrorKind>;

/// Subdirectory of the binary dir that receives downloads.
const DOWNLOAD_DIR: &str = "download";

/// Scratch subdirectory of the binary dir used while unpacking.
const EXTRACT_DIR: &str = "extract";

const DEFAULT_RETRY_WINDOW: Duration = Duration::from_secs(30);

/// What the last successful fetch into a source dir was made from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FetchStamp {
    url: String,
    hash: Option<String>,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Remote(String),
    Local(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    TarGz,
    Tar,
    Plain,
}

/// Downloads, unpacks or copies `URL` sources.
#[derive(Debug, Clone)]
pub struct UrlFetcher {
    agent: ureq::Agent,
    retry_window: Duration,
}

impl Default for UrlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlFetcher {
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new(),
            retry_window: DEFAULT_RETRY_WINDOW,
        }
    }

    /// Give up retrying failed downloads after `window`.
    pub fn with_retry_window(mut self, window: Duration) -> Self {
        self.retry_window = window;
        self
    }

    fn fetch(&self, request: &FetchRequest<'_>, url: &str, hash: Option<&UrlHash>) -> StepResult {
        let stamp_path = request.binary_dir.join(FETCH_STAMP);
        let wanted_hash = hash.map(UrlHash::to_string);

        if request.source_dir.is_populated_dir() {
            // An unreadable stamp just means the dir is refreshed
            let stamp = ConfigStore::new()
                .load_optional::<FetchStamp>(&stamp_path)
                .ok()
                .flatten();
            if let Some(stamp) = stamp
                && stamp.url == url
                && stamp.hash == wanted_hash
            {
                tracing::debug!(
                    dependency = %request.name(),
                    fetched_at = %stamp.fetched_at,
                    "Source dir already holds this URL"
                );
                return Ok(());
            }
        }

        match locate(url, &request.declared_in)? {
            Location::Local(path) if path.is_dir() => {
                if hash.is_some() {
                    tracing::warn!(
                        dependency = %request.name(),
                        path = %path.display(),
                        "Hash ignored for a local directory"
                    );
                }
                reset_dir(&request.source_dir)?;
                fs_io::copy_tree(&NormalizedPath::new(&path), &request.source_dir)?;
            }
            Location::Local(path) => {
                if !path.is_file() {
                    return Err(ErrorKind::Download {
                        message: format!("{} does not exist", path.display()),
                    });
                }
                verify(&NormalizedPath::new(&path), hash)?;
                place(&path, request)?;
            }
            Location::Remote(url) => {
                let file = self.download(&url, &request.binary_dir)?;
                verify(&file, hash)?;
                place(&file.to_native(), request)?;
            }
        }

        ConfigStore::new().save(
            &stamp_path,
            &FetchStamp {
                url: url.to_string(),
                hash: wanted_hash,
                fetched_at: Utc::now(),
            },
        )?;
        Ok(())
    }

    fn download(&self, url: &str, binary_dir: &NormalizedPath) -> StepResult<NormalizedPath> {
        let dir = binary_dir.join(DOWNLOAD_DIR);
        create_dir(&dir)?;
        let target = dir.join(&url_file_name(url));

        tracing::info!(url = %url, dest = %target, "Downloading");
        let policy = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(self.retry_window))
            .build();
        let response = backoff::retry(policy, || {
            self.agent.get(url).call().map_err(|err| match err {
                ureq::Error::Status(code, _) if code < 500 => backoff::Error::permanent(err),
                other => {
                    tracing::warn!(url = %url, error = %other, "Download attempt failed");
                    backoff::Error::transient(other)
                }
            })
        })
        .map_err(|err| {
            let message = match err {
                backoff::Error::Permanent(e) => e.to_string(),
                backoff::Error::Transient { err, .. } => err.to_string(),
            };
            ErrorKind::Download { message }
        })?;

        let native = target.to_native();
        let mut reader = response.into_reader();
        let mut out = File::create(&native).map_err(|e| deptree_fs::Error::io(&native, e))?;
        std::io::copy(&mut reader, &mut out).map_err(|e| ErrorKind::Download {
            message: e.to_string(),
        })?;
        Ok(target)
    }
}

impl Fetcher for UrlFetcher {
    fn materialize(&self, request: &FetchRequest<'_>) -> Result<NormalizedPath> {
        let Source::Url { url, hash } = request.source() else {
            return Err(Error::new(
                request,
                ErrorKind::UnsupportedSource {
                    kind: request.spec.kind(),
                },
            ));
        };
        if url.is_empty() {
            return Err(Error::new(request, ErrorKind::MissingUri));
        }

        self.fetch(request, url, hash.as_ref())
            .map_err(|kind| Error::new(request, kind))?;
        Ok(request.source_dir.clone())
    }
}

fn locate(url: &str, declared_in: &NormalizedPath) -> StepResult<Location> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(Location::Local(PathBuf::from(path)));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(Location::Remote(url.to_string()));
    }
    if url.contains("://") {
        return Err(ErrorKind::UnsupportedScheme {
            url: url.to_string(),
        });
    }

    let path = Path::new(url);
    if path.is_absolute() {
        Ok(Location::Local(path.to_path_buf()))
    } else {
        Ok(Location::Local(declared_in.to_native().join(path)))
    }
}

/// Last path segment of a URL, without query or fragment.
fn url_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("download")
        .to_string()
}

fn archive_format(file_name: &str) -> ArchiveFormat {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        ArchiveFormat::TarGz
    } else if lower.ends_with(".tar") {
        ArchiveFormat::Tar
    } else {
        ArchiveFormat::Plain
    }
}

fn verify(file: &NormalizedPath, hash: Option<&UrlHash>) -> StepResult {
    let Some(hash) = hash else {
        return Ok(());
    };
    let actual = checksum::digest_file(hash.algorithm, file)?;
    if actual != hash.digest {
        return Err(ErrorKind::HashMismatch {
            algorithm: hash.algorithm,
            expected: hash.digest.clone(),
            actual,
        });
    }
    tracing::debug!(file = %file, algorithm = %hash.algorithm, "Hash verified");
    Ok(())
}

/// Put a fetched file's contents into the source dir.
fn place(file: &Path, request: &FetchRequest<'_>) -> StepResult {
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let open = || File::open(file).map_err(|e| deptree_fs::Error::io(file, e));

    reset_dir(&request.source_dir)?;
    match archive_format(&file_name) {
        ArchiveFormat::TarGz => unpack(GzDecoder::new(open()?), file, request),
        ArchiveFormat::Tar => unpack(open()?, file, request),
        ArchiveFormat::Plain => {
            let target = request.source_dir.join(&file_name).to_native();
            fs::copy(file, &target).map_err(|e| deptree_fs::Error::io(&target, e))?;
            Ok(())
        }
    }
}

fn unpack<R: Read>(reader: R, archive: &Path, request: &FetchRequest<'_>) -> StepResult {
    let extract = request.binary_dir.join(EXTRACT_DIR);
    reset_dir(&extract)?;

    tracing::info!(
        dependency = %request.name(),
        archive = %archive.display(),
        "Unpacking archive"
    );
    tar::Archive::new(reader)
        .unpack(extract.to_native())
        .map_err(|e| ErrorKind::Archive {
            path: archive.to_path_buf(),
            message: e.to_string(),
        })?;

    let root = archive_root(&extract)?;
    fs_io::copy_tree(&root, &request.source_dir)?;

    let native = extract.to_native();
    fs::remove_dir_all(&native).map_err(|e| deptree_fs::Error::io(&native, e))?;
    Ok(())
}

/// The single top-level directory of an unpacked archive, or the extraction
/// dir itself when the archive has several top-level entries.
fn archive_root(extract: &NormalizedPath) -> StepResult<NormalizedPath> {
    let native = extract.to_native();
    let entries = fs::read_dir(&native)
        .map_err(|e| deptree_fs::Error::io(&native, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| deptree_fs::Error::io(&native, e))?;

    match entries.as_slice() {
        [only] if only.path().is_dir() => Ok(NormalizedPath::new(only.path())),
        _ => Ok(extract.clone()),
    }
}

fn reset_dir(dir: &NormalizedPath) -> StepResult {
    let native = dir.to_native();
    if native.exists() {
        fs::remove_dir_all(&native).map_err(|e| deptree_fs::Error::io(&native, e))?;
    }
    create_dir(dir)
}

fn create_dir(dir: &NormalizedPath) -> StepResult {
    let native = dir.to_native();
    fs::create_dir_all(&native).map_err(|e| deptree_fs::Error::io(&native, e))?;
    Ok(())
}
