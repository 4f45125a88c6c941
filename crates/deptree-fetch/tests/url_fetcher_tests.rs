use deptree_fetch::{ErrorKind, FetchRequest, Fetcher, UrlFetcher};
use deptree_fs::checksum::{HashAlgorithm, digest_bytes};
use deptree_fs::constants::FETCH_STAMP;
use deptree_fs::NormalizedPath;
use deptree_meta::DependencySpec;
use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn request<'a>(spec: &'a DependencySpec, root: &Path) -> FetchRequest<'a> {
    FetchRequest {
        spec,
        declared_in: NormalizedPath::new(root),
        source_dir: NormalizedPath::new(root.join(format!("_deps/{}-src", spec.name))),
        binary_dir: NormalizedPath::new(root.join(format!("_deps/{}-build", spec.name))),
    }
}

fn append(builder: &mut tar::Builder<impl std::io::Write>, path: &str, payload: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_size(payload.len() as u64);
    header.set_cksum();
    builder.append_data(&mut header, path, payload).unwrap();
}

/// `zlib-1.3/` top-level directory holding a manifest and a source file.
fn write_tar_gz(path: &Path) -> Vec<u8> {
    let mut tarball = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    {
        let mut builder = tar::Builder::new(&mut tarball);
        append(&mut builder, "zlib-1.3/dependencies.txt", b"# leaf\n");
        append(&mut builder, "zlib-1.3/src/zlib.c", b"int deflate;");
        builder.finish().unwrap();
    }
    tarball.finish().unwrap();
    fs::read(path).unwrap()
}

fn write_flat_tar(path: &Path) {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    append(&mut builder, "a.txt", b"a");
    append(&mut builder, "b.txt", b"b");
    builder.finish().unwrap();
}

fn src(root: &Path, name: &str) -> PathBuf {
    root.join(format!("_deps/{name}-src"))
}

#[test]
fn test_tar_gz_is_unpacked_without_top_level_dir() {
    let temp = TempDir::new().unwrap();
    write_tar_gz(&temp.path().join("zlib-1.3.tar.gz"));
    let spec = DependencySpec::parse("zlib URL zlib-1.3.tar.gz").unwrap();

    UrlFetcher::new()
        .materialize(&request(&spec, temp.path()))
        .unwrap();

    let dir = src(temp.path(), "zlib");
    assert_eq!(fs::read_to_string(dir.join("src/zlib.c")).unwrap(), "int deflate;");
    assert!(dir.join("dependencies.txt").is_file());
    assert!(!dir.join("zlib-1.3").exists());
    assert!(temp.path().join("_deps/zlib-build").join(FETCH_STAMP).is_file());
}

#[test]
fn test_tar_with_several_roots_is_kept_as_is() {
    let temp = TempDir::new().unwrap();
    write_flat_tar(&temp.path().join("flat.tar"));
    let url = format!("file://{}", temp.path().join("flat.tar").display());
    let spec = DependencySpec::parse(&format!("flat URL {url}")).unwrap();

    UrlFetcher::new()
        .materialize(&request(&spec, temp.path()))
        .unwrap();

    let dir = src(temp.path(), "flat");
    assert_eq!(fs::read_to_string(dir.join("a.txt")).unwrap(), "a");
    assert_eq!(fs::read_to_string(dir.join("b.txt")).unwrap(), "b");
}

#[test]
fn test_matching_hash_is_accepted() {
    let temp = TempDir::new().unwrap();
    let bytes = write_tar_gz(&temp.path().join("zlib.tgz"));
    let digest = digest_bytes(HashAlgorithm::Sha256, &bytes);
    let line = format!("zlib URL zlib.tgz URL_HASH SHA256={digest}");
    let spec = DependencySpec::parse(&line).unwrap();

    let dir = UrlFetcher::new()
        .materialize(&request(&spec, temp.path()))
        .unwrap();
    assert!(dir.join("src/zlib.c").is_file());
}

#[test]
fn test_hash_mismatch_is_fatal() {
    let temp = TempDir::new().unwrap();
    write_tar_gz(&temp.path().join("zlib.tgz"));
    let wrong = "0".repeat(32);
    let spec = DependencySpec::parse(&format!("zlib URL zlib.tgz URL_MD5 {wrong}")).unwrap();

    let err = UrlFetcher::new()
        .materialize(&request(&spec, temp.path()))
        .unwrap_err();

    assert_eq!(err.name, "zlib");
    assert_eq!(err.uri, "zlib.tgz");
    match err.kind {
        ErrorKind::HashMismatch {
            algorithm,
            expected,
            ..
        } => {
            assert_eq!(algorithm, HashAlgorithm::Md5);
            assert_eq!(expected, wrong);
        }
        other => panic!("expected hash mismatch, got {other:?}"),
    }
    assert!(!src(temp.path(), "zlib").exists());
}

#[test]
fn test_local_directory_is_copied() {
    let temp = TempDir::new().unwrap();
    let vendor = temp.path().join("vendor/header-only");
    fs::create_dir_all(vendor.join("include")).unwrap();
    fs::write(vendor.join("include/lib.h"), "#pragma once").unwrap();
    let spec = DependencySpec::parse("headers URL vendor/header-only").unwrap();

    UrlFetcher::new()
        .materialize(&request(&spec, temp.path()))
        .unwrap();

    let copied = src(temp.path(), "headers").join("include/lib.h");
    assert_eq!(fs::read_to_string(copied).unwrap(), "#pragma once");
}

#[test]
fn test_plain_file_is_placed_in_source_dir() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("single.hpp"), "struct S {};").unwrap();
    let spec = DependencySpec::parse("single URL single.hpp").unwrap();

    UrlFetcher::new()
        .materialize(&request(&spec, temp.path()))
        .unwrap();

    let placed = src(temp.path(), "single").join("single.hpp");
    assert_eq!(fs::read_to_string(placed).unwrap(), "struct S {};");
}

#[test]
fn test_repeat_fetch_keeps_existing_source_dir() {
    let temp = TempDir::new().unwrap();
    write_tar_gz(&temp.path().join("zlib.tgz"));
    let spec = DependencySpec::parse("zlib URL zlib.tgz").unwrap();
    let fetcher = UrlFetcher::new();

    fetcher.materialize(&request(&spec, temp.path())).unwrap();
    let local_edit = src(temp.path(), "zlib").join("local.txt");
    fs::write(&local_edit, "edit").unwrap();
    fetcher.materialize(&request(&spec, temp.path())).unwrap();

    assert!(local_edit.is_file());
}

#[test]
fn test_changed_url_refreshes_source_dir() {
    let temp = TempDir::new().unwrap();
    write_tar_gz(&temp.path().join("zlib.tgz"));
    write_flat_tar(&temp.path().join("flat.tar"));
    let first = DependencySpec::parse("zlib URL zlib.tgz").unwrap();
    let second = DependencySpec::parse("zlib URL flat.tar").unwrap();
    let fetcher = UrlFetcher::new();

    fetcher.materialize(&request(&first, temp.path())).unwrap();
    fetcher.materialize(&request(&second, temp.path())).unwrap();

    let dir = src(temp.path(), "zlib");
    assert!(dir.join("a.txt").is_file());
    assert!(!dir.join("src/zlib.c").exists());
}

#[test]
fn test_missing_local_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let spec = DependencySpec::parse("gone URL missing.tar.gz").unwrap();

    let err = UrlFetcher::new()
        .materialize(&request(&spec, temp.path()))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Download { .. }));
}
