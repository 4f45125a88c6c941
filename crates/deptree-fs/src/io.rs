//! Atomic I/O operations with file locking, plus directory copies

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;
use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file lives next to the target so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Recursively copy the contents of `source` into `dest`.
///
/// `dest` is created if missing. Existing files are overwritten, files only
/// present in `dest` are left alone. Returns the number of files copied.
pub fn copy_tree(source: &NormalizedPath, dest: &NormalizedPath) -> Result<usize> {
    let source_native = source.to_native();
    let dest_native = dest.to_native();
    fs::create_dir_all(&dest_native).map_err(|e| Error::io(&dest_native, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(&source_native).min_depth(1) {
        let entry = entry.map_err(|e| Error::Walk {
            path: source_native.clone(),
            message: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(&source_native)
            .map_err(|e| Error::Walk {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            })?;
        let target = dest_native.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| Error::io(entry.path(), e))?;
            copied += 1;
        }
    }

    tracing::debug!(
        source = %source,
        dest = %dest,
        files = copied,
        "Copied directory tree"
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("a/b/c.txt"));

        write_atomic(&path, b"hello").unwrap();

        assert_eq!(read_text(&path).unwrap(), "hello");
    }

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("out.toml"));

        write_text(&path, "first").unwrap();
        write_text(&path, "second").unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["out.toml".to_string()]);
        assert_eq!(read_text(&path).unwrap(), "second");
    }

    #[test]
    fn read_text_reports_path_on_failure() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("missing.txt"));

        let err = read_text(&path).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }
}
