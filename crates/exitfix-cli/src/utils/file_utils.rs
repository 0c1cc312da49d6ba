//! File and path utilities

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::{DirEntry, WalkDir};

/// Utilities for working with files and paths
pub struct FileUtils;

impl FileUtils {
    /// Go files below `dir`, in file name order. Walk errors are yielded in
    /// place so the caller can report them and carry on.
    pub fn find_go_files(
        dir: &Path,
    ) -> impl Iterator<Item = std::result::Result<PathBuf, walkdir::Error>> {
        WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Self::is_go_file(&entry).then(|| Ok(entry.into_path())),
                Err(err) => Some(Err(err)),
            })
    }

    /// Regular files named `*.go` that are not hidden.
    pub fn is_go_file(entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        entry.file_type().is_file() && !name.starts_with('.') && name.ends_with(".go")
    }

    /// Replaces the contents of `path` through a temporary file in the same
    /// directory, keeping the original permissions.
    pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
        let permissions = fs::metadata(path)?.permissions();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.as_file().sync_all()?;
        fs::set_permissions(file.path(), permissions)?;
        file.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}
