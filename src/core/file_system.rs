use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/*
 * This module provides the filesystem provider used by the navigation core.
 * It defines errors specific to these operations, a trait `FileSystemOperations`
 * abstracting the list/read/write/create/remove/move primitives, and a concrete
 * implementation `CoreFileSystem` backed by `std::fs`. Everything above this layer
 * only talks to the trait, so tests can inject failures with a mock provider.
 */

/*
 * Defines custom error types for filesystem operations.
 * `NotFound`, `AlreadyExists` and `NotADirectory` are detected up front so callers can
 * tell a missing target from a generic I/O failure without inspecting `io::ErrorKind`.
 */
#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    NotFound(PathBuf),
    AlreadyExists(PathBuf),
    NotADirectory(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::NotFound(p) => write!(f, "No such file or directory: {p:?}"),
            FileSystemError::AlreadyExists(p) => write!(f, "Already exists: {p:?}"),
            FileSystemError::NotADirectory(p) => write!(f, "Not a directory: {p:?}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/*
 * One raw child of a directory as reported by the provider, before any ordering.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirEntry {
    pub name: String,
    pub is_dir: bool,
}

/*
 * Defines the filesystem primitives the navigation core calls into.
 * All paths are absolute. Implementations must fail rather than silently succeed
 * when the target is invalid, so the core can keep its view consistent.
 */
pub trait FileSystemOperations: Send + Sync {
    fn list_directory(&self, path: &Path) -> Result<Vec<RawDirEntry>>;
    fn read_text(&self, path: &Path) -> Result<String>;
    /* Whole-file overwrite; creates the file if it doesn't exist. */
    fn write_text(&self, path: &Path, text: &str) -> Result<()>;
    fn make_directory(&self, path: &Path) -> Result<()>;
    /* Removes a file, or a directory with all of its descendants. */
    fn remove_recursive(&self, path: &Path) -> Result<()>;
    /* Moves `from` to `to`, failing with `AlreadyExists` if `to` is taken. */
    fn move_item(&self, from: &Path, to: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

/*
 * The `std::fs` implementation of `FileSystemOperations`.
 * Writes go through a sibling temporary file followed by a rename, so an interrupted
 * save never leaves a half-written note behind.
 */
pub struct CoreFileSystem {}

impl CoreFileSystem {
    pub fn new() -> Self {
        CoreFileSystem {}
    }

    fn temp_path_for(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{file_name}.tmp-save"))
    }

    fn write_synced(path: &Path, text: &str) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(text.as_bytes())?;
        // Data must be on disk before the rename makes it visible.
        file.sync_all()
    }
}

impl Default for CoreFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemOperations for CoreFileSystem {
    fn list_directory(&self, path: &Path) -> Result<Vec<RawDirEntry>> {
        log::trace!("CoreFileSystem: Listing {path:?}");
        if !path.exists() {
            return Err(FileSystemError::NotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FileSystemError::NotADirectory(path.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry_result in fs::read_dir(path)? {
            let entry = entry_result?;
            // file_type() does not follow symlinks; a link to a folder is shown as a folder.
            let is_dir = match entry.file_type() {
                Ok(ft) if ft.is_symlink() => entry.path().is_dir(),
                Ok(ft) => ft.is_dir(),
                Err(e) => {
                    log::warn!(
                        "CoreFileSystem: Could not determine type of {:?}: {e}",
                        entry.path()
                    );
                    continue;
                }
            };
            entries.push(RawDirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        Ok(entries)
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        log::trace!("CoreFileSystem: Reading {path:?}");
        if !path.exists() {
            return Err(FileSystemError::NotFound(path.to_path_buf()));
        }
        Ok(fs::read_to_string(path)?)
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        log::trace!("CoreFileSystem: Writing {} bytes to {path:?}", text.len());
        let temp_path = Self::temp_path_for(path);
        if let Err(e) = Self::write_synced(&temp_path, text) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, path) {
            log::warn!("CoreFileSystem: Rename of temp file onto {path:?} failed: {e}");
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn make_directory(&self, path: &Path) -> Result<()> {
        log::trace!("CoreFileSystem: Creating directory {path:?}");
        if path.exists() {
            return Err(FileSystemError::AlreadyExists(path.to_path_buf()));
        }
        fs::create_dir(path)?;
        Ok(())
    }

    fn remove_recursive(&self, path: &Path) -> Result<()> {
        log::trace!("CoreFileSystem: Removing {path:?}");
        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FileSystemError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if metadata.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn move_item(&self, from: &Path, to: &Path) -> Result<()> {
        log::trace!("CoreFileSystem: Moving {from:?} to {to:?}");
        if !from.exists() {
            return Err(FileSystemError::NotFound(from.to_path_buf()));
        }
        if to.exists() {
            return Err(FileSystemError::AlreadyExists(to.to_path_buf()));
        }
        fs::rename(from, to)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
