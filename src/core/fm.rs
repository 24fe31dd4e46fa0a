//! File and directory browsing logic for fiander.
//!
//! Provides the [FileEntry] snapshot used throughout fiander and [browse_dir], which reads
//! one directory into a vector of entries.

use crate::core::error::ListingError;

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What an entry is on disk, as listed (symlinks are not followed for this).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// A single entry of a directory listing.
///
/// Immutable once listed; re-reading a directory produces fresh entries.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    name: Box<OsStr>,
    path: PathBuf,
    flags: u8,
    size: u64,
    modified: Option<SystemTime>,
}

impl FileEntry {
    // Flag bit definitions
    pub(super) const IS_DIR: u8 = 1 << 0;
    pub(super) const IS_HIDDEN: u8 = 1 << 1;
    pub(super) const IS_SYMLINK: u8 = 1 << 2;
    pub(super) const IS_BROKEN_SYM: u8 = 1 << 3;
    pub(super) const IS_EXECUTABLE: u8 = 1 << 4;

    #[cfg(unix)]
    const EXEC_FLAG: u32 = 0o111;

    /// Reads a single entry from disk without following a symlink at `path` itself.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = fs::symlink_metadata(path)?;
        let name = path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| path.as_os_str().to_os_string());
        Ok(Self::from_metadata(name, path.to_path_buf(), &meta))
    }

    fn from_metadata(name: OsString, path: PathBuf, meta: &Metadata) -> Self {
        let mut flags = 0u8;
        let mut size = meta.len();
        let mut modified = meta.modified().ok();

        if meta.file_type().is_symlink() {
            flags |= Self::IS_SYMLINK;
            match fs::metadata(&path) {
                Ok(target) => {
                    if target.is_dir() {
                        flags |= Self::IS_DIR;
                    }
                    size = target.len();
                    modified = target.modified().ok().or(modified);
                    flags |= exec_flag(&target);
                }
                Err(_) => flags |= Self::IS_BROKEN_SYM,
            }
        } else {
            if meta.is_dir() {
                flags |= Self::IS_DIR;
            }
            flags |= exec_flag(meta);
        }

        if is_hidden_name(&name, meta) {
            flags |= Self::IS_HIDDEN;
        }

        FileEntry {
            name: name.into_boxed_os_str(),
            path,
            flags,
            size,
            modified,
        }
    }

    // Accessors

    #[inline]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    #[inline]
    pub fn name_str(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn kind(&self) -> EntryKind {
        if self.is_symlink() {
            EntryKind::Symlink
        } else if self.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    /// True for directories and for symlinks whose target is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.flags & Self::IS_DIR != 0
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.flags & Self::IS_HIDDEN != 0
    }

    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.flags & Self::IS_SYMLINK != 0
    }

    #[inline]
    pub fn is_broken_sym(&self) -> bool {
        self.flags & Self::IS_BROKEN_SYM != 0
    }

    #[inline]
    pub fn is_executable(&self) -> bool {
        self.flags & Self::IS_EXECUTABLE != 0
    }
}

#[cfg(unix)]
fn exec_flag(meta: &Metadata) -> u8 {
    use std::os::unix::fs::PermissionsExt;
    if meta.is_file() && meta.permissions().mode() & FileEntry::EXEC_FLAG != 0 {
        FileEntry::IS_EXECUTABLE
    } else {
        0
    }
}

#[cfg(windows)]
fn exec_flag(_meta: &Metadata) -> u8 {
    0
}

#[cfg(unix)]
fn is_hidden_name(name: &OsStr, _meta: &Metadata) -> bool {
    use std::os::unix::ffi::OsStrExt;
    name.as_bytes().first() == Some(&b'.')
}

#[cfg(windows)]
fn is_hidden_name(name: &OsStr, meta: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    meta.file_attributes() & 0x2 != 0 || name.to_string_lossy().starts_with('.')
}

/// Reads the contents of the provided directory into unsorted [FileEntry] values.
///
/// Entries that vanish or cannot be stat'ed mid-read are skipped.
pub fn browse_dir(path: &Path) -> Result<Vec<FileEntry>, ListingError> {
    let read = fs::read_dir(path).map_err(|e| ListingError::from_io(path, e))?;
    let mut entries = Vec::with_capacity(256);

    for entry in read {
        let Ok(entry) = entry else {
            continue;
        };
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        entries.push(FileEntry::from_metadata(
            entry.file_name(),
            entry.path(),
            &meta,
        ));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn entry_from_path_reads_metadata() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        let file_path = tmp.path().join("hello.txt");
        let mut file = File::create(&file_path)?;
        write!(file, "abc123")?;

        let entry = FileEntry::from_path(&file_path)?;
        assert_eq!(entry.kind(), EntryKind::File);
        assert_eq!(entry.name_str(), "hello.txt");
        assert_eq!(entry.size(), 6);
        assert!(entry.modified().is_some());
        assert!(!entry.is_hidden());
        Ok(())
    }

    #[test]
    fn browse_marks_directories_and_hidden() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        fs::create_dir(tmp.path().join("sub"))?;
        File::create(tmp.path().join(".dotfile"))?;

        let entries = browse_dir(tmp.path())?;
        assert_eq!(entries.len(), 2);

        let sub = entries
            .iter()
            .find(|e| e.name() == "sub")
            .ok_or("sub missing")?;
        assert_eq!(sub.kind(), EntryKind::Directory);
        assert_eq!(sub.path(), tmp.path().join("sub"));

        let dot = entries
            .iter()
            .find(|e| e.name() == ".dotfile")
            .ok_or("dotfile missing")?;
        assert!(dot.is_hidden());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_directory_counts_as_dir() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        let target = tmp.path().join("target");
        fs::create_dir(&target)?;
        std::os::unix::fs::symlink(&target, tmp.path().join("link"))?;
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("broken"))?;

        let link = FileEntry::from_path(&tmp.path().join("link"))?;
        assert_eq!(link.kind(), EntryKind::Symlink);
        assert!(link.is_dir());

        let broken = FileEntry::from_path(&tmp.path().join("broken"))?;
        assert!(broken.is_broken_sym());
        assert!(!broken.is_dir());
        Ok(())
    }

    #[test]
    fn browse_nonexistent_reports_not_found() {
        let result = browse_dir(Path::new("/path/does/not/exist"));
        assert!(matches!(result, Err(ListingError::NotFound(_))));
    }
}
