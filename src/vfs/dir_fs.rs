//! This module provides a filesystem implementation that maps to a real directory on the host
//! system. Every call is passed straight to `std::fs` after the path has been cleaned and joined
//! under the root.
//!
//! ### Key Features:
//! - **Rooted**: All paths are resolved below a designated root directory (self.root).
//!   `..` components are resolved lexically and never climb above it.
//! - **Pass-through**: No state is kept besides the root; host errors are mapped onto
//!   [`FsError`] kinds and otherwise surfaced unmodified.
//! - **Cross‑platform**: Uses std::path::Path and PathBuf for portable path handling.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{FsBackend, FsError, FsFile, OpenOptions, Result, utils};
use crate::{DirEntry, EntryType, FileInfo};

/// A filesystem implementation rooted at a real directory on the host system.
///
/// ### Usage notes:
/// - `DirFS` does not create its root; create it with `std::fs` or through a parent `DirFS`.
/// - Symlinks on the host are followed by the host calls; `remove()` removes the link itself.
/// - Errors keep the path the caller passed, not the host path.
///
/// ### Example:
/// ```
/// use wfs_kit::{DirFS, FsBackend};
///
/// let root = std::env::temp_dir().join("wfs_kit_doc_dir_fs");
/// std::fs::create_dir_all(&root).unwrap();
///
/// let fs = DirFS::new(&root).unwrap();
/// fs.mkdir_all("/docs", 0o755).unwrap();
/// fs.write_file("/docs/note.txt", b"Hello").unwrap();
/// assert!(fs.exists("/docs/note.txt"));
///
/// fs.remove_all("/docs").unwrap();
/// std::fs::remove_dir(&root).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DirFS {
    root: PathBuf, // host-related path
}

impl DirFS {
    /// Creates a new DirFS instance with the root directory at `root`.
    /// * `root` is a host path. It may not exist yet, but if it exists it must be a directory.
    /// An empty `root` is rejected.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if root.as_os_str().is_empty() {
            return Err(FsError::invalid("invalid root path: empty"));
        }
        if root.exists() && !root.is_dir() {
            return Err(FsError::not_a_directory(root));
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Returns root path related to the host file system.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns the host path matching the inner `path`.
    pub fn to_host<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let inner = utils::clean(path)?;
        if inner.as_os_str().is_empty() {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(inner))
    }

    fn base_name(&self, host: &Path) -> String {
        host.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

impl FsBackend for DirFS {
    type File = DirFile;

    fn open_file<P: AsRef<Path>>(&self, path: P, options: &OpenOptions) -> Result<DirFile> {
        let path = path.as_ref();
        options.check()?;
        let host = self.to_host(path)?;

        let mut opts = std::fs::OpenOptions::new();
        opts.read(options.is_read())
            .write(options.is_write())
            .append(options.is_append())
            .truncate(options.is_truncate())
            .create(options.is_create())
            .create_new(options.is_create_new());
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(options.get_mode());
        }

        let file = opts.open(&host).map_err(|e| FsError::from_io(e, path))?;
        Ok(DirFile {
            file: Some(file),
            name: path.to_string_lossy().into_owned(),
        })
    }

    fn mkdir<P: AsRef<Path>>(&self, path: P, mode: u32) -> Result<()> {
        let path = path.as_ref();
        let host = self.to_host(path)?;

        let mut builder = std::fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        builder
            .create(&host)
            .map_err(|e| FsError::from_io(e, path))?;
        debug!(path = %host.display(), "created directory");
        Ok(())
    }

    fn remove<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if utils::is_root(path) {
            return Err(FsError::invalid("remove: the root cannot be removed"));
        }
        let host = self.to_host(path)?;

        let md = std::fs::symlink_metadata(&host).map_err(|e| FsError::from_io(e, path))?;
        let removed = if md.is_dir() {
            std::fs::remove_dir(&host)
        } else {
            std::fs::remove_file(&host)
        };
        removed.map_err(|e| FsError::from_io(e, path))?;
        debug!(path = %host.display(), "removed");
        Ok(())
    }

    fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> Result<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        if utils::is_root(from) || utils::is_root(to) {
            return Err(FsError::invalid("rename: the root cannot be moved or replaced"));
        }
        let host_from = self.to_host(from)?;
        let host_to = self.to_host(to)?;

        std::fs::rename(&host_from, &host_to).map_err(|e| {
            // the source is the usual culprit of a missing entry
            if e.kind() == io::ErrorKind::NotFound && !host_from.exists() {
                FsError::from_io(e, from)
            } else {
                FsError::from_io(e, to)
            }
        })?;
        debug!(from = %host_from.display(), to = %host_to.display(), "renamed");
        Ok(())
    }

    fn stat<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo> {
        let path = path.as_ref();
        let host = self.to_host(path)?;
        let md = std::fs::metadata(&host).map_err(|e| FsError::from_io(e, path))?;
        Ok(FileInfo::from_metadata(self.base_name(&host), &md))
    }

    fn read_dir<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DirEntry>> {
        let path = path.as_ref();
        let host = self.to_host(path)?;

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&host).map_err(|e| FsError::from_io(e, path))? {
            let entry = entry.map_err(|e| FsError::from_io(e, path))?;
            let file_type = entry.file_type().map_err(|e| FsError::from_io(e, path))?;
            let kind = if file_type.is_dir() {
                EntryType::Directory
            } else {
                EntryType::File
            };
            entries.push(DirEntry::new(
                entry.file_name().to_string_lossy().into_owned(),
                kind,
            ));
        }
        Ok(entries)
    }
}

/// An open host file. Closing drops the handle; any later call fails with `Closed`.
#[derive(Debug)]
pub struct DirFile {
    file: Option<File>,
    name: String,
}

impl DirFile {
    fn file(&self) -> Result<&File> {
        self.file.as_ref().ok_or(FsError::Closed)
    }

    fn host_err(&self, err: io::Error) -> FsError {
        FsError::from_io(err, &self.name)
    }
}

impl FsFile for DirFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut file = self.file()?;
        file.read(buf).map_err(|e| self.host_err(e))
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let file = self.file()?;
        let mut filled = 0;
        while filled < buf.len() {
            match positional_read(file, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => return Err(FsError::UnexpectedEof { read: filled }),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.host_err(e)),
            }
        }
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut file = self.file()?;
        file.write(buf).map_err(|e| self.host_err(e))
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize> {
        let file = self.file()?;
        let mut written = 0;
        while written < buf.len() {
            match positional_write(file, &buf[written..], offset + written as u64) {
                Ok(0) => return Err(self.host_err(io::ErrorKind::WriteZero.into())),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.host_err(e)),
            }
        }
        Ok(written)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let mut file = self.file()?;
        file.seek(pos).map_err(|e| self.host_err(e))
    }

    fn stat(&self) -> Result<FileInfo> {
        let md = self.file()?.metadata().map_err(|e| self.host_err(e))?;
        let name = Path::new(&self.name)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(FileInfo::from_metadata(name, &md))
    }

    fn truncate(&self, size: u64) -> Result<()> {
        self.file()?.set_len(size).map_err(|e| self.host_err(e))
    }

    fn close(&mut self) -> Result<()> {
        self.file.take().ok_or(FsError::Closed)?;
        Ok(())
    }
}

#[cfg(unix)]
fn positional_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(unix)]
fn positional_write(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.write_at(buf, offset)
}

// seek_read/seek_write move the handle cursor on Windows.
#[cfg(windows)]
fn positional_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(windows)]
fn positional_write(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_write(buf, offset)
}
