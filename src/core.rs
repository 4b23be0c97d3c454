use std::io::{self, SeekFrom};
use std::path::Path;

use crate::{DirEntry, FileInfo};

pub use crate::error::{FsError, Result};

pub mod utils;

/// Permission bits given to files created through [`FsBackend::create`].
pub const DEFAULT_FILE_MODE: u32 = 0o666;
/// Permission bits for directories when the caller has no preference.
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// Options and flags used to open a file, in the manner of [`std::fs::OpenOptions`].
///
/// ### Example
/// ```
/// use wfs_kit::{FsBackend, MemFS, OpenOptions};
///
/// let fs = MemFS::new();
/// let file = fs
///     .open_file("log.txt", OpenOptions::new().append(true).create(true))
///     .unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    read: bool,
    write: bool,
    append: bool,
    truncate: bool,
    create: bool,
    create_new: bool,
    mode: u32,
}

impl OpenOptions {
    /// Creates a blank set of options: nothing enabled, mode `0o666`.
    pub fn new() -> Self {
        Self {
            read: false,
            write: false,
            append: false,
            truncate: false,
            create: false,
            create_new: false,
            mode: DEFAULT_FILE_MODE,
        }
    }

    pub fn read(&mut self, read: bool) -> &mut Self {
        self.read = read;
        self
    }

    pub fn write(&mut self, write: bool) -> &mut Self {
        self.write = write;
        self
    }

    /// Every write goes to the current end of the file. Implies write access.
    pub fn append(&mut self, append: bool) -> &mut Self {
        self.append = append;
        self
    }

    /// Truncates an existing file to zero length on open.
    pub fn truncate(&mut self, truncate: bool) -> &mut Self {
        self.truncate = truncate;
        self
    }

    /// Creates the file if it is missing. The parent directory must exist.
    pub fn create(&mut self, create: bool) -> &mut Self {
        self.create = create;
        self
    }

    /// Creates the file and fails with `AlreadyExists` if it exists already.
    pub fn create_new(&mut self, create_new: bool) -> &mut Self {
        self.create_new = create_new;
        self
    }

    /// Permission bits for a newly created file.
    pub fn mode(&mut self, mode: u32) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    /// True for `write` and `append`.
    pub fn is_write(&self) -> bool {
        self.write || self.append
    }

    pub fn is_append(&self) -> bool {
        self.append
    }

    pub fn is_truncate(&self) -> bool {
        self.truncate
    }

    pub fn is_create(&self) -> bool {
        self.create || self.create_new
    }

    pub fn is_create_new(&self) -> bool {
        self.create_new
    }

    pub fn get_mode(&self) -> u32 {
        self.mode
    }

    /// Rejects combinations the host would reject too.
    pub(crate) fn check(&self) -> Result<()> {
        if !self.read && !self.is_write() {
            return Err(FsError::invalid("open: no access mode given"));
        }
        if self.truncate && !self.write {
            return Err(FsError::invalid("open: truncate requires write access"));
        }
        if self.is_create() && !self.is_write() {
            return Err(FsError::invalid("open: create requires write access"));
        }
        Ok(())
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// An open file descriptor.
///
/// Every method fails with [`FsError::Closed`] after [`close`](FsFile::close), including a
/// second `close`.
pub trait FsFile {
    /// The path this descriptor was opened with.
    fn name(&self) -> &str;

    /// Reads at the cursor and advances it. `Ok(0)` signals end of data.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Reads at `offset` without moving the cursor.
    ///
    /// Fills `buf` completely or fails with [`FsError::UnexpectedEof`], whose `read` field
    /// tells how many bytes were copied.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize>;

    /// Writes at the cursor (or at the end in append mode) and advances it.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Writes at `offset` without moving the cursor.
    fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize>;

    /// Moves the cursor. Positions past the end are legal, positions before the start are not.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    fn stat(&self) -> Result<FileInfo>;

    /// Sets the file size, growing or shrinking it.
    fn truncate(&self, size: u64) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            let n = self.write(buf)?;
            if n == 0 {
                return Err(FsError::Io {
                    path: self.name().into(),
                    source: io::ErrorKind::WriteZero.into(),
                });
            }
            buf = &buf[n..];
        }
        Ok(())
    }

    /// Reads from the cursor until end of data, appending to `out`.
    fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let mut chunk = [0u8; 4096];
        let mut total = 0;
        loop {
            let n = self.read(&mut chunk)?;
            if n == 0 {
                return Ok(total);
            }
            out.extend_from_slice(&chunk[..n]);
            total += n;
        }
    }

    /// Borrows the descriptor as a `std::io` reader/writer.
    fn io(&mut self) -> FileIo<'_, Self>
    where
        Self: Sized,
    {
        FileIo { file: self }
    }
}

/// Adapter exposing an [`FsFile`] through `std::io::{Read, Write, Seek}`.
pub struct FileIo<'a, F: FsFile + ?Sized> {
    file: &'a mut F,
}

impl<'a, F: FsFile + ?Sized> FileIo<'a, F> {
    pub fn new(file: &'a mut F) -> Self {
        Self { file }
    }
}

impl<F: FsFile + ?Sized> io::Read for FileIo<'_, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.file.read(buf)?)
    }
}

impl<F: FsFile + ?Sized> io::Write for FileIo<'_, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.file.write(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<F: FsFile + ?Sized> io::Seek for FileIo<'_, F> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(self.file.seek(pos)?)
    }
}

/// The filesystem contract every backend satisfies.
///
/// Paths are always relative to the backend root; a leading `/` is accepted and ignored.
/// The provided methods are built on the required ones only, so they behave the same on
/// every backend.
pub trait FsBackend {
    type File: FsFile;

    /// Opens `path` with the given options.
    /// A missing parent directory fails with `NotFound`.
    fn open_file<P: AsRef<Path>>(&self, path: P, options: &OpenOptions) -> Result<Self::File>;

    /// Creates exactly one directory level.
    fn mkdir<P: AsRef<Path>>(&self, path: P, mode: u32) -> Result<()>;

    /// Removes a file or an empty directory.
    fn remove<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Moves an entry. An existing file or empty directory at `to` is replaced.
    fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> Result<()>;

    fn stat<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo>;

    /// Lists the immediate children of a directory. Callers must not rely on the order.
    fn read_dir<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DirEntry>>;

    /// Returns true, if `path` exists.
    fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.stat(path).is_ok()
    }

    /// Opens `path` read-only.
    fn open<P: AsRef<Path>>(&self, path: P) -> Result<Self::File> {
        self.open_file(path, OpenOptions::new().read(true))
    }

    /// Opens `path` for reading and writing, creating or truncating it.
    fn create<P: AsRef<Path>>(&self, path: P) -> Result<Self::File> {
        self.open_file(
            path,
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true),
        )
    }

    /// See [`crate::fs::mkdir_all`].
    fn mkdir_all<P: AsRef<Path>>(&self, path: P, mode: u32) -> Result<()> {
        crate::fs::mkdir_all(self, path, mode)
    }

    /// See [`crate::fs::remove_all`].
    fn remove_all<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::fs::remove_all(self, path)
    }

    /// Reads the entire contents of a file.
    fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        let mut file = self.open(path)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        file.close()?;
        Ok(content)
    }

    /// Replaces the contents of a file, creating it if needed.
    fn write_file<P: AsRef<Path>>(&self, path: P, content: &[u8]) -> Result<()> {
        let mut file = self.create(path)?;
        file.write_all(content)?;
        file.close()
    }
}
