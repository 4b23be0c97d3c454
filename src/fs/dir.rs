//! Recursive directory operations built only on the [`FsBackend`] primitives, so every backend
//! gets the same behavior.

use std::path::Path;

use tracing::warn;

use crate::core::{FsBackend, FsError, Result, utils};

/// Creates the directory `path` and all of its missing parents.
///
/// Existing directories along the way are left untouched, so the call is idempotent. If any
/// prefix of `path` exists but is not a directory, the call fails with `NotADirectory` naming
/// that prefix.
///
/// ### Example
/// ```
/// use wfs_kit::{FsBackend, MemFS};
///
/// let fs = MemFS::new();
/// wfs_kit::fs::mkdir_all(&fs, "/a/b/c", 0o755).unwrap();
/// assert!(fs.stat("/a/b").unwrap().is_dir());
/// ```
pub fn mkdir_all<F, P>(fs: &F, path: P, mode: u32) -> Result<()>
where
    F: FsBackend + ?Sized,
    P: AsRef<Path>,
{
    let parts = utils::split(path)?;
    make_dirs(fs, &parts, mode)
}

fn make_dirs<F: FsBackend + ?Sized>(fs: &F, parts: &[String], mode: u32) -> Result<()> {
    let path = utils::join(parts);
    match fs.stat(&path) {
        Ok(info) if info.is_dir() => return Ok(()),
        Ok(_) => return Err(FsError::not_a_directory(&path)),
        // a file somewhere above shows up here too; the parent pass names it
        Err(FsError::NotFound { .. }) | Err(FsError::NotADirectory { .. }) => {}
        Err(err) => return Err(err),
    }

    if let Some((_, parent)) = parts.split_last() {
        make_dirs(fs, parent, mode)?;
    }

    match fs.mkdir(&path, mode) {
        Ok(()) => Ok(()),
        // somebody else got there first
        Err(err @ FsError::AlreadyExists { .. }) => match fs.stat(&path) {
            Ok(info) if info.is_dir() => Ok(()),
            _ => Err(err),
        },
        Err(err) => Err(err),
    }
}

/// Removes `path` and, for a directory, everything below it.
///
/// A missing `path` is not an error. Removal is best effort: every child is attempted even
/// after a failure, and the first error met is returned.
///
/// The root itself can't be removed. `remove_all("/")` empties the tree and then reports
/// `InvalidArgument`.
pub fn remove_all<F, P>(fs: &F, path: P) -> Result<()>
where
    F: FsBackend + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match fs.remove(path) {
        Ok(()) | Err(FsError::NotFound { .. }) => return Ok(()),
        Err(err) => match fs.stat(path) {
            Ok(info) if info.is_dir() => {}
            Err(FsError::NotFound { .. }) => return Ok(()),
            _ => return Err(err),
        },
    }

    let mut first_err = None;
    for entry in fs.read_dir(path)? {
        let child = path.join(entry.name());
        if let Err(err) = remove_all(fs, &child) {
            warn!(path = %child.display(), error = %err, "failed to remove entry");
            first_err.get_or_insert(err);
        }
    }
    if let Some(err) = first_err {
        return Err(err);
    }

    match fs.remove(path) {
        Ok(()) | Err(FsError::NotFound { .. }) => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DirFS, FsFile, MemFS};
    use tempdir::TempDir;

    fn populate<F: FsBackend>(fs: &F) {
        fs.mkdir("/docs", 0o755).unwrap();
        fs.mkdir("/docs/drafts", 0o755).unwrap();
        fs.write_file("/docs/readme.md", b"readme").unwrap();
        fs.write_file("/docs/drafts/a.txt", b"a").unwrap();
        fs.write_file("/docs/drafts/b.txt", b"b").unwrap();
        fs.write_file("/top.txt", b"top").unwrap();
    }

    fn check_mkdir_all<F: FsBackend>(fs: &F) {
        mkdir_all(fs, "a/b/c", 0o755).unwrap();
        assert!(fs.stat("a").unwrap().is_dir());
        assert!(fs.stat("a/b").unwrap().is_dir());
        assert!(fs.stat("/a/b/c").unwrap().is_dir());

        // idempotent
        mkdir_all(fs, "a/b/c", 0o755).unwrap();
        mkdir_all(fs, "/a/b", 0o755).unwrap();
        mkdir_all(fs, "/", 0o755).unwrap();
    }

    fn check_mkdir_all_through_file<F: FsBackend>(fs: &F) {
        fs.write_file("/plain", b"x").unwrap();
        let err = mkdir_all(fs, "/plain/sub/dir", 0o755).unwrap_err();
        assert!(
            matches!(err, FsError::NotADirectory { ref path } if path == Path::new("plain")),
            "{err:?}"
        );

        let err = mkdir_all(fs, "/plain", 0o755).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
    }

    fn check_remove_all<F: FsBackend>(fs: &F) {
        populate(fs);
        assert!(matches!(fs.remove("/docs"), Err(FsError::NotEmpty { .. })));

        remove_all(fs, "/docs").unwrap();
        assert!(!fs.exists("/docs"));
        assert!(fs.exists("/top.txt"));

        // missing path and plain file
        remove_all(fs, "/docs").unwrap();
        remove_all(fs, "/nothing/here").unwrap();
        remove_all(fs, "/top.txt").unwrap();
        assert!(!fs.exists("/top.txt"));
    }

    fn check_remove_all_root<F: FsBackend>(fs: &F) {
        populate(fs);
        assert!(matches!(
            remove_all(fs, "/"),
            Err(FsError::InvalidArgument(_))
        ));
        assert!(fs.read_dir("/").unwrap().is_empty());
    }

    mod mem {
        use super::*;

        #[test]
        fn test_mkdir_all() {
            check_mkdir_all(&MemFS::new());
        }

        #[test]
        fn test_mkdir_all_through_file() {
            check_mkdir_all_through_file(&MemFS::new());
        }

        #[test]
        fn test_mkdir_all_keeps_mode_of_new_dirs() {
            let fs = MemFS::new();
            mkdir_all(&fs, "/x/y", 0o700).unwrap();
            assert_eq!(fs.stat("/x").unwrap().mode(), 0o700);
            assert_eq!(fs.stat("/x/y").unwrap().mode(), 0o700);
        }

        #[test]
        fn test_remove_all() {
            check_remove_all(&MemFS::new());
        }

        #[test]
        fn test_remove_all_root() {
            check_remove_all_root(&MemFS::new());
        }

        #[test]
        fn test_remove_all_invalidates_descriptors() {
            let fs = MemFS::new();
            populate(&fs);
            let file = fs.open("/docs/drafts/a.txt").unwrap();
            remove_all(&fs, "/docs").unwrap();
            assert!(matches!(file.stat(), Err(FsError::NotFound { .. })));
        }

        #[test]
        fn test_trait_methods_delegate() {
            let fs = MemFS::new();
            fs.mkdir_all("/p/q", 0o755).unwrap();
            fs.write_file("/p/q/r.txt", b"r").unwrap();
            fs.remove_all("/p").unwrap();
            assert!(!fs.exists("/p"));
        }
    }

    mod dir {
        use super::*;

        fn setup_test_env() -> (TempDir, DirFS) {
            let temp_dir = TempDir::new("dir_ops_test").unwrap();
            let fs = DirFS::new(temp_dir.path()).unwrap();
            (temp_dir, fs)
        }

        #[test]
        fn test_mkdir_all() {
            let (temp_dir, fs) = setup_test_env();
            check_mkdir_all(&fs);
            assert!(temp_dir.path().join("a/b/c").is_dir());
        }

        #[test]
        fn test_mkdir_all_through_file() {
            let (_temp_dir, fs) = setup_test_env();
            check_mkdir_all_through_file(&fs);
        }

        #[test]
        fn test_mkdir_all_creates_missing_root() {
            let temp_dir = TempDir::new("dir_ops_test").unwrap();
            let root = temp_dir.path().join("later");
            let fs = DirFS::new(&root).unwrap();
            mkdir_all(&fs, "/sub", 0o755).unwrap();
            assert!(root.join("sub").is_dir());
        }

        #[test]
        fn test_remove_all() {
            let (temp_dir, fs) = setup_test_env();
            check_remove_all(&fs);
            assert!(!temp_dir.path().join("docs").exists());
        }

        #[test]
        fn test_remove_all_root() {
            let (temp_dir, fs) = setup_test_env();
            check_remove_all_root(&fs);
            assert!(temp_dir.path().is_dir());
        }
    }

    mod faults {
        use super::*;
        use crate::{DirEntry, FileInfo, MemFile, OpenOptions};
        use std::cell::RefCell;
        use std::path::PathBuf;

        /// `MemFS` that refuses to remove some names and can hide one path from `stat` once.
        struct Faulty {
            inner: MemFS,
            locked: Vec<&'static str>,
            hidden: RefCell<Option<PathBuf>>,
        }

        impl Faulty {
            fn new(locked: &[&'static str]) -> Self {
                Self {
                    inner: MemFS::new(),
                    locked: locked.to_vec(),
                    hidden: RefCell::new(None),
                }
            }

            fn hide_once(&self, path: &str) {
                *self.hidden.borrow_mut() = Some(utils::clean(path).unwrap());
            }
        }

        impl FsBackend for Faulty {
            type File = MemFile;

            fn open_file<P: AsRef<Path>>(&self, path: P, options: &OpenOptions) -> Result<MemFile> {
                self.inner.open_file(path, options)
            }

            fn mkdir<P: AsRef<Path>>(&self, path: P, mode: u32) -> Result<()> {
                self.inner.mkdir(path, mode)
            }

            fn remove<P: AsRef<Path>>(&self, path: P) -> Result<()> {
                let path = path.as_ref();
                let name = path.file_name().and_then(|name| name.to_str());
                if name.is_some_and(|name| self.locked.iter().any(|locked| *locked == name)) {
                    return Err(FsError::permission_denied(path));
                }
                self.inner.remove(path)
            }

            fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> Result<()> {
                self.inner.rename(from, to)
            }

            fn stat<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo> {
                let path = path.as_ref();
                let mut hidden = self.hidden.borrow_mut();
                if hidden.as_deref() == Some(utils::clean(path)?.as_path()) {
                    hidden.take();
                    return Err(FsError::not_found(path));
                }
                self.inner.stat(path)
            }

            fn read_dir<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DirEntry>> {
                self.inner.read_dir(path)
            }
        }

        fn populate_d(fs: &Faulty) {
            fs.mkdir("/d", 0o755).unwrap();
            fs.mkdir("/d/sub", 0o755).unwrap();
            for file in ["/d/a.txt", "/d/b.txt", "/d/c.txt", "/d/sub/z.txt"] {
                fs.write_file(file, file.as_bytes()).unwrap();
            }
        }

        fn names(fs: &Faulty, path: &str) -> Vec<String> {
            fs.read_dir(path)
                .unwrap()
                .into_iter()
                .map(|entry| entry.name().to_string())
                .collect()
        }

        #[test]
        fn test_remove_all_attempts_every_child() {
            let fs = Faulty::new(&["b.txt"]);
            populate_d(&fs);

            let err = remove_all(&fs, "/d").unwrap_err();
            let failed = Path::new("/d/b.txt");
            assert!(
                matches!(err, FsError::PermissionDenied { ref path } if path == failed),
                "{err:?}"
            );
            assert_eq!(names(&fs, "/d"), ["b.txt"]);
        }

        #[test]
        fn test_remove_all_returns_first_error() {
            let fs = Faulty::new(&["b.txt", "z.txt"]);
            populate_d(&fs);

            let err = remove_all(&fs, "/d").unwrap_err();
            let failed = Path::new("/d/b.txt");
            assert!(
                matches!(err, FsError::PermissionDenied { ref path } if path == failed),
                "{err:?}"
            );
            assert_eq!(names(&fs, "/d"), ["b.txt", "sub"]);
            assert_eq!(names(&fs, "/d/sub"), ["z.txt"]);
        }

        #[test]
        fn test_mkdir_all_accepts_concurrent_directory() {
            let fs = Faulty::new(&[]);
            fs.mkdir("/a", 0o755).unwrap();
            fs.hide_once("/a");

            mkdir_all(&fs, "/a", 0o755).unwrap();
            assert!(fs.stat("/a").unwrap().is_dir());
        }

        #[test]
        fn test_mkdir_all_rejects_concurrent_file() {
            let fs = Faulty::new(&[]);
            fs.write_file("/a", b"file").unwrap();
            fs.hide_once("/a");

            let err = mkdir_all(&fs, "/a", 0o755).unwrap_err();
            assert!(matches!(err, FsError::AlreadyExists { .. }), "{err:?}");
        }
    }
}
