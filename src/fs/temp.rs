//! Per-process scratch space on the host.
//!
//! A [`TempRoot`] owns one work directory below a base directory. The work directory is
//! created on first use and kept afterwards; temporary files and directories are created
//! inside it with owner-only permissions.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::core::{FsBackend, FsError, OpenOptions, Result, utils};
use crate::fs::ExecInfo;
use crate::{DirFS, DirFile};

const MAX_ATTEMPTS: usize = 64;

/// Lazily created work directory `<base>/<nanos><name>`.
///
/// The directory is created at most once per `TempRoot`, even when several threads ask for
/// it at the same time. It is never removed automatically.
#[derive(Debug)]
pub struct TempRoot {
    base: PathBuf,
    name: String,
    work_dir: OnceCell<PathBuf>,
}

impl TempRoot {
    /// Creates a context rooted at `base`. `name` becomes the work directory suffix and must not
    /// contain a path separator.
    pub fn new<P: AsRef<Path>>(base: P, name: &str) -> Result<Self> {
        utils::check_name(name)?;
        Ok(Self {
            base: base.as_ref().to_path_buf(),
            name: name.to_string(),
            work_dir: OnceCell::new(),
        })
    }

    /// Context under the system temp directory, named after the running executable.
    pub fn from_env() -> Result<Self> {
        let exec = ExecInfo::current()?;
        Self::new(std::env::temp_dir(), exec.name())
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns the work directory, creating it on the first call.
    pub fn work_dir(&self) -> Result<&Path> {
        let dir = self.work_dir.get_or_try_init(|| {
            let fs = DirFS::new(&self.base)?;
            fs.mkdir_all("/", 0o700)?;
            let name = create_unique(&self.name, |name| fs.mkdir(name, 0o700))?;
            let dir = self.base.join(name);
            info!(path = %dir.display(), "created temp work directory");
            Ok::<_, FsError>(dir)
        })?;
        Ok(dir.as_path())
    }

    /// Creates a new empty file in the work directory, opened for reading and writing with mode
    /// `0o600`. The file name ends with `suffix`.
    pub fn create_temp(&self, suffix: &str) -> Result<DirFile> {
        utils::check_name(suffix)?;
        let fs = DirFS::new(self.work_dir()?)?;
        let options = *OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .mode(0o600);

        let mut file = None;
        create_unique(suffix, |name| {
            file = Some(fs.open_file(name, &options)?);
            Ok(())
        })?;
        file.ok_or_else(|| FsError::invalid("create_temp: no file created"))
    }

    /// Creates a new directory with mode `0o700` in the work directory and returns its host
    /// path. The directory name ends with `suffix`.
    pub fn create_temp_dir(&self, suffix: &str) -> Result<PathBuf> {
        utils::check_name(suffix)?;
        let work_dir = self.work_dir()?;
        let fs = DirFS::new(work_dir)?;
        let name = create_unique(suffix, |name| fs.mkdir(name, 0o700))?;
        Ok(work_dir.join(name))
    }
}

/// Runs `create` with fresh names until one does not exist yet.
fn create_unique<C>(suffix: &str, mut create: C) -> Result<String>
where
    C: FnMut(&str) -> Result<()>,
{
    let mut last_err = None;
    for _ in 0..MAX_ATTEMPTS {
        let name = temp_name(suffix);
        match create(&name) {
            Ok(()) => {
                debug!(name = %name, "created temp entry");
                return Ok(name);
            }
            Err(err @ FsError::AlreadyExists { .. }) => last_err = Some(err),
            Err(err) => return Err(err),
        }
    }
    Err(last_err.unwrap_or_else(|| FsError::invalid("temp name: no attempts made")))
}

/// `<nanoseconds since the epoch><suffix>`
fn temp_name(suffix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsFile;
    use std::io::SeekFrom;
    use tempdir::TempDir;

    fn setup_test_env() -> (TempDir, TempRoot) {
        let temp_dir = TempDir::new("temp_root_test").unwrap();
        let root = TempRoot::new(temp_dir.path(), "app").unwrap();
        (temp_dir, root)
    }

    mod work_dir {
        use super::*;

        #[test]
        fn test_created_once() {
            let (temp_dir, root) = setup_test_env();
            let first = root.work_dir().unwrap().to_path_buf();
            let second = root.work_dir().unwrap().to_path_buf();
            assert_eq!(first, second);
            assert!(first.is_dir());
            assert_eq!(first.parent().unwrap(), temp_dir.path());
            assert!(first.file_name().unwrap().to_str().unwrap().ends_with("app"));
            assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
        }

        #[test]
        fn test_missing_base_is_created() {
            let temp_dir = TempDir::new("temp_root_test").unwrap();
            let root = TempRoot::new(temp_dir.path().join("deeper"), "app").unwrap();
            assert!(root.work_dir().unwrap().is_dir());
        }

        #[test]
        fn test_name_with_separator() {
            let temp_dir = TempDir::new("temp_root_test").unwrap();
            assert!(matches!(
                TempRoot::new(temp_dir.path(), "a/b"),
                Err(FsError::InvalidArgument(_))
            ));
        }

        #[test]
        fn test_from_env() {
            let root = TempRoot::from_env().unwrap();
            assert_eq!(root.base(), std::env::temp_dir());
        }
    }

    mod create {
        use super::*;

        #[test]
        fn test_create_temp() {
            let (_temp_dir, root) = setup_test_env();
            let mut file = root.create_temp(".log").unwrap();
            assert!(file.name().ends_with(".log"));

            file.write_all(b"scratch").unwrap();
            file.seek(SeekFrom::Start(0)).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            assert_eq!(content, b"scratch");

            let host = root.work_dir().unwrap().join(file.name());
            assert!(host.is_file());
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mode = std::fs::metadata(&host).unwrap().permissions().mode();
                assert_eq!(mode & 0o077, 0);
            }
        }

        #[test]
        fn test_create_temp_names_differ() {
            let (_temp_dir, root) = setup_test_env();
            let a = root.create_temp(".tmp").unwrap();
            let b = root.create_temp(".tmp").unwrap();
            assert_ne!(a.name(), b.name());
        }

        #[test]
        fn test_create_temp_dir() {
            let (_temp_dir, root) = setup_test_env();
            let dir = root.create_temp_dir("-cache").unwrap();
            assert!(dir.is_dir());
            assert_eq!(dir.parent().unwrap(), root.work_dir().unwrap());
            assert!(dir.to_str().unwrap().ends_with("-cache"));
        }

        #[test]
        fn test_suffix_with_separator() {
            let (_temp_dir, root) = setup_test_env();
            assert!(matches!(
                root.create_temp("x/y"),
                Err(FsError::InvalidArgument(_))
            ));
            assert!(matches!(
                root.create_temp_dir("x/y"),
                Err(FsError::InvalidArgument(_))
            ));
        }
    }
}
