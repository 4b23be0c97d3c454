use std::path::{Path, PathBuf};

use crate::DirFS;
use crate::core::{FsError, Result, utils};

/// Location of an executable: its full path, its directory and its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecInfo {
    path: PathBuf,
    dir: PathBuf,
    name: String,
}

impl ExecInfo {
    /// Describes the running executable.
    pub fn current() -> Result<Self> {
        let path = std::env::current_exe().map_err(|e| FsError::from_io(e, "current_exe"))?;
        Self::from_path(path)
    }

    /// Describes the executable at `path`. The path must name a file, not end in `..`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                FsError::invalid(format!("no executable name in '{}'", path.display()))
            })?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        Ok(Self {
            path: path.to_path_buf(),
            dir: dir.to_path_buf(),
            name: name.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend rooted at the executable directory.
    pub fn fs(&self) -> Result<DirFS> {
        DirFS::new(&self.dir)
    }

    /// Backend rooted at `path` below the executable directory.
    pub fn sub_fs<P: AsRef<Path>>(&self, path: P) -> Result<DirFS> {
        DirFS::new(self.dir.join(utils::clean(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsBackend;
    use tempdir::TempDir;

    #[test]
    fn test_current() {
        let exec = ExecInfo::current().unwrap();
        assert!(exec.path().is_file());
        assert_eq!(exec.path(), exec.dir().join(exec.name()));
        assert!(exec.fs().unwrap().exists(exec.name()));
    }

    #[test]
    fn test_from_path() {
        let exec = ExecInfo::from_path("/opt/tool/bin/tool").unwrap();
        assert_eq!(exec.dir(), Path::new("/opt/tool/bin"));
        assert_eq!(exec.name(), "tool");
        assert_eq!(exec.fs().unwrap().root(), Path::new("/opt/tool/bin"));
        assert_eq!(
            exec.sub_fs("/plugins/../data").unwrap().root(),
            Path::new("/opt/tool/bin/data")
        );
    }

    #[test]
    fn test_from_path_without_name() {
        assert!(matches!(
            ExecInfo::from_path("/"),
            Err(FsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_sub_fs_reads_neighbours() {
        let temp_dir = TempDir::new("exec_test").unwrap();
        std::fs::create_dir(temp_dir.path().join("assets")).unwrap();
        std::fs::write(temp_dir.path().join("assets/logo.txt"), b"logo").unwrap();

        let exec = ExecInfo::from_path(temp_dir.path().join("app")).unwrap();
        let assets = exec.sub_fs("assets").unwrap();
        assert_eq!(assets.read_file("logo.txt").unwrap(), b"logo");
    }
}
