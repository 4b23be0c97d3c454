//! Error types shared by every backend.

use std::io;
use std::path::{Path, PathBuf};

/// Filesystem error.
///
/// Variants carry the path the failing call was given (not the host path), so the same
/// error reads the same on every backend.
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    #[error("{}: no such file or directory", .path.display())]
    NotFound { path: PathBuf },

    #[error("{}: file already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("{}: not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("{}: not a regular file", .path.display())]
    NotARegularFile { path: PathBuf },

    #[error("{}: directory not empty", .path.display())]
    NotEmpty { path: PathBuf },

    #[error("{}: permission denied", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("file already closed")]
    Closed,

    /// A positional read found fewer bytes than requested. `read` bytes were copied.
    #[error("unexpected end of data after {read} bytes")]
    UnexpectedEof { read: usize },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FsError>;

impl FsError {
    pub(crate) fn not_found<P: AsRef<Path>>(path: P) -> Self {
        FsError::NotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn already_exists<P: AsRef<Path>>(path: P) -> Self {
        FsError::AlreadyExists {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn not_a_directory<P: AsRef<Path>>(path: P) -> Self {
        FsError::NotADirectory {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn not_a_regular_file<P: AsRef<Path>>(path: P) -> Self {
        FsError::NotARegularFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn not_empty<P: AsRef<Path>>(path: P) -> Self {
        FsError::NotEmpty {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn permission_denied<P: AsRef<Path>>(path: P) -> Self {
        FsError::PermissionDenied {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn invalid<S: Into<String>>(reason: S) -> Self {
        FsError::InvalidArgument(reason.into())
    }

    /// Maps a host error onto the taxonomy. Kinds without a counterpart stay `Io`.
    pub(crate) fn from_io<P: AsRef<Path>>(err: io::Error, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists { path },
            io::ErrorKind::NotADirectory => FsError::NotADirectory { path },
            io::ErrorKind::IsADirectory => FsError::NotARegularFile { path },
            io::ErrorKind::DirectoryNotEmpty => FsError::NotEmpty { path },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path },
            io::ErrorKind::InvalidInput => FsError::InvalidArgument(err.to_string()),
            io::ErrorKind::UnexpectedEof => FsError::UnexpectedEof { read: 0 },
            _ => FsError::Io { path, source: err },
        }
    }

    /// The `std::io` kind closest to this error.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            FsError::NotFound { .. } => io::ErrorKind::NotFound,
            FsError::AlreadyExists { .. } => io::ErrorKind::AlreadyExists,
            FsError::NotADirectory { .. } => io::ErrorKind::NotADirectory,
            FsError::NotARegularFile { .. } => io::ErrorKind::IsADirectory,
            FsError::NotEmpty { .. } => io::ErrorKind::DirectoryNotEmpty,
            FsError::PermissionDenied { .. } => io::ErrorKind::PermissionDenied,
            FsError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            FsError::Closed => io::ErrorKind::Other,
            FsError::UnexpectedEof { .. } => io::ErrorKind::UnexpectedEof,
            FsError::Io { source, .. } => source.kind(),
        }
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        match err {
            FsError::Io { source, .. } => source,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_kinds() {
        let err = FsError::from_io(io::Error::from(io::ErrorKind::NotFound), "a/b");
        assert!(matches!(err, FsError::NotFound { ref path } if path == Path::new("a/b")));

        let err = FsError::from_io(io::Error::from(io::ErrorKind::DirectoryNotEmpty), "dir");
        assert!(matches!(err, FsError::NotEmpty { .. }));

        let err = FsError::from_io(io::Error::from(io::ErrorKind::IsADirectory), "dir");
        assert!(matches!(err, FsError::NotARegularFile { .. }));

        let err = FsError::from_io(io::Error::from(io::ErrorKind::Interrupted), "x");
        assert!(matches!(err, FsError::Io { .. }));
    }

    #[test]
    fn test_into_io_error_keeps_kind() {
        let err: io::Error = FsError::not_found("missing.txt").into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("missing.txt"));

        let err: io::Error = FsError::Closed.into();
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn test_display_names_path() {
        let err = FsError::not_empty("/docs");
        assert_eq!(err.to_string(), "/docs: directory not empty");
    }
}
