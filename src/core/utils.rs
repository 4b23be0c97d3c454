//! Path helpers shared by every backend.
//!
//! Both backends resolve incoming paths with [`split`], so `MemFS` and `DirFS` walk the same
//! components for the same input.

use std::path::{Component, Path, PathBuf, is_separator};

use crate::error::{FsError, Result};

/// Splits `path` into plain component names.
///
/// Root, drive prefixes, `.` and empty components are dropped. `..` removes the previous
/// component and never climbs above the root.
pub fn split<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Normal(name) => {
                let name = name.to_str().ok_or_else(|| {
                    FsError::invalid(format!("path is not valid UTF-8: {}", path.display()))
                })?;
                parts.push(name.to_string());
            }
        }
    }
    Ok(parts)
}

/// Returns the cleaned form of `path` as a relative path (empty for the root).
pub fn clean<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    Ok(join(&split(path)?))
}

/// Joins component names back into a relative path.
pub fn join<S: AsRef<str>>(parts: &[S]) -> PathBuf {
    parts.iter().map(|part| part.as_ref()).collect()
}

/// Returns true if `path` resolves to the root.
pub fn is_root<P: AsRef<Path>>(path: P) -> bool {
    split(path).is_ok_and(|parts| parts.is_empty())
}

/// Checks that `name` is a plain name and can't be mistaken for a path.
pub fn check_name(name: &str) -> Result<()> {
    if name.chars().any(is_separator) {
        return Err(FsError::invalid(format!(
            "name contains path separator: {name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        assert_eq!(split("a/b/c").unwrap(), ["a", "b", "c"]);
        assert_eq!(split("/a/b").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_split_drops_empty_and_dot() {
        assert_eq!(split("//a///b//").unwrap(), ["a", "b"]);
        assert_eq!(split("./a/./b/.").unwrap(), ["a", "b"]);
        assert!(split("").unwrap().is_empty());
        assert!(split("/").unwrap().is_empty());
        assert!(split(".").unwrap().is_empty());
    }

    #[test]
    fn test_split_parent_dir() {
        assert_eq!(split("a/b/../c").unwrap(), ["a", "c"]);
        assert_eq!(split("/foo/./../bar").unwrap(), ["bar"]);
        assert!(split("../../..").unwrap().is_empty());
        assert_eq!(split("../../x").unwrap(), ["x"]);
    }

    #[test]
    fn test_clean_and_join() {
        assert_eq!(clean("/a//b/./c/").unwrap(), PathBuf::from("a/b/c"));
        assert_eq!(clean("/").unwrap(), PathBuf::new());
        assert_eq!(join(&["x", "y"]), PathBuf::from("x/y"));
    }

    #[test]
    fn test_is_root() {
        assert!(is_root("/"));
        assert!(is_root(""));
        assert!(is_root("a/.."));
        assert!(!is_root("a"));
    }

    #[test]
    fn test_check_name() {
        assert!(check_name("suffix.tmp").is_ok());
        assert!(check_name("").is_ok());
        assert!(matches!(
            check_name("a/b"),
            Err(FsError::InvalidArgument(_))
        ));
    }
}
