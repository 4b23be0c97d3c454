//! This module provides a filesystem implementation that keeps a tree of nodes in memory.

use std::collections::btree_map::Entry;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core::{DEFAULT_DIR_MODE, FsBackend, FsError, OpenOptions, Result, utils};
use crate::{DirEntry, FileInfo};

use super::mem::MemFile;
use super::mem::node::{Node, NodeRef, lock_read, lock_write, lookup};

/// A filesystem that stores files and directories in process memory.
///
/// `MemFS` owns a tree of nodes. Every directory node exclusively owns its children, so the
/// tree never has cycles or hard links. Files opened through [`FsBackend::open_file`] are
/// [`MemFile`] descriptors that share the node content and keep their own cursor.
///
/// ### Internal state
///
/// * `root`: The root directory node. Every path is resolved from here, with a leading `/`
///   accepted and ignored.
///
/// ### Concurrency
///
/// Nodes sit behind `RwLock`s, so `MemFS` is `Send + Sync`, but concurrent writers on the same
/// file are not isolated from each other. Serialize access externally if that matters.
/// Cloning a `MemFS` shares the tree.
///
/// ### Example
///
/// ```
/// use wfs_kit::{FsBackend, FsFile, MemFS};
///
/// let fs = MemFS::new();
/// fs.mkdir_all("/docs/drafts", 0o755).unwrap();
///
/// let mut file = fs.create("/docs/note.txt").unwrap();
/// file.write(b"Hello").unwrap();
/// file.close().unwrap();
///
/// assert_eq!(fs.read_file("/docs/note.txt").unwrap(), b"Hello");
/// fs.remove_all("/docs").unwrap();
/// assert!(!fs.exists("/docs"));
/// ```
#[derive(Debug, Clone)]
pub struct MemFS {
    root: NodeRef,
}

impl MemFS {
    /// Creates an empty filesystem holding only the root directory.
    pub fn new() -> Self {
        Self {
            root: Node::dir("/", DEFAULT_DIR_MODE),
        }
    }

    fn lookup(&self, path: &Path) -> Result<NodeRef> {
        let parts = utils::split(path)?;
        lookup(&self.root, &parts, path)
    }

    /// Resolves the directory that holds `path` and the final component name.
    fn lookup_parent(&self, path: &Path) -> Result<(NodeRef, String)> {
        let mut parts = utils::split(path)?;
        let name = parts
            .pop()
            .ok_or_else(|| FsError::invalid("operation not permitted on the root"))?;
        let parent = lookup(&self.root, &parts, path)?;
        if !lock_read(&parent).is_dir() {
            return Err(FsError::not_a_directory(path));
        }
        Ok((parent, name))
    }
}

impl Default for MemFS {
    fn default() -> Self {
        Self::new()
    }
}

impl FsBackend for MemFS {
    type File = MemFile;

    /// Opens a descriptor on `path`.
    ///
    /// The parent directory must exist. With `create`, a missing file is created with the
    /// requested mode; with `truncate`, an existing file is emptied. Directories can only be
    /// opened read-only, and reads on them fail with `NotARegularFile`.
    fn open_file<P: AsRef<Path>>(&self, path: P, options: &OpenOptions) -> Result<MemFile> {
        let path = path.as_ref();
        options.check()?;
        let name = path.to_string_lossy().into_owned();

        if utils::is_root(path) {
            if options.is_create_new() {
                return Err(FsError::already_exists(path));
            }
            if options.is_write() {
                return Err(FsError::not_a_regular_file(path));
            }
            return Ok(MemFile::new(&self.root, name, options));
        }

        let (parent, file_name) = self.lookup_parent(path)?;
        // one write guard on the parent covers both the lookup and the insert
        let mut dir = lock_write(&parent);
        let children = dir
            .children_mut()
            .ok_or_else(|| FsError::not_a_directory(path))?;
        let (node, created) = match children.entry(file_name) {
            Entry::Occupied(entry) => {
                if options.is_create_new() {
                    return Err(FsError::already_exists(path));
                }
                let node = Arc::clone(entry.get());
                {
                    let mut guard = lock_write(&node);
                    if guard.is_dir() && options.is_write() {
                        return Err(FsError::not_a_regular_file(path));
                    }
                    guard.check_access(options, path)?;
                    if options.is_truncate() {
                        if let Some(store) = guard.store_mut() {
                            store.truncate(0)?;
                        }
                        guard.touch();
                    }
                }
                (node, false)
            }
            Entry::Vacant(entry) => {
                if !options.is_create() {
                    return Err(FsError::not_found(path));
                }
                let node = Node::file(entry.key().clone(), options.get_mode());
                entry.insert(Arc::clone(&node));
                (node, true)
            }
        };
        if created {
            dir.touch();
            debug!(path = %path.display(), "created file");
        }
        drop(dir);

        Ok(MemFile::new(&node, name, options))
    }

    /// Creates a single directory. The parent must exist and the target must not.
    fn mkdir<P: AsRef<Path>>(&self, path: P, mode: u32) -> Result<()> {
        let path = path.as_ref();
        if utils::is_root(path) {
            return Err(FsError::already_exists(path));
        }
        let (parent, name) = self.lookup_parent(path)?;
        let mut dir = lock_write(&parent);
        let children = dir
            .children_mut()
            .ok_or_else(|| FsError::not_a_directory(path))?;
        if children.contains_key(&name) {
            return Err(FsError::already_exists(path));
        }
        children.insert(name.clone(), Node::dir(name, mode));
        dir.touch();
        debug!(path = %path.display(), "created directory");
        Ok(())
    }

    /// Removes a file or an empty directory.
    ///
    /// The node is dropped from the tree; descriptors still open on it fail with `NotFound`
    /// from then on.
    fn remove<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if utils::is_root(path) {
            return Err(FsError::invalid("remove: the root cannot be removed"));
        }
        let (parent, name) = self.lookup_parent(path)?;
        let mut dir = lock_write(&parent);
        let children = dir
            .children_mut()
            .ok_or_else(|| FsError::not_a_directory(path))?;
        let non_empty = match children.get(&name) {
            Some(child) => lock_read(child).has_children(),
            None => return Err(FsError::not_found(path)),
        };
        if non_empty {
            return Err(FsError::not_empty(path));
        }
        children.remove(&name);
        dir.touch();
        debug!(path = %path.display(), "removed");
        Ok(())
    }

    /// Moves an entry by detaching it from its parent and attaching it to the new one.
    /// No content is copied.
    fn rename<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> Result<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        let from_parts = utils::split(from)?;
        let to_parts = utils::split(to)?;
        if from_parts.is_empty() || to_parts.is_empty() {
            return Err(FsError::invalid("rename: the root cannot be moved or replaced"));
        }
        if from_parts == to_parts {
            return self.stat(from).map(|_| ());
        }
        if to_parts.starts_with(&from_parts) {
            return Err(FsError::invalid(format!(
                "rename: cannot move {} into itself",
                from.display()
            )));
        }

        let (from_parent, from_name) = self.lookup_parent(from)?;
        let (to_parent, to_name) = self.lookup_parent(to)?;

        let node = lock_read(&from_parent)
            .child(&from_name)
            .ok_or_else(|| FsError::not_found(from))?;
        let moving_dir = lock_read(&node).is_dir();

        let target = lock_read(&to_parent).child(&to_name);
        if let Some(target) = target {
            let target = lock_read(&target);
            match (moving_dir, target.is_dir()) {
                (true, false) => return Err(FsError::not_a_directory(to)),
                (false, true) => return Err(FsError::not_a_regular_file(to)),
                (true, true) if target.has_children() => return Err(FsError::not_empty(to)),
                _ => {}
            }
        }

        {
            let mut dir = lock_write(&from_parent);
            if let Some(children) = dir.children_mut() {
                children.remove(&from_name);
            }
            dir.touch();
        }
        lock_write(&node).set_name(to_name.clone());
        {
            let mut dir = lock_write(&to_parent);
            dir.children_mut()
                .ok_or_else(|| FsError::not_a_directory(to))?
                .insert(to_name, node);
            dir.touch();
        }

        debug!(from = %from.display(), to = %to.display(), "renamed");
        Ok(())
    }

    fn stat<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo> {
        let node = self.lookup(path.as_ref())?;
        let info = lock_read(&node).info();
        Ok(info)
    }

    /// Lists the immediate children of a directory, ordered by name.
    fn read_dir<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DirEntry>> {
        let path = path.as_ref();
        let node = self.lookup(path)?;
        let dir = lock_read(&node);
        let children = dir
            .children()
            .ok_or_else(|| FsError::not_a_directory(path))?;
        Ok(children
            .values()
            .map(|child| lock_read(child).entry())
            .collect())
    }
}
