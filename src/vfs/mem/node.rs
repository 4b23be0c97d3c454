//! Nodes of the in-memory tree.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use crate::core::{FsError, OpenOptions, Result};
use crate::{DirEntry, EntryType, FileInfo};

use super::ByteStore;

/// Strong reference held by the parent directory (or by `MemFS` for the root).
pub(crate) type NodeRef = Arc<RwLock<Node>>;

#[derive(Debug)]
pub(crate) enum NodeKind {
    Regular(ByteStore),
    Directory(BTreeMap<String, NodeRef>),
}

/// A named file or directory. The kind never changes after creation.
#[derive(Debug)]
pub(crate) struct Node {
    name: String,
    mode: u32,
    mod_time: SystemTime,
    kind: NodeKind,
}

impl Node {
    pub fn file<S: Into<String>>(name: S, mode: u32) -> NodeRef {
        Self::wrap(name.into(), mode, NodeKind::Regular(ByteStore::new()))
    }

    pub fn dir<S: Into<String>>(name: S, mode: u32) -> NodeRef {
        Self::wrap(name.into(), mode, NodeKind::Directory(BTreeMap::new()))
    }

    fn wrap(name: String, mode: u32, kind: NodeKind) -> NodeRef {
        Arc::new(RwLock::new(Node {
            name,
            mode,
            mod_time: SystemTime::now(),
            kind,
        }))
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::Regular(store) => store.len(),
            NodeKind::Directory(_) => 0,
        }
    }

    pub fn touch(&mut self) {
        self.mod_time = SystemTime::now();
    }

    pub fn store(&self) -> Option<&ByteStore> {
        match &self.kind {
            NodeKind::Regular(store) => Some(store),
            NodeKind::Directory(_) => None,
        }
    }

    pub fn store_mut(&mut self) -> Option<&mut ByteStore> {
        match &mut self.kind {
            NodeKind::Regular(store) => Some(store),
            NodeKind::Directory(_) => None,
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<String, NodeRef>> {
        match &self.kind {
            NodeKind::Directory(children) => Some(children),
            NodeKind::Regular(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut BTreeMap<String, NodeRef>> {
        match &mut self.kind {
            NodeKind::Directory(children) => Some(children),
            NodeKind::Regular(_) => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<NodeRef> {
        self.children().and_then(|children| children.get(name).cloned())
    }

    pub fn has_children(&self) -> bool {
        self.children().is_some_and(|children| !children.is_empty())
    }

    /// Coarse owner permission check for opening an existing node.
    pub fn check_access(&self, options: &OpenOptions, path: &Path) -> Result<()> {
        if options.is_read() && self.mode & 0o400 == 0 {
            return Err(FsError::permission_denied(path));
        }
        if options.is_write() && self.mode & 0o200 == 0 {
            return Err(FsError::permission_denied(path));
        }
        Ok(())
    }

    fn entry_type(&self) -> EntryType {
        match self.kind {
            NodeKind::Regular(_) => EntryType::File,
            NodeKind::Directory(_) => EntryType::Directory,
        }
    }

    pub fn info(&self) -> FileInfo {
        FileInfo::new(
            self.name.clone(),
            self.entry_type(),
            self.size(),
            self.mode,
            self.mod_time,
        )
    }

    pub fn entry(&self) -> DirEntry {
        DirEntry::new(self.name.clone(), self.entry_type())
    }
}

// Node data stays structurally valid even if a holder panicked, so poisoning is ignored.
pub(crate) fn lock_read(node: &NodeRef) -> RwLockReadGuard<'_, Node> {
    node.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock_write(node: &NodeRef) -> RwLockWriteGuard<'_, Node> {
    node.write().unwrap_or_else(PoisonError::into_inner)
}

/// Walks `parts` down from `root`. `path` is only used for error reporting.
pub(crate) fn lookup(root: &NodeRef, parts: &[String], path: &Path) -> Result<NodeRef> {
    let mut current = Arc::clone(root);
    for part in parts {
        let next = {
            let node = lock_read(&current);
            match &node.kind {
                NodeKind::Directory(children) => children
                    .get(part)
                    .cloned()
                    .ok_or_else(|| FsError::not_found(path))?,
                NodeKind::Regular(_) => return Err(FsError::not_a_directory(path)),
            }
        };
        current = next;
    }
    Ok(current)
}
