//! Open descriptors over in-memory nodes.

use std::io::SeekFrom;
use std::sync::{RwLock, Weak};

use crate::FileInfo;
use crate::core::{FsError, FsFile, OpenOptions, Result};

use super::node::{Node, NodeRef, lock_read, lock_write};

/// An open descriptor over a `MemFS` node.
///
/// Each descriptor owns its cursor; content lives in the node and is shared by every
/// descriptor opened on it, so a write through one descriptor is visible to all others
/// immediately. The descriptor does not keep the node alive: once the entry is removed from
/// the tree, operations fail with `NotFound`.
#[derive(Debug)]
pub struct MemFile {
    node: Weak<RwLock<Node>>,
    name: String,
    cursor: u64,
    readable: bool,
    writable: bool,
    append: bool,
    closed: bool,
}

impl MemFile {
    pub(crate) fn new(node: &NodeRef, name: String, options: &OpenOptions) -> Self {
        Self {
            node: std::sync::Arc::downgrade(node),
            name,
            cursor: 0,
            readable: options.is_read(),
            writable: options.is_write(),
            append: options.is_append(),
            closed: false,
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn node(&self) -> Result<NodeRef> {
        if self.closed {
            return Err(FsError::Closed);
        }
        self.node
            .upgrade()
            .ok_or_else(|| FsError::not_found(&self.name))
    }

    fn check_readable(&self) -> Result<()> {
        if !self.readable {
            return Err(FsError::permission_denied(&self.name));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if !self.writable {
            return Err(FsError::permission_denied(&self.name));
        }
        Ok(())
    }
}

impl FsFile for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let node = self.node()?;
        self.check_readable()?;
        let n = {
            let node = lock_read(&node);
            let store = node
                .store()
                .ok_or_else(|| FsError::not_a_regular_file(&self.name))?;
            store.read(buf, self.cursor)
        };
        self.cursor += n as u64;
        Ok(n)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let node = self.node()?;
        self.check_readable()?;
        let node = lock_read(&node);
        let store = node
            .store()
            .ok_or_else(|| FsError::not_a_regular_file(&self.name))?;
        let n = store.read(buf, offset);
        if n < buf.len() {
            return Err(FsError::UnexpectedEof { read: n });
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let node = self.node()?;
        let (offset, n) = {
            let mut node = lock_write(&node);
            let store = node
                .store_mut()
                .ok_or_else(|| FsError::not_a_regular_file(&self.name))?;
            self.check_writable()?;
            let offset = if self.append { store.len() } else { self.cursor };
            let n = store.write(buf, offset)?;
            node.touch();
            (offset, n)
        };
        self.cursor = offset + n as u64;
        Ok(n)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize> {
        let node = self.node()?;
        let mut node = lock_write(&node);
        let store = node
            .store_mut()
            .ok_or_else(|| FsError::not_a_regular_file(&self.name))?;
        self.check_writable()?;
        let n = store.write(buf, offset)?;
        node.touch();
        Ok(n)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let node = self.node()?;
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.cursor) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(lock_read(&node).size()) + i128::from(delta),
        };
        if target < 0 {
            return Err(FsError::invalid("seek: offset before file begin"));
        }
        self.cursor = u64::try_from(target)
            .map_err(|_| FsError::invalid("seek: offset out of range"))?;
        Ok(self.cursor)
    }

    fn stat(&self) -> Result<FileInfo> {
        let node = self.node()?;
        let info = lock_read(&node).info();
        Ok(info)
    }

    fn truncate(&self, size: u64) -> Result<()> {
        let node = self.node()?;
        let mut node = lock_write(&node);
        let store = node
            .store_mut()
            .ok_or_else(|| FsError::not_a_regular_file(&self.name))?;
        self.check_writable()?;
        store.truncate(size)?;
        node.touch();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(FsError::Closed);
        }
        self.closed = true;
        Ok(())
    }
}
